use anyhow::Result;
use async_trait::async_trait;

use super::{HostKind, RemoteSource, SourceHost};

/// Maps module paths to their hosting repository by convention: well-known
/// hosts, `golang.org/x` and `gopkg.in` redirectors, major-version suffixes,
/// and the nested-module tag prefix.
pub struct HostResolver;

impl HostResolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HostResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceHost for HostResolver {
    async fn resolve(&self, module_path: &str, version: &str) -> Result<RemoteSource> {
        let path = rewrite_redirectors(module_path);
        let path = strip_major_version(&path);

        let segments: Vec<&str> = path.split('/').collect();
        let kind = match segments.first().copied() {
            Some("github.com") => HostKind::GitHub,
            Some("gitlab.com") => HostKind::GitLab,
            _ => HostKind::Other,
        };

        let (base, subdir) = if kind != HostKind::Other && segments.len() >= 3 {
            (segments[..3].join("/"), segments[3..].join("/"))
        } else {
            (path.to_string(), String::new())
        };

        // Tags for modules nested in a sub-directory carry the sub-directory
        // as a prefix, e.g. `plugin/api/v1.2.0`.
        let reference = if version.is_empty() || subdir.is_empty() {
            version.to_string()
        } else {
            format!("{}/{}", subdir, version)
        };

        Ok(RemoteSource {
            kind,
            base,
            reference,
            subdir,
        })
    }
}

/// Rewrite vanity-import redirectors to the repositories they point at.
fn rewrite_redirectors(module_path: &str) -> String {
    if let Some(rest) = module_path.strip_prefix("golang.org/x/") {
        return format!("github.com/golang/{}", rest);
    }
    if let Some(rest) = module_path.strip_prefix("gopkg.in/") {
        // gopkg.in/pkg.v3        -> github.com/go-pkg/pkg
        // gopkg.in/user/pkg.v3   -> github.com/user/pkg
        let segments: Vec<&str> = rest.split('/').collect();
        match segments.as_slice() {
            [pkg] => {
                let name = pkg.split('.').next().unwrap_or(pkg);
                return format!("github.com/go-{}/{}", name, name);
            }
            [user, pkg] => {
                let name = pkg.split('.').next().unwrap_or(pkg);
                return format!("github.com/{}/{}", user, name);
            }
            _ => {}
        }
    }
    module_path.to_string()
}

/// Drop a trailing `/vN` major-version path segment; it names an API
/// revision, not a directory in the repository.
fn strip_major_version(path: &str) -> String {
    if let Some((head, last)) = path.rsplit_once('/') {
        if let Some(major) = last.strip_prefix('v').and_then(|n| n.parse::<u64>().ok()) {
            // v0/v1 are never encoded in the path.
            if major >= 2 {
                return head.to_string();
            }
        }
    }
    path.to_string()
}
