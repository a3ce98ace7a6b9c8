//! Source-hosting services: mapping a module to the repository that hosts it
//! and computing browsable / raw file URLs against that repository.

pub mod resolver;

use anyhow::Result;
use async_trait::async_trait;

/// Hosting services with known URL schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKind {
    GitHub,
    GitLab,
    /// Unrecognized host. Browsable URLs are a best-effort guess and raw
    /// URLs are unsupported.
    Other,
}

/// Resolved handle to the hosting location of a module's repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    pub kind: HostKind,
    /// Repository root without scheme, e.g. `github.com/fatih/color`.
    pub base: String,
    /// Tag, commit, or the symbolic default-branch marker `HEAD`.
    pub reference: String,
    /// The module's sub-directory within the repository; empty when the
    /// module sits at the repository root.
    pub subdir: String,
}

impl RemoteSource {
    /// Override the resolved reference, e.g. with the symbolic `HEAD` marker
    /// for untagged modules.
    pub fn set_reference(&mut self, reference: &str) {
        self.reference = reference.to_string();
    }

    /// A path relative to the module directory, rebased onto the repository
    /// root.
    fn repo_path(&self, relative: &str) -> String {
        if self.subdir.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.subdir, relative)
        }
    }

    /// Browsable URL for a file path relative to the module directory.
    pub fn file_url(&self, relative: &str) -> String {
        self.repo_root_file_url(&self.repo_path(relative))
    }

    /// Raw-content URL for a file path relative to the module directory.
    /// `None` when the host has no raw scheme.
    pub fn raw_file_url(&self, relative: &str) -> Option<String> {
        self.repo_root_raw_file_url(&self.repo_path(relative))
    }

    /// Browsable URL for a file path relative to the repository root.
    pub fn repo_root_file_url(&self, path: &str) -> String {
        match self.kind {
            HostKind::GitHub => {
                format!("https://{}/blob/{}/{}", self.base, self.reference, path)
            }
            HostKind::GitLab => {
                format!("https://{}/-/blob/{}/{}", self.base, self.reference, path)
            }
            HostKind::Other => format!("https://{}/{}", self.base, path),
        }
    }

    /// Raw-content URL for a file path relative to the repository root.
    pub fn repo_root_raw_file_url(&self, path: &str) -> Option<String> {
        match self.kind {
            HostKind::GitHub => {
                let repo = self.base.strip_prefix("github.com/")?;
                Some(format!(
                    "https://raw.githubusercontent.com/{}/{}/{}",
                    repo, self.reference, path
                ))
            }
            HostKind::GitLab => Some(format!(
                "https://{}/-/raw/{}/{}",
                self.base, self.reference, path
            )),
            HostKind::Other => None,
        }
    }
}

impl std::fmt::Display for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base)
    }
}

/// Resolves module coordinates to a [`RemoteSource`].
#[async_trait]
pub trait SourceHost: Sync {
    async fn resolve(&self, module_path: &str, version: &str) -> Result<RemoteSource>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github(subdir: &str) -> RemoteSource {
        RemoteSource {
            kind: HostKind::GitHub,
            base: "github.com/fatih/color".to_string(),
            reference: "v1.16.0".to_string(),
            subdir: subdir.to_string(),
        }
    }

    #[test]
    fn test_github_urls() {
        let remote = github("");
        assert_eq!(
            remote.file_url("LICENSE.md"),
            "https://github.com/fatih/color/blob/v1.16.0/LICENSE.md"
        );
        assert_eq!(
            remote.raw_file_url("LICENSE.md").unwrap(),
            "https://raw.githubusercontent.com/fatih/color/v1.16.0/LICENSE.md"
        );
    }

    #[test]
    fn test_subdir_module_urls_rebased_on_repo_root() {
        let remote = github("plugin/api");
        assert_eq!(
            remote.file_url("LICENSE"),
            "https://github.com/fatih/color/blob/v1.16.0/plugin/api/LICENSE"
        );
        // Repo-root variants ignore the subdir.
        assert_eq!(
            remote.repo_root_file_url("LICENSE"),
            "https://github.com/fatih/color/blob/v1.16.0/LICENSE"
        );
    }

    #[test]
    fn test_gitlab_urls() {
        let remote = RemoteSource {
            kind: HostKind::GitLab,
            base: "gitlab.com/group/proj".to_string(),
            reference: "v2.1.0".to_string(),
            subdir: String::new(),
        };
        assert_eq!(
            remote.file_url("COPYING"),
            "https://gitlab.com/group/proj/-/blob/v2.1.0/COPYING"
        );
        assert_eq!(
            remote.raw_file_url("COPYING").unwrap(),
            "https://gitlab.com/group/proj/-/raw/v2.1.0/COPYING"
        );
    }

    #[test]
    fn test_other_host_has_no_raw_url() {
        let remote = RemoteSource {
            kind: HostKind::Other,
            base: "example.org/some/module".to_string(),
            reference: "v1.0.0".to_string(),
            subdir: String::new(),
        };
        assert!(remote.raw_file_url("LICENSE").is_none());
        assert_eq!(
            remote.file_url("LICENSE"),
            "https://example.org/some/module/LICENSE"
        );
    }

    #[test]
    fn test_set_reference() {
        let mut remote = github("");
        remote.set_reference("HEAD");
        assert_eq!(
            remote.file_url("LICENSE"),
            "https://github.com/fatih/color/blob/HEAD/LICENSE"
        );
    }
}
