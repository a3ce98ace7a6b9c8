use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

/// Locates the license file governing a package.
///
/// Implementations return `Ok(None)` when nothing was found; `Err` is
/// reserved for I/O-level faults.
pub trait LicenseFinder {
    fn find_license(&self, pkg_dir: &Path, module_dir: &Path) -> Result<Option<PathBuf>>;
}

/// Scans a package directory and its ancestors for a conventionally named
/// license file.
///
/// The scan starts at the package directory and walks upward, stopping after
/// the owning module's directory has been scanned. When the module directory
/// is unknown (vendored dependencies), the scan instead stops at the
/// enclosing `vendor` directory, which by convention bounds the vendored
/// subtree.
pub struct DirScanner {
    pattern: Regex,
}

impl Default for DirScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl DirScanner {
    pub fn new() -> Self {
        Self {
            // LICENSE, LICENCE, COPYING and COPYRIGHT variants, optionally
            // with a markdown or text extension. NOTICE files are not
            // licenses and are deliberately excluded.
            pattern: Regex::new(r"(?i)^(licen[sc]e|copying|copyright)(\.(md|txt|markdown))?$")
                .expect("license filename pattern"),
        }
    }

    /// Return the first matching license filename in `dir`, alphabetically.
    fn scan_dir(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("scanning {} for license files", dir.display()))?;
        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if self.pattern.is_match(name) && entry.path().is_file() {
                matches.push(entry.path());
            }
        }
        matches.sort();
        Ok(matches.into_iter().next())
    }
}

impl LicenseFinder for DirScanner {
    fn find_license(&self, pkg_dir: &Path, module_dir: &Path) -> Result<Option<PathBuf>> {
        let bounded = !module_dir.as_os_str().is_empty();
        if bounded && !pkg_dir.starts_with(module_dir) {
            anyhow::bail!(
                "package dir {} is not inside module dir {}",
                pkg_dir.display(),
                module_dir.display()
            );
        }
        let mut dir = pkg_dir;
        loop {
            // An unbounded scan must not escape the vendored subtree.
            if !bounded && dir.file_name().map(|n| n == "vendor").unwrap_or(false) {
                return Ok(None);
            }
            if let Some(found) = self.scan_dir(dir)? {
                return Ok(Some(found));
            }
            if bounded && dir == module_dir {
                return Ok(None);
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_finds_license_in_package_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("pkg");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("LICENSE"), "MIT").unwrap();

        let found = DirScanner::new()
            .find_license(&pkg, tmp.path())
            .unwrap()
            .unwrap();
        assert_eq!(found, pkg.join("LICENSE"));
    }

    #[test]
    fn test_walks_up_to_module_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("a/b/c");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(tmp.path().join("COPYING"), "GPL").unwrap();

        let found = DirScanner::new()
            .find_license(&pkg, tmp.path())
            .unwrap()
            .unwrap();
        assert_eq!(found, tmp.path().join("COPYING"));
    }

    #[test]
    fn test_stops_at_module_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let module = tmp.path().join("module");
        let pkg = module.join("pkg");
        fs::create_dir_all(&pkg).unwrap();
        // A license above the module boundary must not be attributed.
        fs::write(tmp.path().join("LICENSE"), "MIT").unwrap();

        let found = DirScanner::new().find_license(&pkg, &module).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_unbounded_scan_stops_at_vendor_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let pkg = tmp.path().join("vendor/example.com/dep");
        fs::create_dir_all(&pkg).unwrap();
        // The consumer's own license sits above vendor/; a vendored package
        // without module metadata must not claim it.
        fs::write(tmp.path().join("LICENSE"), "MIT").unwrap();

        let found = DirScanner::new().find_license(&pkg, Path::new("")).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_unbounded_scan_finds_vendored_license() {
        let tmp = tempfile::tempdir().unwrap();
        let dep = tmp.path().join("vendor/example.com/dep");
        let pkg = dep.join("internal");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(dep.join("LICENSE.md"), "Apache").unwrap();

        let found = DirScanner::new()
            .find_license(&pkg, Path::new(""))
            .unwrap()
            .unwrap();
        assert_eq!(found, dep.join("LICENSE.md"));
    }

    #[test]
    fn test_notice_is_not_a_license() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("NOTICE"), "attribution").unwrap();

        let found = DirScanner::new()
            .find_license(tmp.path(), tmp.path())
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_pkg_dir_outside_module_dir_is_an_error() {
        let result =
            DirScanner::new().find_license(Path::new("/elsewhere/pkg"), Path::new("/module"));
        assert!(result.is_err());
    }

    #[test]
    fn test_case_insensitive_match() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("License.txt"), "BSD").unwrap();

        let found = DirScanner::new()
            .find_license(tmp.path(), tmp.path())
            .unwrap()
            .unwrap();
        assert_eq!(found, tmp.path().join("License.txt"));
    }
}
