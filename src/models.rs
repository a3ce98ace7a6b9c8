use std::path::{Path, PathBuf};

use serde::Serialize;

/// A versioned Go module. Owns zero or more packages and is rooted at a
/// single directory in the local module cache (or the workspace itself for
/// the main module).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    /// Module import path, e.g. `github.com/fatih/color`.
    pub path: String,
    /// Semantic version, e.g. `v1.16.0`. Empty for the module under
    /// development, which has not been tagged yet.
    pub version: String,
    /// Absolute directory the module is extracted to. Empty when the module
    /// metadata is incomplete, which happens for vendored dependencies.
    pub dir: PathBuf,
    /// Whether this is the main module of the workspace.
    pub is_main: bool,
}

/// A single Go package as reported by the graph loader.
#[derive(Debug, Clone)]
pub struct Package {
    /// Import path, unique within a graph.
    pub import_path: String,
    /// Absolute paths of the package's Go source files.
    pub go_files: Vec<PathBuf>,
    /// Absolute paths of non-Go files (C, assembly, ...). These cannot be
    /// inspected for further dependencies.
    pub other_files: Vec<PathBuf>,
    /// Import paths of directly imported packages.
    pub imports: Vec<String>,
    /// Owning module, if the loader could determine one.
    pub module: Option<Module>,
    /// Load error messages. Non-empty means the package failed to load.
    pub errors: Vec<String>,
}

impl Package {
    /// Directory containing the package's files, derived from the first file
    /// the loader reported. `None` for an empty package.
    pub fn dir(&self) -> Option<&Path> {
        self.go_files
            .first()
            .or_else(|| self.other_files.first())
            .and_then(|f| f.parent())
    }
}

/// A collection of packages covered by the same license file.
///
/// Packages without a discoverable license become singleton libraries with
/// `license_path == None`.
#[derive(Debug, Clone)]
pub struct Library {
    /// Absolute path of the file containing the library's license.
    pub license_path: Option<PathBuf>,
    /// Import paths of the member packages. Not necessarily the complete
    /// set of packages in the library, only the reachable ones.
    pub packages: Vec<String>,
    /// Owning module, shared by every member package.
    pub module: Option<Module>,
}

impl Library {
    /// The common prefix of the import paths of all packages in this
    /// library. For a singleton this is the package's import path itself.
    pub fn name(&self) -> String {
        common_ancestor(&self.packages)
    }
}

impl std::fmt::Display for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Longest common `/`-delimited prefix of a set of import paths.
fn common_ancestor(paths: &[String]) -> String {
    if paths.is_empty() {
        return String::new();
    }
    if paths.len() == 1 {
        return paths[0].clone();
    }
    let mut sorted: Vec<&str> = paths.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    // The lexicographic min and max bound every other path, so their common
    // prefix is the common prefix of the whole set.
    let (min, max) = (sorted[0].as_bytes(), sorted[sorted.len() - 1].as_bytes());
    let mut last_slash = 0;
    for i in 0..min.len().min(max.len()) {
        if min[i] != max[i] {
            return sorted[0][..last_slash].to_string();
        }
        if min[i] == b'/' {
            last_slash = i;
        }
    }
    sorted[0].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib(paths: &[&str]) -> Library {
        Library {
            license_path: None,
            packages: paths.iter().map(|p| p.to_string()).collect(),
            module: None,
        }
    }

    #[test]
    fn test_name_singleton() {
        assert_eq!(lib(&["github.com/a/b"]).name(), "github.com/a/b");
    }

    #[test]
    fn test_name_common_prefix() {
        assert_eq!(lib(&["a/b/c", "a/b/d"]).name(), "a/b");
    }

    #[test]
    fn test_name_duplicate_paths() {
        assert_eq!(lib(&["a/b", "a/b"]).name(), "a/b");
    }

    #[test]
    fn test_name_prefix_respects_segment_boundary() {
        // "a/bc" and "a/bd" share "a/b" as a string prefix but not as a
        // path segment.
        assert_eq!(lib(&["a/bc", "a/bd"]).name(), "a");
    }

    #[test]
    fn test_name_one_path_is_prefix_of_other() {
        assert_eq!(lib(&["a/b", "a/b/c"]).name(), "a/b");
    }

    #[test]
    fn test_name_empty() {
        assert_eq!(lib(&[]).name(), "");
    }

    #[test]
    fn test_package_dir_prefers_go_files() {
        let pkg = Package {
            import_path: "x".into(),
            go_files: vec![PathBuf::from("/src/x/a.go")],
            other_files: vec![PathBuf::from("/src/other/b.c")],
            imports: vec![],
            module: None,
            errors: vec![],
        };
        assert_eq!(pkg.dir(), Some(Path::new("/src/x")));
    }

    #[test]
    fn test_package_dir_falls_back_to_other_files() {
        let pkg = Package {
            import_path: "x".into(),
            go_files: vec![],
            other_files: vec![PathBuf::from("/src/x/b.c")],
            imports: vec![],
            module: None,
            errors: vec![],
        };
        assert_eq!(pkg.dir(), Some(Path::new("/src/x")));
    }
}
