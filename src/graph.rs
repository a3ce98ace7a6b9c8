use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use thiserror::Error;

use crate::models::Package;

/// The transitive package graph produced by a [`PackageLoader`].
#[derive(Debug, Default)]
pub struct PackageGraph {
    /// Import paths the load was requested for, after pattern expansion.
    pub roots: Vec<String>,
    /// Every loaded package, keyed by import path.
    pub packages: HashMap<String, Package>,
    /// Root of the platform's standard library source tree (GOROOT).
    pub goroot: PathBuf,
}

impl PackageGraph {
    /// Packages the load was requested for.
    pub fn root_packages(&self) -> impl Iterator<Item = &Package> {
        self.roots.iter().filter_map(|r| self.packages.get(r))
    }
}

/// Produces a [`PackageGraph`] for a set of import path patterns.
///
/// The production implementation shells out to the Go toolchain
/// ([`crate::golist::GoListLoader`]); tests construct graphs directly.
pub trait PackageLoader {
    fn load(&self, patterns: &[String]) -> Result<PackageGraph>;
}

/// One or more reachable packages failed to load. The whole walk is aborted:
/// a partial license inventory is worse than an explicit failure.
#[derive(Debug, Error)]
#[error("errors in the package graph:{}", .failures.iter().map(|(p, e)| format!("\n{}: {}", p, e)).collect::<String>())]
pub struct GraphError {
    /// `(import path, message)` for every failing package.
    pub failures: Vec<(String, String)>,
}

/// Walk the graph from its roots and return every reachable package that
/// carries license obligations.
///
/// Standard-library packages are pruned (no descent below them), empty
/// packages are skipped but their imports are still followed, and packages
/// with non-Go files are accepted with a warning since those files cannot be
/// inspected for nested dependencies. Any load error anywhere in the
/// reachable graph fails the whole walk with a [`GraphError`] enumerating
/// every failing package.
pub fn walk(graph: &PackageGraph) -> Result<Vec<&Package>, GraphError> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = graph.roots.iter().map(String::as_str).collect();
    let mut accepted = Vec::new();
    let mut failures = Vec::new();

    while let Some(path) = stack.pop() {
        if !visited.insert(path) {
            continue;
        }
        let Some(pkg) = graph.packages.get(path) else {
            // The loader did not report this import. Nothing to attribute.
            continue;
        };
        if !pkg.errors.is_empty() {
            for err in &pkg.errors {
                failures.push((pkg.import_path.clone(), err.clone()));
            }
            continue;
        }
        if is_std_lib(pkg, graph) {
            // No license requirements for the standard library.
            continue;
        }
        if !pkg.other_files.is_empty() {
            eprintln!(
                " {} {} contains non-Go code that can't be inspected for further dependencies",
                "warning:".yellow(),
                pkg.import_path
            );
        }
        if pkg.dir().is_some() {
            accepted.push(pkg);
        }
        for import in &pkg.imports {
            stack.push(import);
        }
    }

    failures.sort();
    if !failures.is_empty() {
        return Err(GraphError { failures });
    }
    Ok(accepted)
}

/// Whether a package belongs to the Go standard library.
fn is_std_lib(pkg: &Package, graph: &PackageGraph) -> bool {
    if pkg.import_path == "unsafe" {
        // unsafe has no Go files of its own.
        return true;
    }
    match pkg.go_files.first() {
        Some(f) => !graph.goroot.as_os_str().is_empty() && f.starts_with(&graph.goroot),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn pkg(path: &str, dir: &str, imports: &[&str]) -> Package {
        Package {
            import_path: path.to_string(),
            go_files: if dir.is_empty() {
                vec![]
            } else {
                vec![PathBuf::from(format!("{}/{}.go", dir, "a"))]
            },
            other_files: vec![],
            imports: imports.iter().map(|i| i.to_string()).collect(),
            module: None,
            errors: vec![],
        }
    }

    fn graph(roots: &[&str], pkgs: Vec<Package>) -> PackageGraph {
        PackageGraph {
            roots: roots.iter().map(|r| r.to_string()).collect(),
            packages: pkgs
                .into_iter()
                .map(|p| (p.import_path.clone(), p))
                .collect(),
            goroot: PathBuf::from("/goroot"),
        }
    }

    fn names(pkgs: &[&Package]) -> Vec<String> {
        let mut v: Vec<String> = pkgs.iter().map(|p| p.import_path.clone()).collect();
        v.sort();
        v
    }

    #[test]
    fn test_diamond_visited_once() {
        let g = graph(
            &["root"],
            vec![
                pkg("root", "/src/root", &["left", "right"]),
                pkg("left", "/src/left", &["shared"]),
                pkg("right", "/src/right", &["shared"]),
                pkg("shared", "/src/shared", &[]),
            ],
        );
        let visited = walk(&g).unwrap();
        assert_eq!(names(&visited), vec!["left", "right", "root", "shared"]);
    }

    #[test]
    fn test_std_lib_pruned() {
        let mut fmt = pkg("fmt", "/goroot/src/fmt", &["hidden"]);
        fmt.go_files = vec![PathBuf::from("/goroot/src/fmt/print.go")];
        let g = graph(
            &["root"],
            vec![
                pkg("root", "/src/root", &["fmt", "unsafe"]),
                fmt,
                // Reachable only through fmt; pruning must not descend.
                pkg("hidden", "/src/hidden", &[]),
                pkg("unsafe", "", &[]),
            ],
        );
        let visited = walk(&g).unwrap();
        assert_eq!(names(&visited), vec!["root"]);
    }

    #[test]
    fn test_empty_package_skipped_but_imports_followed() {
        let g = graph(
            &["root"],
            vec![
                pkg("root", "/src/root", &["empty"]),
                pkg("empty", "", &["below"]),
                pkg("below", "/src/below", &[]),
            ],
        );
        let visited = walk(&g).unwrap();
        assert_eq!(names(&visited), vec!["below", "root"]);
    }

    #[test]
    fn test_load_error_is_fatal_and_aggregated() {
        let mut broken = pkg("broken", "/src/broken", &[]);
        broken.errors = vec!["no Go files".to_string()];
        let mut also = pkg("also", "/src/also", &[]);
        also.errors = vec!["cycle detected".to_string()];
        let g = graph(
            &["root"],
            vec![pkg("root", "/src/root", &["broken", "also"]), broken, also],
        );
        let err = walk(&g).unwrap_err();
        assert_eq!(err.failures.len(), 2);
        let msg = err.to_string();
        assert!(msg.contains("broken: no Go files"));
        assert!(msg.contains("also: cycle detected"));
    }

    #[test]
    fn test_package_with_other_files_accepted() {
        let mut cgo = pkg("cgo", "", &[]);
        cgo.other_files = vec![PathBuf::from("/src/cgo/native.c")];
        let g = graph(&["root"], vec![pkg("root", "/src/root", &["cgo"]), cgo]);
        let visited = walk(&g).unwrap();
        assert_eq!(names(&visited), vec!["cgo", "root"]);
    }

    #[test]
    fn test_missing_import_ignored() {
        let g = graph(&["root"], vec![pkg("root", "/src/root", &["ghost"])]);
        let visited = walk(&g).unwrap();
        assert_eq!(names(&visited), vec!["root"]);
    }
}
