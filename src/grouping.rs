use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::license::finder::LicenseFinder;
use crate::models::{Library, Package};

/// Group visited packages into libraries keyed by their governing license
/// file.
///
/// Grouping is at license-file granularity rather than module granularity: a
/// single module may embed vendored subtrees with distinct license files,
/// and one license file can cover several packages of the same module.
/// Packages with no discoverable license each become their own singleton
/// library with `license_path == None`.
///
/// The returned list is sorted by [`Library::name`] for stable, diffable
/// output; bucketing itself imposes no ordering.
pub fn group_libraries(
    packages: &[&Package],
    finder: &dyn LicenseFinder,
) -> Result<Vec<Library>> {
    let mut by_license: HashMap<PathBuf, Vec<&Package>> = HashMap::new();
    let mut unlicensed: Vec<&Package> = Vec::new();

    for pkg in packages {
        let Some(pkg_dir) = pkg.dir() else { continue };
        let module_dir = pkg
            .module
            .as_ref()
            .map(|m| m.dir.as_path())
            .unwrap_or_else(|| Path::new(""));
        let found = finder
            .find_license(pkg_dir, module_dir)
            .with_context(|| format!("finding license for {}", pkg.import_path))?;
        match found {
            Some(path) => by_license.entry(path).or_default().push(pkg),
            None => unlicensed.push(pkg),
        }
    }

    let mut libraries = Vec::new();
    for pkg in unlicensed {
        libraries.push(Library {
            license_path: None,
            packages: vec![pkg.import_path.clone()],
            module: pkg.module.clone(),
        });
    }
    for (license_path, members) in by_license {
        let mut library = Library {
            license_path: Some(license_path),
            packages: Vec::new(),
            module: None,
        };
        for pkg in members {
            library.packages.push(pkg.import_path.clone());
            if library.module.is_none() {
                // All member packages belong to the same module.
                library.module = pkg.module.clone();
            }
        }
        libraries.push(library);
    }

    libraries.sort_by_key(Library::name);
    Ok(libraries)
}
