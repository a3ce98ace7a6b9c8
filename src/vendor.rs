use std::path::Path;

use colored::Colorize;

use crate::models::{Library, Module};

/// Directory segment that, by Go convention, roots a vendored subtree.
const VENDOR_MARKER: &str = "/vendor/";

/// Split a license path on the vendoring marker, yielding the enclosing
/// (parent) module directory.
///
/// Ecosystem-specific heuristic, kept isolated so it can be swapped without
/// touching grouping or URL logic.
fn split_vendor_path(license_path: &Path) -> Option<&Path> {
    let s = license_path.to_str()?;
    let (prefix, _) = s.split_once(VENDOR_MARKER)?;
    Some(Path::new(prefix))
}

/// Repair library→module ownership for vendored dependencies.
///
/// A module with a non-empty path but an empty directory is the signature of
/// a vendored dependency whose own metadata the loader could not resolve.
/// Vendored source is committed inside its consumer's module, so the license
/// is attributable via the consumer's repository: find the root module whose
/// directory encloses the license path's vendor marker and take ownership
/// from it. First match wins when several root modules share the directory.
///
/// Libraries that cannot be repaired keep their directory-less module and a
/// warning is emitted; URL resolution for them fails deterministically
/// later.
pub fn repair_owners(libraries: &mut [Library], root_modules: &[Module]) {
    for library in libraries.iter_mut() {
        let needs_repair = library
            .module
            .as_ref()
            .is_some_and(|m| !m.path.is_empty() && m.dir.as_os_str().is_empty());
        if !needs_repair {
            continue;
        }
        let module_path = library.module.as_ref().map(|m| m.path.clone()).unwrap_or_default();
        let Some(license_path) = library.license_path.as_deref() else {
            continue;
        };
        let Some(parent_dir) = split_vendor_path(license_path) else {
            eprintln!(
                " {} module {} has no directory and is not vendored, cannot discover its license URL",
                "warning:".yellow(),
                module_path
            );
            continue;
        };
        match root_modules.iter().find(|m| m.dir == parent_dir) {
            Some(parent) => library.module = Some(parent.clone()),
            None => eprintln!(
                " {} cannot find the consuming module of vendored module {}",
                "warning:".yellow(),
                module_path
            ),
        }
    }
}
