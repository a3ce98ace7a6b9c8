//! Report rendering for resolved libraries.
//!
//! - [`csv`] — machine-readable `name, url, spdx` rows.
//! - [`terminal`] — colored summary and failure tables.

pub mod csv;
pub mod terminal;

/// One library's resolution result, ready for rendering.
#[derive(Debug, Clone)]
pub struct LibraryReport {
    /// Library name (common import-path prefix of its packages).
    pub name: String,
    /// Owning module's version, empty for the module in development.
    pub version: String,
    /// SPDX identifier of the license, when one could be determined.
    pub spdx_id: Option<String>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// A browsable URL was resolved (and validated, unless validation was
    /// skipped or unsupported).
    Resolved { url: String },
    /// No license file was discovered for the library's packages.
    Unlicensed,
    /// Module repair, URL computation, or validation failed.
    Failed { error: String },
}

impl LibraryReport {
    pub fn failed(&self) -> bool {
        !matches!(self.outcome, Outcome::Resolved { .. })
    }
}
