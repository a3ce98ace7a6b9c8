//! License file discovery and identification.
//!
//! - [`finder`] — locates the license file governing a package directory.
//! - [`spdx`] — guesses a canonical SPDX identifier from license text, used
//!   only as report metadata.

pub mod finder;
pub mod spdx;
