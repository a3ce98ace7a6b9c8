use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use colored::Colorize;
use thiserror::Error;

use crate::fetch::{Fetch, FetchError};
use crate::models::Library;
use crate::source::SourceHost;

/// Conventional name of a repository's top-level license file. Only this
/// name qualifies for the second resolution attempt.
const TOP_LEVEL_LICENSE: &str = "LICENSE";

/// Delay before the single retry of a failed raw-content download.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// A single validation attempt failed.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("local license file content does not match remote license URL {url}")]
    Mismatch { url: String },
}

/// URL resolution failed for one library. Never aborts other libraries.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("library {library}: no license file was found")]
    NoLicenseFile { library: String },
    #[error("library {library}: empty module info")]
    MissingModule { library: String },
    #[error("library {library}: module {module} has an empty directory")]
    MissingModuleDir { library: String, module: String },
    #[error("library {library}: resolving source host: {source}")]
    Host {
        library: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("library {library}: license path {path} is outside module directory {dir}")]
    PathOutsideModule {
        library: String,
        path: PathBuf,
        dir: PathBuf,
    },
    #[error("library {library}: reading local license file {path}: {source}")]
    LocalRead {
        library: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to validate {url}: {source}")]
    Validation {
        url: String,
        #[source]
        source: ValidationError,
    },
    #[error(
        "cannot infer remote URL for {path}, failed attempts:\n\tattempt 1: failed to validate {url1}: {first}\n\tattempt 2: failed to validate {url2}: {second}"
    )]
    AttemptsExhausted {
        path: PathBuf,
        url1: String,
        first: ValidationError,
        url2: String,
        second: ValidationError,
    },
}

/// Verifies that a raw-content URL serves given local bytes.
///
/// An injectable capability so that callers without network access (or test
/// setups without real license files upstream) can swap in
/// [`SkipValidation`] instead of flipping a global flag.
#[async_trait]
pub trait Validate: Sync {
    async fn validate(&self, raw_url: &str, local: &[u8]) -> Result<(), ValidationError>;
}

/// Byte-exact validation against a fetched raw URL, with a single retry
/// after a fixed delay on any download failure.
pub struct ContentValidator<F> {
    fetcher: F,
}

impl<F: Fetch> ContentValidator<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl<F: Fetch + Send> Validate for ContentValidator<F> {
    async fn validate(&self, raw_url: &str, local: &[u8]) -> Result<(), ValidationError> {
        let remote = match self.fetcher.get(raw_url).await {
            Ok(bytes) => bytes,
            Err(_) => {
                tokio::time::sleep(RETRY_DELAY).await;
                self.fetcher.get(raw_url).await?
            }
        };
        if remote != local {
            return Err(ValidationError::Mismatch {
                url: raw_url.to_string(),
            });
        }
        Ok(())
    }
}

/// Accepts every candidate URL without fetching anything.
pub struct SkipValidation;

#[async_trait]
impl Validate for SkipValidation {
    async fn validate(&self, _raw_url: &str, _local: &[u8]) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Resolves the remote URL of a library's license file and cross-validates
/// it against the local bytes.
pub struct UrlResolver<'a> {
    host: &'a dyn SourceHost,
    validator: &'a dyn Validate,
}

impl<'a> UrlResolver<'a> {
    pub fn new(host: &'a dyn SourceHost, validator: &'a dyn Validate) -> Self {
        Self { host, validator }
    }

    /// Determine a browsable URL for the library's license file using the
    /// owning module's path and version.
    ///
    /// The first candidate is the license path relative to the module
    /// directory. If its content does not validate and the relative path is
    /// the top-level `LICENSE`, the repository root's `LICENSE` is tried
    /// second: a module nested in a sub-directory of its repository may
    /// inherit the repository-root license.
    pub async fn license_url(&self, library: &Library) -> Result<String, ResolveError> {
        let name = library.name();
        let license_path = library
            .license_path
            .as_deref()
            .ok_or_else(|| ResolveError::NoLicenseFile {
                library: name.clone(),
            })?;
        let module = library
            .module
            .as_ref()
            .ok_or_else(|| ResolveError::MissingModule {
                library: name.clone(),
            })?;
        if module.dir.as_os_str().is_empty() {
            return Err(ResolveError::MissingModuleDir {
                library: name,
                module: module.path.clone(),
            });
        }

        let mut remote = self
            .host
            .resolve(&module.path, &module.version)
            .await
            .map_err(|source| ResolveError::Host {
                library: name.clone(),
                source,
            })?;
        if module.version.is_empty() {
            // The module in development has no tag to point at. HEAD always
            // names the default branch, whatever the repository calls it,
            // but the URL may drift from the currently checked-out content.
            remote.set_reference("HEAD");
            eprintln!(
                " {} module {} has an empty version, defaulting to HEAD; please verify the license URL",
                "warning:".yellow(),
                module.path
            );
        }

        let relative = license_path
            .strip_prefix(&module.dir)
            .map_err(|_| ResolveError::PathOutsideModule {
                library: name.clone(),
                path: license_path.to_path_buf(),
                dir: module.dir.clone(),
            })?
            .to_string_lossy()
            .into_owned();
        let url = remote.file_url(&relative);

        let local = std::fs::read(license_path).map_err(|source| ResolveError::LocalRead {
            library: name,
            path: license_path.to_path_buf(),
            source,
        })?;

        // Attempt 1: the module-relative path.
        let Some(raw_url) = remote.raw_file_url(&relative) else {
            eprintln!(
                " {} {} does not support raw URLs; skipping validation. Verify that {} matches {} manually",
                "warning:".yellow(),
                remote,
                url,
                license_path.display()
            );
            return Ok(url);
        };
        let first = match self.validator.validate(&raw_url, &local).await {
            Ok(()) => return Ok(url),
            Err(err) => err,
        };
        if relative != TOP_LEVEL_LICENSE {
            return Err(ResolveError::Validation { url, source: first });
        }

        // Attempt 2: the repository root's LICENSE.
        let url2 = remote.repo_root_file_url(TOP_LEVEL_LICENSE);
        if url2 == url {
            // The second attempt resolved to the same file.
            return Err(ResolveError::Validation { url, source: first });
        }
        let Some(raw_url2) = remote.repo_root_raw_file_url(TOP_LEVEL_LICENSE) else {
            return Err(ResolveError::Validation { url, source: first });
        };
        match self.validator.validate(&raw_url2, &local).await {
            Ok(()) => Ok(url2),
            Err(second) => Err(ResolveError::AttemptsExhausted {
                path: license_path.to_path_buf(),
                url1: raw_url,
                first,
                url2: raw_url2,
                second,
            }),
        }
    }
}
