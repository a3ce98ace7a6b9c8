//! `modlicense` — attribute license obligations across a Go module
//! dependency graph and resolve a verifiable remote URL for each license.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]).
//! 2. Load config and overrides ([`config::load_config`]).
//! 3. Load the package graph via `go list` ([`golist`]).
//! 4. Walk the graph, pruning the standard library ([`graph::walk`]).
//! 5. Group packages into license-bearing libraries ([`grouping`]).
//! 6. Repair vendored module ownership ([`vendor`]).
//! 7. Resolve and validate a license URL per library ([`resolver`]).
//! 8. Render the requested report ([`report`]).
//! 9. Exit `0` (all resolved) or `1` (at least one failure).

mod cli;
mod config;
mod fetch;
mod golist;
mod graph;
mod grouping;
mod license;
mod models;
mod report;
mod resolver;
mod source;
mod vendor;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use cli::{Cli, ReportFormat};
use config::load_config;
use fetch::HttpFetcher;
use graph::PackageLoader;
use license::finder::DirScanner;
use models::{Library, Module};
use report::{LibraryReport, Outcome};
use resolver::{ContentValidator, SkipValidation, UrlResolver, Validate};
use source::resolver::HostResolver;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let workdir = cli.dir.canonicalize().unwrap_or_else(|_| cli.dir.clone());

    let config = load_config(&workdir, cli.config.as_deref())?;
    let go_binary = cli.go_bin.clone().unwrap_or(config.go.binary.clone());

    let loader = golist::GoListLoader::new(go_binary, &workdir);
    let package_graph = loader.load(&cli.patterns)?;
    let visited = graph::walk(&package_graph)?;
    if !cli.quiet {
        eprintln!(
            "  {} {} packages in the dependency closure",
            "→".cyan(),
            visited.len()
        );
    }

    let finder = DirScanner::new();
    let mut libraries = grouping::group_libraries(&visited, &finder)?;
    let root_modules = dedup_root_modules(&package_graph);
    vendor::repair_owners(&mut libraries, &root_modules);
    if !cli.quiet {
        eprintln!("  {} {} libraries to attribute", "→".cyan(), libraries.len());
    }

    let validator: Box<dyn Validate> = if cli.no_validate {
        Box::new(SkipValidation)
    } else {
        Box::new(ContentValidator::new(HttpFetcher::new(FETCH_TIMEOUT)?))
    };
    let host = HostResolver::new();
    let url_resolver = UrlResolver::new(&host, validator.as_ref());

    let reports = resolve_all(&libraries, &url_resolver, &config, cli.quiet).await?;

    for failure in reports.iter().filter(|r| r.failed()) {
        let detail = match &failure.outcome {
            Outcome::Unlicensed => "no license file found",
            Outcome::Failed { error } => error.as_str(),
            Outcome::Resolved { .. } => unreachable!(),
        };
        eprintln!(" {} {}: {}", "error:".red(), failure.name, detail);
    }

    match cli.format {
        ReportFormat::Terminal => report::terminal::render(&reports, cli.verbose, cli.quiet)?,
        ReportFormat::Csv => {
            let mut out = open_output(cli.output.as_deref())?;
            report::csv::render(&reports, out.as_mut())?;
        }
    }

    if reports.iter().any(LibraryReport::failed) {
        std::process::exit(1);
    }
    Ok(())
}

/// Resolve every library sequentially, in sorted order, so logs and error
/// ordering stay reproducible. A failure in one library never aborts the
/// others.
async fn resolve_all(
    libraries: &[Library],
    url_resolver: &UrlResolver<'_>,
    config: &config::Config,
    quiet: bool,
) -> Result<Vec<LibraryReport>> {
    let pb = if !quiet {
        let pb = ProgressBar::new(libraries.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(libraries.len());
    for library in libraries {
        if let Some(pb) = &pb {
            pb.set_message(library.name());
        }
        if let Some(report) = resolve_one(library, url_resolver, config).await {
            reports.push(report);
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    Ok(reports)
}

/// Resolve a single library, honoring overrides. `None` means the library is
/// skipped by configuration.
async fn resolve_one(
    library: &Library,
    url_resolver: &UrlResolver<'_>,
    config: &config::Config,
) -> Option<LibraryReport> {
    let name = library.name();
    let module = library.module.as_ref();
    let version = module.map(|m| m.version.clone()).unwrap_or_default();

    let mut report = LibraryReport {
        name: name.clone(),
        version: version.clone(),
        spdx_id: None,
        outcome: Outcome::Unlicensed,
    };

    let module_override = module.and_then(|m| config.override_for(&m.path));
    if let Some(o) = module_override {
        // An empty pin applies to any version.
        if !o.version.is_empty() && o.version != version {
            report.outcome = Outcome::Failed {
                error: format!(
                    "override version mismatch: {:?} != {:?}",
                    version, o.version
                ),
            };
            return Some(report);
        }
        if o.skip {
            return None;
        }
        if let Some(license) = &o.license {
            if !license.spdx_id.is_empty() {
                report.spdx_id = Some(license.spdx_id.clone());
            }
            if !license.url.is_empty() {
                report.outcome = Outcome::Resolved {
                    url: license.url.clone(),
                };
                return Some(report);
            }
        }
    }

    let Some(license_path) = library.license_path.as_deref() else {
        return Some(report);
    };
    if report.spdx_id.is_none() {
        report.spdx_id = match license::spdx::identify_file(license_path) {
            Ok(id) => id,
            Err(err) => {
                eprintln!(" {} {:#}", "warning:".yellow(), err);
                None
            }
        };
    }
    report.outcome = match url_resolver.license_url(library).await {
        Ok(url) => Outcome::Resolved { url },
        Err(err) => Outcome::Failed {
            error: err.to_string(),
        },
    };
    Some(report)
}

/// Distinct modules of the root packages, in first-seen order.
fn dedup_root_modules(graph: &graph::PackageGraph) -> Vec<Module> {
    let mut modules: Vec<Module> = Vec::new();
    for pkg in graph.root_packages() {
        if let Some(m) = &pkg.module {
            if !modules.contains(m) {
                modules.push(m.clone());
            }
        }
    }
    modules
}

fn open_output(path: Option<&std::path::Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    })
}
