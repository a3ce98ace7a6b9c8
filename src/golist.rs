use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::graph::{PackageGraph, PackageLoader};
use crate::models::{Module, Package};

/// Loads the package graph by shelling out to `go list`.
pub struct GoListLoader {
    go_binary: PathBuf,
    workdir: PathBuf,
}

/// `go list -json` package record. Go file paths are relative to `dir`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoPackage {
    import_path: String,
    #[serde(default)]
    dir: PathBuf,
    #[serde(default)]
    go_files: Vec<String>,
    #[serde(default)]
    cgo_files: Vec<String>,
    #[serde(default)]
    other_files: Vec<String>,
    #[serde(default)]
    imports: Vec<String>,
    #[serde(default)]
    module: Option<GoModule>,
    #[serde(default)]
    error: Option<GoPackageError>,
    #[serde(default)]
    deps_errors: Vec<GoPackageError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoModule {
    path: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    dir: PathBuf,
    #[serde(default)]
    main: bool,
    #[serde(default)]
    replace: Option<Box<GoModule>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GoPackageError {
    err: String,
}

impl GoListLoader {
    pub fn new(go_binary: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            go_binary: go_binary.into(),
            workdir: workdir.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new(&self.go_binary)
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .with_context(|| format!("running {}", self.go_binary.display()))?;
        if !output.status.success() {
            bail!(
                "{} {} failed: {}",
                self.go_binary.display(),
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output.stdout)
    }

    fn goroot(&self) -> Result<PathBuf> {
        let out = self.run(&["env", "GOROOT"])?;
        Ok(PathBuf::from(String::from_utf8_lossy(&out).trim()))
    }

    /// Expand root patterns (e.g. `./...`) to concrete import paths.
    fn expand_roots(&self, patterns: &[String]) -> Result<Vec<String>> {
        let mut args = vec!["list"];
        args.extend(patterns.iter().map(String::as_str));
        let out = self.run(&args)?;
        Ok(String::from_utf8_lossy(&out)
            .lines()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}

impl PackageLoader for GoListLoader {
    fn load(&self, patterns: &[String]) -> Result<PackageGraph> {
        let roots = self.expand_roots(patterns)?;

        let mut args = vec!["list", "-e", "-deps", "-json"];
        args.extend(patterns.iter().map(String::as_str));
        let out = self.run(&args)?;

        let mut graph = PackageGraph {
            roots,
            goroot: self.goroot()?,
            ..Default::default()
        };
        for pkg in parse_packages(&out).context("parsing go list output")? {
            graph.packages.insert(pkg.import_path.clone(), pkg);
        }
        Ok(graph)
    }
}

/// Decode the concatenated-JSON stream `go list -json` emits.
fn parse_packages(raw: &[u8]) -> Result<Vec<Package>> {
    let mut packages = Vec::new();
    let stream = serde_json::Deserializer::from_slice(raw).into_iter::<GoPackage>();
    for entry in stream {
        packages.push(entry.context("decoding go list record")?.into());
    }
    Ok(packages)
}

impl From<GoPackage> for Package {
    fn from(p: GoPackage) -> Self {
        let dir = p.dir;
        let absolute = |files: Vec<String>| -> Vec<PathBuf> {
            files.into_iter().map(|f| dir.join(f)).collect()
        };
        let mut errors: Vec<String> = p.error.into_iter().map(|e| e.err).collect();
        errors.extend(p.deps_errors.into_iter().map(|e| e.err));
        let mut go_files = absolute(p.go_files);
        go_files.extend(absolute(p.cgo_files));
        Package {
            import_path: p.import_path,
            go_files,
            other_files: absolute(p.other_files),
            imports: p.imports,
            module: p.module.map(Module::from),
            errors,
        }
    }
}

impl From<GoModule> for Module {
    fn from(mut m: GoModule) -> Self {
        // A replace directive substitutes the entire module.
        if let Some(replacement) = m.replace.take() {
            m = *replacement;
        }
        Module {
            path: m.path,
            // The +incompatible suffix does not affect the tagged version.
            version: m
                .version
                .strip_suffix("+incompatible")
                .unwrap_or(&m.version)
                .to_string(),
            dir: m.dir,
            is_main: m.main,
        }
    }
}
