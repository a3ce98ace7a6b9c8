use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

/// Root configuration structure, deserialized from `.modlicense/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Go toolchain settings.
    #[serde(default)]
    pub go: GoConfig,
    /// Per-module overrides.
    #[serde(default)]
    pub overrides: Vec<ModuleOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoConfig {
    /// Path to the `go` binary used for listing packages.
    #[serde(default = "default_go_binary")]
    pub binary: String,
}

impl Default for GoConfig {
    fn default() -> Self {
        Self {
            binary: default_go_binary(),
        }
    }
}

fn default_go_binary() -> String {
    "go".to_string()
}

/// Manual correction for a single module, applied after grouping.
///
/// Useful for modules whose license cannot be discovered or validated
/// automatically, e.g. repositories that moved hosts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleOverride {
    /// Module path the override applies to.
    pub name: String,
    /// Optional version pin. An empty pin applies to any version; a
    /// non-matching pin is reported as an error rather than silently
    /// ignored.
    #[serde(default)]
    pub version: String,
    /// Exclude the module from the report entirely.
    #[serde(default)]
    pub skip: bool,
    /// Manually supplied license metadata.
    #[serde(default)]
    pub license: Option<LicenseOverride>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseOverride {
    /// Known-good URL, used verbatim instead of resolution.
    #[serde(default)]
    pub url: String,
    /// SPDX identifier to report.
    #[serde(default)]
    pub spdx_id: String,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<workdir>/.modlicense/config.toml`
/// 3. `~/.config/modlicense/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(workdir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let project_config = workdir.join(".modlicense").join("config.toml");
    if project_config.exists() {
        let content = std::fs::read_to_string(&project_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("modlicense").join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}

impl Config {
    /// The override matching a module path, if any.
    pub fn override_for(&self, module_path: &str) -> Option<&ModuleOverride> {
        self.overrides.iter().find(|o| o.name == module_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[go]
binary = "/usr/local/go/bin/go"

[[overrides]]
name = "example.com/moved"
version = "v1.2.3"

[overrides.license]
url = "https://example.org/LICENSE"
spdx_id = "MIT"

[[overrides]]
name = "example.com/internal"
skip = true
"#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.go.binary, "/usr/local/go/bin/go");
        assert_eq!(config.overrides.len(), 2);

        let moved = config.override_for("example.com/moved").unwrap();
        assert_eq!(moved.version, "v1.2.3");
        assert_eq!(moved.license.as_ref().unwrap().spdx_id, "MIT");

        let internal = config.override_for("example.com/internal").unwrap();
        assert!(internal.skip);
        assert!(config.override_for("example.com/absent").is_none());
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.go.binary, "go");
        assert!(config.overrides.is_empty());
    }
}
