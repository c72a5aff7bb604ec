use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub team: String,
    /// Personal access token. Usually supplied via AZURE_DEVOPS_PAT instead
    /// of the config file.
    #[serde(default)]
    pub pat: String,
    #[serde(default)]
    pub defaults: Defaults,
}

/// Filter values used when no preference record exists yet.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    #[serde(default = "default_sprint")]
    pub sprint: String,
    #[serde(default = "default_all")]
    pub state: String,
    #[serde(default = "default_me")]
    pub assigned: String,
}

fn default_sprint() -> String {
    "current".into()
}

fn default_all() -> String {
    "all".into()
}

fn default_me() -> String {
    "me".into()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            sprint: default_sprint(),
            state: default_all(),
            assigned: default_me(),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("boards")
}

fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Loads the config file and applies environment overrides. Missing
/// required values are fatal; a missing file yields the written template
/// path so main can tell the user where to fill things in.
pub fn load_config() -> Result<AppConfig> {
    let path = config_path();
    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        parse_config(&contents)?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).context("Failed to parse config.toml")
}

fn apply_env_overrides(config: &mut AppConfig) {
    for (var, field) in [
        ("AZURE_DEVOPS_PAT", &mut config.pat),
        ("AZURE_DEVOPS_ORG", &mut config.organization),
        ("AZURE_DEVOPS_PROJECT", &mut config.project),
        ("AZURE_DEVOPS_TEAM", &mut config.team),
    ] {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                *field = value;
            }
        }
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.organization.is_empty() {
        bail!("organization is required (set in config.toml or AZURE_DEVOPS_ORG)");
    }
    if config.project.is_empty() {
        bail!("project is required (set in config.toml or AZURE_DEVOPS_PROJECT)");
    }
    if config.team.is_empty() {
        bail!("team is required (set in config.toml or AZURE_DEVOPS_TEAM)");
    }
    if config.pat.is_empty() {
        bail!("pat is required (set in config.toml or AZURE_DEVOPS_PAT)");
    }
    Ok(())
}

/// Writes a commented template on first run. Never overwrites.
pub fn write_template() -> Result<PathBuf> {
    let path = config_path();
    if path.exists() {
        return Ok(path);
    }
    std::fs::create_dir_all(config_dir())
        .with_context(|| format!("Failed to create {}", config_dir().display()))?;

    let template = r#"# Azure DevOps connection
organization = "my-organization"
project = "my-project"
team = "my-team"

# Personal access token; prefer the AZURE_DEVOPS_PAT environment variable.
pat = ""

# Filters applied on first start, before any saved selection exists.
[defaults]
sprint = "current"   # "current", "all", or a full iteration path
state = "all"
assigned = "me"      # "all", "me"
"#;
    std::fs::write(&path, template)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// The last-used filter selections, saved after every successful filter
/// change and restored once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPrefs {
    pub sprint: String,
    pub state: String,
    pub assigned: String,
    pub area: String,
}

impl FilterPrefs {
    pub fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            sprint: defaults.sprint.clone(),
            state: defaults.state.clone(),
            assigned: defaults.assigned.clone(),
            area: "all".into(),
        }
    }
}

fn prefs_path(dir: &Path) -> PathBuf {
    dir.join("state.json")
}

/// Reads the preference record, falling back to config defaults when the
/// file is missing or unreadable. A corrupt record is not an error.
pub fn load_filter_prefs(dir: &Path, defaults: &Defaults) -> FilterPrefs {
    let fallback = FilterPrefs::from_defaults(defaults);
    match std::fs::read_to_string(prefs_path(dir)) {
        Ok(data) => serde_json::from_str(&data).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

pub fn save_filter_prefs(dir: &Path, prefs: &FilterPrefs) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let data = serde_json::to_string_pretty(prefs)?;
    std::fs::write(prefs_path(dir), data)
        .with_context(|| format!("Failed to write {}", prefs_path(dir).display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_applies_defaults_table() {
        let config = parse_config(
            r#"
organization = "org"
project = "proj"
team = "team"
pat = "secret"
"#,
        )
        .unwrap();
        assert_eq!(config.defaults.sprint, "current");
        assert_eq!(config.defaults.state, "all");
        assert_eq!(config.defaults.assigned, "me");
    }

    #[test]
    fn parse_honors_explicit_defaults() {
        let config = parse_config(
            r#"
organization = "org"
project = "proj"
team = "team"
pat = "secret"

[defaults]
sprint = "all"
state = "Active"
assigned = "all"
"#,
        )
        .unwrap();
        assert_eq!(config.defaults.sprint, "all");
        assert_eq!(config.defaults.state, "Active");
        assert_eq!(config.defaults.assigned, "all");
    }

    #[test]
    fn env_variables_override_file_values() {
        let mut config = parse_config(
            r#"
organization = "file-org"
project = "proj"
team = "team"
pat = "file-pat"
"#,
        )
        .unwrap();
        std::env::set_var("AZURE_DEVOPS_PAT", "env-pat");
        std::env::set_var("AZURE_DEVOPS_ORG", "env-org");
        apply_env_overrides(&mut config);
        std::env::remove_var("AZURE_DEVOPS_PAT");
        std::env::remove_var("AZURE_DEVOPS_ORG");

        assert_eq!(config.pat, "env-pat");
        assert_eq!(config.organization, "env-org");
        assert_eq!(config.project, "proj");
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let config = parse_config(r#"organization = "org""#).unwrap();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn filter_prefs_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = FilterPrefs {
            sprint: "Proj\\Sprint 5".into(),
            state: "Active".into(),
            assigned: "all".into(),
            area: "Proj\\TeamA".into(),
        };
        save_filter_prefs(dir.path(), &prefs).unwrap();
        let loaded = load_filter_prefs(dir.path(), &Defaults::default());
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn missing_prefs_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_filter_prefs(dir.path(), &Defaults::default());
        assert_eq!(loaded.sprint, "current");
        assert_eq!(loaded.assigned, "me");
        assert_eq!(loaded.area, "all");
    }

    #[test]
    fn corrupt_prefs_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("state.json"), "{not json").unwrap();
        let loaded = load_filter_prefs(dir.path(), &Defaults::default());
        assert_eq!(loaded.state, "all");
    }
}
