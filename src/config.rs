use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

use crate::models::{canonical, LibraryDescriptor};

/// Project file name looked up in the scanned directory.
pub const PROJECT_CONFIG_FILE: &str = "license_plist.toml";

/// Root configuration structure, deserialized from `license_plist.toml`.
///
/// Holds the rule set applied to every loaded descriptor as well as the
/// libraries declared directly in the file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub options: RunFlags,
    /// Library names, `owner/repo` coordinates, or `owner/*` patterns to drop.
    pub exclude: Vec<String>,
    /// Original library name → name used in the report. Keys are stored in
    /// canonical form.
    #[serde(deserialize_with = "canonical_keys")]
    pub rename: HashMap<String, String>,
    /// Library name → version forced into the report. Keys are stored in
    /// canonical form.
    #[serde(deserialize_with = "canonical_keys")]
    pub versions: HashMap<String, String>,
    /// Additional GitHub-hosted libraries.
    pub github: Vec<GitHubEntry>,
    /// Libraries whose license text is supplied by hand.
    pub manual: Vec<ManualEntry>,
    /// Directory that relative `manual.file` paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Flags that change the run or the rendered output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunFlags {
    /// Re-render even when nothing changed since the last run.
    pub force: bool,
    /// Put every license on the root plist page.
    pub single_page: bool,
    /// Exit non-zero when a remote library has no license.
    pub fail_if_missing_license: bool,
    /// Append `(version)` to titles.
    pub add_version_numbers: bool,
}

impl RunFlags {
    /// Combine with flags given on the command line; either source can enable a flag.
    pub fn merged(self, other: RunFlags) -> RunFlags {
        RunFlags {
            force: self.force || other.force,
            single_page: self.single_page || other.single_page,
            fail_if_missing_license: self.fail_if_missing_license
                || other.fail_if_missing_license,
            add_version_numbers: self.add_version_numbers || other.add_version_numbers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubEntry {
    pub owner: String,
    pub repo: String,
    pub version: Option<String>,
    /// Display name; defaults to `repo`.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManualEntry {
    pub name: String,
    pub version: Option<String>,
    /// Inline license text.
    pub body: Option<String>,
    /// File holding the license text, relative to the config file.
    pub file: Option<PathBuf>,
    /// Link shown next to the license.
    pub source: Option<String>,
}

fn canonical_keys<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, String>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|(k, v)| (canonical(&k), v)).collect())
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/license_plist.toml`
/// 3. `~/.config/license-plist/config.toml`
/// 4. Built-in [`Config::default`]
///
/// A config file that exists but cannot be parsed aborts the run.
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(PROJECT_CONFIG_FILE);
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-plist")
            .join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config {
        base_dir: project_path.to_path_buf(),
        ..Config::default()
    })
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok(config)
}

impl Config {
    /// Whether any exclusion rule matches the descriptor.
    pub fn is_excluded(&self, desc: &LibraryDescriptor) -> bool {
        self.exclude
            .iter()
            .any(|pattern| exclusion_matches(pattern, desc))
    }

    /// Apply the per-source rules right after parsing: exclusion on the
    /// original name, then rename, then forced versions.
    pub fn apply(&self, descriptors: Vec<LibraryDescriptor>) -> Vec<LibraryDescriptor> {
        descriptors
            .into_iter()
            .filter(|d| !self.is_excluded(d))
            .map(|mut d| {
                if let Some(new_name) = self.rename.get(&d.canonical_name()) {
                    d.name = new_name.clone();
                }
                if let Some(version) = self.versions.get(&d.canonical_name()) {
                    d.version = Some(version.clone());
                }
                d
            })
            .collect()
    }
}

fn exclusion_matches(pattern: &str, desc: &LibraryDescriptor) -> bool {
    let pattern = canonical(pattern.trim());
    match pattern.split_once('/') {
        Some((owner, repo)) => match &desc.remote {
            Some(remote) => {
                owner == canonical(&remote.owner)
                    && (repo == "*" || repo == canonical(&remote.repo))
            }
            None => false,
        },
        None => pattern == desc.canonical_name(),
    }
}
