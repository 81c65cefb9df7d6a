//! Libraries declared directly in the config file.

use tracing::warn;

use crate::config::{Config, ManualEntry};
use crate::error::LoadError;
use crate::models::{GitHubRef, LibraryDescriptor, SourceKind};

const ORIGIN: &str = "config";

/// `[[github]]` entries, treated like any other remote-hosted source.
pub fn load_github(config: &Config) -> Vec<LibraryDescriptor> {
    let libs = config
        .github
        .iter()
        .map(|entry| {
            let github = GitHubRef::new(&entry.owner, &entry.repo);
            let name = entry.name.clone().unwrap_or_else(|| entry.repo.clone());
            LibraryDescriptor::remote(&name, entry.version.clone(), ORIGIN, github)
        })
        .collect();
    config.apply(libs)
}

/// `[[manual]]` entries. An entry whose license file cannot be read is
/// skipped with a warning.
pub fn load_manual(config: &Config) -> Vec<LibraryDescriptor> {
    let libs = config
        .manual
        .iter()
        .filter_map(|entry| match manual_descriptor(entry, config) {
            Ok(desc) => Some(desc),
            Err(e) => {
                warn!("Skipping manual entry {}: {}", entry.name, e);
                None
            }
        })
        .collect();
    config.apply(libs)
}

fn manual_descriptor(entry: &ManualEntry, config: &Config) -> Result<LibraryDescriptor, LoadError> {
    let body = match (&entry.body, &entry.file) {
        (Some(body), _) => body.clone(),
        (None, Some(file)) => {
            let path = config.base_dir.join(file);
            std::fs::read_to_string(&path).map_err(|source| LoadError::Io { path, source })?
        }
        (None, None) => {
            return Err(LoadError::malformed(
                "manual entry",
                "needs either `body` or `file`",
            ))
        }
    };

    Ok(LibraryDescriptor {
        name: entry.name.clone(),
        version: entry.version.clone(),
        source_kind: SourceKind::Manual,
        origin: ORIGIN.to_string(),
        license_body: Some(body),
        remote: None,
        source_url: entry.source.clone(),
    })
}
