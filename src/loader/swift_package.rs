use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::Config;
use crate::error::LoadError;
use crate::models::{GitHubRef, LibraryDescriptor};

/// Locate `Package.resolved` for a `Package.swift` path (or its directory),
/// falling back to the copy Xcode keeps inside the project bundle.
pub fn resolved_path(package: &Path, xcodeproj: Option<&Path>) -> Option<PathBuf> {
    let beside_manifest = if package.is_dir() {
        package.join("Package.resolved")
    } else {
        package.with_file_name("Package.resolved")
    };
    if beside_manifest.exists() {
        return Some(beside_manifest);
    }

    let in_project = xcodeproj?
        .join("project.xcworkspace")
        .join("xcshareddata")
        .join("swiftpm")
        .join("Package.resolved");
    in_project.exists().then_some(in_project)
}

/// `Package.resolved` v1 nests pins under `object`; v2 and v3 keep them at the top.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PackageResolved {
    V1 { object: PinsV1 },
    V2 { pins: Vec<PinV2> },
}

#[derive(Debug, Deserialize)]
struct PinsV1 {
    pins: Vec<PinV1>,
}

#[derive(Debug, Deserialize)]
struct PinV1 {
    #[serde(rename = "repositoryURL")]
    repository_url: String,
    state: PinState,
}

#[derive(Debug, Deserialize)]
struct PinV2 {
    location: String,
    state: PinState,
}

#[derive(Debug, Deserialize)]
struct PinState {
    version: Option<String>,
    branch: Option<String>,
}

impl PinState {
    fn into_version(self) -> Option<String> {
        self.version.or(self.branch)
    }
}

/// Loader for Swift Package Manager's `Package.resolved`.
///
/// Only GitHub-hosted pins are kept; the library name is the repository name
/// so it stays the same across resolved-file format versions.
pub struct SwiftPackageLoader;

impl super::Loader for SwiftPackageLoader {
    fn manifest(&self) -> &'static str {
        "Package.resolved"
    }

    fn load(&self, raw: &str, config: &Config) -> Result<Vec<LibraryDescriptor>, LoadError> {
        let resolved: PackageResolved =
            serde_json::from_str(raw).map_err(|e| LoadError::malformed(self.manifest(), e))?;

        let pins: Vec<(String, PinState)> = match resolved {
            PackageResolved::V1 { object } => object
                .pins
                .into_iter()
                .map(|p| (p.repository_url, p.state))
                .collect(),
            PackageResolved::V2 { pins } => {
                pins.into_iter().map(|p| (p.location, p.state)).collect()
            }
        };

        let libs = pins
            .into_iter()
            .filter_map(|(url, state)| {
                let github = GitHubRef::from_url(&url)?;
                let name = github.repo.clone();
                Some(LibraryDescriptor::remote(
                    &name,
                    state.into_version(),
                    self.manifest(),
                    github,
                ))
            })
            .collect();

        Ok(config.apply(libs))
    }
}
