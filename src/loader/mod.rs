//! Manifest loaders: raw manifest text in, [`LibraryDescriptor`]s out.
//!
//! Every loader applies the config rules ([`Config::apply`]) right after
//! parsing. A missing manifest is not an error; a malformed one is logged and
//! that source contributes nothing.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::LoadError;
use crate::models::LibraryDescriptor;

pub mod carthage;
pub mod cocoapods;
pub mod declared;
pub mod swift_package;

pub trait Loader {
    /// Manifest name used in log lines.
    fn manifest(&self) -> &'static str;

    fn load(&self, raw: &str, config: &Config) -> Result<Vec<LibraryDescriptor>, LoadError>;
}

/// Where to look for each manifest.
#[derive(Debug, Clone)]
pub struct ManifestPaths {
    pub pods: PathBuf,
    pub cartfile: PathBuf,
    pub mintfile: PathBuf,
    pub package: PathBuf,
    pub xcodeproj: Option<PathBuf>,
}

/// Descriptors grouped by precedence class, lowest first.
#[derive(Debug, Default)]
pub struct Sources {
    pub local: Vec<LibraryDescriptor>,
    pub remote: Vec<LibraryDescriptor>,
    pub manual: Vec<LibraryDescriptor>,
}

/// Run every loader. Failures stay local to their source.
pub fn load_sources(paths: &ManifestPaths, config: &Config) -> Sources {
    info!("CocoaPods license collect start");
    let local = cocoapods::load_pods(&paths.pods, config);

    let mut remote = Vec::new();

    info!("Carthage license collect start");
    remote.extend(load_file(
        &carthage::CarthageLoader,
        &carthage::resolved_path(&paths.cartfile),
        config,
    ));

    info!("Mint license collect start");
    remote.extend(load_file(&carthage::MintLoader, &paths.mintfile, config));

    info!("Swift Package Manager license collect start");
    match swift_package::resolved_path(&paths.package, paths.xcodeproj.as_deref()) {
        Some(path) => remote.extend(load_file(&swift_package::SwiftPackageLoader, &path, config)),
        None => debug!("No Package.resolved found"),
    }

    remote.extend(declared::load_github(config));

    info!("Manual license collect start");
    let manual = declared::load_manual(config);

    Sources {
        local,
        remote,
        manual,
    }
}

/// Read `path` and run `loader` over it.
pub fn load_file(loader: &dyn Loader, path: &Path, config: &Config) -> Vec<LibraryDescriptor> {
    if !path.exists() {
        debug!("{} not found at {}", loader.manifest(), path.display());
        return Vec::new();
    }

    let result = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
        .and_then(|raw| loader.load(&raw, config));

    match result {
        Ok(descriptors) => {
            info!(
                "{}: {} libraries from {}",
                loader.manifest(),
                descriptors.len(),
                path.display()
            );
            descriptors
        }
        Err(e) => {
            warn!("Skipping {}: {}", loader.manifest(), e);
            Vec::new()
        }
    }
}
