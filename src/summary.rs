//! Change detection between runs.
//!
//! The summary is a plain-text fingerprint of the aggregated libraries, the
//! requested output files, and the flags that shape the output. It is stored next to the report and
//! compared at the start of the next run; an identical summary means the
//! report would not change.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::RunFlags;
use crate::error::PersistenceError;
use crate::models::LibraryDescriptor;
use crate::report::ReportTargets;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary(String);

impl RunSummary {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `<output>/<prefix>.latest_result.txt`
pub fn summary_path(output_dir: &Path, prefix: &str) -> PathBuf {
    output_dir.join(format!("{}.latest_result.txt", prefix))
}

/// Build the fingerprint. `libraries` must already be in a stable order.
pub fn compute_fingerprint<'a>(
    libraries: impl IntoIterator<Item = &'a LibraryDescriptor>,
    targets: &ReportTargets,
    flags: &RunFlags,
    tool_version: &str,
) -> RunSummary {
    let mut lines: Vec<String> = libraries.into_iter().map(descriptor_line).collect();
    lines.push(format!("markdown: {}", optional_path(targets.markdown.as_deref())));
    lines.push(format!("html: {}", optional_path(targets.html.as_deref())));
    lines.push(format!("add-version-numbers: {}", flags.add_version_numbers));
    lines.push(format!("single-page: {}", flags.single_page));
    lines.push(format!("license-plist version: {}", tool_version));
    RunSummary(lines.join("\n"))
}

fn optional_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn descriptor_line(desc: &LibraryDescriptor) -> String {
    let coordinates = desc
        .remote
        .as_ref()
        .map(|r| r.full_name())
        .unwrap_or_else(|| "-".to_string());
    let body_hash = desc
        .license_body
        .as_deref()
        .map(|body| hex::encode(Sha256::digest(body.as_bytes())))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}|{}|{}|{}|{}|{}",
        desc.source_kind,
        desc.name,
        desc.version.as_deref().unwrap_or("-"),
        desc.origin,
        coordinates,
        body_hash
    )
}

/// True iff a previous summary exists, matches, and the run is not forced.
pub fn should_skip(new: &RunSummary, previous: Option<&str>, force: bool) -> bool {
    !force && previous == Some(new.as_str())
}

/// Previous run's summary; an unreadable file counts as absent.
pub fn read_previous(path: &Path) -> Option<String> {
    std::fs::read_to_string(path).ok()
}

pub fn write(summary: &RunSummary, path: &Path) -> Result<(), PersistenceError> {
    std::fs::write(path, summary.as_str()).map_err(|e| PersistenceError::new(path, e))
}
