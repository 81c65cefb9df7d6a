//! Report renderers for the final license list.
//!
//! - [`plist`] — Settings.bundle plist tree (always written).
//! - [`markdown`] — optional Markdown acknowledgements.
//! - [`html`] — optional HTML acknowledgements.
//! - [`terminal`] — colored summary table; respects `--quiet`.
//!
//! Every file renderer receives the same record slice with no extra filtering.

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::config::RunFlags;
use crate::models::LicenseRecord;

pub mod html;
pub mod markdown;
pub mod plist;
pub mod terminal;

/// Where the file reports go.
#[derive(Debug, Clone)]
pub struct ReportTargets {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub markdown: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

pub fn write_all(
    records: &[LicenseRecord],
    targets: &ReportTargets,
    flags: &RunFlags,
) -> Result<()> {
    plist::write(
        records,
        &targets.output_dir,
        &targets.prefix,
        flags.single_page,
        flags.add_version_numbers,
    )?;

    if let Some(path) = &targets.markdown {
        markdown::write(records, path, flags.add_version_numbers)?;
        info!("Markdown written to {}", path.display());
    }

    if let Some(path) = &targets.html {
        html::write(records, path, flags.add_version_numbers)?;
        info!("HTML written to {}", path.display());
    }

    Ok(())
}
