//! One report-generation run, as a chain of typed stages:
//!
//! [`Sources`] → [`Aggregated`] → [`DiffCheck`] → [`Pending`] → [`Resolved`] → [`Report`]
//!
//! Each stage consumes the previous one, so stages cannot run out of order.
//! An unchanged run stops at [`DiffCheck::Unchanged`] without touching the
//! output directory.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::aggregate::{self, Aggregated};
use crate::config::{Config, RunFlags};
use crate::fetch::{fetch_licenses, LicenseFetch};
use crate::loader::{load_sources, ManifestPaths, Sources};
use crate::models::{canonical, LicenseRecord};
use crate::report::{self, ReportTargets};
use crate::summary::{self, RunSummary};

/// Everything a run needs besides the config rules.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub manifests: ManifestPaths,
    pub targets: ReportTargets,
    pub github_token: Option<String>,
    pub concurrency: usize,
    pub flags: RunFlags,
    pub show_progress: bool,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing changed since the last run; no file was written.
    Unchanged,
    Completed(Report),
}

/// Result of a run that rendered output.
#[derive(Debug)]
pub struct Report {
    pub records: Vec<LicenseRecord>,
    /// Remote libraries that ended up without a license, sorted.
    pub missing: Vec<String>,
    /// Set when missing licenses must fail the process.
    pub failed_missing: bool,
}

pub enum DiffCheck {
    Unchanged,
    Changed(Pending),
}

/// Aggregated libraries that still need their remote licenses.
pub struct Pending {
    aggregated: Aggregated,
    summary: RunSummary,
    summary_path: PathBuf,
}

/// Final license list, ready to render.
pub struct Resolved {
    records: Vec<LicenseRecord>,
    missing: Vec<String>,
    summary: RunSummary,
    summary_path: PathBuf,
}

pub async fn run(
    settings: &RunSettings,
    config: &Config,
    fetcher: &dyn LicenseFetch,
) -> Result<RunOutcome> {
    let sources: Sources = load_sources(&settings.manifests, config);
    let aggregated = aggregate::merge(sources, config);
    info!("Aggregated {} libraries", aggregated.libraries().len());

    let pending = match check(aggregated, settings) {
        DiffCheck::Unchanged => return Ok(RunOutcome::Unchanged),
        DiffCheck::Changed(pending) => pending,
    };

    let resolved = pending.resolve(settings, fetcher).await;
    let report = resolved.render(settings)?;
    Ok(RunOutcome::Completed(report))
}

/// Compare the aggregate with the previous run's summary.
pub fn check(aggregated: Aggregated, settings: &RunSettings) -> DiffCheck {
    let summary = summary::compute_fingerprint(
        aggregated.libraries().iter().chain(aggregated.fallbacks()),
        &settings.targets,
        &settings.flags,
        env!("CARGO_PKG_VERSION"),
    );
    let summary_path =
        summary::summary_path(&settings.targets.output_dir, &settings.targets.prefix);
    let previous = summary::read_previous(&summary_path);

    if summary::should_skip(&summary, previous.as_deref(), settings.flags.force) {
        warn!("Completed because no diff. Use --force to regenerate.");
        return DiffCheck::Unchanged;
    }

    DiffCheck::Changed(Pending {
        aggregated,
        summary,
        summary_path,
    })
}

impl Pending {
    /// Fetch remote licenses, then merge every license kind.
    ///
    /// The final merge keeps the aggregate's precedence, local < fetched
    /// remote < manual, so a failed fetch falls back to a shadowed local
    /// license instead of losing it.
    pub async fn resolve(self, settings: &RunSettings, fetcher: &dyn LicenseFetch) -> Resolved {
        let remote_names: Vec<String> =
            self.aggregated.remote().map(|d| d.name.clone()).collect();
        let parts = self.aggregated.partition();

        let progress = if settings.show_progress {
            let pb = ProgressBar::new(parts.to_fetch.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let fetched = fetch_licenses(
            parts.to_fetch,
            settings.concurrency,
            settings.github_token.as_deref(),
            fetcher,
            &progress,
        )
        .await;

        let mut by_name: HashMap<String, LicenseRecord> = HashMap::new();
        for record in parts
            .fallbacks
            .into_iter()
            .filter_map(LicenseRecord::from_descriptor)
            .chain(fetched)
            .chain(parts.ready.into_iter().filter_map(LicenseRecord::from_descriptor))
        {
            by_name.insert(record.canonical_name(), record);
        }
        let mut records: Vec<LicenseRecord> = by_name.into_values().collect();
        records.sort_by_cached_key(LicenseRecord::canonical_name);

        let missing = find_missing(&remote_names, &records);

        Resolved {
            records,
            missing,
            summary: self.summary,
            summary_path: self.summary_path,
        }
    }
}

/// Remote names with no record of the same canonical name.
fn find_missing(remote_names: &[String], records: &[LicenseRecord]) -> Vec<String> {
    let resolved: HashSet<String> = records.iter().map(LicenseRecord::canonical_name).collect();
    let mut missing: Vec<String> = remote_names
        .iter()
        .filter(|name| !resolved.contains(&canonical(name)))
        .cloned()
        .collect();
    missing.sort_by_cached_key(|name| canonical(name));
    missing
}

impl Resolved {
    /// Report missing licenses, write every output, then persist the summary.
    ///
    /// When missing licenses fail the run the summary is not saved, so the
    /// next run renders again instead of skipping.
    pub fn render(self, settings: &RunSettings) -> Result<Report> {
        info!("# Missing license:");
        if self.missing.is_empty() {
            info!("None");
        } else {
            for name in &self.missing {
                warn!("{}", name);
            }
        }
        let failed_missing = settings.flags.fail_if_missing_license && !self.missing.is_empty();

        let output_dir = &settings.targets.output_dir;
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        report::write_all(&self.records, &settings.targets, &settings.flags)?;

        if !failed_missing {
            summary::write(&self.summary, &self.summary_path)?;
        }

        Ok(Report {
            records: self.records,
            missing: self.missing,
            failed_missing,
        })
    }
}
