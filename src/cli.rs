use std::path::{Path, PathBuf};

use clap::Parser;

use crate::config::{Config, RunFlags};
use crate::fetch::DEFAULT_CONCURRENCY;
use crate::loader::ManifestPaths;
use crate::pipeline::RunSettings;
use crate::report::ReportTargets;

#[derive(Parser, Debug)]
#[command(
    name = "license-plist",
    about = "Collect dependency licenses into a Settings.bundle plist, Markdown, and HTML",
    version
)]
pub struct Cli {
    /// Project root; relative paths below resolve against it
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file [default: ./license_plist.toml, fallback ~/.config/license-plist/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory receiving the plist tree and the run summary
    #[arg(long, value_name = "DIR", default_value = "license-plist-output")]
    pub output_path: PathBuf,

    /// Name of the root plist and of the per-library directory
    #[arg(long, default_value = "license-plist")]
    pub prefix: String,

    /// Carthage Cartfile; its `.resolved` sibling is read
    #[arg(long, value_name = "FILE", default_value = "Cartfile")]
    pub cartfile_path: PathBuf,

    #[arg(long, value_name = "FILE", default_value = "Mintfile")]
    pub mintfile_path: PathBuf,

    /// CocoaPods `Pods` directory
    #[arg(long, value_name = "DIR", default_value = "Pods")]
    pub pods_path: PathBuf,

    /// Package.swift; its `Package.resolved` sibling is read
    #[arg(long, value_name = "FILE", default_value = "Package.swift")]
    pub package_path: PathBuf,

    /// Xcode project searched for Package.resolved when none sits beside Package.swift
    #[arg(long, value_name = "DIR")]
    pub xcodeproj_path: Option<PathBuf>,

    /// Also write a Markdown file
    #[arg(long, value_name = "FILE")]
    pub markdown_path: Option<PathBuf>,

    /// Also write an HTML file
    #[arg(long, value_name = "FILE")]
    pub html_path: Option<PathBuf>,

    /// GitHub token used to raise the API rate limit
    #[arg(long, env = "LICENSE_PLIST_GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Maximum concurrent license downloads
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Regenerate even if nothing changed since the last run
    #[arg(long)]
    pub force: bool,

    /// Append version numbers to titles
    #[arg(long)]
    pub add_version_numbers: bool,

    /// Put every license on the root page
    #[arg(long)]
    pub single_page: bool,

    /// Exit with status 1 when a remote library has no license
    #[arg(long)]
    pub fail_if_missing_license: bool,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Warnings only, no progress bar or summary table
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// `--config`, resolved against `root` like every other path.
    pub fn config_path(&self, root: &Path) -> Option<PathBuf> {
        self.config.as_ref().map(|p| root.join(p))
    }

    fn flags(&self) -> RunFlags {
        RunFlags {
            force: self.force,
            single_page: self.single_page,
            fail_if_missing_license: self.fail_if_missing_license,
            add_version_numbers: self.add_version_numbers,
        }
    }

    /// Resolve paths against `root` and merge flags with the config file.
    pub fn settings(&self, root: &Path, config: &Config) -> RunSettings {
        RunSettings {
            manifests: ManifestPaths {
                pods: root.join(&self.pods_path),
                cartfile: root.join(&self.cartfile_path),
                mintfile: root.join(&self.mintfile_path),
                package: root.join(&self.package_path),
                xcodeproj: self.xcodeproj_path.as_ref().map(|p| root.join(p)),
            },
            targets: ReportTargets {
                output_dir: root.join(&self.output_path),
                prefix: self.prefix.clone(),
                markdown: self.markdown_path.as_ref().map(|p| root.join(p)),
                html: self.html_path.as_ref().map(|p| root.join(p)),
            },
            github_token: self.github_token.clone().filter(|t| !t.is_empty()),
            concurrency: self.concurrency,
            flags: config.options.merged(self.flags()),
            show_progress: !self.quiet,
        }
    }
}
