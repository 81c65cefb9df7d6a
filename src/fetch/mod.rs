//! Remote license resolution.
//!
//! [`LicenseFetch`] is the transport capability: given GitHub coordinates it
//! returns license text or a [`FetchError`]. [`fetch_licenses`] fans out over
//! the pending descriptors with a fixed concurrency bound and joins on all of
//! them before returning.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::models::{GitHubRef, LibraryDescriptor, LicenseKind, LicenseRecord};

pub mod github;

pub const DEFAULT_CONCURRENCY: usize = 10;

#[async_trait]
pub trait LicenseFetch: Send + Sync {
    /// Fetch the license text of one repository. Timeouts are the implementation's concern.
    async fn fetch(&self, repo: &GitHubRef, token: Option<&str>) -> Result<String, FetchError>;
}

/// Resolve a license for every descriptor, at most `limit` requests in flight.
///
/// Failures are logged and dropped. The returned records are the successful
/// subset in completion order.
pub async fn fetch_licenses(
    descriptors: Vec<LibraryDescriptor>,
    limit: usize,
    token: Option<&str>,
    fetcher: &dyn LicenseFetch,
    progress: &ProgressBar,
) -> Vec<LicenseRecord> {
    let limit = limit.max(1);
    let total = descriptors.len();
    info!("Fetching {} licenses (max {} concurrent)", total, limit);
    progress.set_length(total as u64);

    let records: Vec<LicenseRecord> = stream::iter(descriptors)
        .map(|desc| async move {
            let result = match &desc.remote {
                Some(repo) => fetcher.fetch(repo, token).await,
                None => Err(FetchError::NotFound(desc.name.clone())),
            };
            progress.inc(1);
            match result {
                Ok(body) => Some(LicenseRecord {
                    name: desc.name,
                    version: desc.version,
                    body,
                    kind: LicenseKind::GitHub,
                    source_url: desc.source_url,
                }),
                Err(e) => {
                    warn!("Failed to fetch license of {}: {}", desc.name, e);
                    None
                }
            }
        })
        .buffer_unordered(limit)
        .filter_map(|record| async move { record })
        .collect()
        .await;

    progress.finish_and_clear();
    info!("Fetched {}/{} licenses", records.len(), total);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Fails for the configured repos and records the peak number of concurrent calls.
    struct CountingFetcher {
        failing: HashSet<String>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        tokens: Mutex<Vec<Option<String>>>,
    }

    impl CountingFetcher {
        fn new(failing: &[&str]) -> Self {
            Self {
                failing: failing.iter().map(|s| s.to_string()).collect(),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                tokens: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LicenseFetch for CountingFetcher {
        async fn fetch(&self, repo: &GitHubRef, token: Option<&str>) -> Result<String, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.tokens.lock().unwrap().push(token.map(str::to_string));

            tokio::time::sleep(Duration::from_millis(20)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self.failing.contains(&repo.repo) {
                Err(FetchError::NotFound(repo.full_name()))
            } else {
                Ok(format!("license of {}", repo.repo))
            }
        }
    }

    fn pending(n: usize) -> Vec<LibraryDescriptor> {
        (0..n)
            .map(|i| {
                let name = format!("lib{}", i);
                LibraryDescriptor::remote(&name, None, "test", GitHubRef::new("owner", &name))
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bounded_with_partial_failure() {
        let fetcher = CountingFetcher::new(&["lib3", "lib7"]);
        let records =
            fetch_licenses(pending(10), 3, None, &fetcher, &ProgressBar::hidden()).await;

        assert_eq!(records.len(), 8);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(fetcher.in_flight.load(Ordering::SeqCst), 0);
        assert!(records.iter().all(|r| r.name != "lib3" && r.name != "lib7"));
        assert!(records.iter().all(|r| r.kind == LicenseKind::GitHub));
    }

    #[tokio::test]
    async fn test_token_passed_to_every_task() {
        let fetcher = CountingFetcher::new(&[]);
        fetch_licenses(pending(4), 2, Some("secret"), &fetcher, &ProgressBar::hidden()).await;

        let tokens = fetcher.tokens.lock().unwrap();
        assert_eq!(tokens.len(), 4);
        assert!(tokens.iter().all(|t| t.as_deref() == Some("secret")));
    }

    #[tokio::test]
    async fn test_zero_limit_still_progresses() {
        let fetcher = CountingFetcher::new(&[]);
        let records = fetch_licenses(pending(2), 0, None, &fetcher, &ProgressBar::hidden()).await;
        assert_eq!(records.len(), 2);
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 1);
    }
}
