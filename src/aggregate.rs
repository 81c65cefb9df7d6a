//! Cross-source merge: one descriptor per canonical name, sorted.

use std::collections::HashMap;

use crate::config::Config;
use crate::loader::Sources;
use crate::models::{LibraryDescriptor, SourceKind};

/// Output of [`merge`]: deduplicated descriptors in report order.
#[derive(Debug)]
pub struct Aggregated {
    libraries: Vec<LibraryDescriptor>,
    /// Licensed descriptors shadowed by a remote entry that still has to be
    /// fetched. Used when that fetch fails.
    fallbacks: Vec<LibraryDescriptor>,
}

impl Aggregated {
    pub fn libraries(&self) -> &[LibraryDescriptor] {
        &self.libraries
    }

    /// Descriptors whose license still has to be fetched.
    pub fn remote(&self) -> impl Iterator<Item = &LibraryDescriptor> {
        self.libraries
            .iter()
            .filter(|d| d.source_kind == SourceKind::RemoteHosted)
    }

    pub fn fallbacks(&self) -> &[LibraryDescriptor] {
        &self.fallbacks
    }

    /// Split into descriptors needing a fetch, descriptors already carrying a
    /// license, and the shadowed fallbacks.
    pub fn partition(self) -> Partitioned {
        let (to_fetch, ready): (Vec<_>, Vec<_>) =
            self.libraries.into_iter().partition(needs_fetch);
        Partitioned {
            to_fetch,
            ready,
            fallbacks: self.fallbacks,
        }
    }
}

pub struct Partitioned {
    pub to_fetch: Vec<LibraryDescriptor>,
    pub ready: Vec<LibraryDescriptor>,
    pub fallbacks: Vec<LibraryDescriptor>,
}

fn needs_fetch(desc: &LibraryDescriptor) -> bool {
    desc.source_kind == SourceKind::RemoteHosted && desc.license_body.is_none()
}

/// Merge all sources into one list.
///
/// Precedence is local < remote < manual: a later descriptor with the same
/// canonical name replaces the earlier one whole. A licensed descriptor
/// replaced by a remote one that still needs fetching is kept as a fallback.
/// Exclusion rules are checked again here so names produced by renames are
/// honored too.
pub fn merge(sources: Sources, config: &Config) -> Aggregated {
    let mut by_name: HashMap<String, LibraryDescriptor> = HashMap::new();
    let mut shadowed: HashMap<String, LibraryDescriptor> = HashMap::new();

    for desc in sources
        .local
        .into_iter()
        .chain(sources.remote)
        .chain(sources.manual)
    {
        if config.is_excluded(&desc) {
            continue;
        }
        let key = desc.canonical_name();
        if let Some(previous) = by_name.insert(key.clone(), desc) {
            if previous.license_body.is_some() {
                shadowed.insert(key, previous);
            }
        }
    }

    let mut fallbacks: Vec<LibraryDescriptor> = shadowed
        .into_iter()
        .filter(|(key, _)| by_name.get(key).is_some_and(needs_fetch))
        .map(|(_, desc)| desc)
        .collect();
    fallbacks.sort_by_cached_key(LibraryDescriptor::canonical_name);

    let mut libraries: Vec<LibraryDescriptor> = by_name.into_values().collect();
    libraries.sort_by_cached_key(LibraryDescriptor::canonical_name);

    Aggregated {
        libraries,
        fallbacks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GitHubRef;

    fn local(name: &str) -> LibraryDescriptor {
        LibraryDescriptor {
            name: name.to_string(),
            version: Some("1.0".into()),
            source_kind: SourceKind::LocalPackageManager,
            origin: "CocoaPods".into(),
            license_body: Some(format!("{} pod license", name)),
            remote: None,
            source_url: None,
        }
    }

    fn remote(name: &str) -> LibraryDescriptor {
        LibraryDescriptor::remote(
            name,
            Some("2.0".into()),
            "Cartfile.resolved",
            GitHubRef::new("owner", name),
        )
    }

    fn manual(name: &str) -> LibraryDescriptor {
        LibraryDescriptor {
            name: name.to_string(),
            version: None,
            source_kind: SourceKind::Manual,
            origin: "config".into(),
            license_body: Some("manual text".into()),
            remote: None,
            source_url: None,
        }
    }

    fn names(agg: &Aggregated) -> Vec<&str> {
        agg.libraries().iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_remote_replaces_local() {
        let sources = Sources {
            local: vec![local("Alamofire")],
            remote: vec![remote("alamofire")],
            manual: vec![],
        };
        let agg = merge(sources, &Config::default());
        assert_eq!(agg.libraries().len(), 1);
        assert_eq!(agg.libraries()[0], remote("alamofire"));
        assert_eq!(agg.fallbacks(), &[local("Alamofire")]);
    }

    #[test]
    fn test_manual_always_wins() {
        let sources = Sources {
            local: vec![local("Charts")],
            remote: vec![remote("Charts")],
            manual: vec![manual("CHARTS")],
        };
        let agg = merge(sources, &Config::default());
        assert_eq!(agg.libraries(), &[manual("CHARTS")]);
        // Nothing left to fetch, so nothing to fall back to.
        assert!(agg.fallbacks().is_empty());
    }

    #[test]
    fn test_sorted_case_insensitively() {
        let sources = Sources {
            local: vec![local("zlib")],
            remote: vec![remote("Alamofire")],
            manual: vec![manual("boost")],
        };
        let agg = merge(sources, &Config::default());
        assert_eq!(names(&agg), vec!["Alamofire", "boost", "zlib"]);
    }

    #[test]
    fn test_excluded_never_aggregated() {
        let config: Config = toml::from_str(r#"exclude = ["Kingfisher"]"#).unwrap();
        let sources = Sources {
            local: vec![local("Kingfisher"), local("SnapKit")],
            remote: vec![],
            manual: vec![manual("kingfisher")],
        };
        let agg = merge(sources, &config);
        assert_eq!(names(&agg), vec!["SnapKit"]);
    }

    #[test]
    fn test_renamed_collision_is_last_writer_wins() {
        // Two sources rename different originals to the same name; the later source wins.
        let config: Config =
            toml::from_str("[rename]\n\"A\" = \"Same\"\n\"B\" = \"Same\"\n").unwrap();
        let sources = Sources {
            local: config.apply(vec![local("A")]),
            remote: config.apply(vec![remote("B")]),
            manual: vec![],
        };
        let agg = merge(sources, &config);
        assert_eq!(agg.libraries().len(), 1);
        assert_eq!(agg.libraries()[0].source_kind, SourceKind::RemoteHosted);
    }

    #[test]
    fn test_partition() {
        let sources = Sources {
            local: vec![local("Pod")],
            remote: vec![remote("Repo")],
            manual: vec![manual("Hand")],
        };
        let parts = merge(sources, &Config::default()).partition();
        assert_eq!(parts.to_fetch.len(), 1);
        assert_eq!(parts.to_fetch[0].name, "Repo");
        assert_eq!(parts.ready.len(), 2);
        assert!(parts.fallbacks.is_empty());
    }
}
