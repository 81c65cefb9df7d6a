use serde::{Deserialize, Serialize};

/// One dependency entry as parsed from a manifest, before merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    pub name: String,
    pub version: Option<String>,
    pub source_kind: SourceKind,
    /// Where the entry was read from, e.g. `Cartfile.resolved`.
    pub origin: String,
    pub license_body: Option<String>,
    pub remote: Option<GitHubRef>,
    pub source_url: Option<String>,
}

impl LibraryDescriptor {
    /// Case-insensitive key used for deduplication and sorting.
    pub fn canonical_name(&self) -> String {
        canonical(&self.name)
    }

    pub fn remote(name: &str, version: Option<String>, origin: &str, github: GitHubRef) -> Self {
        let source_url = Some(github.url());
        Self {
            name: name.to_string(),
            version,
            source_kind: SourceKind::RemoteHosted,
            origin: origin.to_string(),
            license_body: None,
            remote: Some(github),
            source_url,
        }
    }
}

pub fn canonical(name: &str) -> String {
    name.to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    LocalPackageManager,
    RemoteHosted,
    Manual,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::LocalPackageManager => write!(f, "local"),
            SourceKind::RemoteHosted => write!(f, "remote"),
            SourceKind::Manual => write!(f, "manual"),
        }
    }
}

/// Coordinates of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubRef {
    pub owner: String,
    pub repo: String,
}

impl GitHubRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parse `owner/repo`, tolerating a trailing `.git`.
    pub fn parse(slug: &str) -> Option<Self> {
        let mut parts = slug.trim().trim_end_matches('/').splitn(2, '/');
        let owner = parts.next()?.trim();
        let repo = parts.next()?.trim().trim_end_matches(".git");
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self::new(owner, repo))
    }

    /// Parse a GitHub clone URL (`https://github.com/o/r.git`, `git@github.com:o/r.git`).
    pub fn from_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let rest = url
            .strip_prefix("https://github.com/")
            .or_else(|| url.strip_prefix("http://github.com/"))
            .or_else(|| url.strip_prefix("ssh://git@github.com/"))
            .or_else(|| url.strip_prefix("git@github.com:"))?;
        Self::parse(rest)
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

/// A resolved, renderable license entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub name: String,
    pub version: Option<String>,
    pub body: String,
    pub kind: LicenseKind,
    pub source_url: Option<String>,
}

impl LicenseRecord {
    pub fn canonical_name(&self) -> String {
        canonical(&self.name)
    }

    /// Display title, with the version appended when requested.
    pub fn title(&self, add_version_numbers: bool) -> String {
        match (&self.version, add_version_numbers) {
            (Some(version), true) => format!("{} ({})", self.name, version),
            _ => self.name.clone(),
        }
    }

    /// Build a record from a descriptor that already carries its license text.
    pub fn from_descriptor(desc: LibraryDescriptor) -> Option<Self> {
        let kind = match desc.source_kind {
            SourceKind::LocalPackageManager => LicenseKind::CocoaPods,
            SourceKind::RemoteHosted => LicenseKind::GitHub,
            SourceKind::Manual => LicenseKind::Manual,
        };
        let body = desc.license_body?;
        Some(Self {
            name: desc.name,
            version: desc.version,
            body,
            kind,
            source_url: desc.source_url,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseKind {
    CocoaPods,
    GitHub,
    Manual,
}

impl std::fmt::Display for LicenseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseKind::CocoaPods => write!(f, "CocoaPods"),
            LicenseKind::GitHub => write!(f, "GitHub"),
            LicenseKind::Manual => write!(f, "Manual"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LicenseRisk {
    Permissive,
    WeakCopyleft,
    StrongCopyleft,
    Proprietary,
    Unknown,
}

impl std::fmt::Display for LicenseRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseRisk::Permissive => write!(f, "Permissive"),
            LicenseRisk::WeakCopyleft => write!(f, "Weak Copyleft"),
            LicenseRisk::StrongCopyleft => write!(f, "Strong Copyleft"),
            LicenseRisk::Proprietary => write!(f, "Proprietary"),
            LicenseRisk::Unknown => write!(f, "Unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_ref_from_url() {
        let r = GitHubRef::from_url("https://github.com/Alamofire/Alamofire.git").unwrap();
        assert_eq!(r, GitHubRef::new("Alamofire", "Alamofire"));

        let r = GitHubRef::from_url("git@github.com:ReactiveX/RxSwift.git").unwrap();
        assert_eq!(r.full_name(), "ReactiveX/RxSwift");

        assert!(GitHubRef::from_url("https://gitlab.com/foo/bar.git").is_none());
    }

    #[test]
    fn test_parse_rejects_nested_paths() {
        assert!(GitHubRef::parse("a/b/c").is_none());
        assert!(GitHubRef::parse("solo").is_none());
    }

    #[test]
    fn test_title_with_version() {
        let record = LicenseRecord {
            name: "Alamofire".into(),
            version: Some("5.4.0".into()),
            body: "MIT".into(),
            kind: LicenseKind::GitHub,
            source_url: None,
        };
        assert_eq!(record.title(true), "Alamofire (5.4.0)");
        assert_eq!(record.title(false), "Alamofire");
    }
}
