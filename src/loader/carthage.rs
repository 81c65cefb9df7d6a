use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::Config;
use crate::error::LoadError;
use crate::models::{GitHubRef, LibraryDescriptor};

/// `Cartfile` → `Cartfile.resolved`. A path already ending in `.resolved` is kept.
pub fn resolved_path(cartfile: &Path) -> PathBuf {
    if cartfile.extension().is_some_and(|ext| ext == "resolved") {
        return cartfile.to_path_buf();
    }
    let mut name = cartfile.as_os_str().to_os_string();
    name.push(".resolved");
    PathBuf::from(name)
}

/// Loader for Carthage's `Cartfile.resolved`.
///
/// Handles `github "owner/repo" "version"` and `git "<github url>" "version"`.
/// `binary` entries and non-GitHub `git` entries carry no fetchable license
/// and are skipped.
pub struct CarthageLoader;

impl super::Loader for CarthageLoader {
    fn manifest(&self) -> &'static str {
        "Cartfile.resolved"
    }

    fn load(&self, raw: &str, config: &Config) -> Result<Vec<LibraryDescriptor>, LoadError> {
        let re = Regex::new(r#"^(github|git|binary)\s+"([^"]+)"\s+"([^"]+)""#)
            .map_err(|e| LoadError::malformed(self.manifest(), e))?;
        let mut libs = Vec::new();

        for (index, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let caps = re.captures(line).ok_or_else(|| {
                LoadError::malformed(self.manifest(), format!("line {}: {}", index + 1, line))
            })?;

            let github = match &caps[1] {
                "github" => GitHubRef::parse(&caps[2]).or_else(|| GitHubRef::from_url(&caps[2])),
                "git" => GitHubRef::from_url(&caps[2]),
                _ => None,
            };
            if let Some(github) = github {
                let name = github.repo.clone();
                libs.push(LibraryDescriptor::remote(
                    &name,
                    Some(caps[3].to_string()),
                    self.manifest(),
                    github,
                ));
            }
        }

        Ok(config.apply(libs))
    }
}

/// Loader for Mint's `Mintfile`: `owner/repo@version` per line.
pub struct MintLoader;

impl super::Loader for MintLoader {
    fn manifest(&self) -> &'static str {
        "Mintfile"
    }

    fn load(&self, raw: &str, config: &Config) -> Result<Vec<LibraryDescriptor>, LoadError> {
        let mut libs = Vec::new();

        for (index, line) in raw.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }

            // The version separator is the last '@' so `git@github.com:` URLs survive.
            let (package, version) = match line.rsplit_once('@') {
                Some((package, version)) if package != "git" => {
                    (package, Some(version.trim().to_string()))
                }
                _ => (line, None),
            };

            let github = GitHubRef::from_url(package)
                .or_else(|| GitHubRef::parse(package))
                .ok_or_else(|| {
                    LoadError::malformed(self.manifest(), format!("line {}: {}", index + 1, line))
                })?;
            let name = github.repo.clone();
            libs.push(LibraryDescriptor::remote(&name, version, self.manifest(), github));
        }

        Ok(config.apply(libs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Loader;

    #[test]
    fn test_parse_cartfile_resolved() {
        let raw = r#"
# comment
github "Alamofire/Alamofire" "5.4.0"
git "https://github.com/ReactiveX/RxSwift.git" "6.5.0"
git "https://bitbucket.org/foo/bar.git" "1.0"
binary "https://example.com/sdk.json" "3.0"
"#;
        let libs = CarthageLoader.load(raw, &Config::default()).unwrap();
        assert_eq!(libs.len(), 2);
        assert_eq!(libs[0].name, "Alamofire");
        assert_eq!(libs[0].version.as_deref(), Some("5.4.0"));
        assert_eq!(libs[0].source_url.as_deref(), Some("https://github.com/Alamofire/Alamofire"));
        assert_eq!(libs[1].remote, Some(GitHubRef::new("ReactiveX", "RxSwift")));
    }

    #[test]
    fn test_malformed_cartfile_line() {
        let err = CarthageLoader
            .load("github Alamofire/Alamofire\n", &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_rename_applied_in_loader() {
        let config: Config = toml::from_str("[rename]\n\"Alamofire\" = \"AF\"\n").unwrap();
        let libs = CarthageLoader
            .load("github \"Alamofire/Alamofire\" \"5.4.0\"\n", &config)
            .unwrap();
        assert_eq!(libs[0].name, "AF");
    }

    #[test]
    fn test_parse_mintfile() {
        let raw = "realm/SwiftLint@0.50.3\nyonaskolb/XcodeGen # latest\ngit@github.com:mono0926/LicensePlist.git@3.0.0\n";
        let libs = MintLoader.load(raw, &Config::default()).unwrap();
        assert_eq!(libs.len(), 3);
        assert_eq!(libs[0].name, "SwiftLint");
        assert_eq!(libs[0].version.as_deref(), Some("0.50.3"));
        assert_eq!(libs[1].version, None);
        assert_eq!(libs[2].remote, Some(GitHubRef::new("mono0926", "LicensePlist")));
        assert_eq!(libs[2].version.as_deref(), Some("3.0.0"));
    }

    #[test]
    fn test_resolved_path() {
        assert_eq!(resolved_path(Path::new("Cartfile")), PathBuf::from("Cartfile.resolved"));
        assert_eq!(
            resolved_path(Path::new("x/Cartfile.resolved")),
            PathBuf::from("x/Cartfile.resolved")
        );
    }
}
