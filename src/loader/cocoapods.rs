use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LoadError;
use crate::models::{LibraryDescriptor, SourceKind};

const ACKNOWLEDGEMENTS_SUFFIX: &str = "-acknowledgements.plist";

/// Loader for CocoaPods acknowledgement plists.
///
/// CocoaPods writes the full license text of every pod into
/// `Pods/Target Support Files/<target>/<target>-acknowledgements.plist`.
/// Versions are taken from `Pods/Manifest.lock` when it is present.
pub struct CocoaPodsLoader {
    versions: HashMap<String, String>,
}

impl CocoaPodsLoader {
    pub fn new(manifest_lock: Option<&str>) -> Self {
        Self {
            versions: manifest_lock.map(parse_manifest_lock).unwrap_or_default(),
        }
    }
}

impl super::Loader for CocoaPodsLoader {
    fn manifest(&self) -> &'static str {
        "acknowledgements plist"
    }

    fn load(&self, raw: &str, config: &Config) -> Result<Vec<LibraryDescriptor>, LoadError> {
        let entries = parse_acknowledgements(raw)
            .map_err(|message| LoadError::malformed(self.manifest(), message))?;

        let libs = entries
            .into_iter()
            .filter_map(|mut entry| {
                // Header and footer entries have no `License` key.
                entry.get("License")?;
                let name = entry.remove("Title")?;
                let body = entry.remove("FooterText")?;
                Some(LibraryDescriptor {
                    version: self.versions.get(&name).cloned(),
                    name,
                    source_kind: SourceKind::LocalPackageManager,
                    origin: "CocoaPods".to_string(),
                    license_body: Some(body),
                    remote: None,
                    source_url: None,
                })
            })
            .collect();

        Ok(config.apply(libs))
    }
}

/// Load every acknowledgements plist below `pods_dir`.
pub fn load_pods(pods_dir: &Path, config: &Config) -> Vec<LibraryDescriptor> {
    let support_dir = pods_dir.join("Target Support Files");
    if !support_dir.is_dir() {
        debug!("No CocoaPods support files at {}", support_dir.display());
        return Vec::new();
    }

    let manifest_lock = std::fs::read_to_string(pods_dir.join("Manifest.lock")).ok();
    let loader = CocoaPodsLoader::new(manifest_lock.as_deref());

    let plists = match find_acknowledgements(&support_dir) {
        Ok(plists) => plists,
        Err(e) => {
            warn!("Skipping CocoaPods: {}", e);
            return Vec::new();
        }
    };

    plists
        .iter()
        .flat_map(|path| super::load_file(&loader, path, config))
        .collect()
}

fn find_acknowledgements(support_dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source: std::io::Error| LoadError::Io {
        path: support_dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for target in std::fs::read_dir(support_dir).map_err(io_err)? {
        let target = target.map_err(io_err)?.path();
        if !target.is_dir() {
            continue;
        }
        for file in std::fs::read_dir(&target).map_err(io_err)? {
            let file = file.map_err(io_err)?.path();
            let is_ack = file
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(ACKNOWLEDGEMENTS_SUFFIX));
            if is_ack {
                found.push(file);
            }
        }
    }
    found.sort();
    Ok(found)
}

/// Extract the `PreferenceSpecifiers` dictionaries as key → string maps.
fn parse_acknowledgements(xml: &str) -> Result<Vec<HashMap<String, String>>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut entries = Vec::new();
    let mut entry: HashMap<String, String> = HashMap::new();
    let mut saw_plist = false;
    let mut dict_depth: u32 = 0;
    let mut current_tag = String::new();
    let mut pending_key: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                current_tag = String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned();
                match current_tag.as_str() {
                    "plist" => saw_plist = true,
                    "dict" => {
                        dict_depth += 1;
                        if dict_depth == 2 {
                            entry.clear();
                            pending_key = None;
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| format!("{} at byte {}", err, reader.buffer_position()))?;
                match current_tag.as_str() {
                    "key" => pending_key = Some(text.into_owned()),
                    "string" if dict_depth == 2 => {
                        if let Some(key) = pending_key.take() {
                            entry.insert(key, text.into_owned());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                // `<string/>` and `<true/>` still consume the pending key.
                if let Some(key) = pending_key.take() {
                    if dict_depth == 2 && e.name().local_name().as_ref() == b"string" {
                        entry.insert(key, String::new());
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().local_name().as_ref() == b"dict" {
                    if dict_depth == 2 {
                        entries.push(std::mem::take(&mut entry));
                    }
                    dict_depth = dict_depth.saturating_sub(1);
                }
                current_tag.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("{} at byte {}", e, reader.buffer_position())),
            _ => {}
        }
        buf.clear();
    }

    if !saw_plist {
        return Err("missing <plist> root element".to_string());
    }
    Ok(entries)
}

/// Map pod name → version from the `PODS:` section of `Manifest.lock`.
///
/// Subspecs (`Firebase/Core`) are recorded under their root pod name; the
/// first version seen wins.
fn parse_manifest_lock(raw: &str) -> HashMap<String, String> {
    let mut versions = HashMap::new();
    let mut in_pods = false;

    for line in raw.lines() {
        if !line.starts_with(' ') {
            in_pods = line.trim_end() == "PODS:";
            continue;
        }
        if !in_pods {
            continue;
        }
        // Top-level pods are indented by exactly two spaces.
        let Some(spec) = line.strip_prefix("  - ") else {
            continue;
        };
        let spec = spec.trim().trim_end_matches(':').trim_matches('"');
        let Some((name, version)) = spec.split_once(" (") else {
            continue;
        };
        let root = name.split('/').next().unwrap_or(name);
        let version = version.trim_end_matches(')');
        versions
            .entry(root.to_string())
            .or_insert_with(|| version.to_string());
    }

    versions
}
