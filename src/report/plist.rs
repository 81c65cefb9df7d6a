//! Settings.bundle output.
//!
//! Normal mode writes a root `<prefix>.plist` of child panes plus one
//! `<prefix>/<name>.plist` per library. Single-page mode puts every license
//! into the root file as a group footer.

use std::path::Path;

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;

use crate::error::PersistenceError;
use crate::models::LicenseRecord;

const DOCTYPE: &str =
    r#"plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd""#;

/// Write the root plist and, unless `single_page`, the per-library plists.
/// The `<prefix>` directory is recreated on every call.
pub fn write(
    records: &[LicenseRecord],
    output_dir: &Path,
    prefix: &str,
    single_page: bool,
    add_version_numbers: bool,
) -> Result<()> {
    let items_dir = output_dir.join(prefix);
    if items_dir.exists() {
        std::fs::remove_dir_all(&items_dir).map_err(|e| PersistenceError::new(&items_dir, e))?;
        info!("Deleted existing plist within {}", prefix);
    }
    std::fs::create_dir_all(&items_dir).map_err(|e| PersistenceError::new(&items_dir, e))?;

    let root = if single_page {
        render_single_page(records, add_version_numbers)?
    } else {
        for record in records {
            let path = items_dir.join(format!("{}.plist", file_stem(record)));
            let content = render_item(record)?;
            std::fs::write(&path, content).map_err(|e| PersistenceError::new(&path, e))?;
        }
        render_root(records, prefix, add_version_numbers)?
    };

    let root_path = output_dir.join(format!("{}.plist", prefix));
    std::fs::write(&root_path, root).map_err(|e| PersistenceError::new(&root_path, e))?;
    info!("Plist written to {}", root_path.display());
    Ok(())
}

/// File name of a library's plist, without extension.
fn file_stem(record: &LicenseRecord) -> String {
    record.name.replace(['/', '\\', ':'], "_")
}

fn render_root(
    records: &[LicenseRecord],
    prefix: &str,
    add_version_numbers: bool,
) -> Result<String> {
    let mut plist = PlistWriter::new()?;
    for record in records {
        let file = format!("{}/{}", prefix, file_stem(record));
        plist.specifier(&[
            ("File", file.as_str()),
            ("Title", record.title(add_version_numbers).as_str()),
            ("Type", "PSChildPaneSpecifier"),
        ])?;
    }
    plist.finish()
}

fn render_single_page(records: &[LicenseRecord], add_version_numbers: bool) -> Result<String> {
    let mut plist = PlistWriter::new()?;
    for record in records {
        plist.specifier(&[
            ("FooterText", record.body.as_str()),
            ("Title", record.title(add_version_numbers).as_str()),
            ("Type", "PSGroupSpecifier"),
        ])?;
    }
    plist.finish()
}

fn render_item(record: &LicenseRecord) -> Result<String> {
    let mut plist = PlistWriter::new()?;
    plist.specifier(&[("FooterText", record.body.as_str()), ("Type", "PSGroupSpecifier")])?;
    plist.finish()
}

/// Writes `<plist><dict><key>PreferenceSpecifiers</key><array>…` documents.
struct PlistWriter {
    writer: Writer<Vec<u8>>,
}

impl PlistWriter {
    fn new() -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;
        writer.write_event(Event::Start(
            BytesStart::new("plist").with_attributes([("version", "1.0")]),
        ))?;
        writer.write_event(Event::Start(BytesStart::new("dict")))?;
        let mut plist = Self { writer };
        plist.element("key", "PreferenceSpecifiers")?;
        plist.writer.write_event(Event::Start(BytesStart::new("array")))?;
        Ok(plist)
    }

    fn element(&mut self, tag: &str, text: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(tag)))?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn specifier(&mut self, pairs: &[(&str, &str)]) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new("dict")))?;
        for (key, value) in pairs {
            self.element("key", key)?;
            self.element("string", value)?;
        }
        self.writer.write_event(Event::End(BytesEnd::new("dict")))?;
        Ok(())
    }

    fn finish(mut self) -> Result<String> {
        for tag in ["array", "dict", "plist"] {
            self.writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        Ok(String::from_utf8(bytes)?)
    }
}
