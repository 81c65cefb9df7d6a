use std::fmt::Write as _;
use std::path::Path;

use crate::error::PersistenceError;
use crate::models::LicenseRecord;

pub fn render(records: &[LicenseRecord], add_version_numbers: bool) -> String {
    let mut out = String::from("# Acknowledgements\n\n");
    out.push_str("This application makes use of the following third party libraries:\n");

    for record in records {
        let _ = write!(out, "\n## {}\n\n", record.title(add_version_numbers));
        if let Some(url) = &record.source_url {
            let _ = write!(out, "<{}>\n\n", url);
        }
        out.push_str("```\n");
        out.push_str(record.body.trim_end());
        out.push_str("\n```\n");
    }

    out
}

pub fn write(
    records: &[LicenseRecord],
    path: &Path,
    add_version_numbers: bool,
) -> Result<(), PersistenceError> {
    std::fs::write(path, render(records, add_version_numbers))
        .map_err(|e| PersistenceError::new(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LicenseKind;

    #[test]
    fn test_render_markdown() {
        let records = vec![LicenseRecord {
            name: "Alamofire".into(),
            version: Some("5.4.0".into()),
            body: "MIT License\n\n".into(),
            kind: LicenseKind::GitHub,
            source_url: Some("https://github.com/Alamofire/Alamofire".into()),
        }];
        let md = render(&records, true);
        assert!(md.starts_with("# Acknowledgements\n"));
        assert!(md.contains("\n## Alamofire (5.4.0)\n\n<https://github.com/Alamofire/Alamofire>\n\n```\nMIT License\n```\n"));
    }
}
