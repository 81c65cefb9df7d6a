use std::fmt::Write as _;
use std::path::Path;

use quick_xml::escape::escape;

use crate::error::PersistenceError;
use crate::models::LicenseRecord;

pub fn render(records: &[LicenseRecord], add_version_numbers: bool) -> String {
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Acknowledgements</title>\n</head>\n<body>\n<h1>Acknowledgements</h1>\n",
    );

    for record in records {
        let title = record.title(add_version_numbers);
        let _ = writeln!(out, "<section>\n<h2>{}</h2>", escape(title.as_str()));
        if let Some(url) = &record.source_url {
            let url = escape(url.as_str());
            let _ = writeln!(out, "<p><a href=\"{}\">{}</a></p>", url, url);
        }
        let _ = writeln!(out, "<pre>{}</pre>\n</section>", escape(record.body.trim_end()));
    }

    out.push_str("</body>\n</html>\n");
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
