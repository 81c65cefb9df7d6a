//! License text identification for the terminal summary.
//!
//! - [`identify`] — guesses an SPDX identifier from the full license text.
//! - [`spdx`] — maps SPDX identifiers to a [`LicenseRisk`](crate::models::LicenseRisk).
//!
//! Identification is informational: it never changes records or the run summary.

pub mod identify;
pub mod spdx;

use crate::models::LicenseRisk;

/// Identify a license body and classify its risk.
pub fn classify(body: &str) -> (Option<&'static str>, LicenseRisk) {
    match identify::identify(body) {
        Some(id) => (Some(id), spdx::classify_spdx_id(id)),
        None => {
            let lower = body.to_lowercase();
            if lower.contains("proprietary") || lower.contains("commercial license") {
                (None, LicenseRisk::Proprietary)
            } else {
                (None, LicenseRisk::Unknown)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_and_unknown() {
        let mit = "Permission is hereby granted, free of charge, to any person obtaining a copy";
        assert_eq!(classify(mit), (Some("MIT"), LicenseRisk::Permissive));
        assert_eq!(
            classify("This is proprietary software of ACME Corp."),
            (None, LicenseRisk::Proprietary)
        );
        assert_eq!(classify("Do what you like."), (None, LicenseRisk::Unknown));
    }
}
