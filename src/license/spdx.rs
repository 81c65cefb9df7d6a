use crate::models::LicenseRisk;

/// Classify an SPDX identifier produced by [`identify`](super::identify::identify).
pub fn classify_spdx_id(id: &str) -> LicenseRisk {
    match id.trim() {
        "MIT" | "Apache-2.0" | "BSD-2-Clause" | "BSD-3-Clause" | "ISC" | "Zlib" | "Unlicense" => {
            LicenseRisk::Permissive
        }
        "LGPL-2.1" | "LGPL-3.0" | "MPL-2.0" => LicenseRisk::WeakCopyleft,
        "GPL-2.0" | "GPL-3.0" | "AGPL-3.0" => LicenseRisk::StrongCopyleft,
        _ => LicenseRisk::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_permissive() {
        assert_eq!(classify_spdx_id("MIT"), LicenseRisk::Permissive);
        assert_eq!(classify_spdx_id("Zlib"), LicenseRisk::Permissive);
    }

    #[test]
    fn test_classify_copyleft() {
        assert_eq!(classify_spdx_id("MPL-2.0"), LicenseRisk::WeakCopyleft);
        assert_eq!(classify_spdx_id("AGPL-3.0"), LicenseRisk::StrongCopyleft);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify_spdx_id("WTFPL"), LicenseRisk::Unknown);
    }
}
