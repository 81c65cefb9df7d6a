/// Distinctive phrases, checked in order. More specific texts come first:
/// the LGPL and AGPL both mention the GPL.
const MARKERS: &[(&str, &[&str])] = &[
    ("AGPL-3.0", &["gnu affero general public license"]),
    ("LGPL-3.0", &["gnu lesser general public license", "version 3"]),
    ("LGPL-2.1", &["gnu lesser general public license"]),
    ("GPL-3.0", &["gnu general public license", "version 3"]),
    ("GPL-2.0", &["gnu general public license"]),
    ("MPL-2.0", &["mozilla public license", "2.0"]),
    ("Apache-2.0", &["apache license", "version 2.0"]),
    ("MIT", &["permission is hereby granted, free of charge"]),
    (
        "ISC",
        &["permission to use, copy, modify, and/or distribute this software for any purpose"],
    ),
    ("Unlicense", &["free and unencumbered software released into the public domain"]),
    ("Zlib", &["altered source versions must be plainly marked as such"]),
    (
        "BSD-3-Clause",
        &["redistribution and use in source and binary forms", "may be used to endorse or promote"],
    ),
    ("BSD-2-Clause", &["redistribution and use in source and binary forms"]),
];

/// Guess the SPDX identifier of a license from its full text.
pub fn identify(body: &str) -> Option<&'static str> {
    // Wrapped lines and indentation differ between copies of the same license.
    let text = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    MARKERS
        .iter()
        .find(|(_, phrases)| phrases.iter().all(|p| text.contains(p)))
        .map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_wrapped_mit() {
        let body = "Copyright (c) 2014 Alamofire\n\nPermission is hereby granted,\n   free of charge, to any person";
        assert_eq!(identify(body), Some("MIT"));
    }

    #[test]
    fn test_identify_apache() {
        let body = "                              Apache License\n                        Version 2.0, January 2004";
        assert_eq!(identify(body), Some("Apache-2.0"));
    }

    #[test]
    fn test_identify_lgpl_before_gpl() {
        let body = "GNU LESSER GENERAL PUBLIC LICENSE\nVersion 2.1, February 1999";
        assert_eq!(identify(body), Some("LGPL-2.1"));
        let body = "GNU GENERAL PUBLIC LICENSE\nVersion 3, 29 June 2007";
        assert_eq!(identify(body), Some("GPL-3.0"));
    }

    #[test]
    fn test_identify_bsd_variants() {
        let two = "Redistribution and use in source and binary forms, with or without modification, are permitted";
        assert_eq!(identify(two), Some("BSD-2-Clause"));
        let three = format!("{} ... Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote products", two);
        assert_eq!(identify(&three), Some("BSD-3-Clause"));
    }

    #[test]
    fn test_identify_unknown() {
        assert_eq!(identify("All rights reserved."), None);
    }
}
