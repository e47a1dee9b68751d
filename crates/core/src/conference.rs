//! Conference alias table and source catalog.
//!
//! Both tables are static and read-only. Alias values are display names shown
//! to users; catalog entries are the machine identifiers used to build source
//! document URLs and to key fetched data.

/// Short lowercase token to display name.
pub const CONFERENCE_ALIASES: &[(&str, &str)] = &[
    ("iclr", "ICLR"),
    ("nips", "NeurIPS"),
    ("neurips", "NeurIPS"),
    ("cvpr", "CVPR"),
    ("icml", "ICML"),
    ("aaai", "AAAI"),
    ("acl", "ACL"),
    ("emnlp", "EMNLP"),
    ("iccv", "ICCV"),
    ("eccv", "ECCV"),
    ("ijcai", "IJCAI"),
    ("kdd", "KDD"),
    ("www", "WWW"),
    ("recsys", "RecSys"),
    ("wacv", "WACV"),
    ("icassp", "ICASSP"),
    ("interspeech", "Interspeech"),
];

/// Source documents fetched per request, in fetch order.
pub const SOURCE_CATALOG: &[&str] = &[
    "iclr",
    "nips",
    "neurips",
    "cvpr",
    "icml",
    "aaai",
    "acl",
    "emnlp",
    "iccv",
    "eccv",
    "ijcai",
    "kdd",
    "www",
    "recsys",
    "wacv",
    "icassp",
    "interspeech",
];

/// Keys suggested to users when a lookup comes back empty.
pub const SUGGESTED_KEYS: &[&str] = &["iclr", "nips", "cvpr", "icml", "aaai", "acl", "emnlp"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedConference {
    pub key: String,
    pub display_name: String,
}

/// Resolves a free-text token. Unknown tokens fall back to their lowercase form.
pub fn resolve(token: &str) -> ResolvedConference {
    let key = token.to_lowercase();
    let display_name = display_name_for(&key).map(str::to_owned).unwrap_or_else(|| key.clone());
    ResolvedConference { key, display_name }
}

pub fn display_name_for(key: &str) -> Option<&'static str> {
    CONFERENCE_ALIASES
        .iter()
        .find_map(|(alias, display_name)| (*alias == key).then_some(*display_name))
}

#[cfg(test)]
mod tests {
    use super::{display_name_for, resolve, CONFERENCE_ALIASES, SOURCE_CATALOG};

    #[test]
    fn known_alias_resolves_to_display_name() {
        let resolved = resolve("nips");
        assert_eq!(resolved.key, "nips");
        assert_eq!(resolved.display_name, "NeurIPS");
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(resolve("ICLR"), resolve("iclr"));
        assert_eq!(resolve("ReCsYs").display_name, "RecSys");
    }

    #[test]
    fn unknown_and_empty_tokens_pass_through() {
        let unknown = resolve("XYZ123");
        assert_eq!(unknown.key, "xyz123");
        assert_eq!(unknown.display_name, "xyz123");

        let empty = resolve("");
        assert_eq!(empty.key, "");
        assert_eq!(empty.display_name, "");
    }

    #[test]
    fn every_lowercased_display_name_is_a_catalog_source() {
        for (_, display_name) in CONFERENCE_ALIASES {
            let lookup = display_name.to_lowercase();
            assert!(
                SOURCE_CATALOG.contains(&lookup.as_str()),
                "{display_name} has no matching source document"
            );
        }
    }

    #[test]
    fn display_name_lookup_requires_exact_key() {
        assert_eq!(display_name_for("icml"), Some("ICML"));
        assert_eq!(display_name_for("ICML"), None);
    }
}
