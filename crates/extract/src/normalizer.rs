use regex::Regex;
use std::sync::LazyLock;

/// A bracketed qualifier at the very end, preceded by whitespace:
/// `polychlorinated biphenyls (pcbs)`.
static TRAILING_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s\(.*?\)$").unwrap());

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a raw chemical mention from generator output: trim whitespace
/// and stray newlines, drop a trailing bracketed qualifier, lowercase.
pub fn normalize_mention(raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = TRAILING_QUALIFIER.replace(trimmed, "");
    stripped.trim().to_lowercase()
}

/// Lookup key for the canonical lexicon: lowercase, single spaces, trimmed.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    WHITESPACE_RUN.replace_all(lowered.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(normalize_mention("Aflatoxin B1"), "aflatoxin b1");
        assert_eq!(normalize_mention("  lead\n"), "lead");
        assert_eq!(normalize_mention("\nmercury \n"), "mercury");
    }

    #[test]
    fn test_trailing_qualifier_is_removed() {
        assert_eq!(
            normalize_mention("polychlorinated biphenyls (PCBs)"),
            "polychlorinated biphenyls"
        );
        assert_eq!(normalize_mention("dioxins (pcdd/fs)\n"), "dioxins");
        // no whitespace before the bracket: left alone
        assert_eq!(normalize_mention("(pcbs)"), "(pcbs)");
        // bracket not at the end: left alone
        assert_eq!(normalize_mention("lead (pb) salts"), "lead (pb) salts");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in ["Lead (Pb)", "  cadmium  ", "leafy-greens", "CHEBI:25016"] {
            let once = normalize_mention(raw);
            assert_eq!(normalize_mention(&once), once);
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Polychlorinated   Biphenyls "), "polychlorinated biphenyls");
        assert_eq!(normalize_name("ochratoxin\ta"), "ochratoxin a");
    }
}
