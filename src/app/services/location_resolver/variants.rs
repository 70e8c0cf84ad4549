//! County-name normalization and spelling-variant generation
//!
//! County strings arrive with administrative suffixes ("Anoka County",
//! "St. Bernard Parish", "Valdez-Cordova Census Area") and historical
//! spelling quirks. These helpers reduce a raw county to its lookup form
//! and enumerate the spellings tried against the centroid tables.
//!
//! The variant list is heuristic and can false-match similarly named
//! counties when the state key itself is wrong; it is kept exactly as the
//! upstream tables were built against.

use regex::Regex;
use std::sync::OnceLock;

fn city_suffix_re() -> &'static Regex {
    static CITY_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
    CITY_SUFFIX_RE.get_or_init(|| Regex::new(r"(?i)\s*city\s*$").expect("valid city suffix regex"))
}

fn county_suffix_re() -> &'static Regex {
    static COUNTY_SUFFIX_RE: OnceLock<Regex> = OnceLock::new();
    COUNTY_SUFFIX_RE.get_or_init(|| {
        Regex::new(r"(?i)\s*(county|parish|borough|census area|\(ca\))\s*$")
            .expect("valid county suffix regex")
    })
}

fn place_prefix_re() -> &'static Regex {
    static PLACE_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    PLACE_PREFIX_RE.get_or_init(|| {
        Regex::new(r"(?i)^(city of|town of|village of|borough of)\s+")
            .expect("valid place prefix regex")
    })
}

/// Reduce a raw county string to its cleaned lowercase lookup form
///
/// Strips a trailing "city" (independent cities) and then any trailing
/// county/parish/borough/census-area designation.
pub(crate) fn normalize_county(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let no_city = city_suffix_re().replace(&lowered, "").trim().to_string();
    county_suffix_re().replace(&no_city, "").trim().to_string()
}

/// Generate the spelling variants tried for a cleaned county name
///
/// Order matters: the first table hit wins. Duplicates produced by
/// no-op replacements are collapsed while preserving order.
pub(crate) fn county_variants(clean: &str) -> Vec<String> {
    let candidates = [
        clean.to_string(),
        format!("{} county", clean),
        clean.replace("st.", "saint"),
        clean.replace("st ", "saint "),
        clean.replace("saint", "st."),
        clean.replace(' ', "-"),
        clean.replace('-', " "),
        format!("{}ugh", clean),
        clean.replace("ugh", ""),
    ];

    let mut variants = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Strip a leading "city of"/"town of"/"village of"/"borough of" from a
/// free-text place name, lowercased
pub(crate) fn strip_place_prefix(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    place_prefix_re().replace(&lowered, "").trim().to_string()
}

/// Strip a trailing administrative designation from a free-text place name
pub(crate) fn strip_place_suffix(place: &str) -> String {
    county_suffix_re().replace(place, "").trim().to_string()
}
