use std::sync::LazyLock;

use regex::Regex;

/// A single rewrite applied to a spec token.
struct UnitRule {
    pattern: Regex,
    replacement: &'static str,
}

impl UnitRule {
    fn new(pattern: &str, replacement: &'static str) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("unit rule pattern is valid"),
            replacement,
        }
    }
}

/// Unit rewrites, applied in order, each to the first occurrence only.
static UNIT_RULES: LazyLock<Vec<UnitRule>> = LazyLock::new(|| {
    vec![
        // 3" or 1/2"
        UnitRule::new(r#"([0-9]+/?[0-9]*)""#, "${1} IN."),
        // 3 inch, 1/2 Inch
        UnitRule::new(r"(?i)([0-9]+/?[0-9]*) inch", "${1} IN."),
        UnitRule::new(r"(?i)diameter", "DIA."),
        UnitRule::new(r"(?i)length", "LG."),
        UnitRule::new(r"(?i)width", "W."),
        UnitRule::new(r"(?i)height", "H."),
        UnitRule::new(r"(?i)long", "LG."),
    ]
});

/// A steel grade such as `4140-4150` followed by its words.
static GRADE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4}-[0-9]{4})\s+([A-Za-z\s]+)").expect("grade pattern is valid")
});

/// Known materials, checked in this order (not input order).
pub const MATERIALS: &[&str] = &[
    "CARBON STEEL",
    "STAINLESS STEEL",
    "ALUMINUM",
    "BRASS",
    "BRONZE",
    "COPPER",
];

/// Rewrite units and dimension words in a single token to their standard
/// abbreviations, then trim.
///
/// - `3"` and `3 inch` become `3 IN.`
/// - `diameter`, `length`, `width`, `height` and `long` become `DIA.`,
///   `LG.`, `W.`, `H.` and `LG.`
///
/// Word rules match case-insensitively anywhere in the token.
pub fn normalize_unit(token: &str) -> String {
    let mut value = token.to_owned();
    for rule in UNIT_RULES.iter() {
        value = rule
            .pattern
            .replacen(&value, 1, rule.replacement)
            .into_owned();
    }
    value.trim().to_owned()
}

/// Find the material named in a description.
///
/// A grade pattern (`4140-4150 Steel Alloy`) wins and is returned as the
/// grade followed by its uppercased words. Otherwise the first entry of
/// [`MATERIALS`] contained in the input (case-insensitive) is returned.
/// Returns an empty string when nothing matches.
pub fn extract_material(input: &str) -> String {
    if let Some(caps) = GRADE.captures(input) {
        let grade = &caps[1];
        let words = caps[2].trim().to_uppercase();
        return format!("{grade} {words}");
    }

    let upper = input.to_uppercase();
    MATERIALS
        .iter()
        .find(|material| upper.contains(*material))
        .map(|material| (*material).to_owned())
        .unwrap_or_default()
}
