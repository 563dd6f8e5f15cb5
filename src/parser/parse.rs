use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parser::normalize::{extract_material, normalize_unit};

/// Nouns recognized as the item being described, checked in this order.
pub const COMMON_NOUNS: &[&str] = &["PIN", "BOLT", "NUT", "SCREW", "WASHER", "COTTER PIN"];

/// Word-bounded, optionally plural, case-insensitive matcher per noun.
/// Boundaries are ASCII: a non-ASCII letter next to the noun does not
/// join it into a longer word.
static NOUN_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    COMMON_NOUNS
        .iter()
        .map(|noun| {
            let pattern = format!(r"(?i)(?-u:\b){}s?(?-u:\b)", regex::escape(noun));
            (*noun, Regex::new(&pattern).expect("noun pattern is valid"))
        })
        .collect()
});

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").expect("separator pattern is valid"));

/// The labeled parts of a free-form product description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedDescription {
    /// The recognized noun, or empty.
    pub main_noun: String,
    /// Normalized specification tokens, in input order.
    pub specs: Vec<String>,
    /// The recognized material or grade, or empty.
    pub material: String,
}

impl ParsedDescription {
    /// Element texts in display order: noun, specs, material. Empty parts are dropped.
    pub fn elements(&self) -> Vec<String> {
        std::iter::once(&self.main_noun)
            .chain(self.specs.iter())
            .chain(std::iter::once(&self.material))
            .filter(|part| !part.is_empty())
            .cloned()
            .collect()
    }
}

/// Split a description into noun, spec tokens, and material.
///
/// Best effort: input with no known noun or material still yields its
/// whitespace/comma separated tokens as specs.
pub fn parse_description(input: &str) -> ParsedDescription {
    let material = extract_material(input);
    let mut remaining = if material.is_empty() {
        input.trim().to_owned()
    } else {
        input.replacen(&material, "", 1).trim().to_owned()
    };

    let mut main_noun = String::new();
    for (noun, pattern) in NOUN_PATTERNS.iter() {
        if pattern.is_match(&remaining) {
            main_noun = (*noun).to_owned();
            remaining = pattern.replacen(&remaining, 1, "").trim().to_owned();
            break;
        }
    }

    let specs = SEPARATORS
        .split(&remaining)
        .map(normalize_unit)
        .filter(|spec| !spec.is_empty())
        .collect();

    tracing::trace!(
        main_noun = %main_noun,
        material = %material,
        "parsed description"
    );

    ParsedDescription {
        main_noun,
        specs,
        material,
    }
}
