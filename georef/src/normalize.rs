//! Normalizing detected text before we compare it to place names.
//!
//! OCR output is lower-cased, stripped of obvious artifacts, and has its
//! abbreviations expanded. Normalizing twice is not guaranteed to give the
//! same result as normalizing once: if one abbreviation's expansion contains
//! another abbreviation (or itself), a second pass will expand it again.

use std::borrow::Cow;

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

use crate::abbreviations::Abbreviations;

/// Is this text just OCR debris? Map hatching and dotted boundaries tend to
/// come back as runs of hyphens and periods.
pub fn is_noise(text: &str) -> bool {
    lazy_static! {
        static ref DEBRIS: Regex = Regex::new(r"^[-.]+$").unwrap();
    }
    text.trim().is_empty() || DEBRIS.is_match(text)
}

/// Apply each abbreviation rule in order. A rule replaces every occurrence
/// of its abbreviation, and later rules see the output of earlier ones.
pub fn expand_abbreviations<'a>(text: &'a str, abbreviations: &Abbreviations) -> Cow<'a, str> {
    let mut text = Cow::Borrowed(text);
    for rule in abbreviations.iter() {
        if text.contains(rule.abbreviation.as_str()) {
            text = Cow::Owned(text.replace(rule.abbreviation.as_str(), &rule.expansion));
        }
    }
    text
}

/// Map the German/Swedish "ö" onto the Norwegian "ø", which older map
/// lettering and OCR engines tend to confuse.
pub fn transliterate(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'Ö' => 'Ø',
            'ö' => 'ø',
            c => c,
        })
        .collect()
}

/// Normalize detected text for comparison, or return `None` if it is noise.
///
/// ```
/// use georef::abbreviations::{AbbreviationRule, Abbreviations};
/// use georef::normalize::normalize;
///
/// let abbreviations: Abbreviations =
///     vec![AbbreviationRule::new("st.", "stasjon")].into_iter().collect();
/// assert_eq!(Some("hamar stasjon".to_owned()), normalize("Hamar St.", &abbreviations));
/// assert_eq!(Some("ørje".to_owned()), normalize("Örje", &abbreviations));
/// assert_eq!(None, normalize("-..-", &abbreviations));
/// ```
pub fn normalize(text: &str, abbreviations: &Abbreviations) -> Option<String> {
    let lower = text.to_lowercase();
    if is_noise(&lower) {
        trace!("discarding {:?} as noise", text);
        return None;
    }
    let expanded = expand_abbreviations(&lower, abbreviations);
    Some(transliterate(&expanded))
}
