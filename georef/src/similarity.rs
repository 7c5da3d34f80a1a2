//! String similarity ratios.

use std::{fmt, str::FromStr};

use crate::errors::Error;

/// How to score the similarity of two strings. Every metric returns a value
/// in `[0, 1]`, is symmetric, and returns 1.0 only for identical strings.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SimilarityMetric {
    /// `1 - indel_distance / (len(a) + len(b))`, where the indel distance
    /// only counts insertions and deletions (a substitution costs 2). This
    /// is the "Levenshtein ratio" popularized by Python's `Levenshtein`
    /// package, and the thresholds our users are accustomed to assume it.
    #[default]
    Indel,

    /// `1 - levenshtein_distance / max(len(a), len(b))`.
    Levenshtein,
}

impl SimilarityMetric {
    /// Score `a` against `b`.
    pub fn similarity(self, a: &str, b: &str) -> f64 {
        match self {
            SimilarityMetric::Indel => indel_ratio(a, b),
            SimilarityMetric::Levenshtein => strsim::normalized_levenshtein(a, b),
        }
    }
}

impl FromStr for SimilarityMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "indel" => Ok(SimilarityMetric::Indel),
            "levenshtein" => Ok(SimilarityMetric::Levenshtein),
            _ => Err(Error::invalid_config(format!(
                "unknown similarity metric {:?} (expected \"indel\" or \"levenshtein\")",
                s
            ))),
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityMetric::Indel => write!(f, "indel"),
            SimilarityMetric::Levenshtein => write!(f, "levenshtein"),
        }
    }
}

/// The normalized indel similarity of two strings, computed over Unicode
/// scalar values. Two empty strings are identical.
///
/// ```
/// use georef::similarity::indel_ratio;
///
/// assert_eq!(1.0, indel_ratio("oslo", "oslo"));
/// assert_eq!(6.0 / 7.0, indel_ratio("oslo", "osl"));
/// assert_eq!(0.0, indel_ratio("abc", ""));
/// ```
pub fn indel_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    // indel_distance = total - 2 * lcs, so the ratio simplifies to this.
    (2 * longest_common_subsequence(&a, &b)) as f64 / total as f64
}

/// Length of the longest common subsequence, using a single row of the
/// usual dynamic-programming table.
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0usize; short.len() + 1];
    for &lc in long {
        let mut diagonal = 0;
        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == sc {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[short.len()]
}
