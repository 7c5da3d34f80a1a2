//! Abbreviations commonly printed on maps, and what they stand for.

use std::{fs::File, io, path::Path};

use log::debug;

use crate::{errors::Error, Result};

/// Replace `abbreviation` with `expansion` wherever it appears.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AbbreviationRule {
    /// The literal text to look for.
    pub abbreviation: String,
    /// What to replace it with.
    pub expansion: String,
}

impl AbbreviationRule {
    /// Create a new rule.
    pub fn new<A, E>(abbreviation: A, expansion: E) -> AbbreviationRule
    where
        A: Into<String>,
        E: Into<String>,
    {
        AbbreviationRule {
            abbreviation: abbreviation.into(),
            expansion: expansion.into(),
        }
    }
}

/// An ordered table of [`AbbreviationRule`]s.
///
/// Rules are applied in the order they were added, and each rule sees the
/// output of the ones before it. Adding a rule for an abbreviation we
/// already have replaces the old expansion but keeps the old position.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Abbreviations {
    rules: Vec<AbbreviationRule>,
}

impl Abbreviations {
    /// An empty table.
    pub fn new() -> Abbreviations {
        Abbreviations::default()
    }

    /// Add a rule, or update the expansion of an existing one.
    pub fn insert(&mut self, rule: AbbreviationRule) {
        match self
            .rules
            .iter_mut()
            .find(|r| r.abbreviation == rule.abbreviation)
        {
            Some(existing) => existing.expansion = rule.expansion,
            None => self.rules.push(rule),
        }
    }

    /// Load a headerless CSV file. The first field of each row is the
    /// abbreviation and the last is its expansion; anything in between is
    /// ignored.
    pub fn from_path(path: &Path) -> Result<Abbreviations> {
        let file = File::open(path).map_err(|err| Error::io(path, err))?;
        Abbreviations::from_reader(file, path)
    }

    /// Load abbreviation CSV data from `rdr`. `path` is only used to label
    /// errors.
    pub fn from_reader<R: io::Read>(rdr: R, path: &Path) -> Result<Abbreviations> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(rdr);
        let mut abbreviations = Abbreviations::new();
        for record in rdr.records() {
            let record = record.map_err(|err| Error::csv(path, err))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if record.len() < 2 {
                return Err(Error::malformed(
                    path,
                    line,
                    "expected an abbreviation and an expansion",
                ));
            }
            let abbreviation = &record[0];
            if abbreviation.is_empty() {
                return Err(Error::malformed(path, line, "empty abbreviation"));
            }
            abbreviations.insert(AbbreviationRule::new(abbreviation, &record[record.len() - 1]));
        }
        debug!("loaded {} abbreviations from {}", abbreviations.len(), path.display());
        Ok(abbreviations)
    }

    /// How many rules do we have?
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Do we have any rules?
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over our rules in the order they will be applied.
    pub fn iter(&self) -> impl Iterator<Item = &AbbreviationRule> {
        self.rules.iter()
    }
}

impl FromIterator<AbbreviationRule> for Abbreviations {
    fn from_iter<I: IntoIterator<Item = AbbreviationRule>>(iter: I) -> Self {
        let mut abbreviations = Abbreviations::new();
        for rule in iter {
            abbreviations.insert(rule);
        }
        abbreviations
    }
}
