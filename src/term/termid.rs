use core::fmt::Debug;
use std::fmt::Display;
use std::str::FromStr;

use crate::{PhenoError, PhenoResult, HPO_PREFIX};

/// Identifier of a single ontology term, e.g. `HP:0001250`
///
/// The identifier always has the canonical form `PREFIX:digits`.
/// Ordering is lexicographic on that canonical string.
///
/// # Examples
///
/// ```
/// use phenocompare::TermId;
///
/// let seizure = TermId::try_from("HP:0001250").unwrap();
/// assert_eq!(seizure.prefix(), "HP");
/// assert_eq!(seizure.local_id(), "0001250");
///
/// // HPO terms can also be created from their numerical id
/// assert_eq!(seizure, TermId::from(1250u32));
///
/// assert!(TermId::try_from("HP0001250").is_err());
/// ```
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TermId {
    inner: String,
}

impl TermId {
    /// Returns the canonical `PREFIX:digits` representation
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the namespace of the term, e.g. `HP`
    pub fn prefix(&self) -> &str {
        self.inner.split_once(':').map_or("", |(prefix, _)| prefix)
    }

    /// Returns the numerical part of the term, e.g. `0001250`
    pub fn local_id(&self) -> &str {
        self.inner.split_once(':').map_or("", |(_, id)| id)
    }

    /// Returns `true` if the term belongs to the Human Phenotype Ontology
    pub fn is_hpo(&self) -> bool {
        self.prefix() == HPO_PREFIX
    }

    /// A representation of the id that is safe to use in file names
    ///
    /// ```
    /// use phenocompare::TermId;
    /// assert_eq!(TermId::from(1250u32).file_stem(), "HP_0001250");
    /// ```
    pub fn file_stem(&self) -> String {
        self.inner.replace(':', "_")
    }
}

fn is_valid(prefix: &str, id: &str) -> bool {
    !prefix.is_empty()
        && !id.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && id.chars().all(|c| c.is_ascii_digit())
}

/// HPO ids are always padded to 7 digits, e.g. `HP:1250` becomes `HP:0001250`
impl TryFrom<&str> for TermId {
    type Error = PhenoError;
    fn try_from(s: &str) -> PhenoResult<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((prefix, id)) if is_valid(prefix, id) => {
                if prefix == HPO_PREFIX {
                    if let Ok(n) = id.parse::<u32>() {
                        return Ok(TermId::from(n));
                    }
                }
                Ok(TermId {
                    inner: s.to_string(),
                })
            }
            _ => Err(PhenoError::InvalidTermId(s.to_string())),
        }
    }
}

impl FromStr for TermId {
    type Err = PhenoError;
    fn from_str(s: &str) -> PhenoResult<Self> {
        TermId::try_from(s)
    }
}

/// Creates an HPO term from its numerical id
impl From<u32> for TermId {
    fn from(n: u32) -> Self {
        Self {
            inner: format!("{HPO_PREFIX}:{n:07}"),
        }
    }
}

impl From<hpo::HpoTermId> for TermId {
    fn from(id: hpo::HpoTermId) -> Self {
        Self {
            inner: id.to_string(),
        }
    }
}

impl From<&hpo::HpoTermId> for TermId {
    fn from(id: &hpo::HpoTermId) -> Self {
        Self {
            inner: id.to_string(),
        }
    }
}

impl Debug for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TermId({self})")
    }
}

impl Display for TermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for TermId {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}
