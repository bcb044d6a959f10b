//! A single patient with a mutated gene and observed phenotypes
use std::fmt::Display;

use crate::{PhenoError, PhenoResult, TermId, TermSet};

/// Column of the gene symbol in a patient record
const GENE_COLUMN: usize = 1;
/// Column of the PubMed ID in a patient record
const PMID_COLUMN: usize = 2;
/// Column of the clinical summary in a patient record
const SUMMARY_COLUMN: usize = 3;
/// Column of the semicolon separated term ids in a patient record
const TERMS_COLUMN: usize = 5;

/// A patient with a mutation in one gene and a set of directly observed terms
///
/// Two patients are equal if id, gene, metadata and terms are all equal.
///
/// # Examples
///
/// ```
/// use phenocompare::{Patient, TermId};
///
/// let record = "P1\tPIGV\tPMID:24129430\tseizures\t-\tHP:0001250; HP:0001252";
/// let patient = Patient::from_record(record).unwrap();
///
/// assert_eq!(patient.id(), "P1");
/// assert_eq!(patient.gene(), "PIGV");
/// assert_eq!(patient.pmid(), Some("PMID:24129430"));
/// assert_eq!(patient.terms().len(), 2);
/// assert!(patient.terms().contains(&TermId::from(1252u32)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Patient {
    id: String,
    gene: String,
    pmid: Option<String>,
    summary: Option<String>,
    terms: TermSet,
}

impl Patient {
    /// Constructs a new [`Patient`] without metadata
    ///
    /// # Errors
    ///
    /// [`PhenoError::InvalidRecord`] if the gene is empty or no terms are given
    pub fn new<S: Into<String>, T: Into<String>>(
        id: S,
        gene: T,
        terms: TermSet,
    ) -> PhenoResult<Self> {
        let id = id.into();
        let gene = gene.into();
        if gene.trim().is_empty() {
            return Err(PhenoError::InvalidRecord(format!("patient {id} has no gene")));
        }
        if terms.is_empty() {
            return Err(PhenoError::InvalidRecord(format!("patient {id} has no terms")));
        }
        Ok(Self {
            id,
            gene,
            pmid: None,
            summary: None,
            terms,
        })
    }

    /// Adds PubMed ID and summary to the patient
    #[must_use]
    pub fn with_metadata(mut self, pmid: Option<String>, summary: Option<String>) -> Self {
        self.pmid = pmid;
        self.summary = summary;
        self
    }

    /// Parses one line of a patient file
    ///
    /// The record has at least six tab-separated columns:
    ///
    /// ```text
    /// id  gene  pmid  summary  (ignored)  HP:0000001;HP:0000002
    /// ```
    ///
    /// # Errors
    ///
    /// - [`PhenoError::InvalidRecord`] if columns are missing or id, gene or terms are empty
    /// - [`PhenoError::InvalidTermId`] if one of the terms is not a valid term id
    pub fn from_record(line: &str) -> PhenoResult<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() <= TERMS_COLUMN {
            return Err(PhenoError::InvalidRecord(format!(
                "expected {} columns, found {}: {line}",
                TERMS_COLUMN + 1,
                cols.len()
            )));
        }

        let id = cols[0].trim();
        if id.is_empty() {
            return Err(PhenoError::InvalidRecord(format!("missing patient id: {line}")));
        }

        let terms = cols[TERMS_COLUMN]
            .split(';')
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(TermId::try_from)
            .collect::<PhenoResult<TermSet>>()?;

        let patient = Patient::new(id, cols[GENE_COLUMN].trim(), terms)
            .map_err(|_| PhenoError::InvalidRecord(line.to_string()))?;
        Ok(patient.with_metadata(
            optional_column(cols[PMID_COLUMN]),
            optional_column(cols[SUMMARY_COLUMN]),
        ))
    }

    /// The identifier of the patient
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The mutated gene
    pub fn gene(&self) -> &str {
        &self.gene
    }

    /// The PubMed ID of the publication that describes the patient
    pub fn pmid(&self) -> Option<&str> {
        self.pmid.as_deref()
    }

    /// A free-text clinical summary
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The directly observed terms
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }
}

fn optional_column(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl Display for Patient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let terms: Vec<&str> = self.terms.iter().map(TermId::as_str).collect();
        write!(
            f,
            "Patient: Id = {}; Gene = {}; Terms = {}",
            self.id,
            self.gene,
            terms.join(", ")
        )
    }
}
