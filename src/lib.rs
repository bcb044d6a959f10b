//! `phenocompare` compares the phenotypes of patient cohorts that are defined
//! by mutations in different sets of genes.
//!
//! Every patient is described by a set of HPO terms. The terms are propagated
//! up the ontology, so that a patient with *Generalized tonic-clonic seizure*
//! also counts towards *Seizure* and *Abnormality of the nervous system*.
//! For every term, the number of patients per cohort is compared using a
//! chi-squared test and the p-values are corrected for multiple testing.
//!
//! In addition, all patients are compared pairwise to build a similarity
//! matrix that can be used for clustering.
//!
//! # Examples
//!
//! ```
//! use phenocompare::{Analysis, GeneGroups, Cohorts, Patient, TermGraph, TermSet};
//! use phenocompare::similarity::Overlap;
//!
//! let mut ontology = TermGraph::default();
//! ontology.insert_term("All".into(), 1u32);
//! ontology.insert_term("Seizure".into(), 1250u32);
//! ontology.add_parent(1u32, 1250u32).unwrap();
//!
//! let genes = GeneGroups::from_reader("PIGA PIGM\nPIGV\n".as_bytes(), "genes").unwrap();
//!
//! let patients = vec![
//!     Patient::new("P1", "PIGA", TermSet::from_iter([1250u32.into()])).unwrap(),
//!     Patient::new("P2", "PIGV", TermSet::from_iter([1u32.into()])).unwrap(),
//! ];
//! let cohorts = Cohorts::classify(&genes, patients);
//!
//! let analysis = Analysis::run(cohorts, &ontology, &Overlap).unwrap();
//! assert_eq!(analysis.table().counts(&1250u32.into()), vec![1, 0]);
//! // far too few patients for a valid chi-squared test
//! assert!(analysis.comparison().significant().is_empty());
//! ```
use std::path::PathBuf;

use thiserror::Error;

pub mod analysis;
pub mod cohort;
pub mod genes;
pub mod matrix;
pub mod ontology;
pub mod patient;
pub mod propagation;
pub mod report;
pub mod similarity;
pub mod stats;
pub mod term;

pub use analysis::Analysis;
pub use cohort::{Cohorts, PatientGroup, RecordWarning};
pub use genes::{GeneGroup, GeneGroups};
pub use ontology::{AncestorProvider, TermGraph};
pub use patient::Patient;
pub use propagation::{AncestorClosure, SubgroupTable, Subgroups};
pub use similarity::SimilarityMatrix;
pub use stats::{TermChiSquared, TermComparison};
pub use term::{TermId, TermSet};

/// Every cell of a contingency table must have at least this expected count
/// for the chi-squared approximation to be valid
pub const MIN_EXPECTED_COUNT: f64 = 5.0;

/// Terms with a Bonferroni corrected p-value above this level are not reported
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Prefix of Human Phenotype Ontology terms
pub const HPO_PREFIX: &str = "HP";

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PhenoError {
    /// Failed to open or read a file
    #[error("cannot open file {}: {reason}", .path.display())]
    CannotOpenFile {
        /// The file that could not be read
        path: PathBuf,
        /// Description of the underlying problem
        reason: String,
    },
    /// Reading from an already opened input failed
    #[error("cannot read {path}: {reason}")]
    CannotReadFile {
        /// The file or input that could not be read
        path: String,
        /// Description of the underlying problem
        reason: String,
    },
    /// The gene file did not contain a single gene group
    #[error("no gene groups found in {0}")]
    NoGeneGroups(String),
    /// A patient record could not be parsed
    #[error("cannot parse patient record: {0}")]
    InvalidRecord(String),
    /// A string is not a valid `PREFIX:digits` term identifier
    #[error("invalid term id: {0}")]
    InvalidTermId(String),
    /// The gene of a patient is not part of any gene group
    #[error("gene {0} is not part of any gene group")]
    UnknownGene(String),
    /// The term is not present in the ontology
    #[error("term {0} does not exist in the ontology")]
    UnknownTerm(TermId),
    /// A patient group did not receive any patients
    #[error("patient group {0} is empty")]
    EmptyGroup(usize),
    /// Counts that do not form a valid contingency table
    #[error("invalid contingency table: {0}")]
    InvalidTable(String),
    /// Error from the ontology library
    #[error("ontology error: {0}")]
    Ontology(String),
    /// Failed writing results
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shortcut for `Result<T, PhenoError>`
pub type PhenoResult<T> = Result<T, PhenoError>;
