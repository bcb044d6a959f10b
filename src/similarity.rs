//! Methods to calculate the similarity between two patients
//!
//! The similarity of every pair of patients is collected in a
//! [`SimilarityMatrix`] that can be used for clustering.

use tracing::debug;

use crate::matrix::{Matrix, Rows};
use crate::propagation::AncestorClosure;
use crate::stats::f64_from_usize;
use crate::{AncestorProvider, Patient, TermSet};

/// Trait for similarity score calculation between 2 [`Patient`]s
///
/// The score is calculated on a phenotypic profile of each patient.
/// Profiles are created once per patient, so that expensive profiles,
/// e.g. ancestor closures, are not recalculated for every pair.
pub trait PatientSimilarity {
    /// Returns the set of terms that is compared
    ///
    /// Defaults to the directly annotated terms of the patient.
    fn profile(&self, patient: &Patient) -> TermSet {
        patient.terms().clone()
    }

    /// Calculates the similarity of two profiles, between `0.0` and `1.0`
    fn score(&self, a: &TermSet, b: &TermSet) -> f64;

    /// Calculates the similarity of two patients
    fn calculate(&self, a: &Patient, b: &Patient) -> f64 {
        self.score(&self.profile(a), &self.profile(b))
    }
}

/// Fraction of shared annotated terms
///
/// `|A ∩ B| / max(|A|, |B|)`
///
/// # Examples
///
/// ```
/// use phenocompare::{Patient, TermSet};
/// use phenocompare::similarity::{Overlap, PatientSimilarity};
///
/// let a = Patient::new("1", "PIGA", TermSet::from_iter([1250u32.into(), 1252u32.into()])).unwrap();
/// let b = Patient::new("2", "PIGV", TermSet::from_iter([1250u32.into()])).unwrap();
///
/// assert_eq!(Overlap.calculate(&a, &b), 0.5);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Overlap;

impl PatientSimilarity for Overlap {
    fn score(&self, a: &TermSet, b: &TermSet) -> f64 {
        let max = a.len().max(b.len());
        if max == 0 {
            return 0.0;
        }
        f64_from_usize(a.intersection_len(b)) / f64_from_usize(max)
    }
}

/// Jaccard index of the ancestor closures of two patients
///
/// `|A ∩ B| / |A ∪ B|`, where `A` and `B` contain the annotated terms
/// and all their ancestors. Patients with related, but not identical
/// terms are similar because they share ancestors.
pub struct Jaccard<'a, A> {
    ontology: &'a A,
}

impl<'a, A: AncestorProvider> Jaccard<'a, A> {
    /// Constructs a new `Jaccard` similarity that uses `ontology` for the closures
    pub fn new(ontology: &'a A) -> Self {
        Self { ontology }
    }
}

impl<A: AncestorProvider> PatientSimilarity for Jaccard<'_, A> {
    fn profile(&self, patient: &Patient) -> TermSet {
        AncestorClosure::new(patient.terms(), self.ontology)
            .terms()
            .clone()
    }

    fn score(&self, a: &TermSet, b: &TermSet) -> f64 {
        let union = a.union_len(b);
        if union == 0 {
            return 0.0;
        }
        f64_from_usize(a.intersection_len(b)) / f64_from_usize(union)
    }
}

/// Pairwise similarity scores of a list of patients
///
/// The matrix is symmetric and every patient has a similarity of exactly
/// `1.0` to itself. Row and column `i` belong to the `i`th patient.
///
/// # Examples
///
/// ```
/// use phenocompare::{Patient, SimilarityMatrix, TermSet};
/// use phenocompare::similarity::Overlap;
///
/// let patients = vec![
///     Patient::new("1", "PIGA", TermSet::from_iter([1250u32.into(), 1252u32.into()])).unwrap(),
///     Patient::new("2", "PIGV", TermSet::from_iter([1250u32.into()])).unwrap(),
///     Patient::new("3", "PIGV", TermSet::from_iter([252u32.into()])).unwrap(),
/// ];
/// let matrix = SimilarityMatrix::compute(&patients, &Overlap);
///
/// assert_eq!(matrix.dim(), 3);
/// assert_eq!(matrix.get(0, 1), Some(0.5));
/// assert_eq!(matrix.get(1, 0), Some(0.5));
/// assert_eq!(matrix.get(2, 0), Some(0.0));
/// assert_eq!(matrix.get(2, 2), Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    scores: Matrix<f64>,
}

impl SimilarityMatrix {
    /// Compares all patients with each other
    pub fn compute<'p, I, S>(patients: I, similarity: &S) -> Self
    where
        I: IntoIterator<Item = &'p Patient>,
        S: PatientSimilarity + ?Sized,
    {
        let profiles: Vec<TermSet> = patients
            .into_iter()
            .map(|patient| similarity.profile(patient))
            .collect();
        let dim = profiles.len();
        debug!("Calculating similarity of {} patients", dim);

        let mut scores = Matrix::filled(dim, dim, 0.0);
        for row in 0..dim {
            scores.set(row, row, 1.0);
            for col in 0..row {
                let score = similarity.score(&profiles[row], &profiles[col]);
                scores.set(row, col, score);
                scores.set(col, row, score);
            }
        }
        Self { scores }
    }

    /// The number of patients
    pub fn dim(&self) -> usize {
        self.scores.dim().0
    }

    /// Returns `true` if the matrix does not contain any patient
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The similarity of patient `a` and patient `b`
    pub fn get(&self, a: usize, b: usize) -> Option<f64> {
        self.scores.get(a, b).copied()
    }

    /// Iterates the rows of the matrix
    pub fn rows(&self) -> Rows<'_, f64> {
        self.scores.rows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TermGraph, TermId};

    fn terms(ids: &[u32]) -> TermSet {
        ids.iter().map(|id| TermId::from(*id)).collect()
    }

    fn patient(id: &str, ids: &[u32]) -> Patient {
        Patient::new(id, "PIGA", terms(ids)).unwrap()
    }

    fn ontology() -> TermGraph {
        let mut graph = TermGraph::default();
        for (name, id) in [
            ("All", 1u32),
            ("Abnormality of the nervous system", 707),
            ("Seizure", 1250),
            ("Hypotonia", 1252),
            ("Microcephaly", 252),
        ] {
            graph.insert_term(name.into(), id);
        }
        for (parent, child) in [(1u32, 707u32), (707, 1250), (707, 1252), (1, 252)] {
            graph.add_parent(parent, child).unwrap();
        }
        graph
    }

    #[test]
    fn overlap_scores() {
        assert_eq!(Overlap.score(&terms(&[1, 2, 3]), &terms(&[1, 2, 3])), 1.0);
        assert_eq!(Overlap.score(&terms(&[1, 2, 3, 4]), &terms(&[1, 2])), 0.5);
        assert_eq!(Overlap.score(&terms(&[1]), &terms(&[2])), 0.0);
        assert_eq!(Overlap.score(&TermSet::new(), &TermSet::new()), 0.0);
    }

    #[test]
    fn jaccard_uses_ancestors() {
        let ontology = ontology();
        let jaccard = Jaccard::new(&ontology);
        let seizure = patient("1", &[1250]);
        let hypotonia = patient("2", &[1252]);
        // {1, 707, 1250} and {1, 707, 1252}
        assert_eq!(jaccard.calculate(&seizure, &hypotonia), 0.5);
        assert_eq!(Overlap.calculate(&seizure, &hypotonia), 0.0);
        assert_eq!(jaccard.calculate(&seizure, &seizure), 1.0);
    }

    #[test]
    fn jaccard_ignores_unknown_terms() {
        let ontology = ontology();
        let jaccard = Jaccard::new(&ontology);
        let profile = jaccard.profile(&patient("1", &[252, 9999999]));
        assert_eq!(profile, terms(&[1, 252]));
    }

    #[test]
    fn matrix_is_symmetric() {
        let ontology = ontology();
        let patients = vec![
            patient("1", &[1250]),
            patient("2", &[1252, 252]),
            patient("3", &[252]),
            patient("4", &[1250, 1252]),
        ];
        let matrix = SimilarityMatrix::compute(&patients, &Jaccard::new(&ontology));
        assert_eq!(matrix.dim(), 4);
        for a in 0..4 {
            assert_eq!(matrix.get(a, a), Some(1.0));
            for b in 0..4 {
                let score = matrix.get(a, b).unwrap();
                assert_eq!(Some(score), matrix.get(b, a));
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn identical_and_disjoint_patients() {
        let patients = vec![patient("1", &[1250]), patient("2", &[1250]), patient("3", &[252])];
        let matrix = SimilarityMatrix::compute(&patients, &Overlap);
        assert_eq!(matrix.get(0, 1), Some(1.0));
        assert_eq!(matrix.get(0, 2), Some(0.0));
        assert_eq!(matrix.get(1, 2), Some(0.0));
    }

    #[test]
    fn empty_matrix() {
        let matrix = SimilarityMatrix::compute(&Vec::<Patient>::new(), &Overlap);
        assert!(matrix.is_empty());
        assert_eq!(matrix.dim(), 0);
        assert_eq!(matrix.rows().count(), 0);
    }

    #[test]
    fn rows_follow_patient_order() {
        let patients = vec![patient("1", &[1250]), patient("2", &[1250, 1252])];
        let matrix = SimilarityMatrix::compute(&patients, &Overlap);
        let first: Vec<f64> = matrix.rows().next().unwrap().copied().collect();
        assert_eq!(first, [1.0, 0.5]);
    }
}
