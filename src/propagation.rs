//! Propagation of patient phenotypes through the ontology
//!
//! A patient annotated with *Generalized tonic-clonic seizure* implicitly
//! also has *Seizure* and every other ancestor term. [`AncestorClosure`]
//! computes this deductive closure for a single patient and
//! [`SubgroupTable`] aggregates the closures of all patients into per-term,
//! per-group counts.
use std::collections::btree_map::{self, BTreeMap};
use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::{AncestorProvider, Cohorts, PhenoError, TermId, TermSet};

/// All terms that are implied by a set of annotated terms
///
/// The closure contains the annotated terms themselves and all of their
/// ancestors. Annotated terms that are not part of the ontology are
/// listed as unresolved and do not contribute to the closure.
///
/// # Examples
///
/// ```
/// use phenocompare::{AncestorClosure, TermGraph, TermId, TermSet};
///
/// let mut ontology = TermGraph::default();
/// ontology.insert_term("All".into(), 1u32);
/// ontology.insert_term("Seizure".into(), 1250u32);
/// ontology.add_parent(1u32, 1250u32).unwrap();
///
/// let terms = TermSet::from_iter([1250u32.into(), 9999999u32.into()]);
/// let closure = AncestorClosure::new(&terms, &ontology);
///
/// assert_eq!(closure.terms().len(), 2);
/// assert!(closure.terms().contains(&TermId::from(1u32)));
/// assert_eq!(closure.unresolved(), &[TermId::from(9999999u32)]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncestorClosure {
    terms: TermSet,
    unresolved: Vec<TermId>,
}

impl AncestorClosure {
    /// Computes the union of the ancestors of all `terms`
    pub fn new<A: AncestorProvider>(terms: &TermSet, ontology: &A) -> Self {
        let mut closure = TermSet::with_capacity(terms.len() * 4);
        let mut unresolved = Vec::new();
        for term in terms {
            match ontology.ancestors(term) {
                Ok(ancestors) => closure.extend(ancestors.iter().cloned()),
                Err(PhenoError::UnknownTerm(id)) => unresolved.push(id),
                Err(err) => {
                    warn!("Unable to resolve {}: {}", term, err);
                    unresolved.push(term.clone());
                }
            }
        }
        Self {
            terms: closure,
            unresolved,
        }
    }

    /// The annotated terms and all their ancestors
    pub fn terms(&self) -> &TermSet {
        &self.terms
    }

    /// Annotated terms that are not present in the ontology
    pub fn unresolved(&self) -> &[TermId] {
        &self.unresolved
    }
}

/// The patients of every group that carry one particular term
///
/// Patients are identified by their index within their [`PatientGroup`](crate::PatientGroup).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgroups {
    members: Vec<Vec<usize>>,
}

impl Subgroups {
    /// Constructs empty subgroups for `num_groups` groups
    pub fn new(num_groups: usize) -> Self {
        Self {
            members: vec![Vec::new(); num_groups],
        }
    }

    /// Records the patient at `patient_idx` of group `group`
    ///
    /// # Panics
    ///
    /// If `group` is out of bounds
    pub fn add(&mut self, group: usize, patient_idx: usize) {
        self.members[group].push(patient_idx);
    }

    /// Number of patients of `group` that carry the term
    pub fn count(&self, group: usize) -> u64 {
        self.members
            .get(group)
            .map_or(0, |members| members.len() as u64)
    }

    /// Number of patients per group that carry the term
    pub fn counts(&self) -> Vec<u64> {
        self.members
            .iter()
            .map(|members| members.len() as u64)
            .collect()
    }

    /// Indices of the patients of `group` that carry the term
    pub fn members(&self, group: usize) -> &[usize] {
        self.members
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of patients in all groups that carry the term
    pub fn total(&self) -> u64 {
        self.counts().iter().sum()
    }
}

/// Per-term, per-group patient counts of a whole cohort
///
/// Only terms that are carried by at least one patient are stored.
/// Every other term implicitly has a count of zero in every group.
///
/// # Examples
///
/// ```
/// use phenocompare::{Cohorts, GeneGroups, Patient, SubgroupTable, TermGraph, TermSet};
///
/// let mut ontology = TermGraph::default();
/// ontology.insert_term("All".into(), 1u32);
/// ontology.insert_term("Seizure".into(), 1250u32);
/// ontology.insert_term("Hypotonia".into(), 1252u32);
/// ontology.add_parent(1u32, 1250u32).unwrap();
/// ontology.add_parent(1u32, 1252u32).unwrap();
///
/// let genes = GeneGroups::from_reader("PIGA\nPIGV\n".as_bytes(), "genes").unwrap();
/// let cohorts = Cohorts::classify(&genes, vec![
///     Patient::new("1", "PIGA", TermSet::from_iter([1250u32.into()])).unwrap(),
///     Patient::new("2", "PIGA", TermSet::from_iter([1250u32.into(), 1252u32.into()])).unwrap(),
///     Patient::new("3", "PIGV", TermSet::from_iter([1252u32.into()])).unwrap(),
/// ]);
///
/// let table = SubgroupTable::aggregate(&cohorts, &ontology);
/// assert_eq!(table.counts(&1u32.into()), vec![2, 1]);
/// assert_eq!(table.counts(&1250u32.into()), vec![2, 0]);
/// assert_eq!(table.counts(&1252u32.into()), vec![1, 1]);
/// assert_eq!(table.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SubgroupTable {
    num_groups: usize,
    terms: BTreeMap<TermId, Subgroups>,
    unresolved: BTreeSet<TermId>,
}

impl SubgroupTable {
    /// Propagates the terms of every patient and counts them per group
    ///
    /// Terms that are missing from the ontology are skipped for the patient
    /// and collected in [`SubgroupTable::unresolved`].
    pub fn aggregate<A: AncestorProvider>(cohorts: &Cohorts, ontology: &A) -> Self {
        let num_groups = cohorts.num_groups();
        let mut terms: BTreeMap<TermId, Subgroups> = BTreeMap::new();
        let mut unresolved = BTreeSet::new();

        for (group_idx, group) in cohorts.groups().enumerate() {
            for (patient_idx, patient) in group.iter().enumerate() {
                let closure = AncestorClosure::new(patient.terms(), ontology);
                for term in closure.unresolved() {
                    debug!("Patient {}: {} is not in the ontology", patient.id(), term);
                }
                unresolved.extend(closure.unresolved().iter().cloned());

                for term in closure.terms() {
                    terms
                        .entry(term.clone())
                        .or_insert_with(|| Subgroups::new(num_groups))
                        .add(group_idx, patient_idx);
                }
            }
        }

        if !unresolved.is_empty() {
            warn!(
                "{} annotated terms are not present in the ontology",
                unresolved.len()
            );
        }
        debug!("Aggregated {} terms", terms.len());

        Self {
            num_groups,
            terms,
            unresolved,
        }
    }

    /// Returns the subgroups of `term`, if any patient carries it
    pub fn get(&self, term: &TermId) -> Option<&Subgroups> {
        self.terms.get(term)
    }

    /// Number of patients per group that carry `term`
    ///
    /// Terms that no patient carries have a count of 0 in every group.
    pub fn counts(&self, term: &TermId) -> Vec<u64> {
        self.terms
            .get(term)
            .map_or_else(|| vec![0; self.num_groups], Subgroups::counts)
    }

    /// Iterates all terms with their subgroups, ordered by term id
    pub fn iter(&self) -> btree_map::Iter<'_, TermId, Subgroups> {
        self.terms.iter()
    }

    /// Number of terms that are carried by at least one patient
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if no patient carries any term
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The number of patient groups
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// All distinct annotated terms that are not part of the ontology
    pub fn unresolved(&self) -> &BTreeSet<TermId> {
        &self.unresolved
    }
}

impl<'a> IntoIterator for &'a SubgroupTable {
    type Item = (&'a TermId, &'a Subgroups);
    type IntoIter = btree_map::Iter<'a, TermId, Subgroups>;
    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// Returns the terms whose ancestor closure includes `ancestor`
///
/// This lists which annotated terms of a patient explain why the
/// patient carries `ancestor`. Unresolvable terms are ignored.
pub fn subtypes<A: AncestorProvider>(terms: &TermSet, ancestor: &TermId, ontology: &A) -> TermSet {
    terms
        .iter()
        .filter(|term| {
            ontology
                .ancestors(term)
                .map_or(false, |ancestors| ancestors.contains(ancestor))
        })
        .cloned()
        .collect()
}
