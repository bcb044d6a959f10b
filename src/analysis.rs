use tracing::info;

use crate::similarity::PatientSimilarity;
use crate::stats::{compare_terms, TermComparison};
use crate::{AncestorProvider, Cohorts, PhenoResult, SimilarityMatrix, SubgroupTable};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// The complete comparison of a set of patient cohorts
///
/// `Analysis` runs all steps of the comparison and keeps their results:
///
/// ```mermaid
/// flowchart LR
///     G[GeneGroups] --> C[Cohorts]
///     P[Patients] --> C
///     C --> T[SubgroupTable]
///     O[Ontology] --> T
///     T --> X[TermComparison]
///     C --> S[SimilarityMatrix]
///     O -.-> S
/// ```
///
/// 1. Ensures that no patient group is empty
/// 2. Propagates all patient terms and counts them per group ([`SubgroupTable`])
/// 3. Tests every term for a difference between the groups ([`TermComparison`])
/// 4. Calculates the pairwise similarity of all patients ([`SimilarityMatrix`]).
///    Patients are ordered by group: all patients of the first group, then
///    all of the second group and so on.
///
/// # Examples
///
/// ```
/// use phenocompare::{Analysis, Cohorts, GeneGroups, Patient, TermGraph, TermSet};
/// use phenocompare::similarity::Jaccard;
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
///     Patient::new("1", "PIGV", TermSet::from_iter([1252u32.into()])).unwrap(),
///     Patient::new("2", "PIGA", TermSet::from_iter([1250u32.into()])).unwrap(),
/// ]);
///
/// let analysis = Analysis::run(cohorts, &ontology, &Jaccard::new(&ontology)).unwrap();
///
/// // patient 2 belongs to the first group and is listed first
/// let first = analysis.cohorts().patients().next().unwrap();
/// assert_eq!(first.id(), "2");
/// assert_eq!(analysis.similarity().get(0, 1), Some(1.0 / 3.0));
/// ```
#[derive(Debug)]
pub struct Analysis {
    cohorts: Cohorts,
    table: SubgroupTable,
    comparison: TermComparison,
    similarity: SimilarityMatrix,
}

impl Analysis {
    /// Runs the complete analysis
    ///
    /// # Errors
    ///
    /// - [`PhenoError::EmptyGroup`](crate::PhenoError::EmptyGroup) if one of
    ///   the patient groups does not contain any patients
    /// - [`PhenoError::InvalidTable`](crate::PhenoError::InvalidTable) if the
    ///   counts of a term cannot be tested
    pub fn run<A, S>(cohorts: Cohorts, ontology: &A, similarity: &S) -> PhenoResult<Self>
    where
        A: AncestorProvider,
        S: PatientSimilarity + ?Sized,
    {
        cohorts.check_not_empty()?;

        let table = SubgroupTable::aggregate(&cohorts, ontology);
        let comparison = compare_terms(&table, &cohorts.group_sizes())?;
        let similarity = SimilarityMatrix::compute(cohorts.patients(), similarity);
        info!(
            "Compared {} patients in {} groups",
            cohorts.total_patients(),
            cohorts.num_groups()
        );

        Ok(Self {
            cohorts,
            table,
            comparison,
            similarity,
        })
    }

    /// The classified patients
    pub fn cohorts(&self) -> &Cohorts {
        &self.cohorts
    }

    /// Per-term and per-group patient counts
    pub fn table(&self) -> &SubgroupTable {
        &self.table
    }

    /// The significant terms
    pub fn comparison(&self) -> &TermComparison {
        &self.comparison
    }

    /// Pairwise similarity of all patients, ordered by group
    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}
