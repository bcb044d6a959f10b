//! Statistical comparison of term frequencies between patient groups
//!
//! For every term, the number of patients with and without the term in
//! each group forms an `N x 2` contingency table. Pearson's chi-squared
//! test is applied to all tables with sufficiently large expected counts
//! and the p-values are corrected for multiple testing with the
//! Bonferroni method.
//!
//! Only terms with a corrected p-value of at most [`SIGNIFICANCE_LEVEL`]
//! are reported.

use tracing::info;

use crate::{PhenoError, PhenoResult, SubgroupTable, SIGNIFICANCE_LEVEL};

mod chisquared;
mod contingency;

pub use chisquared::{bonferroni, test_term, TermChiSquared};
pub use contingency::ContingencyTable;

/// The outcome of comparing all terms of a [`SubgroupTable`]
#[derive(Debug, Default, Clone)]
pub struct TermComparison {
    tested: usize,
    significant: Vec<TermChiSquared>,
}

impl TermComparison {
    /// Number of terms for which the chi-squared test was applicable
    ///
    /// This is the number of tests used for the Bonferroni correction.
    pub fn tested(&self) -> usize {
        self.tested
    }

    /// All significant terms, the largest chi-squared statistic first
    pub fn significant(&self) -> &[TermChiSquared] {
        &self.significant
    }

    /// Returns the result of `term`, if it is significant
    pub fn get(&self, term: &crate::TermId) -> Option<&TermChiSquared> {
        self.significant.iter().find(|result| result.term() == term)
    }
}

impl<'a> IntoIterator for &'a TermComparison {
    type Item = &'a TermChiSquared;
    type IntoIter = std::slice::Iter<'a, TermChiSquared>;
    fn into_iter(self) -> Self::IntoIter {
        self.significant.iter()
    }
}

/// Tests every term of the table and returns the significant ones
///
/// 1. Terms with an expected count below [`MIN_EXPECTED_COUNT`](crate::MIN_EXPECTED_COUNT)
///    in any cell are not tested.
/// 2. The p-values of all tested terms are Bonferroni corrected.
/// 3. Terms with a corrected p-value above [`SIGNIFICANCE_LEVEL`] are dropped.
/// 4. The remaining terms are sorted by their chi-squared statistic,
///    descending. Ties are ordered by term id.
///
/// # Errors
///
/// - [`PhenoError::InvalidTable`] if `group_sizes` does not match the number
///   of groups of `table`
/// - [`PhenoError::EmptyGroup`] if a group size is 0
pub fn compare_terms(table: &SubgroupTable, group_sizes: &[u64]) -> PhenoResult<TermComparison> {
    if group_sizes.len() != table.num_groups() {
        return Err(PhenoError::InvalidTable(format!(
            "{} group sizes for {} groups",
            group_sizes.len(),
            table.num_groups()
        )));
    }

    let mut results = Vec::new();
    for (term, subgroups) in table {
        if let Some(result) = test_term(term.clone(), &subgroups.counts(), group_sizes)? {
            results.push(result);
        }
    }

    let tested = results.len();
    for result in &mut results {
        result.correct_p_value(tested);
    }
    results.retain(|result| {
        result
            .corrected_p_value()
            .map_or(false, |p| p <= SIGNIFICANCE_LEVEL)
    });
    results.sort_by(TermChiSquared::most_significant_first);

    info!(
        "Tested {} of {} terms, {} are significant",
        tested,
        table.len(),
        results.len()
    );
    Ok(TermComparison {
        tested,
        significant: results,
    })
}

/// Converts a `u64` count into `f64`
///
/// # Panics
///
/// If the count is larger than `u32::MAX`
pub(crate) fn f64_from_u64(n: u64) -> f64 {
    let intermediate: u32 = n
        .try_into()
        .expect("cannot safely create f64 from large u64");
    intermediate.into()
}

/// Converts a `usize` count into `f64`
///
/// # Panics
///
/// If the count is larger than `u32::MAX`
pub(crate) fn f64_from_usize(n: usize) -> f64 {
    let intermediate: u32 = n
        .try_into()
        .expect("cannot safely create f64 from large usize");
    intermediate.into()
}
