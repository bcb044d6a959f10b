use std::cmp::Ordering;

use crate::matrix::Matrix;
use crate::stats::ContingencyTable;
use crate::{PhenoError, PhenoResult, TermId, MIN_EXPECTED_COUNT};

/// The chi-squared test result of one term
///
/// The corrected p-value is only known after all terms are tested
/// and is set by [`TermChiSquared::correct_p_value`].
#[derive(Debug, Clone, PartialEq)]
pub struct TermChiSquared {
    term: TermId,
    chi_square: f64,
    p_value: f64,
    corrected_p_value: Option<f64>,
}

impl TermChiSquared {
    /// Constructs a new, uncorrected test result
    pub fn new(term: TermId, chi_square: f64, p_value: f64) -> Self {
        Self {
            term,
            chi_square,
            p_value,
            corrected_p_value: None,
        }
    }

    /// The tested term
    pub fn term(&self) -> &TermId {
        &self.term
    }

    /// Pearson's chi-squared statistic
    pub fn chi_square(&self) -> f64 {
        self.chi_square
    }

    /// The uncorrected p-value
    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    /// The Bonferroni corrected p-value, if it was already calculated
    pub fn corrected_p_value(&self) -> Option<f64> {
        self.corrected_p_value
    }

    /// Applies the Bonferroni correction for `tests` tested terms
    pub fn correct_p_value(&mut self, tests: usize) {
        self.corrected_p_value = Some(bonferroni(self.p_value, tests));
    }

    /// Orders by chi-squared statistic ascending, then by term id
    ///
    /// ```
    /// use phenocompare::TermChiSquared;
    ///
    /// let mut results = vec![
    ///     TermChiSquared::new(1252u32.into(), 3.0, 0.2),
    ///     TermChiSquared::new(1250u32.into(), 3.0, 0.2),
    ///     TermChiSquared::new(118u32.into(), 1.0, 0.5),
    /// ];
    /// results.sort_by(TermChiSquared::ascending);
    /// assert_eq!(results[0].term().as_str(), "HP:0000118");
    /// assert_eq!(results[1].term().as_str(), "HP:0001250");
    /// ```
    pub fn ascending(a: &Self, b: &Self) -> Ordering {
        a.chi_square
            .total_cmp(&b.chi_square)
            .then_with(|| a.term.cmp(&b.term))
    }

    /// Orders by chi-squared statistic descending, then by term id ascending
    pub fn most_significant_first(a: &Self, b: &Self) -> Ordering {
        b.chi_square
            .total_cmp(&a.chi_square)
            .then_with(|| a.term.cmp(&b.term))
    }
}

/// Bonferroni correction of a p-value for `tests` independent tests
///
/// The corrected value never exceeds 1.0.
///
/// ```
/// use phenocompare::stats::bonferroni;
///
/// assert_eq!(bonferroni(0.01, 4), 0.04);
/// assert_eq!(bonferroni(0.3, 4), 1.0);
/// ```
pub fn bonferroni(p_value: f64, tests: usize) -> f64 {
    (p_value * tests as f64).min(1.0)
}

/// Tests whether the frequency of a term differs between groups
///
/// `counts[i]` is the number of patients of group `i` with the term,
/// `group_sizes[i]` the total number of patients in group `i`.
///
/// Returns `None` if the chi-squared test is not applicable because
/// at least one expected count is below [`MIN_EXPECTED_COUNT`].
///
/// # Errors
///
/// - [`PhenoError::InvalidTable`] if `counts` and `group_sizes` have
///   different lengths or a count is larger than its group
/// - [`PhenoError::EmptyGroup`] if a group does not contain any patients
///
/// # Examples
///
/// ```
/// use phenocompare::stats::test_term;
///
/// let result = test_term(1250u32.into(), &[18, 10, 2], &[20, 20, 20]).unwrap().unwrap();
/// assert!((result.chi_square() - 25.6).abs() < 1e-9);
///
/// // expected counts of 1.0 in the second column
/// assert!(test_term(1252u32.into(), &[3, 0, 0], &[20, 20, 20]).unwrap().is_none());
/// ```
pub fn test_term(
    term: TermId,
    counts: &[u64],
    group_sizes: &[u64],
) -> PhenoResult<Option<TermChiSquared>> {
    if counts.len() != group_sizes.len() {
        return Err(PhenoError::InvalidTable(format!(
            "{} counts for {} groups",
            counts.len(),
            group_sizes.len()
        )));
    }

    let mut observed = Vec::with_capacity(counts.len() * 2);
    for (idx, (count, size)) in counts.iter().zip(group_sizes).enumerate() {
        if *size == 0 {
            return Err(PhenoError::EmptyGroup(idx + 1));
        }
        if count > size {
            return Err(PhenoError::InvalidTable(format!(
                "{term}: {count} patients in group {} of size {size}",
                idx + 1
            )));
        }
        observed.push(*count);
        observed.push(size - count);
    }

    // an empty column has an expected count of 0 in every cell
    let with: u64 = counts.iter().sum();
    let without: u64 = group_sizes.iter().sum::<u64>() - with;
    if with == 0 || without == 0 {
        return Ok(None);
    }

    let table = ContingencyTable::new(Matrix::new(counts.len(), 2, observed)?)?;
    if table.min_expected() < MIN_EXPECTED_COUNT {
        return Ok(None);
    }
    Ok(Some(TermChiSquared::new(
        term,
        table.statistic(),
        table.p_value()?,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significant_difference() {
        let result = test_term(1250u32.into(), &[18, 10, 2], &[20, 20, 20])
            .unwrap()
            .unwrap();
        assert_eq!(result.term(), &TermId::from(1250u32));
        assert!((result.chi_square() - 25.6).abs() < 1e-9);
        assert!((result.p_value() - (-12.8f64).exp()).abs() < 1e-12);
        assert!(result.corrected_p_value().is_none());
    }

    #[test]
    fn expected_exactly_at_threshold() {
        let result = test_term(1250u32.into(), &[5, 5, 5], &[20, 20, 20])
            .unwrap()
            .unwrap();
        assert!(result.chi_square().abs() < 1e-12);
        assert!((result.p_value() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn expected_below_threshold() {
        assert!(test_term(1250u32.into(), &[4, 5, 5], &[20, 20, 20])
            .unwrap()
            .is_none());
    }

    #[test]
    fn term_in_every_patient() {
        assert!(test_term(1u32.into(), &[20, 20, 20], &[20, 20, 20])
            .unwrap()
            .is_none());
        assert!(test_term(1u32.into(), &[0, 0, 0], &[20, 20, 20])
            .unwrap()
            .is_none());
    }

    #[test]
    fn invalid_input() {
        assert!(matches!(
            test_term(1u32.into(), &[1, 2], &[20, 0]),
            Err(PhenoError::EmptyGroup(2))
        ));
        assert!(test_term(1u32.into(), &[21, 2], &[20, 20]).is_err());
        assert!(test_term(1u32.into(), &[1, 2], &[20, 20, 20]).is_err());
    }

    #[test]
    fn bonferroni_saturates() {
        assert!((bonferroni(0.01, 3) - 0.03).abs() < 1e-12);
        assert_eq!(bonferroni(0.5, 2), 1.0);
        assert_eq!(bonferroni(0.6, 2), 1.0);
        assert_eq!(bonferroni(1.0, 1), 1.0);
    }

    #[test]
    fn correct_p_value() {
        let mut result = TermChiSquared::new(1u32.into(), 10.0, 0.02);
        result.correct_p_value(10);
        assert_eq!(result.corrected_p_value(), Some(0.2));
        result.correct_p_value(100);
        assert_eq!(result.corrected_p_value(), Some(1.0));
    }

    #[test]
    fn ordering() {
        let mut results = vec![
            TermChiSquared::new(1252u32.into(), 3.0, 0.2),
            TermChiSquared::new(1250u32.into(), 3.0, 0.2),
            TermChiSquared::new(118u32.into(), 9.0, 0.01),
            TermChiSquared::new(707u32.into(), 1.0, 0.5),
        ];

        results.sort_by(TermChiSquared::ascending);
        let terms: Vec<&str> = results.iter().map(|r| r.term().as_str()).collect();
        assert_eq!(terms, ["HP:0000707", "HP:0001250", "HP:0001252", "HP:0000118"]);

        results.sort_by(TermChiSquared::most_significant_first);
        let terms: Vec<&str> = results.iter().map(|r| r.term().as_str()).collect();
        assert_eq!(terms, ["HP:0000118", "HP:0001250", "HP:0001252", "HP:0000707"]);
    }
}
