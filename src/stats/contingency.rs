use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::matrix::Matrix;
use crate::stats::f64_from_u64;
use crate::{PhenoError, PhenoResult};

/// An `R x C` table of observed counts
///
/// Every row and every column of the table must contain at least one
/// observation, otherwise the expected counts are not defined.
///
/// # Examples
///
/// ```
/// use phenocompare::stats::ContingencyTable;
///
/// let table = ContingencyTable::from_rows(&[
///     [7u64, 87, 12, 9],
///     [1, 18, 3, 1],
///     [3, 84, 4, 7],
/// ]).unwrap();
///
/// assert_eq!(table.degrees_of_freedom(), 6);
/// assert!((table.statistic() - 5.488545890584).abs() < 1e-9);
/// assert!((table.p_value().unwrap() - 0.482842169465).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct ContingencyTable {
    observed: Matrix<u64>,
    row_totals: Vec<u64>,
    col_totals: Vec<u64>,
    total: u64,
}

impl ContingencyTable {
    /// Constructs a new table from a matrix of observed counts
    ///
    /// # Errors
    ///
    /// [`PhenoError::InvalidTable`] if the table has fewer than 2 rows or
    /// columns or if one row or column does not contain any observation
    pub fn new(observed: Matrix<u64>) -> PhenoResult<Self> {
        let (rows, cols) = observed.dim();
        if rows < 2 || cols < 2 {
            return Err(PhenoError::InvalidTable(format!(
                "a {rows} x {cols} table needs at least 2 rows and 2 columns"
            )));
        }

        let row_totals: Vec<u64> = observed.rows().map(|row| row.sum()).collect();
        let col_totals: Vec<u64> = observed.cols().map(|col| col.sum()).collect();

        if let Some(idx) = row_totals.iter().position(|total| *total == 0) {
            return Err(PhenoError::InvalidTable(format!("row {idx} is empty")));
        }
        if let Some(idx) = col_totals.iter().position(|total| *total == 0) {
            return Err(PhenoError::InvalidTable(format!("column {idx} is empty")));
        }

        let total = row_totals.iter().sum();
        Ok(Self {
            observed,
            row_totals,
            col_totals,
            total,
        })
    }

    /// Constructs a new table from rows of observed counts
    ///
    /// # Errors
    ///
    /// [`PhenoError::InvalidTable`] if the rows have different lengths
    /// and for all reasons listed in [`ContingencyTable::new`]
    pub fn from_rows<R: AsRef<[u64]>>(rows: &[R]) -> PhenoResult<Self> {
        let cols = rows.first().map_or(0, |row| row.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(PhenoError::InvalidTable(format!(
                    "rows with {} and {} columns",
                    cols,
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Self::new(Matrix::new(rows.len(), cols, data)?)
    }

    /// Returns a Tuple with number of rows and number of columns
    pub fn dim(&self) -> (usize, usize) {
        self.observed.dim()
    }

    /// The observed count at `row` and `col`
    pub fn observed(&self, row: usize, col: usize) -> Option<u64> {
        self.observed.get(row, col).copied()
    }

    /// The sum of all counts of a row
    pub fn row_total(&self, row: usize) -> u64 {
        self.row_totals[row]
    }

    /// The sum of all counts of a column
    pub fn col_total(&self, col: usize) -> u64 {
        self.col_totals[col]
    }

    /// The sum of all counts
    pub fn grand_total(&self) -> u64 {
        self.total
    }

    /// The count expected at `row` and `col` if rows and columns are independent
    ///
    /// # Panics
    ///
    /// If `row` or `col` is out of bounds
    pub fn expected(&self, row: usize, col: usize) -> f64 {
        f64_from_u64(self.row_totals[row]) * f64_from_u64(self.col_totals[col])
            / f64_from_u64(self.total)
    }

    /// The smallest expected count of all cells
    ///
    /// It is always found in the cell of the smallest row and the smallest column.
    pub fn min_expected(&self) -> f64 {
        let min_row = self.row_totals.iter().min().copied().unwrap_or_default();
        let min_col = self.col_totals.iter().min().copied().unwrap_or_default();
        f64_from_u64(min_row) * f64_from_u64(min_col) / f64_from_u64(self.total)
    }

    /// Pearson's chi-squared statistic
    pub fn statistic(&self) -> f64 {
        let mut statistic = 0.0;
        for (row, observed_row) in self.observed.rows().enumerate() {
            for (col, observed) in observed_row.enumerate() {
                let expected = self.expected(row, col);
                let diff = f64_from_u64(*observed) - expected;
                statistic += diff * diff / expected;
            }
        }
        statistic
    }

    /// Degrees of freedom: `(rows - 1) * (cols - 1)`
    pub fn degrees_of_freedom(&self) -> u64 {
        let (rows, cols) = self.observed.dim();
        ((rows - 1) * (cols - 1)) as u64
    }

    /// Probability to observe a statistic at least this large by chance
    ///
    /// # Errors
    ///
    /// [`PhenoError::InvalidTable`] if the chi-squared distribution
    /// cannot be created
    pub fn p_value(&self) -> PhenoResult<f64> {
        let dist = ChiSquared::new(f64_from_u64(self.degrees_of_freedom()))
            .map_err(|err| PhenoError::InvalidTable(err.to_string()))?;
        Ok(dist.sf(self.statistic()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn three_by_four() {
        let table =
            ContingencyTable::from_rows(&[[7u64, 87, 12, 9], [1, 18, 3, 1], [3, 84, 4, 7]]).unwrap();
        assert_eq!(table.dim(), (3, 4));
        assert_eq!(table.grand_total(), 236);
        assert_eq!(table.row_total(0), 115);
        assert_eq!(table.col_total(1), 189);
        assert_eq!(table.degrees_of_freedom(), 6);
        assert!((table.statistic() - 5.488_545_890_584).abs() < EPSILON);
        assert!((table.p_value().unwrap() - 0.482_842_169_465).abs() < EPSILON);
    }

    #[test]
    fn expected_counts() {
        let table = ContingencyTable::from_rows(&[[10u64, 10], [30, 10]]).unwrap();
        // row totals 20, 40; column totals 40, 20; grand total 60
        assert!((table.expected(0, 0) - 40.0 / 3.0).abs() < EPSILON);
        assert!((table.expected(1, 1) - 40.0 / 3.0).abs() < EPSILON);
        assert!((table.expected(0, 1) - 20.0 / 3.0).abs() < EPSILON);
        assert!((table.min_expected() - 20.0 / 3.0).abs() < EPSILON);
        assert_eq!(table.observed(1, 0), Some(30));
    }

    #[test]
    fn independent_table() {
        let table = ContingencyTable::from_rows(&[[5u64, 5], [5, 5], [5, 5]]).unwrap();
        assert!(table.statistic().abs() < EPSILON);
        assert!((table.p_value().unwrap() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn two_by_two() {
        // 18 of 20 vs 2 of 20
        let table = ContingencyTable::from_rows(&[[18u64, 2], [2, 18]]).unwrap();
        assert!((table.statistic() - 25.6).abs() < EPSILON);
        assert_eq!(table.degrees_of_freedom(), 1);
        assert!(table.p_value().unwrap() < 1e-5);
    }

    #[test]
    fn invalid_tables() {
        assert!(ContingencyTable::from_rows(&[[1u64, 2]]).is_err());
        assert!(ContingencyTable::from_rows(&[[1u64], [2]]).is_err());
        assert!(ContingencyTable::from_rows(&[[0u64, 0], [1, 2]]).is_err());
        assert!(ContingencyTable::from_rows(&[[0u64, 1], [0, 2]]).is_err());
        assert!(ContingencyTable::from_rows(&[vec![1u64, 2], vec![1, 2, 3]]).is_err());
        assert!(ContingencyTable::from_rows::<[u64; 2]>(&[]).is_err());
    }
}
