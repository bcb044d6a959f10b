//! A dense, row-major matrix with row and column iterators
//!
//! `Matrix` backs both the contingency tables of the chi-squared test
//! and the patient similarity matrix.
//!
//! | Index |   0 |   1 |   2 |   3 |
//! |:----- | ---:| ---:| ---:| ---:|
//! | **0** |  11 |  12 |  13 |  14 |
//! | **1** |  21 |  22 |  23 |  24 |
//! | **2** |  31 |  32 |  33 |  34 |
//!
//! ```
//! use phenocompare::matrix::Matrix;
//! let data = vec![11, 12, 13, 14, 21, 22, 23, 24, 31, 32, 33, 34];
//! let m = Matrix::new(3, 4, data).unwrap();
//!
//! let row_sums: Vec<i32> = m.rows().map(|row| row.sum()).collect();
//! assert_eq!(row_sums, [50, 90, 130]);
//!
//! let col_sums: Vec<i32> = m.cols().map(|col| col.sum()).collect();
//! assert_eq!(col_sums, [63, 66, 69, 72]);
//! ```
use std::fmt::Debug;

use crate::{PhenoError, PhenoResult};

/// A dense matrix with `rows * cols` values stored row by row
#[derive(Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Creates a new Matrix from `data` with `rows` number of rows, `cols` number of columns
    ///
    /// # Errors
    ///
    /// [`PhenoError::InvalidTable`] if the length of `data` is not `rows * cols`
    pub fn new(rows: usize, cols: usize, data: Vec<T>) -> PhenoResult<Self> {
        if rows * cols != data.len() {
            return Err(PhenoError::InvalidTable(format!(
                "{rows} x {cols} matrix cannot hold {} values",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Returns the total number of values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the `Matrix` does not contain any data
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a Tuple with number of rows and number of columns
    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the value at `row` and `col`
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Replaces the value at `row` and `col`
    ///
    /// # Panics
    ///
    /// If `row` or `col` is out of bounds
    pub(crate) fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col] = value;
    }

    /// Iterates the rows of the matrix
    ///
    /// ```
    /// use phenocompare::matrix::Matrix;
    /// let m = Matrix::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
    ///
    /// let mut rows = m.rows();
    /// let row: Vec<&i32> = rows.next().unwrap().collect();
    /// assert_eq!(row, [&1, &2, &3]);
    /// assert_eq!(rows.next().unwrap().count(), 3);
    /// assert!(rows.next().is_none());
    /// ```
    pub fn rows(&self) -> Rows<'_, T> {
        Rows {
            // a matrix without columns has no rows to iterate
            inner: self.data.chunks(self.cols.max(1)),
        }
    }

    /// Iterates the columns of the matrix
    ///
    /// ```
    /// use phenocompare::matrix::Matrix;
    /// let m = Matrix::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
    ///
    /// let mut cols = m.cols();
    /// let col: Vec<&i32> = cols.next().unwrap().collect();
    /// assert_eq!(col, [&1, &4]);
    /// assert_eq!(cols.count(), 2);
    /// ```
    pub fn cols(&self) -> Columns<'_, T> {
        Columns {
            data: &self.data,
            cols: self.cols,
            idx: 0,
        }
    }
}

impl<T: Clone> Matrix<T> {
    /// Creates a `rows` x `cols` matrix with every value set to `value`
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }
}

impl<T: std::fmt::Display> Debug for Matrix<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let v: Vec<String> = row.map(|v| format!("{v}")).collect();
            writeln!(f, "[{}]", v.join(", "))?;
        }
        Ok(())
    }
}

/// Iterates the rows of a `Matrix`, returning an Iterator over individual row values
pub struct Rows<'a, T> {
    inner: std::slice::Chunks<'a, T>,
}

impl<'a, T> Iterator for Rows<'a, T> {
    type Item = std::slice::Iter<'a, T>;
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(<[T]>::iter)
    }
}

/// Iterates the columns of a `Matrix`, returning an Iterator over individual column values
pub struct Columns<'a, T> {
    data: &'a [T],
    cols: usize,
    idx: usize,
}

impl<'a, T> Iterator for Columns<'a, T> {
    type Item = std::iter::StepBy<std::slice::Iter<'a, T>>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.cols {
            return None;
        }
        let column = self.data.get(self.idx..).unwrap_or_default().iter().step_by(self.cols);
        self.idx += 1;
        Some(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_dimensions() {
        assert!(Matrix::new(2, 3, vec![1, 2, 3]).is_err());
        assert!(Matrix::<u8>::new(0, 0, vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_row_iterator_sums() {
        let m = Matrix::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let mut rows = m.rows();
        assert_eq!(rows.next().unwrap().sum::<i32>(), 6);
        assert_eq!(rows.next().unwrap().sum::<i32>(), 15);
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_col_iterator_sums() {
        let m = Matrix::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let sums: Vec<i32> = m.cols().map(|col| col.sum()).collect();
        assert_eq!(sums, [5, 7, 9]);
    }

    #[test]
    fn single_column() {
        let m = Matrix::new(3, 1, vec![1, 2, 3]).unwrap();
        assert_eq!(m.rows().count(), 3);
        let col: Vec<&i32> = m.cols().next().unwrap().collect();
        assert_eq!(col, [&1, &2, &3]);
    }

    #[test]
    fn empty_matrix_iterators() {
        let m = Matrix::<f64>::filled(0, 0, 0.0);
        assert_eq!(m.rows().count(), 0);
        assert_eq!(m.cols().count(), 0);
    }

    #[test]
    fn columns_without_rows() {
        let m = Matrix::<u64>::new(0, 3, vec![]).unwrap();
        assert_eq!(m.rows().count(), 0);
        let sums: Vec<u64> = m.cols().map(|col| col.sum()).collect();
        assert_eq!(sums, [0, 0, 0]);
    }

    #[test]
    fn get_and_set() {
        let mut m = Matrix::filled(2, 2, 0.0);
        m.set(1, 0, 0.5);
        assert_eq!(m.get(1, 0), Some(&0.5));
        assert_eq!(m.get(0, 1), Some(&0.0));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.get(0, 2), None);
        assert_eq!(m.dim(), (2, 2));
    }

    #[test]
    fn debug_output() {
        let m = Matrix::new(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(format!("{m:?}"), "[1, 2]\n[3, 4]\n");
    }
}
