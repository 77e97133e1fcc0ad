//! Dense matrix conversion target
//!
//! Row-major dense representation produced by `SparseMatrix::to_dense`.
//! Nothing converts back from it.

use std::fmt;

/// Dense matrix in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    /// Create a matrix from a flat vector (row-major order)
    pub fn from_flat(data: Vec<T>, rows: usize, cols: usize) -> Self {
        assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Get matrix dimensions
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Access element at (i, j)
    pub fn get(&self, i: usize, j: usize) -> &T {
        &self.data[i * self.cols + j]
    }

    /// Get underlying data as slice
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get a row as a slice
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Rows as owned vectors
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }
}

impl<T: fmt::Display + Clone> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            write!(f, "[")?;
            for (j, x) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", x)?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_access() {
        let m = Matrix::from_flat((0..6).collect::<Vec<i64>>(), 2, 3);

        assert_eq!(m.dims(), (2, 3));
        assert_eq!(m.get(0, 0), &0);
        assert_eq!(m.get(0, 2), &2);
        assert_eq!(m.get(1, 0), &3);
        assert_eq!(m.row(1), &[3, 4, 5]);
    }

    #[test]
    fn test_display() {
        let m = Matrix::from_flat(vec![1, 0, -2, 5], 2, 2);
        assert_eq!(m.to_string(), "[1 0]\n[-2 5]\n");
    }
}
