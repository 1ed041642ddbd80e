use crate::error::{Error, Result};
use crate::math::vector::dot;

/// Row-major dense matrix. A layer's weights are stored as
/// `neuron_count × input_count`, so row `i` holds the incoming weights of
/// neuron `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Builds a matrix from explicit rows. Every row must have the same
    /// length; an empty row list yields a `0 × 0` matrix.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Result<Matrix> {
        let rows = data.len();
        let cols = data.first().map_or(0, Vec::len);
        if let Some(bad) = data.iter().find(|row| row.len() != cols) {
            return Err(Error::mismatch("matrix row length", cols, bad.len()));
        }
        Ok(Matrix { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        self.data.get(row).map(Vec::as_slice)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.iter().map(Vec::as_slice)
    }

    /// Consumes the matrix, returning its rows.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.data
    }

    pub(crate) fn rows_mut(&mut self) -> impl Iterator<Item = &mut Vec<f64>> {
        self.data.iter_mut()
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Multiplies every element by `scalar` in place.
    pub fn scale_in_place(&mut self, scalar: f64) {
        for row in &mut self.data {
            for x in row.iter_mut() {
                *x *= scalar;
            }
        }
    }

    pub fn fill(&mut self, value: f64) {
        for row in &mut self.data {
            row.iter_mut().for_each(|x| *x = value);
        }
    }

    fn check_same_shape(&self, rhs: &Matrix, context: &'static str) -> Result<()> {
        if self.rows != rhs.rows {
            return Err(Error::mismatch(context, self.rows, rhs.rows));
        }
        if self.cols != rhs.cols {
            return Err(Error::mismatch(context, self.cols, rhs.cols));
        }
        Ok(())
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix> {
        self.check_same_shape(rhs, "matrix add")?;
        Ok(self.zip_with(rhs, |a, b| a + b))
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix> {
        self.check_same_shape(rhs, "matrix sub")?;
        Ok(self.zip_with(rhs, |a, b| a - b))
    }

    /// `self += rhs`. The shape is checked before any element changes.
    pub fn add_assign(&mut self, rhs: &Matrix) -> Result<()> {
        self.check_same_shape(rhs, "matrix add")?;
        for (row, rhs_row) in self.data.iter_mut().zip(&rhs.data) {
            for (x, y) in row.iter_mut().zip(rhs_row) {
                *x += y;
            }
        }
        Ok(())
    }

    fn zip_with<F>(&self, rhs: &Matrix, f: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
                .collect(),
        }
    }

    /// `matrix × vector`: element `i` is `dot(row_i, vector)`.
    pub fn mat_vec(&self, vector: &[f64]) -> Result<Vec<f64>> {
        if self.cols != vector.len() {
            return Err(Error::mismatch("matrix × vector", self.cols, vector.len()));
        }
        self.data.iter().map(|row| dot(row, vector)).collect()
    }

    /// `vectorᵀ × matrix`, treating `vector` as a row vector.
    /// The result has one element per matrix column.
    pub fn vec_mat(vector: &[f64], matrix: &Matrix) -> Result<Vec<f64>> {
        if vector.len() != matrix.rows {
            return Err(Error::mismatch("vector × matrix", matrix.rows, vector.len()));
        }
        let mut product = vec![0.0; matrix.cols];
        for (v, row) in vector.iter().zip(&matrix.data) {
            for (p, w) in product.iter_mut().zip(row) {
                *p += v * w;
            }
        }
        Ok(product)
    }

    /// Outer product `col × rowᵀ`, shape `col.len() × row.len()`.
    pub fn outer(col: &[f64], row: &[f64]) -> Matrix {
        Matrix {
            rows: col.len(),
            cols: row.len(),
            data: col
                .iter()
                .map(|&c| row.iter().map(|&r| c * r).collect())
                .collect(),
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}
