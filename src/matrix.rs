use std::ops::{Add, Mul, Sub};

use crate::errors::{LayoutError, Result};

/// Element types a [`Matrix`] can hold.
pub trait Numeric:
    Copy + Default + PartialEq + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self>
{
}

impl<T> Numeric for T where
    T: Copy + Default + PartialEq + Add<Output = T> + Sub<Output = T> + Mul<Output = T>
{
}

/// Dense, immutable, rectangular matrix. Every operation returns a new matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T = f64> {
    rows: Vec<Vec<T>>,
    number_of_rows: usize,
    number_of_columns: usize,
}

impl<T: Numeric> Matrix<T> {
    pub fn new(rows: Vec<Vec<T>>) -> Result<Self> {
        let number_of_rows = rows.len();
        if number_of_rows == 0 {
            return Err(LayoutError::StructuralRange(
                "matrix must have at least one row".into(),
            ));
        }
        let number_of_columns = rows[0].len();
        if number_of_columns == 0 {
            return Err(LayoutError::StructuralRange(
                "matrix must have at least one column".into(),
            ));
        }
        if let Some(idx) = rows.iter().position(|row| row.len() != number_of_columns) {
            return Err(LayoutError::StructuralRange(format!(
                "matrix row {idx} has {} columns, expected {number_of_columns}",
                rows[idx].len()
            )));
        }

        Ok(Self {
            rows,
            number_of_rows,
            number_of_columns,
        })
    }

    /// A matrix of `T::default()` (zero for the numeric types).
    pub fn zeros(number_of_rows: usize, number_of_columns: usize) -> Result<Self> {
        Self::new(vec![vec![T::default(); number_of_columns]; number_of_rows])
    }

    /// Single-column matrix.
    pub fn column_vector(values: Vec<T>) -> Result<Self> {
        Self::new(values.into_iter().map(|v| vec![v]).collect())
    }

    pub fn number_of_rows(&self) -> usize {
        self.number_of_rows
    }

    pub fn number_of_columns(&self) -> usize {
        self.number_of_columns
    }

    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    pub fn get_row(&self, i: usize) -> Result<&[T]> {
        self.rows.get(i).map(Vec::as_slice).ok_or_else(|| {
            LayoutError::StructuralRange(format!(
                "row {i} out of bounds for matrix with {} rows",
                self.number_of_rows
            ))
        })
    }

    pub fn get_column(&self, j: usize) -> Result<Vec<T>> {
        if j >= self.number_of_columns {
            return Err(LayoutError::StructuralRange(format!(
                "column {j} out of bounds for matrix with {} columns",
                self.number_of_columns
            )));
        }
        Ok(self.rows.iter().map(|row| row[j]).collect())
    }

    pub fn get_element_at_position(&self, i: usize, j: usize) -> Result<T> {
        let row = self.get_row(i)?;
        row.get(j).copied().ok_or_else(|| {
            LayoutError::StructuralRange(format!(
                "column {j} out of bounds for matrix with {} columns",
                self.number_of_columns
            ))
        })
    }

    pub fn add(&self, other: &Matrix<T>) -> Result<Self> {
        self.element_wise(other, "add", |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix<T>) -> Result<Self> {
        self.element_wise(other, "subtract", |a, b| a - b)
    }

    pub fn multiply(&self, other: &Matrix<T>) -> Result<Self> {
        if self.number_of_columns != other.number_of_rows {
            return Err(LayoutError::StructuralRange(format!(
                "cannot multiply {}x{} by {}x{}",
                self.number_of_rows,
                self.number_of_columns,
                other.number_of_rows,
                other.number_of_columns
            )));
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                (0..other.number_of_columns)
                    .map(|j| {
                        row.iter()
                            .zip(other.rows.iter())
                            .fold(T::default(), |acc, (&a, other_row)| acc + a * other_row[j])
                    })
                    .collect()
            })
            .collect();

        Self::new(rows)
    }

    pub fn transpose(&self) -> Self {
        let rows = (0..self.number_of_columns)
            .map(|j| self.rows.iter().map(|row| row[j]).collect())
            .collect();
        Self {
            rows,
            number_of_rows: self.number_of_columns,
            number_of_columns: self.number_of_rows,
        }
    }

    /// True when every element equals `T::default()`.
    pub fn is_zero(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.iter().all(|&v| v == T::default()))
    }

    fn element_wise(
        &self,
        other: &Matrix<T>,
        op_name: &str,
        op: impl Fn(T, T) -> T,
    ) -> Result<Self> {
        if self.number_of_rows != other.number_of_rows
            || self.number_of_columns != other.number_of_columns
        {
            return Err(LayoutError::StructuralRange(format!(
                "cannot {op_name} {}x{} and {}x{}",
                self.number_of_rows,
                self.number_of_columns,
                other.number_of_rows,
                other.number_of_columns
            )));
        }

        let rows = self
            .rows
            .iter()
            .zip(other.rows.iter())
            .map(|(a, b)| a.iter().zip(b.iter()).map(|(&x, &y)| op(x, y)).collect())
            .collect();

        Ok(Self {
            rows,
            number_of_rows: self.number_of_rows,
            number_of_columns: self.number_of_columns,
        })
    }
}
