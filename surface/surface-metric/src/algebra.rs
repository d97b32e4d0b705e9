//! Column algebra: element-wise binary and unary operations.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MetricError, MetricResult};
use crate::table::{MetricTable, Modified, OutputColumn};

/// Element-wise operation on two columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`, with 0 wherever `b` is 0.
    Divide,
    /// `(a + b) / 2`
    Average,
}

impl BinaryOp {
    /// Apply to one pair of values.
    #[inline]
    #[must_use]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => {
                if b == 0.0 {
                    0.0
                } else {
                    a / b
                }
            }
            Self::Average => (a + b) * 0.5,
        }
    }

    fn comment(self, a: &str, b: &str) -> String {
        match self {
            Self::Add => format!("Added columns {a} and {b}"),
            Self::Subtract => format!("Subtracted columns {a} minus {b}"),
            Self::Multiply => format!("Multiplied columns {a} times {b}"),
            Self::Divide => format!("Divided columns {a} divided by {b}"),
            Self::Average => format!("Average columns {a} averaged with {b}"),
        }
    }
}

/// Element-wise operation on one column, some with a scalar operand.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnaryOp {
    /// `v + k`
    Add(f32),
    /// `v * k`
    Multiply(f32),
    /// `min(v, k)`: values above `k` are capped.
    Ceiling(f32),
    /// `max(v, k)`: values below `k` are raised.
    Floor(f32),
    /// `|v|`
    Abs,
    /// `sqrt(v)`, with negative values clamped to 0.
    Sqrt,
    /// `1 - v`
    OneMinus,
    /// `log_k(v)`; non-positive values are left unchanged.
    LogBase(f32),
    /// Replace NaN and infinities with 0.
    FixNan,
}

impl UnaryOp {
    /// Apply to one value.
    #[inline]
    #[must_use]
    pub fn apply(self, v: f32) -> f32 {
        match self {
            Self::Add(k) => v + k,
            Self::Multiply(k) => v * k,
            Self::Ceiling(k) => {
                if v > k {
                    k
                } else {
                    v
                }
            }
            Self::Floor(k) => {
                if v < k {
                    k
                } else {
                    v
                }
            }
            Self::Abs => v.abs(),
            Self::Sqrt => {
                if v > 0.0 {
                    v.sqrt()
                } else {
                    0.0
                }
            }
            Self::OneMinus => 1.0 - v,
            Self::LogBase(base) => {
                if v > 0.0 {
                    v.ln() / base.ln()
                } else {
                    v
                }
            }
            Self::FixNan => {
                if v.is_finite() {
                    v
                } else {
                    0.0
                }
            }
        }
    }

    fn validate(self) -> MetricResult<()> {
        match self {
            Self::LogBase(base)
                if base <= 0.0 || (base - 1.0).abs() < f32::EPSILON || !base.is_finite() =>
            {
                Err(MetricError::invalid_input(format!(
                    "invalid logarithm base {base}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn comment(self, name: &str) -> String {
        match self {
            Self::Add(k) => format!("Added {k} to column {name}"),
            Self::Multiply(k) => format!("Multiplied column {name} by {k}"),
            Self::Ceiling(k) => format!("Ceiling of {k} applied to column {name}"),
            Self::Floor(k) => format!("Floor of {k} applied to column {name}"),
            Self::Abs => format!("Absolute value of column {name}"),
            Self::Sqrt => format!("Square root of column {name}"),
            Self::OneMinus => format!("One minus column {name}"),
            Self::LogBase(k) => format!("Log base {k} of column {name}"),
            Self::FixNan => format!("Non-finite values replaced with zero in column {name}"),
        }
    }
}

impl MetricTable {
    /// Combine columns `a` and `b` element-wise into `output`.
    ///
    /// The output column is named `name` and its comment records the
    /// operation. `output` may be `a` or `b`.
    ///
    /// # Errors
    ///
    /// [`MetricError::ColumnOutOfRange`] for any bad column.
    pub fn binary_op(
        &mut self,
        op: BinaryOp,
        a: usize,
        b: usize,
        output: OutputColumn,
        name: &str,
    ) -> MetricResult<Modified> {
        let lhs = self.column_values(a)?;
        let rhs = self.column_values(b)?;
        let values: Vec<f32> = lhs
            .iter()
            .zip(rhs)
            .map(|(&x, &y)| op.apply(x, y))
            .collect();
        let comment = op.comment(&self.columns()[a].name, &self.columns()[b].name);

        let index = self.prepare_output(output, name)?;
        let column = self.column_mut(index)?;
        column.replace_values(values);
        column.comment = comment;
        Ok(Modified {
            first_column: index,
            column_count: 1,
        })
    }

    /// Apply a unary operation to column `column`, writing into `output`.
    ///
    /// # Errors
    ///
    /// - [`MetricError::ColumnOutOfRange`] for a bad column
    /// - [`MetricError::InvalidInput`] for a logarithm base that is not
    ///   positive or equals 1
    pub fn unary_op(
        &mut self,
        op: UnaryOp,
        column: usize,
        output: OutputColumn,
        name: &str,
    ) -> MetricResult<Modified> {
        op.validate()?;
        let values: Vec<f32> = self
            .column_values(column)?
            .iter()
            .map(|&v| op.apply(v))
            .collect();
        let comment = op.comment(&self.columns()[column].name);

        let index = self.prepare_output(output, name)?;
        let target = self.column_mut(index)?;
        target.replace_values(values);
        target.append_comment(&comment);
        Ok(Modified {
            first_column: index,
            column_count: 1,
        })
    }
}
