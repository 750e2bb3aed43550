//! Table layouts and the fixed-point rules for money columns.
//!
//! Every entity type persists to exactly one table keyed by an auto-incrementing
//! integer `Id`. Money columns are `decimal(18,2)`; [`DecimalSpec::fit`] is the
//! single place where a value is rounded to the column's scale.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::store::ValidationError;

/// `decimal(18,2)`, used for `Price` and `TotalPrice`.
pub const MONEY: DecimalSpec = DecimalSpec {
    precision: 18,
    scale: 2,
};

/// Precision/scale pair of a SQL `decimal(p,s)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub precision: u32,
    pub scale: u32,
}

impl DecimalSpec {
    /// Number of digits allowed left of the decimal point.
    pub fn integer_digits(&self) -> u32 {
        self.precision - self.scale
    }

    /// Fits `value` to this column: rounds once to `scale` digits (midpoint away
    /// from zero, as SQL decimal columns do) and rejects values whose integer
    /// part has more than `precision - scale` digits.
    pub fn fit(&self, field: &'static str, value: Decimal) -> Result<Decimal, ValidationError> {
        let mut fitted =
            value.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointAwayFromZero);
        fitted.rescale(self.scale);

        let limit = Decimal::from_i128_with_scale(10_i128.pow(self.integer_digits()), 0);
        if fitted.abs() >= limit || fitted.scale() != self.scale {
            return Err(ValidationError::Overflow {
                field,
                value,
                precision: self.precision,
                scale: self.scale,
            });
        }
        Ok(fitted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// `int`, auto-incremented when it is the primary key.
    Int,
    Text,
    Decimal(DecimalSpec),
    Timestamp,
}

impl ColumnType {
    fn sql(&self) -> String {
        match self {
            ColumnType::Int => "int".to_string(),
            ColumnType::Text => "nvarchar(max)".to_string(),
            ColumnType::Decimal(d) => format!("decimal({},{})", d.precision, d.scale),
            ColumnType::Timestamp => "datetime2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub primary_key: bool,
}

impl Column {
    pub const fn key(name: &'static str) -> Self {
        Self {
            name,
            ty: ColumnType::Int,
            primary_key: true,
        }
    }

    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            primary_key: false,
        }
    }
}

/// Layout of one entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl TableSchema {
    /// DDL handed to the external migration step. No foreign keys are emitted.
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                let mut line = format!("    [{}] {} NOT NULL", column.name, column.ty.sql());
                if column.primary_key {
                    line.push_str(" IDENTITY(1,1)");
                }
                line
            })
            .collect();
        let keys: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| format!("[{}]", c.name))
            .collect();

        format!(
            "CREATE TABLE [{}] (\n{},\n    CONSTRAINT [PK_{}] PRIMARY KEY ({})\n);",
            self.name,
            columns.join(",\n"),
            self.name,
            keys.join(", ")
        )
    }
}
