use std::sync::Arc;

use polars::{
    frame::DataFrame,
    prelude::{DataType, Field, Schema, SchemaRef},
};
use strum::IntoEnumIterator;

use crate::{
    data::schema::{MarkCol, TradeCol},
    error::{DataError, TradesheetResult},
    report::io::{Report, ToSchema},
};

/// The mark (reference market value) table: one row per instrument type.
///
/// Instrument types are expected to be unique but this is not enforced; a
/// duplicated type fans out every trade joined against it.
#[derive(Debug, Clone)]
pub struct MarkTable {
    df: DataFrame,
}

/// All trading-activity rows of a folder, concatenated file by file.
#[derive(Debug, Clone)]
pub struct TradeTable {
    df: DataFrame,
}

impl MarkTable {
    pub fn new(df: DataFrame) -> TradesheetResult<Self> {
        ensure_schema(&df, &Self::to_schema())?;
        Ok(Self { df })
    }

    pub fn into_inner(self) -> DataFrame {
        self.df
    }
}

impl TradeTable {
    pub fn new(df: DataFrame) -> TradesheetResult<Self> {
        ensure_schema(&df, &Self::to_schema())?;
        Ok(Self { df })
    }

    pub fn into_inner(self) -> DataFrame {
        self.df
    }
}

impl Default for MarkTable {
    fn default() -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::to_schema()),
        }
    }
}

impl Default for TradeTable {
    fn default() -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::to_schema()),
        }
    }
}

impl Report for MarkTable {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl Report for TradeTable {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

/// Raw schema as read from disk: every field is text, coercion happens after the join.
impl ToSchema for MarkTable {
    fn to_schema() -> SchemaRef {
        let fields = MarkCol::iter().map(|col| Field::new(col.into(), DataType::String));
        Arc::new(Schema::from_iter(fields))
    }
}

/// Raw schema as read from disk: every field is text, coercion happens after the join.
impl ToSchema for TradeTable {
    fn to_schema() -> SchemaRef {
        let fields = TradeCol::iter().map(|col| Field::new(col.into(), DataType::String));
        Arc::new(Schema::from_iter(fields))
    }
}

/// Checks that every column of `expected` exists in `df` with the expected dtype.
pub(crate) fn ensure_schema(df: &DataFrame, expected: &Schema) -> TradesheetResult<()> {
    let current = df.schema();
    for (name, expected_dtype) in expected.iter() {
        let actual_dtype = current
            .get(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))?;
        if actual_dtype != expected_dtype {
            return Err(DataError::SchemaMismatch {
                column: name.to_string(),
                expected: expected_dtype.to_string(),
                found: actual_dtype.to_string(),
            }
            .into());
        }
    }
    Ok(())
}
