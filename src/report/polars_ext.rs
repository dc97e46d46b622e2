use polars::prelude::{DataFrame, DataType, Expr, JsonFormat, JsonWriter, NULL, SerWriter, lit};
use serde_json::Value;

use crate::error::{DataError, IoError, TradesheetError, TradesheetResult};

pub(crate) fn polars_to_tradesheet_error(
    report: &str,
    e: polars::error::PolarsError,
) -> TradesheetError {
    TradesheetError::Data(DataError::DataFrame(format!(
        "Error while building {report}: {e}"
    )))
}

pub trait ExprExt {
    /// Coerces a text column to `Float64`.
    ///
    /// Values that do not parse as a number become null instead of failing the
    /// whole frame, and so does `NaN` text. Downstream `sum` aggregations skip
    /// these nulls, so a malformed row contributes nothing to a total but stays
    /// in the table.
    fn parse_or_null(self) -> Expr;

    /// Exact, case-sensitive string equality that maps null input to `false`.
    fn eq_str_or_false(self, value: &str) -> Expr;
}

impl ExprExt for Expr {
    fn parse_or_null(self) -> Expr {
        self.cast(DataType::Float64)
            .fill_nan(lit(NULL))
            .cast(DataType::Float64)
    }

    fn eq_str_or_false(self, value: &str) -> Expr {
        self.eq(lit(value)).fill_null(lit(false))
    }
}

pub trait DataFrameExt {
    fn to_json_rows(&self) -> TradesheetResult<Vec<serde_json::Map<String, Value>>>;
}

impl DataFrameExt for DataFrame {
    fn to_json_rows(&self) -> TradesheetResult<Vec<serde_json::Map<String, Value>>> {
        if self.height() == 0 {
            return Ok(Vec::new());
        }

        let mut buf = Vec::new();
        JsonWriter::new(&mut buf)
            .with_json_format(JsonFormat::Json)
            .finish(&mut self.clone())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;

        let json: Value = serde_json::from_slice(&buf).map_err(IoError::Json)?;
        let Value::Array(rows) = json else {
            let msg = "report JSON is not an array of rows".to_string();
            return Err(DataError::DataFrame(msg).into());
        };

        Ok(rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect())
    }
}
