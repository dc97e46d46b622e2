use std::{fmt, sync::Arc};

use polars::{
    frame::DataFrame,
    prelude::{DataType, Field, PlSmallStr, Schema, SchemaRef, SortMultipleOptions, col},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    error::{DataError, TradesheetResult},
    report::{
        enriched::{EnrichedCol, EnrichedTrades},
        io::{Report, ReportName, ToSchema},
        polars_ext::{ExprExt, polars_to_tradesheet_error},
    },
};

/// The only action counted as a long position. Anything else, including an
/// unknown or missing label, counts as short.
pub const LONG_ACTION: &str = "BUY";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    PartialOrd,
    Ord,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum LongShortCol {
    Company,
    /// Number of `BUY` trades of the company.
    LongCount,
    /// Number of non-`BUY` trades of the company.
    ShortCount,
}

impl From<LongShortCol> for PlSmallStr {
    fn from(value: LongShortCol) -> Self {
        value.as_str().into()
    }
}

impl LongShortCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// One ranked row of a [`LongShortRanking`] report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LongShortRow {
    pub company: String,
    pub long_count: u32,
    pub short_count: u32,
}

/// Companies with more long than short trades, ranked by long count.
///
/// Every row satisfies `short_count < long_count`.
#[derive(Debug, Clone)]
pub struct LongShortRanking {
    df: DataFrame,
}

impl Report for LongShortRanking {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl ReportName for LongShortRanking {
    fn base_name(&self) -> String {
        "long_short_ranking".to_string()
    }
}

impl Default for LongShortRanking {
    fn default() -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::to_schema()),
        }
    }
}

impl ToSchema for LongShortRanking {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = LongShortCol::iter()
            .map(|col| {
                let dtype = match col {
                    LongShortCol::Company => DataType::String,
                    LongShortCol::LongCount | LongShortCol::ShortCount => DataType::UInt32,
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl fmt::Display for LongShortRanking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.df)
    }
}

impl LongShortRanking {
    /// The ranking as typed rows, in report order.
    pub fn rows(&self) -> TradesheetResult<Vec<LongShortRow>> {
        let companies = self
            .df
            .column(LongShortCol::Company.as_str())
            .and_then(|c| c.str())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;
        let longs = self
            .df
            .column(LongShortCol::LongCount.as_str())
            .and_then(|c| c.u32())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;
        let shorts = self
            .df
            .column(LongShortCol::ShortCount.as_str())
            .and_then(|c| c.u32())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;

        Ok(companies
            .into_iter()
            .zip(longs)
            .zip(shorts)
            .filter_map(|((company, long_count), short_count)| {
                Some(LongShortRow {
                    company: company?.to_string(),
                    long_count: long_count.unwrap_or(0),
                    short_count: short_count.unwrap_or(0),
                })
            })
            .collect())
    }

    /// Counts long and short trades per company, keeps companies that are net
    /// long, sorts by long count descending and keeps the first `top_n`.
    ///
    /// A company with no short trades has a short count of `0`, not null.
    pub(crate) fn compute(trades: &EnrichedTrades, top_n: usize) -> TradesheetResult<Self> {
        if trades.is_empty() || top_n == 0 {
            return Ok(Self::default());
        }

        let is_long = col(EnrichedCol::Action).eq_str_or_false(LONG_ACTION);

        let df = trades
            .lazy()
            .filter(col(EnrichedCol::Company).is_not_null())
            .group_by_stable([col(EnrichedCol::Company)])
            .agg([
                is_long
                    .clone()
                    .sum()
                    .cast(DataType::UInt32)
                    .alias(LongShortCol::LongCount),
                is_long
                    .not()
                    .sum()
                    .cast(DataType::UInt32)
                    .alias(LongShortCol::ShortCount),
            ])
            .filter(col(LongShortCol::ShortCount).lt(col(LongShortCol::LongCount)))
            .sort(
                [LongShortCol::LongCount.as_str()],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .collect()
            .map_err(|e| polars_to_tradesheet_error("long/short ranking", e))?
            .head(Some(top_n));

        Ok(Self { df })
    }
}
