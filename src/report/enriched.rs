use std::sync::Arc;

use polars::{
    frame::DataFrame,
    prelude::{
        DataType, Field, IntoLazy, JoinArgs, JoinType, LazyFrame, MaintainOrderJoin, PlSmallStr,
        Schema, SchemaRef, col,
    },
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{
    data::{
        schema::{MarkCol, TradeCol},
        table::{MarkTable, TradeTable, ensure_schema},
    },
    error::TradesheetResult,
    report::{
        io::{Report, ReportName, ToSchema},
        long_short::LongShortRanking,
        polars_ext::{ExprExt, polars_to_tradesheet_error},
        top_companies::{Metric, TopCompanies},
    },
};

/// Columns of a trade row enriched with the mark value of its instrument type.
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
pub enum EnrichedCol {
    Date,
    Company,
    #[strum(to_string = "type")]
    InstrumentType,
    Action,
    /// Coerced to `Float64`, null when the text was not numeric.
    Quantity,
    /// Coerced to `Float64`, null when the text was not numeric.
    Price,
    /// Coerced to `Float64`, null when the text was not numeric.
    MarketValue,
}

impl From<EnrichedCol> for PlSmallStr {
    fn from(value: EnrichedCol) -> Self {
        value.as_str().into()
    }
}

impl EnrichedCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Trades inner-joined with the mark table on instrument type.
///
/// Trades whose type has no mark, and marks no trade refers to, are dropped
/// silently. Row order follows the trade table.
#[derive(Debug, Clone)]
pub struct EnrichedTrades {
    df: DataFrame,
}

impl Report for EnrichedTrades {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl ReportName for EnrichedTrades {
    fn base_name(&self) -> String {
        "enriched_trades".to_string()
    }
}

impl Default for EnrichedTrades {
    fn default() -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::to_schema()),
        }
    }
}

impl ToSchema for EnrichedTrades {
    fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = EnrichedCol::iter()
            .map(|col| {
                let dtype = match col {
                    EnrichedCol::Date
                    | EnrichedCol::Company
                    | EnrichedCol::InstrumentType
                    | EnrichedCol::Action => DataType::String,

                    EnrichedCol::Quantity | EnrichedCol::Price | EnrichedCol::MarketValue => {
                        DataType::Float64
                    }
                };
                Field::new(col.into(), dtype)
            })
            .collect();

        Arc::new(Schema::from_iter(fields))
    }
}

impl EnrichedTrades {
    /// Inner-joins `trades` with `marks` and coerces the numeric columns.
    pub fn join(trades: TradeTable, marks: MarkTable) -> TradesheetResult<Self> {
        let joined = trades
            .into_inner()
            .lazy()
            .join(
                marks.into_inner().lazy(),
                [col(TradeCol::InstrumentType)],
                [col(MarkCol::InstrumentType)],
                JoinArgs {
                    maintain_order: MaintainOrderJoin::Left,
                    ..JoinArgs::new(JoinType::Inner)
                },
            )
            .with_columns([
                col(EnrichedCol::Quantity).parse_or_null(),
                col(EnrichedCol::Price).parse_or_null(),
                col(EnrichedCol::MarketValue).parse_or_null(),
            ])
            .select(EnrichedCol::iter().map(col).collect::<Vec<_>>())
            .collect()
            .map_err(|e| polars_to_tradesheet_error("enriched trades", e))?;

        ensure_schema(&joined, &Self::to_schema())?;
        Ok(Self { df: joined })
    }

    pub fn top_by_metric(&self, metric: Metric, top_n: usize) -> TradesheetResult<TopCompanies> {
        TopCompanies::compute(self, metric, top_n)
    }

    pub fn long_short_ranking(&self, top_n: usize) -> TradesheetResult<LongShortRanking> {
        LongShortRanking::compute(self, top_n)
    }

    pub(crate) fn lazy(&self) -> LazyFrame {
        self.df.clone().lazy()
    }
}
