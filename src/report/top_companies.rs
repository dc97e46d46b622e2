use std::{fmt, str::FromStr, sync::Arc};

use polars::{
    frame::DataFrame,
    prelude::{DataType, Expr, Field, PlSmallStr, Schema, SchemaRef, SortMultipleOptions, col},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{DataError, ReportError, TradesheetResult},
    report::{
        enriched::{EnrichedCol, EnrichedTrades},
        io::{Report, ReportName},
        polars_ext::polars_to_tradesheet_error,
    },
};

/// The value a company ranking is computed from.
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
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Notional value: `quantity * price`.
    Asset,
    /// Raw traded quantity.
    Volume,
    /// Marked value: `quantity * market_value`.
    Market,
}

impl Metric {
    /// Parses a lowercase metric name (`asset`, `volume`, `market`).
    pub fn parse(name: &str) -> TradesheetResult<Self> {
        Self::from_str(name).map_err(|_| ReportError::InvalidMetric(name.to_string()).into())
    }

    /// Name of the summed column in the resulting report.
    pub fn column(&self) -> TopCompaniesCol {
        match self {
            Self::Asset => TopCompaniesCol::TotalAssetValue,
            Self::Volume => TopCompaniesCol::Quantity,
            Self::Market => TopCompaniesCol::TotalMarketValue,
        }
    }

    /// Per-row value summed per company. Null inputs propagate to a null row value.
    fn value_expr(&self) -> Expr {
        let quantity = col(EnrichedCol::Quantity);
        match self {
            Self::Asset => quantity * col(EnrichedCol::Price),
            Self::Volume => quantity,
            Self::Market => quantity * col(EnrichedCol::MarketValue),
        }
    }
}

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
pub enum TopCompaniesCol {
    Company,
    TotalAssetValue,
    Quantity,
    TotalMarketValue,
}

impl From<TopCompaniesCol> for PlSmallStr {
    fn from(value: TopCompaniesCol) -> Self {
        value.as_str().into()
    }
}

impl TopCompaniesCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// One ranked row of a [`TopCompanies`] report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyValue {
    pub company: String,
    pub value: f64,
}

/// Companies ranked by a summed [`Metric`], highest first.
///
/// # Columns
///
/// - `company`: Company identifier.
/// - `total_asset_value` | `quantity` | `total_market_value`: the summed metric.
///
/// # Example Table (`Metric::Market`)
///
/// | company | total_market_value |
/// |---------|--------------------|
/// | Acme    | 1500.0             |
/// | Globex  | 1000.0             |
///
/// Ties keep the order in which companies first appear in the trade files.
#[derive(Debug, Clone)]
pub struct TopCompanies {
    df: DataFrame,
    metric: Metric,
}

impl Report for TopCompanies {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl ReportName for TopCompanies {
    fn base_name(&self) -> String {
        match self.metric {
            Metric::Asset => "top_asset_value",
            Metric::Volume => "top_volume",
            Metric::Market => "top_market_value",
        }
        .to_string()
    }
}

impl fmt::Display for TopCompanies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.df)
    }
}

impl TopCompanies {
    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn schema(metric: Metric) -> SchemaRef {
        Arc::new(Schema::from_iter([
            Field::new(TopCompaniesCol::Company.into(), DataType::String),
            Field::new(metric.column().into(), DataType::Float64),
        ]))
    }

    /// The ranking as typed rows, in report order.
    pub fn rows(&self) -> TradesheetResult<Vec<CompanyValue>> {
        let companies = self
            .df
            .column(TopCompaniesCol::Company.as_str())
            .and_then(|c| c.str())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;
        let values = self
            .df
            .column(self.metric.column().as_str())
            .and_then(|c| c.f64())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;

        Ok(companies
            .into_iter()
            .zip(values)
            .filter_map(|(company, value)| {
                Some(CompanyValue {
                    company: company?.to_string(),
                    value: value.unwrap_or(0.0),
                })
            })
            .collect())
    }

    /// Groups by company, sums the metric, sorts descending and keeps the first `top_n`.
    pub(crate) fn compute(
        trades: &EnrichedTrades,
        metric: Metric,
        top_n: usize,
    ) -> TradesheetResult<Self> {
        if trades.is_empty() || top_n == 0 {
            return Ok(Self {
                df: DataFrame::empty_with_schema(&Self::schema(metric)),
                metric,
            });
        }

        let value_col = metric.column();
        let df = trades
            .lazy()
            .filter(col(EnrichedCol::Company).is_not_null())
            .group_by_stable([col(EnrichedCol::Company)])
            .agg([metric.value_expr().sum().alias(value_col)])
            .sort(
                [value_col.as_str()],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_maintain_order(true),
            )
            .collect()
            .map_err(|e| polars_to_tradesheet_error("top companies", e))?
            .head(Some(top_n));

        Ok(Self { df, metric })
    }
}

#[cfg(test)]
mod tests {
    use polars::df;

    use crate::{
        data::table::{MarkTable, TradeTable},
        error::TradesheetError,
    };

    use super::*;

    fn enriched(rows: &[(&str, &str, &str, &str, &str)]) -> EnrichedTrades {
        let marks = MarkTable::new(
            df![
                "type" => &["EQ", "BOND"],
                "market_value" => &["10.0", "5.0"]
            ]
            .expect("Failed to create marks DF"),
        )
        .expect("Failed to create MarkTable");

        let company = rows.iter().map(|r| r.0).collect::<Vec<_>>();
        let ty = rows.iter().map(|r| r.1).collect::<Vec<_>>();
        let action = rows.iter().map(|r| r.2).collect::<Vec<_>>();
        let quantity = rows.iter().map(|r| r.3).collect::<Vec<_>>();
        let price = rows.iter().map(|r| r.4).collect::<Vec<_>>();
        let date = vec!["2024-01-01"; rows.len()];

        let trades = TradeTable::new(
            df![
                "date" => date,
                "company" => company,
                "type" => ty,
                "action" => action,
                "quantity" => quantity,
                "price" => price
            ]
            .expect("Failed to create trades DF"),
        )
        .expect("Failed to create TradeTable");

        EnrichedTrades::join(trades, marks).expect("join failed")
    }

    fn scenario() -> EnrichedTrades {
        enriched(&[
            ("Acme", "EQ", "BUY", "100", "12.0"),
            ("Acme", "EQ", "SELL", "50", "11.0"),
            ("Globex", "BOND", "BUY", "200", "4.5"),
        ])
    }

    fn cv(company: &str, value: f64) -> CompanyValue {
        CompanyValue {
            company: company.to_string(),
            value,
        }
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!(Metric::parse("asset").ok(), Some(Metric::Asset));
        assert_eq!(Metric::parse("volume").ok(), Some(Metric::Volume));
        assert_eq!(Metric::parse("market").ok(), Some(Metric::Market));

        for bogus in ["bogus", "Market", ""] {
            match Metric::parse(bogus) {
                Err(TradesheetError::Report(ReportError::InvalidMetric(s))) => assert_eq!(s, bogus),
                other => panic!("expected invalid metric error for '{bogus}', got {other:?}"),
            }
        }
    }

    #[test]
    fn test_market_value_scenario() {
        let report = scenario()
            .top_by_metric(Metric::Market, 10)
            .expect("report failed");
        assert_eq!(
            report.rows().expect("rows failed"),
            vec![cv("Acme", 1500.0), cv("Globex", 1000.0)]
        );
    }

    #[test]
    fn test_asset_and_volume() {
        let trades = scenario();

        let asset = trades
            .top_by_metric(Metric::Asset, 10)
            .expect("report failed");
        assert_eq!(
            asset.rows().expect("rows failed"),
            vec![cv("Acme", 1750.0), cv("Globex", 900.0)]
        );

        let volume = trades
            .top_by_metric(Metric::Volume, 10)
            .expect("report failed");
        assert_eq!(
            volume.rows().expect("rows failed"),
            vec![cv("Globex", 200.0), cv("Acme", 150.0)]
        );
        assert_eq!(
            volume.as_df().get_column_names_str(),
            ["company", "quantity"]
        );
    }

    #[test]
    fn test_top_n_truncates() {
        let trades = enriched(&[
            ("A", "EQ", "BUY", "1", "1.0"),
            ("B", "EQ", "BUY", "3", "1.0"),
            ("C", "EQ", "BUY", "2", "1.0"),
        ]);

        let report = trades
            .top_by_metric(Metric::Volume, 2)
            .expect("report failed");
        assert_eq!(
            report.rows().expect("rows failed"),
            vec![cv("B", 3.0), cv("C", 2.0)]
        );

        let none = trades
            .top_by_metric(Metric::Volume, 0)
            .expect("report failed");
        assert!(none.is_empty());
        assert_eq!(none.as_df().get_column_names_str(), ["company", "quantity"]);
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let trades = enriched(&[
            ("Zeta", "EQ", "BUY", "5", "1.0"),
            ("Alpha", "EQ", "BUY", "5", "1.0"),
            ("Mid", "EQ", "BUY", "7", "1.0"),
        ]);

        let report = trades
            .top_by_metric(Metric::Volume, 10)
            .expect("report failed");
        assert_eq!(
            report.rows().expect("rows failed"),
            vec![cv("Mid", 7.0), cv("Zeta", 5.0), cv("Alpha", 5.0)]
        );
    }

    #[test]
    fn test_malformed_quantity_contributes_nothing() {
        let trades = enriched(&[
            ("Acme", "EQ", "BUY", "abc", "12.0"),
            ("Acme", "EQ", "BUY", "10", "2.0"),
            ("Globex", "EQ", "BUY", "oops", "1.0"),
        ]);

        let report = trades
            .top_by_metric(Metric::Asset, 10)
            .expect("report failed");
        assert_eq!(
            report.rows().expect("rows failed"),
            vec![cv("Acme", 20.0), cv("Globex", 0.0)]
        );
    }

    #[test]
    fn test_nan_text_is_treated_as_missing() {
        let trades = enriched(&[
            ("Acme", "EQ", "BUY", "NaN", "1.0"),
            ("Acme", "EQ", "BUY", "5", "1.0"),
            ("Globex", "EQ", "BUY", "3", "1.0"),
            ("Globex", "EQ", "BUY", "nan", "1.0"),
        ]);

        let report = trades
            .top_by_metric(Metric::Volume, 10)
            .expect("report failed");
        assert_eq!(
            report.rows().expect("rows failed"),
            vec![cv("Acme", 5.0), cv("Globex", 3.0)]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_report() {
        let report = EnrichedTrades::default()
            .top_by_metric(Metric::Market, 10)
            .expect("report failed");
        assert!(report.is_empty());
        assert_eq!(report.base_name(), "top_market_value");
    }
}
