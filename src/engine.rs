use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    data::source::DataSource,
    error::{ReportError, TradesheetResult},
    report::{
        enriched::EnrichedTrades,
        io::{Report, ReportFormat, ToFile},
        long_short::LongShortRanking,
        top_companies::{Metric, TopCompanies},
    },
};

/// Runs reports against a [`DataSource`].
///
/// The single-report methods reload and rejoin the source on every call, so
/// each answer reflects the files as they are at call time. [`Self::report_set`]
/// loads once and derives all four reports from the same joined table.
#[derive(Debug, Clone)]
pub struct ReportEngine<S> {
    source: S,
}

impl<S> ReportEngine<S>
where
    S: DataSource,
{
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Loads marks and trades and joins them.
    ///
    /// Returns `None` when the mark table is missing or no trade rows exist.
    #[tracing::instrument(skip(self))]
    pub fn enriched_trades(&self) -> TradesheetResult<Option<EnrichedTrades>> {
        let Some(marks) = self.source.marks()? else {
            warn!("No mark data available");
            return Ok(None);
        };

        let trades = self.source.trades()?;
        if trades.is_empty() {
            warn!("No trading data available");
            return Ok(None);
        }

        let enriched = EnrichedTrades::join(trades, marks)?;
        info!(rows = enriched.len(), "Joined trades with marks");
        Ok(Some(enriched))
    }

    /// Top `top_n` companies by the given metric, or `None` without joined data.
    pub fn top_by_metric(
        &self,
        metric: Metric,
        top_n: usize,
    ) -> TradesheetResult<Option<TopCompanies>> {
        self.enriched_trades()?
            .map(|trades| trades.top_by_metric(metric, top_n))
            .transpose()
    }

    /// Same as [`Self::top_by_metric`] for a metric given by name.
    ///
    /// Unknown names fail with [`ReportError::InvalidMetric`] before any file is read.
    pub fn top_by_metric_named(
        &self,
        metric: &str,
        top_n: usize,
    ) -> TradesheetResult<Option<TopCompanies>> {
        let metric = Metric::parse(metric)?;
        self.top_by_metric(metric, top_n)
    }

    /// Net-long companies ranked by long count.
    ///
    /// Fails with [`ReportError::MissingJoinedData`] when there is no joined
    /// table to rank. A joined table without rows yields an empty ranking.
    pub fn long_short_ranking(&self, top_n: usize) -> TradesheetResult<LongShortRanking> {
        let trades = self.enriched_trades()?.ok_or_else(|| {
            ReportError::MissingJoinedData(
                "mark data is missing or no trading rows were found".to_string(),
            )
        })?;
        trades.long_short_ranking(top_n)
    }

    /// All four reports from one load, or `None` without joined data.
    pub fn report_set(&self, top_n: usize) -> TradesheetResult<Option<ReportSet>> {
        self.enriched_trades()?
            .map(|trades| ReportSet::compute(&trades, top_n))
            .transpose()
    }
}

/// The fixed set of reports of one run, in presentation order.
#[derive(Debug, Clone)]
pub struct ReportSet {
    pub long_short: LongShortRanking,
    pub market: TopCompanies,
    pub volume: TopCompanies,
    pub asset: TopCompanies,
}

impl ReportSet {
    pub fn compute(trades: &EnrichedTrades, top_n: usize) -> TradesheetResult<Self> {
        Ok(Self {
            long_short: trades.long_short_ranking(top_n)?,
            market: trades.top_by_metric(Metric::Market, top_n)?,
            volume: trades.top_by_metric(Metric::Volume, top_n)?,
            asset: trades.top_by_metric(Metric::Asset, top_n)?,
        })
    }

    /// Writes every report into `dir` and returns the written paths in presentation order.
    pub fn write_to(
        &self,
        dir: impl AsRef<Path>,
        format: ReportFormat,
    ) -> TradesheetResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let paths = vec![
            self.long_short.write_to(dir, format)?,
            self.market.write_to(dir, format)?,
            self.volume.write_to(dir, format)?,
            self.asset.write_to(dir, format)?,
        ];
        info!(dir = %dir.display(), files = paths.len(), %format, "Wrote reports");
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, fs};

    use polars::df;

    use crate::{
        data::{
            source::InMemorySource,
            table::{MarkTable, TradeTable},
        },
        error::TradesheetError,
        io::LocalFolder,
        report::top_companies::CompanyValue,
    };

    use super::*;

    fn marks() -> MarkTable {
        MarkTable::new(
            df![
                "type" => &["EQ", "BOND"],
                "market_value" => &["10.0", "5.0"]
            ]
            .expect("Failed to create marks DF"),
        )
        .expect("Failed to create MarkTable")
    }

    fn trades() -> TradeTable {
        TradeTable::new(
            df![
                "date" => &["2024-01-01", "2024-01-01", "2024-01-01"],
                "company" => &["Acme", "Acme", "Globex"],
                "type" => &["EQ", "EQ", "BOND"],
                "action" => &["BUY", "SELL", "BUY"],
                "quantity" => &["100", "50", "200"],
                "price" => &["12.0", "11.0", "4.5"]
            ]
            .expect("Failed to create trades DF"),
        )
        .expect("Failed to create TradeTable")
    }

    /// Counts how often the source is read.
    struct CountingSource {
        inner: InMemorySource,
        loads: Cell<usize>,
    }

    impl DataSource for CountingSource {
        fn marks(&self) -> TradesheetResult<Option<MarkTable>> {
            self.loads.set(self.loads.get() + 1);
            self.inner.marks()
        }

        fn trades(&self) -> TradesheetResult<TradeTable> {
            self.inner.trades()
        }
    }

    #[test]
    fn test_missing_marks_means_no_result() {
        let engine = ReportEngine::new(InMemorySource {
            marks: None,
            trades: trades(),
        });

        assert!(engine.enriched_trades().expect("load failed").is_none());
        assert!(
            engine
                .top_by_metric(Metric::Market, 10)
                .expect("report failed")
                .is_none()
        );
        assert!(engine.report_set(10).expect("report failed").is_none());
    }

    #[test]
    fn test_long_short_without_joined_data_fails() {
        let engine = ReportEngine::new(InMemorySource {
            marks: Some(marks()),
            trades: TradeTable::default(),
        });

        match engine.long_short_ranking(10) {
            Err(TradesheetError::Report(ReportError::MissingJoinedData(_))) => {}
            other => panic!("expected missing joined data error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_mark_table_yields_empty_reports() {
        let engine = ReportEngine::new(InMemorySource {
            marks: Some(MarkTable::default()),
            trades: trades(),
        });

        let set = engine
            .report_set(10)
            .expect("report failed")
            .expect("joined table should exist");
        assert!(set.long_short.is_empty());
        assert!(set.market.is_empty());
        assert!(set.volume.is_empty());
        assert!(set.asset.is_empty());
    }

    #[test]
    fn test_invalid_metric_name_fails_before_loading() {
        let source = CountingSource {
            inner: InMemorySource {
                marks: Some(marks()),
                trades: trades(),
            },
            loads: Cell::new(0),
        };
        let engine = ReportEngine::new(&source);

        match engine.top_by_metric_named("bogus", 5) {
            Err(TradesheetError::Report(ReportError::InvalidMetric(name))) => {
                assert_eq!(name, "bogus")
            }
            other => panic!("expected invalid metric error, got {other:?}"),
        }
        assert_eq!(source.loads.get(), 0);

        let market = engine
            .top_by_metric_named("market", 5)
            .expect("report failed")
            .expect("joined table should exist");
        assert_eq!(market.metric(), Metric::Market);
        assert_eq!(source.loads.get(), 1);
    }

    #[test]
    fn test_single_reports_reload_and_set_loads_once() {
        let source = CountingSource {
            inner: InMemorySource {
                marks: Some(marks()),
                trades: trades(),
            },
            loads: Cell::new(0),
        };
        let engine = ReportEngine::new(&source);

        engine.long_short_ranking(10).expect("report failed");
        engine
            .top_by_metric(Metric::Volume, 10)
            .expect("report failed");
        assert_eq!(source.loads.get(), 2);

        engine.report_set(10).expect("report failed");
        assert_eq!(source.loads.get(), 3);
    }

    #[test]
    fn test_report_set_is_deterministic() {
        let engine = ReportEngine::new(InMemorySource {
            marks: Some(marks()),
            trades: trades(),
        });

        let first = engine
            .report_set(10)
            .expect("report failed")
            .expect("joined table should exist");
        let second = engine
            .report_set(10)
            .expect("report failed")
            .expect("joined table should exist");

        assert!(first.long_short.as_df().equals(second.long_short.as_df()));
        assert!(first.market.as_df().equals(second.market.as_df()));
        assert!(first.volume.as_df().equals(second.volume.as_df()));
        assert!(first.asset.as_df().equals(second.asset.as_df()));
        assert_eq!(
            first.market.rows().expect("rows failed"),
            vec![
                CompanyValue {
                    company: "Acme".to_string(),
                    value: 1500.0
                },
                CompanyValue {
                    company: "Globex".to_string(),
                    value: 1000.0
                },
            ]
        );
    }

    #[test]
    fn test_report_set_writes_all_reports() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::write(dir.path().join("marks.txt"), "EQ 10.0\nBOND 5.0\n")
            .expect("failed to write marks");
        fs::write(
            dir.path().join("xaa"),
            "2024-01-01\tAcme\tEQ\tBUY\t100\t12.0\n2024-01-01\tGlobex\tBOND\tBUY\t200\t4.5\n",
        )
        .expect("failed to write trades");

        let engine = ReportEngine::new(LocalFolder::new(dir.path()));
        let set = engine
            .report_set(10)
            .expect("report failed")
            .expect("joined table should exist");

        let out = dir.path().join("out");
        let paths = set
            .write_to(&out, ReportFormat::Json)
            .expect("failed to write reports");
        let names = paths
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .collect::<Vec<_>>();

        assert_eq!(
            names,
            [
                "long_short_ranking.json",
                "top_market_value.json",
                "top_volume.json",
                "top_asset_value.json"
            ]
        );
        for path in &paths {
            assert!(path.is_file(), "missing report file {}", path.display());
        }
    }
}
