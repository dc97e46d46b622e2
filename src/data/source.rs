use crate::{
    data::table::{MarkTable, TradeTable},
    error::TradesheetResult,
};

/// Supplies the two tabular inputs of a report run.
///
/// Absence is not an error at this seam: a missing mark table is reported as
/// `Ok(None)` and a source without trading files yields an empty [`TradeTable`].
/// Callers decide whether "no data" is fatal.
pub trait DataSource {
    /// Loads the mark table, or `None` when the source has no mark data.
    fn marks(&self) -> TradesheetResult<Option<MarkTable>>;

    /// Loads and concatenates all trading-activity rows.
    fn trades(&self) -> TradesheetResult<TradeTable>;
}

impl<T> DataSource for &T
where
    T: DataSource + ?Sized,
{
    fn marks(&self) -> TradesheetResult<Option<MarkTable>> {
        (**self).marks()
    }

    fn trades(&self) -> TradesheetResult<TradeTable> {
        (**self).trades()
    }
}

/// An in-memory source, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub marks: Option<MarkTable>,
    pub trades: TradeTable,
}

impl DataSource for InMemorySource {
    fn marks(&self) -> TradesheetResult<Option<MarkTable>> {
        Ok(self.marks.clone())
    }

    fn trades(&self) -> TradesheetResult<TradeTable> {
        Ok(self.trades.clone())
    }
}
