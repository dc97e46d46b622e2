use polars::prelude::PlSmallStr;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Columns of the mark (reference market value) file, in on-disk order.
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
pub enum MarkCol {
    /// Instrument type identifier (e.g., `EQ`, `BOND`). Join key.
    #[strum(to_string = "type")]
    InstrumentType,
    /// Reference market value per unit of the instrument type.
    MarketValue,
}

/// Columns of a trading-activity file, in on-disk order.
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
pub enum TradeCol {
    /// Trade date as written in the file. Carried through, never aggregated.
    Date,
    /// Company identifier; the grouping dimension of every report.
    Company,
    /// Instrument type identifier. Join key into the mark table.
    #[strum(to_string = "type")]
    InstrumentType,
    /// Trade action label. Only `BUY` is distinguished.
    Action,
    /// Traded quantity (magnitude only).
    Quantity,
    /// Trade price.
    Price,
}

impl From<MarkCol> for PlSmallStr {
    fn from(value: MarkCol) -> Self {
        value.as_str().into()
    }
}

impl From<TradeCol> for PlSmallStr {
    fn from(value: TradeCol) -> Self {
        value.as_str().into()
    }
}

impl MarkCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl TradeCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
