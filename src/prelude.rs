// 1. Traits
pub use crate::data::source::DataSource;
pub use crate::report::io::{Report, ReportName, ToCsv, ToFile, ToJson, ToSchema};

// 2. Entry Point
pub use crate::config::ReportConfig;
pub use crate::engine::{ReportEngine, ReportSet};

// 3. Tables & Reports
pub use crate::data::schema::{MarkCol, TradeCol};
pub use crate::data::source::InMemorySource;
pub use crate::data::table::{MarkTable, TradeTable};
pub use crate::report::enriched::{EnrichedCol, EnrichedTrades};
pub use crate::report::io::ReportFormat;
pub use crate::report::long_short::{LongShortCol, LongShortRanking, LongShortRow};
pub use crate::report::top_companies::{CompanyValue, Metric, TopCompanies, TopCompaniesCol};

// 4. Data Sources
pub use crate::io::LocalFolder;

// 5. Errors
pub use crate::error::{DataError, IoError, ReportError, TradesheetError, TradesheetResult};
