pub mod enriched;
pub mod io;
pub mod long_short;
pub mod polars_ext;
pub mod top_companies;
