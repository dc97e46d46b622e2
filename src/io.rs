use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use globset::{Glob, GlobMatcher};
use polars::prelude::{
    DataFrame, IntoLazy, LazyCsvReader, LazyFileListReader, PlPath, SchemaRef, UnionArgs, concat,
};
use tracing::{debug, error, info, warn};

use crate::{
    data::{
        source::DataSource,
        table::{MarkTable, TradeTable},
    },
    error::{DataError, IoError, TradesheetResult},
    report::io::ToSchema,
};

pub const DEFAULT_MARK_FILE: &str = "marks.txt";
pub const DEFAULT_TRADE_PATTERN: &str = "xa*";

const MARK_SEPARATOR: u8 = b' ';
const TRADE_SEPARATOR: u8 = b'\t';

// ================================================================================================
// Local Folder
// ================================================================================================

/// A directory holding one mark file and any number of trading files.
///
/// - Mark file: `<root>/marks.txt`, space separated, `(type, market_value)`, no header.
/// - Trading files: every regular file in `<root>` whose name matches `xa*`, tab
///   separated, `(date, company, type, action, quantity, price)`, no header.
///
/// The directory is only read, never created or watched.
#[derive(Debug, Clone)]
pub struct LocalFolder {
    root: PathBuf,
    mark_file: String,
    trade_pattern: String,
}

impl LocalFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mark_file: DEFAULT_MARK_FILE.to_string(),
            trade_pattern: DEFAULT_TRADE_PATTERN.to_string(),
        }
    }

    pub fn with_mark_file(self, mark_file: impl Into<String>) -> Self {
        Self {
            mark_file: mark_file.into(),
            ..self
        }
    }

    pub fn with_trade_pattern(self, trade_pattern: impl Into<String>) -> Self {
        Self {
            trade_pattern: trade_pattern.into(),
            ..self
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mark_path(&self) -> PathBuf {
        self.root.join(&self.mark_file)
    }

    /// Lists the trading files of the folder in lexicographic path order.
    ///
    /// A folder that does not exist has no trading files.
    pub fn trade_files(&self) -> TradesheetResult<Vec<PathBuf>> {
        let matcher = self.trade_matcher()?;

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(folder = %self.root.display(), "Data folder does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(IoError::Io(e).into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(IoError::Io)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if matcher.is_match(entry.file_name()) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn trade_matcher(&self) -> TradesheetResult<GlobMatcher> {
        Glob::new(&self.trade_pattern)
            .map(|glob| glob.compile_matcher())
            .map_err(|e| {
                IoError::InvalidPattern {
                    pattern: self.trade_pattern.clone(),
                    msg: e.to_string(),
                }
                .into()
            })
    }
}

impl DataSource for LocalFolder {
    fn marks(&self) -> TradesheetResult<Option<MarkTable>> {
        let path = self.mark_path();
        if !path.is_file() {
            error!(path = %path.display(), "Mark file not found");
            return Ok(None);
        }

        if is_zero_length(&path)? {
            warn!(path = %path.display(), "Mark file is empty");
            return Ok(Some(MarkTable::default()));
        }

        let start = Instant::now();
        let df = read_delimited(&path, MARK_SEPARATOR, MarkTable::to_schema())?;
        info!(
            path = %path.display(),
            rows = df.height(),
            elapsed = %humantime::format_duration(start.elapsed()),
            "Loaded mark table"
        );

        MarkTable::new(df).map(Some)
    }

    fn trades(&self) -> TradesheetResult<TradeTable> {
        let files = self.trade_files()?;
        if files.is_empty() {
            warn!(
                folder = %self.root.display(),
                pattern = %self.trade_pattern,
                "No trading files matched"
            );
            return Ok(TradeTable::default());
        }

        let start = Instant::now();
        let mut frames = Vec::with_capacity(files.len());
        for path in &files {
            if is_zero_length(path)? {
                debug!(path = %path.display(), "Skipping empty trading file");
                continue;
            }
            let df = read_delimited(path, TRADE_SEPARATOR, TradeTable::to_schema())?;
            debug!(path = %path.display(), rows = df.height(), "Read trading file");
            frames.push(df.lazy());
        }

        if frames.is_empty() {
            return Ok(TradeTable::default());
        }

        let df = concat(
            frames,
            UnionArgs {
                rechunk: true,
                ..Default::default()
            },
        )
        .and_then(|lf| lf.collect())
        .map_err(|e| DataError::DataFrame(format!("Failed to concatenate trading files: {e}")))?;

        info!(
            files = files.len(),
            rows = df.height(),
            elapsed = %humantime::format_duration(start.elapsed()),
            "Loaded trading files"
        );

        TradeTable::new(df)
    }
}

// ================================================================================================
// Helper Functions
// ================================================================================================

/// Reads a headerless delimited file with every column typed as the given (text) schema.
///
/// Ragged lines are tolerated: missing trailing fields become null, extra fields are dropped.
fn read_delimited(path: &Path, separator: u8, schema: SchemaRef) -> TradesheetResult<DataFrame> {
    let uri = path.to_str().ok_or_else(|| {
        IoError::FileSystem(format!(
            "Path contains invalid UTF-8 characters: {}",
            path.display()
        ))
    })?;

    LazyCsvReader::new(PlPath::new(uri))
        .with_has_header(false)
        .with_separator(separator)
        .with_schema(Some(schema))
        .with_truncate_ragged_lines(true)
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| IoError::ReadFailed(format!("{}: {e}", path.display())).into())
}

fn is_zero_length(path: &Path) -> TradesheetResult<bool> {
    let metadata = fs::metadata(path).map_err(IoError::Io)?;
    Ok(metadata.len() == 0)
}
