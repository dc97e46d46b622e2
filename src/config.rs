use std::{env, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{io::LocalFolder, report::io::ReportFormat};

pub const DEFAULT_DATA_DIR: &str = "test_data";
pub const DEFAULT_TOP_N: usize = 10;

/// Settings of one report run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Folder holding `marks.txt` and the `xa*` trading files.
    pub folder: PathBuf,
    /// Maximum number of rows per report.
    pub top_n: usize,
    /// When set, every report is also written into this directory.
    pub out_dir: Option<PathBuf>,
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    /// `<cwd>/test_data`, top 10, stdout only.
    fn default() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            folder: cwd.join(DEFAULT_DATA_DIR),
            top_n: DEFAULT_TOP_N,
            out_dir: None,
            format: ReportFormat::default(),
        }
    }
}

impl ReportConfig {
    pub fn source(&self) -> LocalFolder {
        LocalFolder::new(&self.folder)
    }
}
