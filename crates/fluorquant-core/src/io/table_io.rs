use std::path::Path;

use crate::error::{QuantError, Result};
use crate::measure::ResultTable;

/// Destination for finished result tables.
pub trait TableSink {
    fn write_table(&mut self, path: &Path, table: &ResultTable) -> Result<()>;
}

/// Writes tables as delimited text files.
#[derive(Clone, Copy, Debug)]
pub struct DelimitedTableSink {
    pub delimiter: char,
}

impl Default for DelimitedTableSink {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl TableSink for DelimitedTableSink {
    fn write_table(&mut self, path: &Path, table: &ResultTable) -> Result<()> {
        std::fs::write(path, table.to_delimited(self.delimiter)).map_err(|source| {
            QuantError::OutputWriteFailure {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}
