//! Dense event file writer

use event_types::ResampledRun;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{EventsError, EventsResult};
use crate::tsv::{format_value, TsvTable};

/// Writes resampled runs as tab-separated event files, one per run.
#[derive(Debug, Clone)]
pub struct EventFileWriter {
    dir: PathBuf,
    header: bool,
    columns: Option<Vec<String>>,
}

impl EventFileWriter {
    /// Create the writer, making `dir` if it does not exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> EventsResult<Self> {
        let dir = dir.into();
        if !dir.exists() {
            create_dir_all(&dir).map_err(|e| EventsError::file_access(&dir, e))?;
        }
        Ok(Self {
            dir,
            header: true,
            columns: None,
        })
    }

    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Restrict the written condition columns.
    pub fn with_columns(mut self, columns: Option<Vec<String>>) -> Self {
        self.columns = columns;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name of the `index`-th run.
    pub fn file_name(run: &ResampledRun, index: usize) -> String {
        if run.entities.is_empty() {
            format!("run-{}_events.tsv", index + 1)
        } else {
            run.entities.file_name("events", "tsv")
        }
    }

    /// Build the output table: `onset` plus the selected condition columns.
    pub fn table(&self, run: &ResampledRun) -> TsvTable {
        let mut run = run.clone();
        if let Some(columns) = &self.columns {
            run.retain_columns(columns);
        }

        let mut headers = vec!["onset".to_string()];
        headers.extend(run.columns.iter().map(|c| c.name.clone()));

        let mut table = TsvTable::new(headers);
        table.rows = (0..run.n_bins())
            .map(|k| {
                let mut row = Vec::with_capacity(run.columns.len() + 1);
                row.push(format_value(run.onset[k]));
                row.extend(run.columns.iter().map(|c| format_value(c.values[k])));
                row
            })
            .collect();
        table
    }

    /// Write one run, returning the path of the new file.
    pub fn write(&self, run: &ResampledRun, index: usize) -> EventsResult<PathBuf> {
        let path = self.dir.join(Self::file_name(run, index));
        let table = self.table(run);
        table.write(&path, self.header)?;
        debug!("Wrote {} rows to {}", table.len(), path.display());
        Ok(path)
    }
}
