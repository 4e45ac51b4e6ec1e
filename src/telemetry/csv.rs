//! Static-schema CSV sink.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use log::{error, warn};

use crate::atoms::SimIt;
use crate::error::TelemetryError;

use super::KvsNode;

/// A tabular sink with a field list declared at construction.
///
/// Frames append to an in-memory buffer; `write_file` materializes the
/// table as `<folder>/<name>.csv`. The iteration column always comes
/// first. Commits must arrive in ascending iteration order.
#[derive(Debug, Clone)]
pub struct CsvWriter {
    name: String,
    sep: char,
    index_label: String,
    fields: Vec<String>,
    content: String,
    last_it: Option<SimIt>,
}

impl CsvWriter {
    /// Creates a sink named `name` (also the file stem) using `sep` as the
    /// column separator. The iteration column is labelled `it`.
    pub fn new(name: &str, sep: char) -> Self {
        CsvWriter {
            name: name.to_string(),
            sep,
            index_label: "it".to_string(),
            fields: Vec::new(),
            content: String::new(),
            last_it: None,
        }
    }

    /// Overrides the label of the leading iteration column.
    pub fn with_index_label(mut self, label: &str) -> Self {
        self.index_label = label.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares the ordered field list and resets the buffer to a fresh
    /// header line.
    pub fn declare_field_names(&mut self, fields: &[&str]) {
        self.fields = fields.iter().map(|f| f.to_string()).collect();

        self.content.clear();
        self.last_it = None;
        self.content.push_str(&self.index_label);
        for field in &self.fields {
            self.content.push(self.sep);
            self.content.push_str(field);
        }
        self.content.push('\n');
    }

    /// Appends one frame: the iteration followed by the value of each
    /// declared field. A missing field leaves its cell empty; a nested
    /// node in place of a scalar writes `PARSE_ERROR`.
    pub fn append_frame(
        &mut self,
        it: SimIt,
        node: &KvsNode,
    ) -> Result<(), TelemetryError> {
        if let Some(last) = self.last_it {
            if it < last {
                return Err(TelemetryError::OutOfOrder {
                    writer: self.name.clone(),
                    frame: it,
                    last,
                });
            }
        }
        self.last_it = Some(it);

        let _ = write!(self.content, "{}", it);
        for field in &self.fields {
            self.content.push(self.sep);
            match node.get(field) {
                Some(value) => match value.as_cell() {
                    Some(cell) => self.content.push_str(&cell),
                    None => {
                        error!(
                            "unable to render the field \"{}\" as a cell for the CSV {}",
                            field, self.name
                        );
                        self.content.push_str("PARSE_ERROR");
                    }
                },
                None => {
                    warn!("field {} missing from a frame for the CSV {}", field, self.name);
                }
            }
        }
        self.content.push('\n');
        Ok(())
    }

    /// Writes the buffered table to `<folder>/<name>.csv`. Telemetry is
    /// best effort; the caller logs a failure and carries on.
    pub fn write_file(&self, folder: &Path) -> std::io::Result<()> {
        let full_path = folder.join(format!("{}.csv", self.name));
        fs::write(&full_path, &self.content)
    }
}
