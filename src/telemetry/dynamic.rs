//! Schema-discovering CSV sink.
//!
//! Not layered over [`super::csv::CsvWriter`]: frames are kept structured
//! until the flush because the header is only known once every frame has
//! been seen.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::error;

use crate::atoms::SimIt;
use crate::error::TelemetryError;

use super::KvsNode;

type DynamicFrame = BTreeMap<String, String>;

/// A tabular sink whose field list is the union of the fields seen across
/// all committed frames. Frames are stored keyed by iteration and written
/// in ascending order on flush, values in header order with empty cells
/// where a frame lacks a field.
#[derive(Debug, Clone, Default)]
pub struct DynamicCsvWriter {
    name: String,
    sep: char,
    fields: BTreeSet<String>,
    frames: BTreeMap<SimIt, DynamicFrame>,
    last_it: Option<SimIt>,
}

impl DynamicCsvWriter {
    pub fn new(name: &str, sep: char) -> Self {
        DynamicCsvWriter {
            name: name.to_string(),
            sep,
            fields: BTreeSet::new(),
            frames: BTreeMap::new(),
            last_it: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of committed frames.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Commits one frame, extending the discovered field set. Nested nodes
    /// are recorded as `PARSE_ERROR` cells. Commits must arrive in
    /// ascending iteration order.
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

        let mut frame = DynamicFrame::new();
        for (field, value) in node {
            self.fields.insert(field.clone());
            let cell = value.as_cell().unwrap_or_else(|| {
                error!(
                    "unable to render the field \"{}\" as a cell for the CSV {}",
                    field, self.name
                );
                "PARSE_ERROR".to_string()
            });
            frame.insert(field.clone(), cell);
        }

        self.frames.insert(it, frame);
        Ok(())
    }

    /// Writes the table to `<folder>/<name>.csv`: the deduplicated header
    /// (`simIt` first) and every frame in ascending iteration order.
    pub fn write_file(&self, folder: &Path) -> std::io::Result<()> {
        let full_path = folder.join(format!("{}.csv", self.name));
        let mut out = BufWriter::new(File::create(&full_path)?);

        // The iteration is the row key; drop a duplicated column.
        let clean_fields: Vec<&String> =
            self.fields.iter().filter(|f| f.as_str() != "simIt").collect();

        write!(out, "simIt")?;
        for field in &clean_fields {
            write!(out, "{}{}", self.sep, field)?;
        }
        writeln!(out)?;

        for (it, frame) in &self.frames {
            write!(out, "{}", it)?;
            for field in &clean_fields {
                match frame.get(field.as_str()) {
                    Some(cell) => write!(out, "{}{}", self.sep, cell)?,
                    None => write!(out, "{}", self.sep)?,
                }
            }
            writeln!(out)?;
        }

        out.flush()
    }
}
