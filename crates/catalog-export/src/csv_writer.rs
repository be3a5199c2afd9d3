//! CSV catalog writer

use std::io::Write;

use catalog_model::{CatalogMetadata, Field};
use tracing::{debug, trace};

use crate::format::{CatalogWriter, ExportFormat};
use crate::summary::describe_constraints;
use crate::{Error, Result};

const HEADERS: [&str; 5] = ["FieldName", "Path", "Multiplicity", "Constraints", "Definition"];

/// Writes `#` metadata lines, then one row per field
pub struct CsvCatalogWriter {
    delimiter: u8,
    metadata_lines: bool,
}

impl CsvCatalogWriter {
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            metadata_lines: true,
        }
    }

    /// Set delimiter character
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter as u8;
        self
    }

    /// Skip the `#` metadata block
    pub fn without_metadata(mut self) -> Self {
        self.metadata_lines = false;
        self
    }

    fn write_metadata(&self, out: &mut dyn Write, metadata: &CatalogMetadata) -> Result<()> {
        writeln!(out, "# Message Type: {}", metadata.message_type)?;
        writeln!(out, "# Total Fields: {}", metadata.total_fields)?;
        writeln!(out, "# Mandatory Fields: {}", metadata.mandatory_count)?;
        writeln!(out, "# Optional Fields: {}", metadata.optional_count)?;
        writeln!(out, "# Extraction Date: {}", metadata.extraction_date_string())?;
        writeln!(out, "#")?;
        Ok(())
    }
}

impl Default for CsvCatalogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogWriter for CsvCatalogWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn write_to(
        &self,
        out: &mut dyn Write,
        fields: &[Field],
        metadata: &CatalogMetadata,
    ) -> Result<()> {
        if self.metadata_lines {
            self.write_metadata(out, metadata)?;
        }

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(&mut *out);

        csv_writer
            .write_record(HEADERS)
            .map_err(|e| Error::Write(e.to_string()))?;

        for field in fields {
            let multiplicity = field.multiplicity();
            let constraints = describe_constraints(field);
            let row = [
                field.name.as_str(),
                field.path.as_str(),
                multiplicity.as_str(),
                constraints.as_str(),
                field.documentation.as_str(),
            ];
            csv_writer
                .write_record(row)
                .map_err(|e| Error::Write(e.to_string()))?;
            trace!(path = %field.path, "Wrote CSV row");
        }

        csv_writer.flush()?;
        debug!(record_count = fields.len(), "Finished writing CSV catalog");
        Ok(())
    }
}
