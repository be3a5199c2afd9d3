//! JSON catalog writer

use std::io::Write;

use catalog_model::{CatalogMetadata, Field};
use serde::Serialize;
use tracing::debug;

use crate::Result;
use crate::format::{CatalogWriter, ExportFormat};

#[derive(Serialize)]
struct CatalogDocument<'a> {
    metadata: &'a CatalogMetadata,
    fields: &'a [Field],
}

/// Writes `{ "metadata": ..., "fields": [...] }`
pub struct JsonCatalogWriter {
    pretty: bool,
}

impl JsonCatalogWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Emit a single line instead of indented output
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

impl Default for JsonCatalogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogWriter for JsonCatalogWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn write_to(
        &self,
        out: &mut dyn Write,
        fields: &[Field],
        metadata: &CatalogMetadata,
    ) -> Result<()> {
        let document = CatalogDocument { metadata, fields };
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &document)?;
        } else {
            serde_json::to_writer(&mut *out, &document)?;
        }
        writeln!(out)?;
        debug!(field_count = fields.len(), "Finished writing JSON catalog");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_model::Cardinality;

    #[test]
    fn test_document_shape() {
        let fields = vec![
            Field::new("PmtMtd", "PmtInf/PmtMtd", "PaymentMethod3Code", Cardinality::required())
                .with_parent_path("PmtInf")
                .with_code_list(vec!["CHK".to_string(), "TRF".to_string()]),
        ];
        let metadata = CatalogMetadata::new("pain.001.001.09", &fields);

        let mut buffer = Vec::new();
        JsonCatalogWriter::new()
            .compact()
            .write_to(&mut buffer, &fields, &metadata)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["metadata"]["messageType"], "pain.001.001.09");
        assert_eq!(value["metadata"]["totalFields"], 1);
        assert_eq!(value["fields"][0]["fieldName"], "PmtMtd");
        assert_eq!(value["fields"][0]["requirement"], "mandatory");
        assert_eq!(value["fields"][0]["codeList"][1], "TRF");
    }
}
