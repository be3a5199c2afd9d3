//! Flattened field catalog of one schema

use crate::document::{SchemaDocument, SchemaFormat};
use crate::ROOT_ELEMENT;
use catalog_model::{CatalogMetadata, CatalogStats, Field};

/// Fields of one loaded schema together with its identity
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub message_type: String,
    pub format: SchemaFormat,
    pub fields: Vec<Field>,
}

impl Catalog {
    /// Flatten `document` from the conventional root
    pub fn from_document(document: &SchemaDocument) -> Self {
        Self::from_document_with_root(document, ROOT_ELEMENT)
    }

    /// Flatten `document` from a named root element
    pub fn from_document_with_root(document: &SchemaDocument, root_element: &str) -> Self {
        Self {
            message_type: document.message_identifier(),
            format: document.format(),
            fields: document.flatten_from(root_element),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_mandatory())
    }

    pub fn optional(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_optional())
    }

    pub fn conditional(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_conditional())
    }

    /// First field whose path is exactly `path`
    pub fn find_by_path(&self, path: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// All fields with leaf name `name`
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Field> + 'a {
        self.fields.iter().filter(move |f| f.name == name)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::from_fields(&self.fields)
    }

    /// Writer metadata stamped with the current time
    pub fn metadata(&self) -> CatalogMetadata {
        CatalogMetadata::new(&self.message_type, &self.fields).with_schema_format(self.format.as_str())
    }
}
