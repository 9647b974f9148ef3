use crate::error::ParseError;
use crate::extractors::{LegacyExtractor, ModernExtractor, SchemaExtractor};
use crate::types::{PlenaryMinutes, SchemaKind};
use crate::xml_tree::Element;
use std::path::Path;

/// Document rooted at `<DOKUMENT>` (periods 1 to 18)
#[derive(Debug, Clone)]
pub struct LegacyDocument(Element);

/// Document rooted at `<dbtplenarprotokoll>` (period 19 onwards)
#[derive(Debug, Clone)]
pub struct ModernDocument(Element);

impl LegacyDocument {
    pub fn root(&self) -> &Element {
        &self.0
    }
}

impl ModernDocument {
    pub fn root(&self) -> &Element {
        &self.0
    }
}

/// A document tree whose schema has been decided
#[derive(Debug, Clone)]
pub enum ParsedDocument {
    Legacy(LegacyDocument),
    Modern(ModernDocument),
}

impl ParsedDocument {
    pub fn schema(&self) -> SchemaKind {
        match self {
            ParsedDocument::Legacy(_) => SchemaKind::Legacy,
            ParsedDocument::Modern(_) => SchemaKind::Modern,
        }
    }

    /// Run the extractor matching this document's schema
    pub fn extract(&self) -> Result<PlenaryMinutes, ParseError> {
        match self {
            ParsedDocument::Legacy(doc) => LegacyExtractor.extract(doc),
            ParsedDocument::Modern(doc) => ModernExtractor.extract(doc),
        }
    }
}

/// Routes a parsed tree to its schema by inspecting the root element only
pub struct FormatDispatcher;

impl Default for FormatDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatDispatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn dispatch(&self, root: Element, source: &Path) -> Result<ParsedDocument, ParseError> {
        match SchemaKind::from_root_marker(root.name()) {
            Some(SchemaKind::Legacy) => Ok(ParsedDocument::Legacy(LegacyDocument(root))),
            Some(SchemaKind::Modern) => Ok(ParsedDocument::Modern(ModernDocument(root))),
            None => Err(ParseError::UnrecognizedSchema {
                file: source.to_path_buf(),
                root: root.name().to_string(),
            }),
        }
    }
}
