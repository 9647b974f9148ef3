// Extractor abstraction
//
// Each schema gets one extractor that turns an already classified document into
// a PlenaryMinutes record. Extractors never look at the root tag to decide what
// they are dealing with; the dispatcher has done that once.

use crate::error::ParseError;
use crate::types::{PlenaryMinutes, SchemaKind};
use crate::xml_tree::Element;

/// Extractor trait - converts one schema's document tree into the uniform record
pub trait SchemaExtractor {
    /// Typed document this extractor accepts
    type Document;

    /// Build the record, failing with a classified error on the first
    /// missing or malformed field
    fn extract(&self, document: &Self::Document) -> Result<PlenaryMinutes, ParseError>;

    /// Schema handled by this extractor
    fn schema(&self) -> SchemaKind;

    /// Extractor name for debugging/logging
    fn name(&self) -> &str;
}

/// Required direct child element
pub(crate) fn required_child<'a>(
    parent: &'a Element,
    name: &str,
) -> Result<&'a Element, ParseError> {
    parent.child(name).ok_or_else(|| ParseError::missing(name))
}

/// Required attribute value
pub(crate) fn required_attr<'a>(element: &'a Element, name: &str) -> Result<&'a str, ParseError> {
    element.attr(name).ok_or_else(|| ParseError::missing(name))
}

/// Parse an electoral period or session number; zero is rejected
pub(crate) fn parse_positive(field: &str, value: &str) -> Result<u32, ParseError> {
    match value.trim().parse::<u32>() {
        Ok(number) if number > 0 => Ok(number),
        _ => Err(ParseError::InvalidInteger {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Title text must carry at least one non-whitespace character
pub(crate) fn non_empty(field: &str, text: String) -> Result<String, ParseError> {
    if text.trim().is_empty() {
        Err(ParseError::missing(field))
    } else {
        Ok(text)
    }
}
