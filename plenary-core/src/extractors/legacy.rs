//! Legacy schema extractor (electoral periods 1 to 18)
//!
//! Legacy files are flat: every field is a direct child of `<DOKUMENT>` and
//! holds plain text.
//!
//! ```text
//! <DOKUMENT>
//!   <WAHLPERIODE>18</WAHLPERIODE>
//!   <DOKUMENTART>PLENARPROTOKOLL</DOKUMENTART>
//!   <NR>18/5</NR>
//!   <DATUM>01.12.2019</DATUM>
//!   <TITEL>Plenarprotokoll vom 01.12.2019</TITEL>
//!   <TEXT>...</TEXT>
//! </DOKUMENT>
//! ```

use super::extractor::{non_empty, parse_positive, required_child, SchemaExtractor};
use crate::date_parser::parse_date;
use crate::dispatcher::LegacyDocument;
use crate::error::ParseError;
use crate::types::{PlenaryMinutes, SchemaKind};

const DATE: &str = "DATUM";
const TITLE: &str = "TITEL";
const TEXT: &str = "TEXT";
const PERIOD: &str = "WAHLPERIODE";
const DOC_TYPE: &str = "DOKUMENTART";
const NUMBER: &str = "NR";

pub struct LegacyExtractor;

impl SchemaExtractor for LegacyExtractor {
    type Document = LegacyDocument;

    fn extract(&self, document: &LegacyDocument) -> Result<PlenaryMinutes, ParseError> {
        let root = document.root();
        let field = |name: &str| required_child(root, name).map(|el| el.direct_text());

        let date = parse_date(&field(DATE)?)?;
        let title = non_empty(TITLE, field(TITLE)?)?;
        let text = field(TEXT)?;
        let period = parse_positive(PERIOD, &field(PERIOD)?)?;
        let doc_type = non_empty(DOC_TYPE, field(DOC_TYPE)?)?;
        let period_number = session_number(&field(NUMBER)?)?;

        PlenaryMinutes::new(title, date, text, period, doc_type, period_number)
    }

    fn schema(&self) -> SchemaKind {
        SchemaKind::Legacy
    }

    fn name(&self) -> &str {
        "LegacyExtractor"
    }
}

/// `NR` holds `<period>/<session>`; the session is the part after the last `/`
fn session_number(raw: &str) -> Result<u32, ParseError> {
    let suffix = raw.rsplit('/').next().unwrap_or(raw);
    parse_positive(NUMBER, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{FormatDispatcher, ParsedDocument};
    use crate::xml_tree::parse_document;
    use chrono::NaiveDate;
    use std::path::Path;

    fn legacy(xml: &str) -> LegacyDocument {
        let root = parse_document(xml).unwrap();
        match FormatDispatcher::new().dispatch(root, Path::new("test.xml")).unwrap() {
            ParsedDocument::Legacy(doc) => doc,
            other => panic!("expected legacy document, got {other:?}"),
        }
    }

    fn document_with(fields: &[(&str, &str)]) -> String {
        let body: String = fields
            .iter()
            .map(|(name, value)| format!("<{name}>{value}</{name}>"))
            .collect();
        format!("<DOKUMENT>{body}</DOKUMENT>")
    }

    fn complete_fields() -> Vec<(&'static str, &'static str)> {
        vec![
            ("WAHLPERIODE", "18"),
            ("DOKUMENTART", "Plenarprotokoll"),
            ("NR", "18/5"),
            ("DATUM", "01.12.2019"),
            ("TITEL", "Sitzung 5"),
            ("TEXT", "Erste Zeile\nZweite Zeile"),
        ]
    }

    #[test]
    fn test_extract_complete_document() {
        let doc = legacy(&document_with(&complete_fields()));
        let pm = LegacyExtractor.extract(&doc).unwrap();

        assert_eq!(pm.date, NaiveDate::from_ymd_opt(2019, 12, 1).unwrap());
        assert_eq!(pm.title, "Sitzung 5");
        assert_eq!(pm.text, "Erste Zeile\\nZweite Zeile");
        assert_eq!(pm.period, 18);
        assert_eq!(pm.doc_type, "Plenarprotokoll");
        assert_eq!(pm.period_number, 5);
    }

    #[test]
    fn test_session_number_uses_last_segment() {
        assert_eq!(session_number("19/123").unwrap(), 123);
        assert_eq!(session_number("1/2/7").unwrap(), 7);
        assert_eq!(session_number("42").unwrap(), 42);
        assert!(matches!(
            session_number("18/"),
            Err(ParseError::InvalidInteger { .. })
        ));
    }

    #[test]
    fn test_each_missing_element_is_named() {
        for missing in [DATE, TITLE, TEXT, PERIOD, DOC_TYPE, NUMBER] {
            let fields: Vec<_> = complete_fields()
                .into_iter()
                .filter(|(name, _)| *name != missing)
                .collect();
            let doc = legacy(&document_with(&fields));

            match LegacyExtractor.extract(&doc) {
                Err(ParseError::MissingField { field }) => assert_eq!(field, missing),
                other => panic!("without {missing}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_nested_fields_are_not_searched() {
        let mut fields = complete_fields();
        fields.retain(|(name, _)| *name != TITLE);
        let xml = document_with(&fields).replace(
            "</DOKUMENT>",
            "<KOPF><TITEL>versteckt</TITEL></KOPF></DOKUMENT>",
        );

        let err = LegacyExtractor.extract(&legacy(&xml)).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field } if field == TITLE));
    }

    #[test]
    fn test_malformed_values_are_classified() {
        let mut fields = complete_fields();
        fields[3] = ("DATUM", "31.02.2019");
        let err = LegacyExtractor.extract(&legacy(&document_with(&fields))).unwrap_err();
        assert!(matches!(err, ParseError::MalformedDate { .. }));

        let mut fields = complete_fields();
        fields[0] = ("WAHLPERIODE", "achtzehn");
        let err = LegacyExtractor.extract(&legacy(&document_with(&fields))).unwrap_err();
        assert!(matches!(err, ParseError::InvalidInteger { field, .. } if field == PERIOD));

        let mut fields = complete_fields();
        fields[4] = ("TITEL", "   ");
        let err = LegacyExtractor.extract(&legacy(&document_with(&fields))).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field } if field == TITLE));
    }

    #[test]
    fn test_empty_text_element_is_allowed() {
        let mut fields = complete_fields();
        fields[5] = ("TEXT", "");
        let pm = LegacyExtractor.extract(&legacy(&document_with(&fields))).unwrap();
        assert_eq!(pm.text, "");
    }
}
