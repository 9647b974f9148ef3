use crate::date_parser::start_of_day;
use crate::error::ParseError;
use crate::text_normalizer::clean_text;
use chrono::{NaiveDate, NaiveDateTime};

/// One plenary session, normalized from either transcript schema.
///
/// Built once by an extractor through [`PlenaryMinutes::new`], which enforces
/// the record invariants and normalizes the text, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlenaryMinutes {
    pub title: String,
    pub date: NaiveDate,
    pub datetime: NaiveDateTime,
    /// Normalized transcript text; line breaks are stored as a literal `\n`
    pub text: String,
    pub period: u32,
    /// Written to the `type` column
    pub doc_type: String,
    pub period_number: u32,
}

impl PlenaryMinutes {
    pub fn new(
        title: String,
        date: NaiveDate,
        text: String,
        period: u32,
        doc_type: String,
        period_number: u32,
    ) -> Result<Self, ParseError> {
        if title.trim().is_empty() {
            return Err(ParseError::missing("title"));
        }
        if doc_type.trim().is_empty() {
            return Err(ParseError::missing("type"));
        }
        for (field, value) in [("period", period), ("period_number", period_number)] {
            if value == 0 {
                return Err(ParseError::InvalidInteger {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(Self {
            title,
            date,
            datetime: start_of_day(date),
            text: clean_text(&text),
            period,
            doc_type,
            period_number,
        })
    }

    /// Whitespace-separated tokens of the transcript text
    pub fn tokens(&self) -> Vec<&str> {
        self.text.split_whitespace().collect()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// The two transcript schemas, identified by their root element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Electoral periods 1 to 18: flat, typed child elements
    Legacy,
    /// Electoral period 19 onwards: nested mixed-content markup
    Modern,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 2] = [SchemaKind::Legacy, SchemaKind::Modern];

    pub fn root_marker(&self) -> &'static str {
        match self {
            SchemaKind::Legacy => "DOKUMENT",
            SchemaKind::Modern => "dbtplenarprotokoll",
        }
    }

    pub fn from_root_marker(marker: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.root_marker() == marker)
    }
}
