//! Modern schema extractor (electoral period 19 onwards)
//!
//! Identifiers live in attributes on the root, while title and proceedings are
//! deeply nested mixed content (speeches, speaker markup, comments, page
//! breaks). Both are read by flattening every text fragment of the subtree in
//! document order.
//!
//! ```text
//! <dbtplenarprotokoll wahlperiode="19" sitzung-nr="200" sitzung-datum="03.09.2021">
//!   <vorspann>
//!     <kopfdaten>
//!       <sitzungstitel><sitzungsnr>200</sitzungsnr>. Sitzung</sitzungstitel>
//!     </kopfdaten>
//!   </vorspann>
//!   <sitzungsverlauf>...</sitzungsverlauf>
//! </dbtplenarprotokoll>
//! ```

use super::extractor::{non_empty, parse_positive, required_attr, SchemaExtractor};
use crate::date_parser::parse_date;
use crate::dispatcher::ModernDocument;
use crate::error::ParseError;
use crate::types::{PlenaryMinutes, SchemaKind};

const DATE_ATTR: &str = "sitzung-datum";
const PERIOD_ATTR: &str = "wahlperiode";
const NUMBER_ATTR: &str = "sitzung-nr";
const TITLE_PATH: &str = "vorspann/kopfdaten/sitzungstitel";
const PROCEEDINGS: &str = "sitzungsverlauf";

pub struct ModernExtractor;

impl SchemaExtractor for ModernExtractor {
    type Document = ModernDocument;

    fn extract(&self, document: &ModernDocument) -> Result<PlenaryMinutes, ParseError> {
        let root = document.root();

        let date = parse_date(required_attr(root, DATE_ATTR)?)?;
        let title = root
            .find(TITLE_PATH)
            .ok_or_else(|| ParseError::missing(TITLE_PATH))?
            .text_content();
        let title = non_empty(TITLE_PATH, title)?;
        let text = root
            .child(PROCEEDINGS)
            .ok_or_else(|| ParseError::missing(PROCEEDINGS))?
            .text_content();
        let period = parse_positive(PERIOD_ATTR, required_attr(root, PERIOD_ATTR)?)?;
        let period_number = parse_positive(NUMBER_ATTR, required_attr(root, NUMBER_ATTR)?)?;

        PlenaryMinutes::new(
            title,
            date,
            text,
            period,
            root.name().to_string(),
            period_number,
        )
    }

    fn schema(&self) -> SchemaKind {
        SchemaKind::Modern
    }

    fn name(&self) -> &str {
        "ModernExtractor"
    }
}
