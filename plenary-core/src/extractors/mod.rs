//! Schema Extractors
//!
//! Map a classified document tree onto the uniform [`PlenaryMinutes`] record.
//!
//! ## Architecture
//!
//! ```text
//! XML file
//!     ↓
//! [xml_tree::parse_document]
//!     ↓
//! Element (root)
//!     ↓
//! [FormatDispatcher]
//!     ↓
//! ParsedDocument::{Legacy, Modern}
//!     ↓
//! [LegacyExtractor | ModernExtractor]
//!     ↓
//! PlenaryMinutes (uniform record)
//! ```
//!
//! ## Available Extractors
//!
//! - `LegacyExtractor` - periods 1 to 18, flat `DOKUMENT` files
//! - `ModernExtractor` - period 19 onwards, nested `dbtplenarprotokoll` files
//!
//! [`PlenaryMinutes`]: crate::types::PlenaryMinutes

pub mod extractor;
pub mod legacy;
pub mod modern;

pub use extractor::SchemaExtractor;
pub use legacy::LegacyExtractor;
pub use modern::ModernExtractor;
