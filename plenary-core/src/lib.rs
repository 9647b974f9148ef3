// Plenary Minutes Core Library
//
// Normalizes plenary minutes published in the legacy (periods 1-18) and the
// modern (period 19+) XML schema into one uniform record stream and writes it
// as a single delimited table.

pub mod config;
pub mod date_parser;
pub mod dispatcher;
pub mod error;
pub mod extractors;
pub mod processor;
pub mod table;
pub mod text_normalizer;
pub mod types;
pub mod xml_tree;

// Re-export main types and functions for easy use
pub use config::{ConfigSource, PipelineConfig};
pub use date_parser::parse_date;
pub use dispatcher::{FormatDispatcher, LegacyDocument, ModernDocument, ParsedDocument};
pub use error::{BatchError, FailureKind, ParseError, WriteError};
pub use extractors::{LegacyExtractor, ModernExtractor, SchemaExtractor};
pub use processor::{
    discover_xml_files, parse_file, run_pipeline, run_pipeline_with_processor, BatchProcessor,
    BatchReport, FailureReport, FileFailure, PipelineSummary, StepProfiler,
};
pub use table::{read_table, TableWriter, COLUMNS};
pub use text_normalizer::clean_text;
pub use types::{PlenaryMinutes, SchemaKind};
