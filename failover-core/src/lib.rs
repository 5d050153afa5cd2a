#![forbid(unsafe_code)]

pub mod error;
pub mod parser;
pub mod template;
pub mod types;
pub mod validate;

pub use crate::error::{ParseError, ValidationError, Violation};
pub use crate::parser::{parse_document_str, DocumentFormat, ParsedDocument};
pub use crate::template::{parse_template, Segment, Template, TemplateError};
pub use crate::types::FailoverDocument;
pub use crate::validate::{validate_document, Validate};
