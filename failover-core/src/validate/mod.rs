mod rules;
mod validator;

use crate::error::ValidationError;
use crate::types::FailoverDocument;
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for FailoverDocument {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_document(self)
    }
}

pub fn validate_document(doc: &FailoverDocument) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.check(doc);
    v.into_result()
}
