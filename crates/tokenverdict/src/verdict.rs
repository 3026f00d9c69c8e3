use crate::error::{ErrorKind, ValidationError};

/// Final state of a validation: valid exactly when no error was recorded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    errors: Vec<ValidationError>,
}

impl Verdict {
    pub(crate) fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors in the order the checks recorded them, duplicates included
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Whether any recorded error is of `kind`
    pub fn has(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// `Ok(())` when valid, otherwise every recorded error
    pub fn into_result(self) -> std::result::Result<(), Vec<ValidationError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
