use covenant_kernel::CatalogError;

/// A source text that could not be read as interface declarations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number.
    pub line: usize,
    /// The interface whose header was being read, if any.
    pub interface: Option<String>,
    pub reason: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            interface: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn within(mut self, interface: &str) -> Self {
        self.interface.get_or_insert_with(|| interface.to_string());
        self
    }
}

impl From<ParseError> for CatalogError {
    fn from(err: ParseError) -> Self {
        CatalogError::MalformedDeclaration {
            interface: err.interface.clone().unwrap_or_else(|| "<source>".to_string()),
            reason: err.to_string(),
        }
    }
}
