//! # Inspector Errors

use std::io;

use thiserror::Error;

/// Result type for inspector operations
pub type InspectResult<T> = Result<T, InspectError>;

/// Template parsing errors. Templates are parsed once, at server start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Template has no {{{{#rows}}}} ... {{{{/rows}}}} block")]
    MissingRowBlock,

    #[error("Template has more than one row block")]
    DuplicateRowBlock,

    #[error("Unknown placeholder '{name}' in {section}")]
    UnknownPlaceholder { name: String, section: &'static str },

    #[error("Unterminated placeholder at byte {0}")]
    Unterminated(usize),
}

/// Inspector errors
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Failed to bind inspector on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to start inspector runtime: {0}")]
    Runtime(#[source] io::Error),

    #[error("Inspector listener exited before reporting its address")]
    ListenerLost,

    #[error("Invalid inspector template: {0}")]
    Template(#[from] TemplateError),

    #[error("Invalid inspector configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_display() {
        assert_eq!(
            TemplateError::MissingRowBlock.to_string(),
            "Template has no {{#rows}} ... {{/rows}} block"
        );
        let err = TemplateError::UnknownPlaceholder {
            name: "bogus".to_string(),
            section: "row",
        };
        assert_eq!(err.to_string(), "Unknown placeholder 'bogus' in row");
    }

    #[test]
    fn test_bind_error_mentions_address() {
        let err = InspectError::Bind {
            addr: "127.0.0.1:9999".to_string(),
            source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
        };
        assert!(err.to_string().contains("127.0.0.1:9999"));
    }
}
