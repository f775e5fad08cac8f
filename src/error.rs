/// Error types for sqlx-path-bind
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The wrapped function does not have a bindable shape
    #[error("Invalid function signature: {0}")]
    InvalidSignature(String),

    /// A `::` pair with nothing between the delimiters
    #[error("Empty variable declaration at position {offset}")]
    EmptyVariableDeclaration { offset: usize },

    /// The query ended inside a placeholder
    #[error("Missing a closing : somewhere: {query}")]
    UnterminatedPlaceholder { query: String },

    /// Placeholder text contained no identifier at all
    #[error("Identifiers cannot be empty: '{0}'")]
    EmptyIdentifier(String),

    /// Semicolons are never allowed in a placeholder
    #[error("; is not allowed in an identifier: {0}")]
    IllegalCharacter(String),

    /// Leading, trailing or doubled `.` in a placeholder path
    #[error("Identifier cannot start or end with . or have two . in a row: {0}")]
    MalformedPath(String),

    /// A character that is neither part of an identifier nor a `.`
    #[error("Invalid character found in identifier: {0}")]
    InvalidIdentifierCharacter(String),

    /// Two identifiers next to each other without a `.`
    #[error(". missing between parts of an identifier: {0}")]
    MissingPathSeparator(String),

    /// Placeholder names a parameter that was never declared
    #[error("Query parameter {0} cannot be found in the incoming parameters")]
    UnknownParameter(String),

    /// Placeholder has a path but the parameter is neither a record nor a mapping
    #[error("Query parameter {0} has a path, but the incoming parameter is not a map or a record")]
    PathOnNonStructuredParameter(String),

    /// The path does not address anything inside the parameter
    #[error("Cannot resolve path '{path}': {reason}")]
    UnresolvablePath { path: String, reason: String },

    /// No argument was supplied for a referenced parameter position
    #[error("No argument supplied for parameter position {0}")]
    MissingArgument(usize),

    /// A collection placeholder was bound to something other than a list
    #[error("Query parameter {0} expands to a list, but the argument is not an array")]
    NotACollection(String),

    /// Error while reading a query catalog
    #[error("Failed to parse query catalog: {0}")]
    Config(#[from] toml::de::Error),

    /// Error from SQLx database operations
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Error {
    pub(crate) fn unresolvable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvablePath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for sqlx-path-bind operations
pub type Result<T> = std::result::Result<T, Error>;
