//! Error types for specification evaluation with actionable messages.
//!
//! Every failure carries an [`ErrorCode`] for programmatic handling plus
//! optional context (operation, entity, navigation) and suggestions.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: S{category}{number}
//! - 1xxx: Query errors (not found, not unique, invalid include)
//! - 2xxx: Include translation errors (descriptor, resolution, invocation)
//! - 5xxx: Execution errors (cancellation, data source failures)
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use sift_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::not_found("Order");
//! assert_eq!(err.code, ErrorCode::RecordNotFound);
//! assert_eq!(err.code.code(), "S1001");
//! ```

use std::fmt;
use thiserror::Error;

use crate::entity::TypeInfo;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Query errors (1xxx)
    /// Record not found (S1001).
    RecordNotFound = 1001,
    /// Multiple records found when expecting one (S1002).
    NotUnique = 1002,
    /// Invalid filter or where clause (S1003).
    InvalidFilter = 1003,
    /// The data source rejected an include step (S1004).
    InvalidInclude = 1004,

    // Include translation errors (2xxx)
    /// Include descriptor is malformed (S2001).
    InvalidDescriptor = 2001,
    /// No unique include translation matches the navigation shape (S2002).
    ResolutionFailure = 2002,
    /// The specialized include call failed or produced no query (S2003).
    InvocationFailure = 2003,

    // Execution errors (5xxx)
    /// Execution was cancelled by the caller (S5001).
    Cancelled = 5001,
    /// The data source failed while executing (S5002).
    DataSource = 5002,

    // Configuration errors (7xxx)
    /// Invalid configuration (S7001).
    InvalidConfiguration = 7001,

    // Internal errors (9xxx)
    /// Internal error (S9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "S2002").
    pub fn code(&self) -> String {
        format!("S{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::RecordNotFound => "Record not found",
            Self::NotUnique => "Multiple records found",
            Self::InvalidFilter => "Invalid filter condition",
            Self::InvalidInclude => "Invalid include",
            Self::InvalidDescriptor => "Invalid include descriptor",
            Self::ResolutionFailure => "Include translation could not be resolved",
            Self::InvocationFailure => "Include translation failed",
            Self::Cancelled => "Operation cancelled",
            Self::DataSource => "Data source error",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }

    /// Whether this code belongs to the include translation category.
    pub fn is_translation(&self) -> bool {
        matches!(
            self,
            Self::InvalidDescriptor | Self::ResolutionFailure | Self::InvocationFailure
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Suggestion for fixing an error.
#[derive(Debug, Clone)]
pub struct Suggestion {
    /// The suggestion text.
    pub text: String,
    /// Optional code example.
    pub code: Option<String>,
}

impl Suggestion {
    /// Create a new suggestion.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            code: None,
        }
    }

    /// Add a code example.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The entity involved.
    pub entity: Option<String>,
    /// The navigation path involved.
    pub navigation: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<Suggestion>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building or executing a query.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(suggestion));
        self
    }

    /// Add a code suggestion.
    pub fn with_code_suggestion(mut self, text: impl Into<String>, code: impl Into<String>) -> Self {
        self.context.suggestions.push(Suggestion::new(text).with_code(code));
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.context.entity = Some(entity.into());
        self
    }

    /// Set the navigation path.
    pub fn with_navigation(mut self, navigation: impl Into<String>) -> Self {
        self.context.navigation = Some(navigation.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// Create a not found error.
    pub fn not_found(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::RecordNotFound,
            format!("No {} record found matching the specification", entity),
        )
        .with_entity(&entity)
        .with_suggestion("Use first_or_default() to get None instead of an error")
    }

    /// Create a not unique error.
    pub fn not_unique(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(
            ErrorCode::NotUnique,
            format!("Expected a single {} record but found multiple", entity),
        )
        .with_entity(&entity)
        .with_suggestion("Add more specific criteria to narrow down to a single record")
        .with_suggestion("Use list() if you expect multiple results")
    }

    /// Create an error for an include step the data source cannot apply.
    pub fn invalid_include(
        entity: impl Into<String>,
        navigation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let entity = entity.into();
        let navigation = navigation.into();
        Self::new(
            ErrorCode::InvalidInclude,
            format!("Cannot include '{}' on {}: {}", navigation, entity, message.into()),
        )
        .with_entity(entity)
        .with_navigation(navigation)
        .with_suggestion("Chain then_include() directly after the include it continues")
    }

    /// Create an error for a malformed include descriptor.
    pub fn invalid_descriptor(navigation: impl Into<String>, message: impl Into<String>) -> Self {
        let navigation = navigation.into();
        Self::new(
            ErrorCode::InvalidDescriptor,
            format!("Invalid include descriptor '{}': {}", navigation, message.into()),
        )
        .with_navigation(navigation)
        .with_help("Build include descriptors through the specification builder")
    }

    /// Create an error for a navigation shape with no registered translation.
    pub fn unresolved_translation(entity: TypeInfo, property: TypeInfo) -> Self {
        Self::new(
            ErrorCode::ResolutionFailure,
            format!(
                "No include translation registered for {} -> {}",
                entity.name(),
                property.name()
            ),
        )
        .with_entity(entity.name())
        .with_code_suggestion(
            format!("Declare the navigation in {}::navigations()", entity.name()),
            format!("visitor.visit::<{}>(\"...\");", property.name()),
        )
    }

    /// Create an error for a navigation shape matched by several translations.
    pub fn ambiguous_translation(entity: TypeInfo, property: TypeInfo, matches: usize) -> Self {
        Self::new(
            ErrorCode::ResolutionFailure,
            format!(
                "Include translation for {} -> {} is ambiguous ({} candidates)",
                entity.name(),
                property.name(),
                matches
            ),
        )
        .with_entity(entity.name())
        .with_suggestion("Register at most one translation per navigation shape")
    }

    /// Create an error for a specialized include call that failed.
    pub fn invocation(navigation: impl Into<String>, message: impl Into<String>) -> Self {
        let navigation = navigation.into();
        Self::new(
            ErrorCode::InvocationFailure,
            format!("Include translation for '{}' failed: {}", navigation, message.into()),
        )
        .with_navigation(navigation)
    }

    /// Create a cancellation error.
    pub fn cancelled(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        Self::new(ErrorCode::Cancelled, format!("{} was cancelled", operation))
            .with_context(operation)
    }

    /// Create a data source error.
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataSource, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message)
            .with_help("Check sift.toml and the SIFT_* environment variables")
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    // ============== Error Checks ==============

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::RecordNotFound
    }

    /// Check if this error was raised while translating an include.
    pub fn is_translation_error(&self) -> bool {
        self.code.is_translation()
    }

    /// Check if this is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }

    /// Get the error code.
    pub fn error_code(&self) -> &ErrorCode {
        &self.code
    }

    /// Display the full error with context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = format!("Error [{}]: {}\n", self.code.code(), self.message);

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref entity) = self.context.entity {
            output.push_str(&format!("  → Entity: {}\n", entity));
        }
        if let Some(ref navigation) = self.context.navigation {
            output.push_str(&format!("  → Navigation: {}\n", navigation));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion.text));
                if let Some(ref code) = suggestion.code {
                    output.push_str(&format!("     {}\n", code.replace('\n', "\n     ")));
                }
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

/// Extension trait for converting errors to QueryError.
pub trait IntoQueryError {
    /// Convert to a QueryError.
    fn into_query_error(self) -> QueryError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoQueryError for E {
    fn into_query_error(self) -> QueryError {
        QueryError::internal(self.to_string()).with_source(self)
    }
}
