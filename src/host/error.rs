//! Host error types
//!
//! Error types for misuse of the host boundary. Nothing in the relay or
//! duplicator core is fatal; these only surface from graph edits and bus
//! lookups.

/// Error type for host operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// No descriptor registered under this type id
    UnknownSourceType(String),
    /// A source with this name already exists
    DuplicateName(String),
    /// The source exists but is not a filter
    NotAFilter(String),
    /// The type id names a filter, not an input source
    NotAnInput(String),
    /// Signal was never declared on this handler
    UnknownSignal(String),
    /// Procedure was never added to this handler
    UnknownProc(String),
    /// No source with this name
    SourceNotFound(String),
}

impl std::fmt::Display for HostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HostError::UnknownSourceType(id) => write!(f, "Unknown source type: {}", id),
            HostError::DuplicateName(name) => write!(f, "Source name already in use: {}", name),
            HostError::NotAFilter(name) => write!(f, "Source is not a filter: {}", name),
            HostError::NotAnInput(id) => write!(f, "Source type is not an input: {}", id),
            HostError::UnknownSignal(name) => write!(f, "Unknown signal: {}", name),
            HostError::UnknownProc(name) => write!(f, "Unknown procedure: {}", name),
            HostError::SourceNotFound(name) => write!(f, "Source not found: {}", name),
        }
    }
}

impl std::error::Error for HostError {}

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;
