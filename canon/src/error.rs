//! Error type shared by every stage of the writer pipeline.

use thiserror::Error;

/// Errors raised while configuring, accumulating, or emitting a graph.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Writer options failed validation before any graph processing began.
    #[error("invalid writer configuration: {0}")]
    Config(String),

    /// An IRI rewrite pattern is not a valid regular expression.
    #[error("invalid IRI pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A statement was built with a literal in subject position.
    #[error("a literal cannot be the subject of a statement: {0}")]
    LiteralSubject(String),

    /// A writer method was called in the wrong lifecycle state.
    #[error("cannot {operation} while the writer is {state}")]
    InvalidState {
        /// The state the writer was in.
        state: &'static str,
        /// The operation that was attempted.
        operation: &'static str,
    },

    /// Sorting gained or lost triples.
    #[error("sorted graph holds {sorted} triples but {unsorted} were accumulated")]
    SortInvariant {
        /// Triple count of the unsorted graph.
        unsorted: usize,
        /// Triple count of the sorted graph.
        sorted: usize,
    },

    /// A node detected as a collection could not be walked during rendering.
    #[error("malformed RDF collection at {0}")]
    MalformedCollection(String),

    /// A predicate has no XML qualified name form.
    #[error("predicate <{0}> cannot be written as an XML qualified name")]
    UnrepresentablePredicate(String),

    /// Input text could not be parsed.
    #[error("failed to parse {format} input: {message}")]
    Parse {
        /// Name of the input syntax.
        format: &'static str,
        /// Parser diagnostic.
        message: String,
    },

    /// The output sink failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FormatError>;
