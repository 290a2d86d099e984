//! Error types for zonal operations.

use thiserror::Error;

use crate::tree::NodeId;

/// Errors that can occur while building, labeling, or persisting trees.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Any failure during zone tree construction, wrapping the original cause.
    #[error("zone tree construction failed: {0}")]
    Construction(#[source] Box<Error>),

    #[error("node {0} is not present in the tree")]
    MissingNode(NodeId),

    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),

    #[error("tree has not been linked")]
    NotLinked,

    #[error("tree has already been linked")]
    AlreadyLinked,

    #[error("tree has no root node")]
    MissingRoot,

    #[error("inconsistent tree: {0}")]
    InvalidTree(String),

    #[error("feature '{name}' holds a {found} value, not {expected}")]
    FeatureType {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("no feature named '{0}'")]
    UnknownFeature(String),

    #[error("no style named '{0}'")]
    UnknownStyle(String),

    #[error("text offsets {0}..{1} are out of range")]
    SpanOutOfRange(u32, u32),

    #[error("invalid document: {0}")]
    Deserialize(String),
}

pub type Result<T> = std::result::Result<T, Error>;
