//! Error types for parsing, rig loading and export.

use std::path::PathBuf;

/// Failure to read a pose file in one of the structured dialects.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// The repaired concatenated-record text is not valid structured data
    #[error("concatenated records are malformed: {source}")]
    Concatenated {
        #[source]
        source: serde_json::Error,
    },

    /// One line of a line-delimited file is not a valid record
    #[error("record on line {line} is malformed: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A record parsed but does not have the shape of a frame
    #[error("record {record} is not a frame: {source}")]
    Record {
        record: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure to build a skeleton from a rig description.
#[derive(thiserror::Error, Debug)]
pub enum RigError {
    #[error("bone {name:?} is defined twice")]
    DuplicateBone { name: String },

    #[error("bone {name:?} names unknown parent {parent:?}")]
    UnknownParent { name: String, parent: String },

    #[error("parent index {parent} of bone {name:?} is out of range")]
    ParentOutOfRange { name: String, parent: usize },

    #[error("failed to read rig {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rig description is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure while exporting keypoints.
#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("unknown keypoint name {0:?}")]
    UnknownName(String),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
