//! Error types for the IBIS and IBIS-AMI parsers.
//!
//! This module provides a unified error type [`IbisAmiError`] that covers
//! every condition that stops a parse from producing a usable tree: syntax
//! errors, missing required structure, and failed lookups on a parsed tree.
//!
//! Non-fatal findings are not errors; they are collected as
//! [`Diagnostics`](crate::diagnostics::Diagnostics) alongside a successful result.

use thiserror::Error;

use crate::lexer::Position;

/// Result type alias using [`IbisAmiError`].
pub type Result<T> = std::result::Result<T, IbisAmiError>;

/// Unified error type for all parsing operations.
#[derive(Error, Debug)]
pub enum IbisAmiError {
    // ============ Syntax Errors ============
    /// Malformed token sequence
    #[error("Syntax error at line {line}, column {column} (offset {offset}): expected {expected}, found {found}")]
    Syntax {
        offset: usize,
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },

    /// Number carrying a suffix outside the engineering-unit table
    #[error("Unrecognized numerical suffix '{suffix}' at line {line}, column {column}")]
    UnknownSuffix {
        suffix: String,
        offset: usize,
        line: usize,
        column: usize,
    },

    /// Expression nesting beyond the configured limit
    #[error("Expression nesting exceeds {max_depth} levels at line {line}")]
    NestingTooDeep { max_depth: usize, line: usize },

    // ============ Structural Errors ============
    /// Required AMI group missing, or root is not a group
    #[error("Malformed AMI file: {message}")]
    MalformedAmiFile { message: String },

    /// Required IBIS keyword or model section missing
    #[error("Malformed IBIS file: {message}")]
    MalformedIbisFile { message: String },

    /// AMI parameter definition that cannot be materialized
    #[error("Invalid AMI parameter '{name}': {message}")]
    AmiParam { name: String, message: String },

    // ============ Tree Access Errors ============
    /// No entry at the given path
    #[error("No parameter found at '{path}'")]
    ParameterNotFound { path: String },

    /// Path resolves to a group, not a parameter
    #[error("'{path}' is a parameter group, not a parameter")]
    NotAParameter { path: String },

    /// Value does not fit the parameter's declared type
    #[error("Value {found} does not match type {expected} of parameter '{name}'")]
    ValueTypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    // ============ I/O Errors ============
    /// Error reading a model or parameter file
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IbisAmiError {
    /// Create a syntax error at the given position
    pub fn syntax(pos: Position, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Syntax {
            offset: pos.offset,
            line: pos.line,
            column: pos.column,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an unknown-suffix error at the given position
    pub fn unknown_suffix(pos: Position, suffix: impl Into<String>) -> Self {
        Self::UnknownSuffix {
            suffix: suffix.into(),
            offset: pos.offset,
            line: pos.line,
            column: pos.column,
        }
    }

    /// Create a malformed AMI file error
    pub fn malformed_ami(message: impl Into<String>) -> Self {
        Self::MalformedAmiFile {
            message: message.into(),
        }
    }

    /// Create a malformed IBIS file error
    pub fn malformed_ibis(message: impl Into<String>) -> Self {
        Self::MalformedIbisFile {
            message: message.into(),
        }
    }

    /// Create an AMI parameter error
    pub fn ami_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AmiParam {
            name: name.into(),
            message: message.into(),
        }
    }

    /// True for errors raised by the grammar itself (no tree was built).
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. } | Self::UnknownSuffix { .. } | Self::NestingTooDeep { .. }
        )
    }

    /// Character offset of the failure, for grammar errors.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Syntax { offset, .. } | Self::UnknownSuffix { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}
