use std::path::PathBuf;

/// A central error enum for profile-store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A profile field violates one of the profile invariants.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("profile '{0}' already exists (use `update` to change it)")]
    DuplicateName(String),

    #[error("profile '{0}' not found")]
    NotFound(String),

    /// The backing file exists but cannot be trusted. It is never overwritten.
    #[error("store file {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("unable to locate the user config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Process exit status for this error kind.
    ///
    /// | kind            | code |
    /// |-----------------|------|
    /// | I/O, no config  | 1    |
    /// | validation      | 3    |
    /// | duplicate name  | 4    |
    /// | not found       | 5    |
    /// | corrupt store   | 6    |
    ///
    /// Code 2 is left to the argument parser for usage errors.
    pub fn exit_code(&self) -> u8 {
        match self {
            StoreError::Io(_) | StoreError::NoConfigDir => 1,
            StoreError::Validation { .. } => 3,
            StoreError::DuplicateName(_) => 4,
            StoreError::NotFound(_) => 5,
            StoreError::Corrupt { .. } => 6,
        }
    }
}
