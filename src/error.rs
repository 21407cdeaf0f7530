use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Result with anyhow::Error as the error type.
/// This provides a consistent error handling pattern across the codebase.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Exit codes for the CLI application.
///
/// These codes let wrapping scripts distinguish argument mistakes from
/// pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - all requested stages completed
    Success = 0,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (structural input problem, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Structural errors for the report pipeline.
///
/// These are the fatal conditions of the pipeline contract: a run aborts on
/// any of them and no partial output is left behind. Data-quality issues
/// (bad dates, missing owners, odd severity codes) are handled inline with
/// sentinels and never surface here.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Input directory not found: {path}\nReason: {reason}\n\n💡 Hint: Please pass a directory that contains the raw scanner exports")]
    InvalidInputDir { path: PathBuf, reason: String },

    #[error("Classified export not found: {path}\n\n💡 Hint: Run the scan stage first, or check that a raw export matching the '{tag}' layout is present in the scan directory")]
    ClassifiedFileMissing { path: PathBuf, tag: String },

    #[error("Two files matched the '{tag}' fingerprint: {first} and {second}\n\n💡 Hint: Remove the stale export so exactly one file per format remains")]
    DuplicateClassification {
        tag: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Expected exactly {expected} CSV files in {dir}, but found {found}\n\n💡 Hint: The inventory snapshot directory must hold one export per pull, nothing else")]
    WrongFileCount {
        dir: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Column headers do not match between {first} and {second}\n\n💡 Hint: Only exports produced with the same report template can be merged")]
    HeaderMismatch { first: PathBuf, second: PathBuf },

    #[error("Required column '{column}' not found in {path}\n\n💡 Hint: Check that the export is the expected format and was not hand-edited")]
    MissingColumn { column: String, path: PathBuf },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },
}
