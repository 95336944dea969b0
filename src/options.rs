//! Processing options configuration.

use std::path::{Path, PathBuf};

/// Name of the folder that receives unprotected copies.
pub const OUTPUT_DIR_NAME: &str = "docxfreed";

/// File name prefix for unprotected copies.
pub const OUTPUT_PREFIX: &str = "unprotected-";

/// How entries other than the settings part reach the new archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyMode {
    /// Copy compressed data and headers verbatim
    #[default]
    Raw,
    /// Decompress and re-encode with the same compression method
    Recompress,
}

/// What batch traversal does when a single document fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the whole run at the first failing document
    #[default]
    Abort,
    /// Record the failure and move on to the next document
    Continue,
}

/// Options for processing one document.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// How untouched entries are copied
    pub copy_mode: CopyMode,

    /// Only report whether protection is present, never write
    pub dry_run: bool,
}

impl ProcessOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the copy mode.
    pub fn with_copy_mode(mut self, mode: CopyMode) -> Self {
        self.copy_mode = mode;
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }
}

/// Options for processing a directory tree.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum traversal depth; the starting directory is depth 1
    pub max_depth: usize,

    /// Output folder created inside every scanned directory
    pub output_dir_name: String,

    /// Failure handling for individual documents
    pub error_policy: ErrorPolicy,

    /// Per-document options
    pub process: ProcessOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            output_dir_name: OUTPUT_DIR_NAME.to_string(),
            error_policy: ErrorPolicy::default(),
            process: ProcessOptions::default(),
        }
    }
}

impl BatchOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum traversal depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the output folder name.
    pub fn with_output_dir_name(mut self, name: impl Into<String>) -> Self {
        self.output_dir_name = name.into();
        self
    }

    /// Set the error policy.
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Set the per-document options.
    pub fn with_process_options(mut self, options: ProcessOptions) -> Self {
        self.process = options;
        self
    }
}

/// Path of the unprotected copy of `file_name` inside `output_dir`.
pub fn output_path_for(output_dir: impl AsRef<Path>, file_name: &str) -> PathBuf {
    output_dir
        .as_ref()
        .join(format!("{}{}", OUTPUT_PREFIX, file_name))
}
