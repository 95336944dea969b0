//! # docxfree
//!
//! Remove editing protection from Word documents.
//!
//! A `.docx` file is a ZIP package. Editing restrictions ("read only",
//! "filling in forms") are stored as a `documentProtection` element in the
//! `word/settings.xml` part. This library removes that element and writes a
//! copy of the package in which every other entry is carried over unchanged.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docxfree::{process_file, Outcome, ProcessOptions};
//!
//! match process_file("form.docx", "unprotected-form.docx", &ProcessOptions::default())? {
//!     Outcome::Removed { output } => println!("wrote {}", output.display()),
//!     other => println!("{}", other.message()),
//! }
//! # Ok::<(), docxfree::Error>(())
//! ```
//!
//! ## Batch Processing
//!
//! ```no_run
//! use docxfree::{process_directory, BatchOptions, ErrorPolicy};
//!
//! let options = BatchOptions::new()
//!     .with_max_depth(3)
//!     .with_error_policy(ErrorPolicy::Continue);
//!
//! let report = process_directory("shared/contracts", &options, |_| {})?;
//! println!("{} removed, {} failed", report.removed(), report.failed());
//! # Ok::<(), docxfree::Error>(())
//! ```
//!
//! ## Lower-Level APIs
//!
//! [`strip_protection`] works on raw XML bytes and [`DocxArchive`] exposes
//! the locate / extract / rewrite steps individually.

pub mod archive;
pub mod batch;
pub mod detect;
pub mod error;
pub mod options;
pub mod process;
pub mod protection;

#[cfg(test)]
mod test_support;

// Re-exports
pub use archive::{DocxArchive, EntryInfo};
pub use batch::{process_directory, BatchEvent, BatchReport, FileReport, DOCX_SUFFIX};
pub use detect::{
    detect_container_from_bytes, detect_container_from_path, is_encrypted_package, ContainerKind,
};
pub use error::{Error, Result};
pub use options::{
    output_path_for, BatchOptions, CopyMode, ErrorPolicy, ProcessOptions, OUTPUT_DIR_NAME,
    OUTPUT_PREFIX,
};
pub use process::{process_file, Outcome, SETTINGS_PART};
pub use protection::{strip_protection, Stripped, PROTECTION_ELEMENT};
