//! Processing of a single document.

use crate::archive::DocxArchive;
use crate::detect::{detect_container_from_path, is_encrypted_package, ContainerKind};
use crate::error::Result;
use crate::options::ProcessOptions;
use crate::protection::strip_protection;
use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Archive path of the document settings part.
pub const SETTINGS_PART: &str = "word/settings.xml";

/// Result of processing one document.
///
/// Only [`Outcome::Removed`] writes a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Protection was removed and the copy written to `output`
    Removed { output: PathBuf },
    /// Protection is present; nothing was written (dry run)
    ProtectionFound { output: PathBuf },
    /// The package has no settings part
    NoSettingsPart,
    /// The settings part carries no protection element
    NoProtection,
    /// The package is encrypted and cannot be modified
    Encrypted,
    /// An OLE compound file that is not an encrypted package (binary `.doc`)
    LegacyFormat,
}

impl Outcome {
    /// Whether a new file was written.
    pub fn is_written(&self) -> bool {
        matches!(self, Outcome::Removed { .. })
    }

    /// Human-readable summary.
    pub fn message(&self) -> String {
        match self {
            Outcome::Removed { output } => format!(
                "Successfully removed protection and created: {}",
                output.display()
            ),
            Outcome::ProtectionFound { output } => format!(
                "Document protection found; would create: {}",
                output.display()
            ),
            Outcome::NoSettingsPart => {
                "No settings.xml found in the document. No changes were made.".to_string()
            }
            Outcome::NoProtection => {
                "No document protection found. No changes were made.".to_string()
            }
            Outcome::Encrypted => {
                "Document is encrypted and cannot be modified. No changes were made.".to_string()
            }
            Outcome::LegacyFormat => {
                "Document is a legacy binary Word file, not a .docx package. No changes were made."
                    .to_string()
            }
        }
    }
}

/// Remove document protection from `source`, writing the result to
/// `destination`.
///
/// Documents without a settings part or without protection, encrypted
/// packages and legacy binary files are successful no-op outcomes and
/// produce no file.
///
/// # Example
///
/// ```no_run
/// use docxfree::{process_file, Outcome, ProcessOptions};
///
/// let outcome = process_file(
///     "contract.docx",
///     "docxfreed/unprotected-contract.docx",
///     &ProcessOptions::default(),
/// )?;
/// if let Outcome::Removed { output } = outcome {
///     println!("wrote {}", output.display());
/// }
/// # Ok::<(), docxfree::Error>(())
/// ```
pub fn process_file(
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    options: &ProcessOptions,
) -> Result<Outcome> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    let outcome = process_inner(source, destination, options)?;
    info!("{}: {}", source.display(), outcome.message());
    Ok(outcome)
}

fn process_inner(source: &Path, destination: &Path, options: &ProcessOptions) -> Result<Outcome> {
    if detect_container_from_path(source)? == ContainerKind::Cfb {
        return if is_encrypted_package(source)? {
            Ok(Outcome::Encrypted)
        } else {
            Ok(Outcome::LegacyFormat)
        };
    }

    let mut archive = DocxArchive::open(source)?;
    debug!("{}: {} entries", archive.path().display(), archive.len());

    let index = match archive.locate(SETTINGS_PART) {
        Some(index) => index,
        None => return Ok(Outcome::NoSettingsPart),
    };

    if archive.is_encrypted(index)? {
        return Ok(Outcome::Encrypted);
    }

    let settings = archive.extract(index)?;
    debug!("{}: read {} bytes", SETTINGS_PART, settings.len());

    let stripped = strip_protection(&settings)?;
    if !stripped.found {
        return Ok(Outcome::NoProtection);
    }

    if options.dry_run {
        return Ok(Outcome::ProtectionFound {
            output: destination.to_path_buf(),
        });
    }

    archive.rewrite(SETTINGS_PART, &stripped.xml, destination, options.copy_mode)?;
    Ok(Outcome::Removed {
        output: destination.to_path_buf(),
    })
}
