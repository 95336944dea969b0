//! Container sniffing for Office documents.
//!
//! A regular `.docx` is a ZIP archive. A password-protected one is wrapped
//! in an OLE compound file holding the encrypted package, which this crate
//! cannot process. Legacy binary `.doc` files use the same OLE container.

use crate::error::{Error, Result};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// ZIP local file header magic: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// ZIP end of central directory magic, the first bytes of an empty archive.
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// OLE compound file (CFB) magic.
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Detected container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// ZIP archive (a regular OOXML package)
    Zip,
    /// OLE compound file (encrypted OOXML or legacy binary format)
    Cfb,
    /// Anything else
    Unknown,
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContainerKind::Zip => "ZIP archive",
            ContainerKind::Cfb => "OLE compound file",
            ContainerKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Detect the container kind from the leading bytes of a file.
pub fn detect_container_from_bytes(data: &[u8]) -> ContainerKind {
    if data.starts_with(&CFB_MAGIC) {
        ContainerKind::Cfb
    } else if data.starts_with(&ZIP_MAGIC) || data.starts_with(&ZIP_EMPTY_MAGIC) {
        ContainerKind::Zip
    } else {
        ContainerKind::Unknown
    }
}

/// Detect the container kind of a file on disk.
///
/// Only the first eight bytes are read.
pub fn detect_container_from_path(path: impl AsRef<Path>) -> Result<ContainerKind> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::open(path, e))?;

    let mut header = Vec::with_capacity(CFB_MAGIC.len());
    file.take(CFB_MAGIC.len() as u64)
        .read_to_end(&mut header)
        .map_err(|e| Error::open(path, e))?;

    let kind = detect_container_from_bytes(&header);
    debug!("{}: {}", path.display(), kind);
    Ok(kind)
}

/// Stream names of an ECMA-376 encrypted package.
const ENCRYPTION_INFO_STREAM: &str = "/EncryptionInfo";
const ENCRYPTED_PACKAGE_STREAM: &str = "/EncryptedPackage";

/// Whether an OLE compound file holds an encrypted OOXML package rather
/// than a legacy binary document.
pub fn is_encrypted_package(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::open(path, e))?;
    let compound = cfb::CompoundFile::open(file).map_err(|e| Error::open(path, e))?;

    Ok(compound.exists(ENCRYPTION_INFO_STREAM) && compound.exists(ENCRYPTED_PACKAGE_STREAM))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_zip() {
        assert_eq!(
            detect_container_from_bytes(b"PK\x03\x04\x14\x00\x06\x00"),
            ContainerKind::Zip
        );
        assert_eq!(
            detect_container_from_bytes(b"PK\x05\x06\x00\x00"),
            ContainerKind::Zip
        );
    }

    #[test]
    fn test_detect_cfb() {
        assert_eq!(detect_container_from_bytes(&CFB_MAGIC), ContainerKind::Cfb);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(detect_container_from_bytes(b""), ContainerKind::Unknown);
        assert_eq!(detect_container_from_bytes(b"PK"), ContainerKind::Unknown);
        assert_eq!(
            detect_container_from_bytes(b"%PDF-1.7"),
            ContainerKind::Unknown
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(ContainerKind::Zip.to_string(), "ZIP archive");
        assert_eq!(ContainerKind::Cfb.to_string(), "OLE compound file");
        assert_eq!(ContainerKind::Unknown.to_string(), "unknown");
    }

    fn write_compound(path: &Path, streams: &[&str]) {
        let mut compound = cfb::CompoundFile::create(File::create(path).unwrap()).unwrap();
        for name in streams {
            let mut stream = compound.create_stream(name).unwrap();
            std::io::Write::write_all(&mut stream, b"\x04\x00\x04\x00").unwrap();
        }
        compound.flush().unwrap();
    }

    #[test]
    fn test_encrypted_package_streams() {
        let dir = tempfile::TempDir::new().unwrap();

        let encrypted = dir.path().join("secret.docx");
        write_compound(&encrypted, &[ENCRYPTION_INFO_STREAM, ENCRYPTED_PACKAGE_STREAM]);
        assert_eq!(detect_container_from_path(&encrypted).unwrap(), ContainerKind::Cfb);
        assert!(is_encrypted_package(&encrypted).unwrap());

        let legacy = dir.path().join("legacy.docx");
        write_compound(&legacy, &["/WordDocument", "/1Table"]);
        assert_eq!(detect_container_from_path(&legacy).unwrap(), ContainerKind::Cfb);
        assert!(!is_encrypted_package(&legacy).unwrap());
    }

    #[test]
    fn test_truncated_compound_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("truncated.docx");
        let mut data = CFB_MAGIC.to_vec();
        data.resize(64, 0);
        std::fs::write(&path, data).unwrap();

        let err = is_encrypted_package(&path).unwrap_err();
        assert!(matches!(err, Error::ArchiveOpen { .. }));
    }

    #[test]
    fn test_detect_missing_file() {
        let err = detect_container_from_path("does/not/exist.docx").unwrap_err();
        assert!(matches!(err, Error::ArchiveOpen { .. }));
    }
}
