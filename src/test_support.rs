//! Archive fixtures shared by unit tests.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub(crate) const SETTINGS_PROTECTED: &[u8] =
    br#"<w:settings xmlns:w="ns"><w:documentProtection w:edit="readOnly"/><w:other/></w:settings>"#;

pub(crate) const SETTINGS_UNPROTECTED: &[u8] = br#"<w:settings xmlns:w="ns"><w:other/></w:settings>"#;

pub(crate) fn write_zip(path: &Path, entries: &[(&str, CompressionMethod, &[u8])]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, method, data) in entries {
        let options = SimpleFileOptions::default().compression_method(*method);
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

/// Flip one byte of a stored payload in place so its CRC no longer matches.
pub(crate) fn corrupt_stored(path: &Path, payload: &[u8]) {
    let mut bytes = std::fs::read(path).unwrap();
    let pos = bytes
        .windows(payload.len())
        .position(|w| w == payload)
        .unwrap();
    bytes[pos] ^= 0x20;
    std::fs::write(path, &bytes).unwrap();
}

/// Write a minimal package whose settings part holds `settings`.
pub(crate) fn write_docx(path: &Path, settings: &[u8]) {
    write_zip(
        path,
        &[
            ("[Content_Types].xml", CompressionMethod::Deflated, b"<Types/>".as_slice()),
            ("word/document.xml", CompressionMethod::Deflated, b"<w:document/>".as_slice()),
            ("word/settings.xml", CompressionMethod::Deflated, settings),
        ],
    );
}

pub(crate) fn read_entries(path: &Path) -> Vec<(String, CompressionMethod, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            (entry.name().to_string(), entry.compression(), data)
        })
        .collect()
}
