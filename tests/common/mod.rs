//! Synthetic package builders for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const PROTECTED_SETTINGS: &str = r#"<w:settings xmlns:w="ns"><w:documentProtection w:edit="readOnly"/><w:other/></w:settings>"#;
pub const UNPROTECTED_SETTINGS: &str = r#"<w:settings xmlns:w="ns"><w:other/></w:settings>"#;

/// One archive entry: name, compression method, payload.
pub type Entry = (String, CompressionMethod, Vec<u8>);

/// Entries of a realistic package with the given settings part.
pub fn package_entries(settings: &str) -> Vec<Entry> {
    // Pseudo-random bytes so the media entry does not compress to nothing.
    let mut state = 0x2545_f491u32;
    let image: Vec<u8> = (0..200_000)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();

    vec![
        (
            "[Content_Types].xml".to_string(),
            CompressionMethod::Deflated,
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Default Extension="png" ContentType="image/png"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>
</Types>"#
                .to_vec(),
        ),
        (
            "_rels/.rels".to_string(),
            CompressionMethod::Deflated,
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#
                .to_vec(),
        ),
        (
            "word/document.xml".to_string(),
            CompressionMethod::Deflated,
            br#"<w:document xmlns:w="ns"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#
                .to_vec(),
        ),
        (
            "word/settings.xml".to_string(),
            CompressionMethod::Deflated,
            settings.as_bytes().to_vec(),
        ),
        (
            "word/media/image1.png".to_string(),
            CompressionMethod::Stored,
            image,
        ),
        (
            "docProps/core.xml".to_string(),
            CompressionMethod::Stored,
            b"<cp:coreProperties/>".to_vec(),
        ),
    ]
}

pub fn write_package(path: &Path, entries: &[Entry]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, method, data) in entries {
        let options = SimpleFileOptions::default().compression_method(*method);
        zip.start_file(name.as_str(), options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap();
}

pub fn write_docx(path: &Path, settings: &str) {
    write_package(path, &package_entries(settings));
}

/// Flip one byte of a stored payload so reading it fails its CRC check.
pub fn corrupt_stored(path: &Path, payload: &[u8]) {
    let mut bytes = std::fs::read(path).unwrap();
    let pos = bytes
        .windows(payload.len())
        .position(|w| w == payload)
        .unwrap();
    bytes[pos] ^= 0x20;
    std::fs::write(path, &bytes).unwrap();
}

pub fn read_package(path: &Path) -> Vec<Entry> {
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
