//! ZIP archive access and rewriting for OOXML packages.

use crate::error::{Error, Result};
use crate::options::CopyMode;
use log::debug;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// An entry as listed in the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Entry name (slash-separated path)
    pub name: String,
    /// Compression method used for the entry
    pub compression: CompressionMethod,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// A `.docx` package opened for reading.
///
/// The file is read through a buffered handle; entry data is only
/// decompressed when requested, one entry at a time.
pub struct DocxArchive {
    archive: ZipArchive<BufReader<File>>,
    path: PathBuf,
}

impl DocxArchive {
    /// Open a package from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use docxfree::DocxArchive;
    ///
    /// let archive = DocxArchive::open("document.docx")?;
    /// println!("{} entries", archive.len());
    /// # Ok::<(), docxfree::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::open(path, e))?;
        let archive = ZipArchive::new(BufReader::new(file)).map_err(|e| Error::open(path, e))?;
        Ok(Self {
            archive,
            path: path.to_path_buf(),
        })
    }

    /// Path the archive was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Find an entry by exact, case-sensitive name.
    pub fn locate(&self, name: &str) -> Option<usize> {
        self.archive.index_for_name(name)
    }

    /// List all entries in central directory order.
    pub fn entries(&mut self) -> Result<Vec<EntryInfo>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let entry = self
                .archive
                .by_index_raw(index)
                .map_err(|e| Error::read(format!("#{}", index), e))?;
            entries.push(EntryInfo {
                name: entry.name().to_string(),
                compression: entry.compression(),
                size: entry.size(),
            });
        }
        Ok(entries)
    }

    /// Whether the entry at `index` uses ZIP encryption.
    pub fn is_encrypted(&mut self, index: usize) -> Result<bool> {
        let entry = self
            .archive
            .by_index_raw(index)
            .map_err(|e| Error::read(format!("#{}", index), e))?;
        Ok(entry.encrypted())
    }

    /// Decompress the entry at `index` into memory.
    pub fn extract(&mut self, index: usize) -> Result<Vec<u8>> {
        let mut entry = self
            .archive
            .by_index(index)
            .map_err(|e| Error::read(format!("#{}", index), e))?;
        let name = entry.name().to_string();

        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .map_err(|e| Error::read(name, e))?;
        Ok(data)
    }

    /// Write a copy of this archive to `destination`, with the content of
    /// `entry_name` replaced by `payload`.
    ///
    /// Every entry keeps its name, position and compression method. The
    /// archive is assembled in a temporary file next to `destination` and
    /// renamed into place once complete, so a failed write never leaves a
    /// truncated file at `destination`.
    pub fn rewrite(
        &mut self,
        entry_name: &str,
        payload: &[u8],
        destination: &Path,
        mode: CopyMode,
    ) -> Result<()> {
        let parent = match destination.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut builder = tempfile::Builder::new();
        builder.prefix(".docxfree-").suffix(".tmp");
        // Same mode as a freshly created file; umask still applies.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let mut temp = builder
            .tempfile_in(parent)
            .map_err(|e| Error::write(destination, e))?;

        {
            let mut writer = ZipWriter::new(BufWriter::new(temp.as_file_mut()));
            for index in 0..self.archive.len() {
                self.copy_entry(&mut writer, index, entry_name, payload, destination, mode)?;
            }
            let buffered = writer.finish().map_err(|e| Error::write(destination, e))?;
            buffered
                .into_inner()
                .map_err(|e| Error::write(destination, e.error()))?;
        }

        temp.as_file()
            .sync_all()
            .map_err(|e| Error::write(destination, e))?;
        temp.persist(destination)
            .map_err(|e| Error::write(destination, e.error))?;

        debug!(
            "wrote {} entries from {} to {}",
            self.len(),
            self.path().display(),
            destination.display()
        );
        Ok(())
    }

    fn copy_entry<W: Write + Seek>(
        &mut self,
        writer: &mut ZipWriter<W>,
        index: usize,
        replace: &str,
        payload: &[u8],
        destination: &Path,
        mode: CopyMode,
    ) -> Result<()> {
        let raw = self
            .archive
            .by_index_raw(index)
            .map_err(|e| Error::read(format!("#{}", index), e))?;
        let name = raw.name().to_string();

        if name == replace {
            let options = entry_options(
                raw.compression(),
                payload.len() as u64,
                raw.unix_mode(),
                raw.last_modified(),
            );
            drop(raw);

            writer
                .start_file(name.as_str(), options)
                .map_err(|e| entry_write_error(destination, &name, e))?;
            writer
                .write_all(payload)
                .map_err(|e| entry_write_error(destination, &name, e))?;
            debug!("replaced {} ({} bytes)", name, payload.len());
            return Ok(());
        }

        match mode {
            CopyMode::Raw => {
                let encrypted = raw.encrypted();
                drop(raw);
                if !encrypted {
                    self.verify_entry(index, &name, destination)?;
                }

                let raw = self
                    .archive
                    .by_index_raw(index)
                    .map_err(|e| Error::read(name.as_str(), e))?;
                writer
                    .raw_copy_file(raw)
                    .map_err(|e| entry_write_error(destination, &name, e))?;
                debug!("copied {} verbatim", name);
                Ok(())
            }
            CopyMode::Recompress => {
                drop(raw);
                self.recompress_entry(writer, index, destination)
            }
        }
    }

    /// Decompress an entry without keeping it, so a damaged stream or CRC
    /// mismatch is reported before its raw bytes are copied.
    fn verify_entry(&mut self, index: usize, name: &str, destination: &Path) -> Result<()> {
        let mut entry = self
            .archive
            .by_index(index)
            .map_err(|e| Error::read(name, e))?;
        copy_stream(&mut entry, &mut io::sink(), name, destination)?;
        Ok(())
    }

    fn recompress_entry<W: Write + Seek>(
        &mut self,
        writer: &mut ZipWriter<W>,
        index: usize,
        destination: &Path,
    ) -> Result<()> {
        let mut entry = self
            .archive
            .by_index(index)
            .map_err(|e| Error::read(format!("#{}", index), e))?;
        let name = entry.name().to_string();
        let options = entry_options(
            entry.compression(),
            entry.size(),
            entry.unix_mode(),
            entry.last_modified(),
        );

        if entry.is_dir() {
            writer
                .add_directory(name.as_str(), options)
                .map_err(|e| entry_write_error(destination, &name, e))?;
            return Ok(());
        }

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| entry_write_error(destination, &name, e))?;
        let copied = copy_stream(&mut entry, writer, &name, destination)?;
        debug!("recompressed {} ({} bytes)", name, copied);
        Ok(())
    }
}

impl std::fmt::Debug for DocxArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxArchive")
            .field("path", &self.path)
            .field("entries", &self.archive.len())
            .finish()
    }
}

fn entry_options(
    method: CompressionMethod,
    size: u64,
    unix_mode: Option<u32>,
    modified: Option<DateTime>,
) -> SimpleFileOptions {
    let mut options = SimpleFileOptions::default()
        .compression_method(method)
        .large_file(size >= u32::MAX as u64);
    if let Some(mode) = unix_mode {
        options = options.unix_permissions(mode);
    }
    if let Some(modified) = modified {
        options = options.last_modified_time(modified);
    }
    options
}

fn entry_write_error(destination: &Path, entry: &str, err: impl std::fmt::Display) -> Error {
    Error::write(destination, format!("{}: {}", entry, err))
}

/// Stream an entry into the writer, keeping read and write failures apart.
fn copy_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    entry: &str,
    destination: &Path,
) -> Result<u64> {
    let mut buf = vec![0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::read(entry, e)),
        };
        writer
            .write_all(&buf[..n])
            .map_err(|e| entry_write_error(destination, entry, e))?;
        total += n as u64;
    }
    Ok(total)
}
