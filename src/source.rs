//! Opening of the input container.
//!
//! The format is picked from the leading magic bytes of the file, falling back
//! to the file extension when they are not recognised:
//! - zip (`.zip`): the first member of the archive is scanned
//! - gzip (`.gz`): a (possibly multi-member) gzip stream
//! - anything else: plain text
//!
//! Sources which advertise zero bytes up front are rejected before scanning.
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Read buffer size used for all source formats
const READ_BUFFER_LEN: usize = 1024 * 1024;

/// Local file header, the start of any non-empty zip archive
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// End of central directory, the start of an archive without members
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
const GZIP_MAGIC: &[u8] = b"\x1f\x8b";
const MAGIC_LEN: u64 = 4;

/// Container formats supported by `open`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Zip,
    Gzip,
    Plain,
}

impl Format {
    /// Return format of `path` based on its extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(e) if e.eq_ignore_ascii_case("zip") => Format::Zip,
            Some(e) if e.eq_ignore_ascii_case("gz") => Format::Gzip,
            _ => Format::Plain,
        }
    }

    /// Return format announced by the leading bytes of a file, if any
    pub fn from_magic(magic: &[u8]) -> Option<Self> {
        if magic.starts_with(ZIP_MAGIC) || magic.starts_with(ZIP_EMPTY_MAGIC) {
            Some(Format::Zip)
        } else if magic.starts_with(GZIP_MAGIC) {
            Some(Format::Gzip)
        } else {
            None
        }
    }
}

/// Opened source handed to the scanning closure
pub struct Input<'a> {
    /// Human readable name of the scanned stream
    pub name: String,
    /// Uncompressed length, when the container advertises it
    pub len: Option<u64>,
    /// Decompressed line-oriented stream
    pub reader: Box<dyn BufRead + 'a>,
}

/// Open `path` and pass the decompressed stream to `scan`.
///
/// The stream may borrow from the opened container, so it is only
/// available for the duration of `scan`.
pub fn open<T, F>(path: &Path, scan: F) -> Result<T>
where
    F: FnOnce(Input<'_>) -> Result<T>,
{
    let open_err = |source: std::io::Error| Error::Open {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(open_err)?;
    let file_len = file.metadata().map_err(open_err)?.len();
    if file_len == 0 {
        return Err(Error::EmptySource {
            name: path.display().to_string(),
        });
    }

    let mut magic = Vec::with_capacity(MAGIC_LEN as usize);
    (&mut file)
        .take(MAGIC_LEN)
        .read_to_end(&mut magic)
        .map_err(open_err)?;
    file.rewind().map_err(open_err)?;

    let format = Format::from_magic(&magic).unwrap_or_else(|| Format::from_path(path));
    debug!(path = %path.display(), ?format, "opening source");

    match format {
        Format::Zip => {
            let archive_err = |source: zip::result::ZipError| Error::Archive {
                path: path.to_path_buf(),
                source,
            };
            let mut archive = ZipArchive::new(file).map_err(archive_err)?;
            if archive.len() == 0 {
                return Err(Error::EmptySource {
                    name: path.display().to_string(),
                });
            }
            let member = archive.by_index(0).map_err(archive_err)?;
            let name = format!("{}:{}", path.display(), member.name());
            let len = member.size();
            if len == 0 {
                return Err(Error::EmptySource { name });
            }
            debug!(%name, len, "scanning first archive member");
            scan(Input {
                name,
                len: Some(len),
                reader: Box::new(BufReader::with_capacity(READ_BUFFER_LEN, member)),
            })
        }
        Format::Gzip => scan(Input {
            name: path.display().to_string(),
            len: None,
            reader: Box::new(BufReader::with_capacity(
                READ_BUFFER_LEN,
                MultiGzDecoder::new(file),
            )),
        }),
        Format::Plain => scan(Input {
            name: path.display().to_string(),
            len: Some(file_len),
            reader: Box::new(BufReader::with_capacity(READ_BUFFER_LEN, file)),
        }),
    }
}
