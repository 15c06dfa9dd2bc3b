use std::{collections::BTreeMap, fs, path::Path};

use log::debug;

use super::error::MetainfoError;
use crate::bencode::{decode, BValue};
use crate::torrent::calculate_info_hash;

type Dict = BTreeMap<Vec<u8>, BValue>;

/// A validated .torrent file.
///
/// Built once by [`Torrent::from_bvalue`] and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Torrent {
    pub announce: String,              // The tracker URL
    pub creation_date: Option<i64>,    // Unix seconds
    pub created_by: Option<String>,
    pub comment: Option<String>,
    pub info_hash: [u8; 20],           // SHA-1 of the bencoded info dictionary
    pub layout: Layout,                // Torrent metadata
}

/// How the content is laid out, chosen by the presence of `files` in `info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    SingleFile {
        name: String,
        length: u64,
        piece_length: u64,
        pieces: Vec<[u8; 20]>,
    },
    MultiFile {
        name: String, // suggested directory name
        piece_length: u64,
        pieces: Vec<[u8; 20]>,
        files: Vec<FileEntry>,
    },
}

/// One file of a multi-file torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: Vec<String>, // directories, then the file name
    pub length: u64,
}

impl Torrent {
    /// Reads a .torrent file from disk and parses its contents.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MetainfoError> {
        let path = path.as_ref();
        let buf = fs::read(path)?;
        debug!("read {} bytes from {}", buf.len(), path.display());

        Self::from_bytes(&buf)
    }

    /// Decodes raw bencoded bytes and projects them into a `Torrent`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetainfoError> {
        let value = decode(bytes)?;
        Self::from_bvalue(&value)
    }

    /// Creates a `Torrent` from a `BValue` (the result of a bencode parse).
    ///
    /// Stops at the first invalid field; no partial torrent is ever returned.
    pub fn from_bvalue(value: &BValue) -> Result<Self, MetainfoError> {
        let root_dict = value.as_dict().ok_or(MetainfoError::NotADictionary)?;
        let root = Fields::new(root_dict, String::new());

        let announce = root
            .lookup("announce")
            .and_then(BValue::to_string_lossy)
            .ok_or_else(|| MetainfoError::MissingField {
                name: "announce".to_string(),
            })?;

        let creation_date = root.optional_integer("creation date")?;
        let created_by = root.optional_string("created by")?;
        let comment = root.optional_string("comment")?;

        let info_value = root.lookup("info").ok_or(MetainfoError::MissingInfoField)?;
        let info_dict = info_value.as_dict().ok_or(MetainfoError::MissingInfoField)?;

        let layout = Layout::from_info(info_dict)?;
        let info_hash = calculate_info_hash(info_value);

        debug!(
            "parsed torrent '{}' ({} pieces, info hash {})",
            layout.name(),
            layout.pieces().len(),
            hex::encode(info_hash)
        );

        Ok(Torrent {
            announce,
            creation_date,
            created_by,
            comment,
            info_hash,
            layout,
        })
    }

    pub fn info_hash_hex(&self) -> String {
        hex::encode(self.info_hash)
    }

    pub fn name(&self) -> &str {
        self.layout.name()
    }

    pub fn piece_length(&self) -> u64 {
        self.layout.piece_length()
    }

    pub fn pieces(&self) -> &[[u8; 20]] {
        self.layout.pieces()
    }

    /// Bytes of content: the single file's length or the sum over all files.
    /// This is what a fresh download reports as `left` to the tracker.
    pub fn total_length(&self) -> u64 {
        match &self.layout {
            Layout::SingleFile { length, .. } => *length,
            Layout::MultiFile { files, .. } => files
                .iter()
                .fold(0u64, |total, file| total.saturating_add(file.length)),
        }
    }

    pub fn is_single_file(&self) -> bool {
        matches!(self.layout, Layout::SingleFile { .. })
    }
}

impl Layout {
    fn from_info(info: &Dict) -> Result<Self, MetainfoError> {
        let info = Fields::new(info, "info".to_string());

        let name = info.get_bytestring("name")?;
        let piece_length = info.get_integer("piece length")?;
        if piece_length <= 0 {
            return Err(info.invalid("piece length", "must be positive"));
        }
        let piece_length = piece_length as u64;
        let pieces = split_pieces(info.lookup_bytestring("pieces")?)?;

        match info.lookup("files") {
            Some(files) => {
                let files = parse_files(files, &info.name("files"))?;
                Ok(Layout::MultiFile {
                    name,
                    piece_length,
                    pieces,
                    files,
                })
            }
            None => {
                let length = info.get_length("length")?;
                Ok(Layout::SingleFile {
                    name,
                    length,
                    piece_length,
                    pieces,
                })
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Layout::SingleFile { name, .. } | Layout::MultiFile { name, .. } => name,
        }
    }

    pub fn piece_length(&self) -> u64 {
        match self {
            Layout::SingleFile { piece_length, .. } | Layout::MultiFile { piece_length, .. } => {
                *piece_length
            }
        }
    }

    pub fn pieces(&self) -> &[[u8; 20]] {
        match self {
            Layout::SingleFile { pieces, .. } | Layout::MultiFile { pieces, .. } => pieces,
        }
    }
}

/// Chunks the `pieces` string into 20-byte SHA-1 hashes.
fn split_pieces(bytes: &[u8]) -> Result<Vec<[u8; 20]>, MetainfoError> {
    if bytes.len() % 20 != 0 {
        return Err(MetainfoError::InvalidPieceLength { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(20)
        .map(|chunk| {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(chunk);
            hash
        })
        .collect())
}

fn parse_files(value: &BValue, name: &str) -> Result<Vec<FileEntry>, MetainfoError> {
    let entries = value.as_list().ok_or_else(|| wrong_type(name, "a list"))?;
    if entries.is_empty() {
        return Err(MetainfoError::InvalidFieldValue {
            name: name.to_string(),
            reason: "must not be empty",
        });
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| -> Result<FileEntry, MetainfoError> {
            let entry_name = format!("{name}[{i}]");
            let dict = entry
                .as_dict()
                .ok_or_else(|| wrong_type(&entry_name, "a dictionary"))?;
            let fields = Fields::new(dict, entry_name);

            let length = fields.get_length("length")?;

            let path_name = fields.name("path");
            let segments = fields
                .lookup("path")
                .ok_or_else(|| MetainfoError::MissingField {
                    name: path_name.clone(),
                })?
                .as_list()
                .ok_or_else(|| wrong_type(&path_name, "a list"))?;
            if segments.is_empty() {
                return Err(fields.invalid("path", "must not be empty"));
            }

            let path = segments
                .iter()
                .enumerate()
                .map(|(j, segment)| {
                    segment
                        .to_string_lossy()
                        .ok_or_else(|| wrong_type(&format!("{path_name}[{j}]"), "a string"))
                })
                .collect::<Result<Vec<_>, _>>()?;

            Ok(FileEntry { path, length })
        })
        .collect()
}

fn wrong_type(name: &str, expected: &'static str) -> MetainfoError {
    MetainfoError::WrongFieldType {
        name: name.to_string(),
        expected,
    }
}

/// Typed lookups into one dictionary. `prefix` is the dotted path of the
/// dictionary itself so errors can name nested fields, e.g. `info.files[2].path`.
struct Fields<'a> {
    dict: &'a Dict,
    prefix: String,
}

impl<'a> Fields<'a> {
    fn new(dict: &'a Dict, prefix: String) -> Self {
        Fields { dict, prefix }
    }

    fn name(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }

    fn invalid(&self, key: &str, reason: &'static str) -> MetainfoError {
        MetainfoError::InvalidFieldValue {
            name: self.name(key),
            reason,
        }
    }

    fn lookup(&self, key: &str) -> Option<&'a BValue> {
        self.dict.get(key.as_bytes())
    }

    fn require(&self, key: &str) -> Result<&'a BValue, MetainfoError> {
        self.lookup(key).ok_or_else(|| MetainfoError::MissingField {
            name: self.name(key),
        })
    }

    /// Raw bytes of a required ByteString field.
    fn lookup_bytestring(&self, key: &str) -> Result<&'a [u8], MetainfoError> {
        self.require(key)?
            .as_bytes()
            .ok_or_else(|| wrong_type(&self.name(key), "a string"))
    }

    /// A required ByteString field as text. Bytes that are not UTF-8 are
    /// replaced, not rejected.
    fn get_bytestring(&self, key: &str) -> Result<String, MetainfoError> {
        self.require(key)?
            .to_string_lossy()
            .ok_or_else(|| wrong_type(&self.name(key), "a string"))
    }

    fn get_integer(&self, key: &str) -> Result<i64, MetainfoError> {
        self.require(key)?
            .as_integer()
            .ok_or_else(|| wrong_type(&self.name(key), "an integer"))
    }

    /// A required byte count, which may be zero but not negative.
    fn get_length(&self, key: &str) -> Result<u64, MetainfoError> {
        let length = self.get_integer(key)?;
        u64::try_from(length).map_err(|_| self.invalid(key, "must not be negative"))
    }

    fn optional_integer(&self, key: &str) -> Result<Option<i64>, MetainfoError> {
        match self.lookup(key) {
            None => Ok(None),
            Some(value) => value
                .as_integer()
                .map(Some)
                .ok_or_else(|| wrong_type(&self.name(key), "an integer")),
        }
    }

    fn optional_string(&self, key: &str) -> Result<Option<String>, MetainfoError> {
        match self.lookup(key) {
            None => Ok(None),
            Some(value) => value
                .to_string_lossy()
                .map(Some)
                .ok_or_else(|| wrong_type(&self.name(key), "a string")),
        }
    }
}
