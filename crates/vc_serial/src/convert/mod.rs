//! Loading and saving top-level polymorphic values.
//!
//! ## Menu
//!
//! - [`Conversion`]: A text format able to sniff a type tag, decode and encode.
//! - [`Converter`]: Combines a [`Conversion`] with a [`Mapper`].
//! - [`JsonConversion`]: `serde_json` backed conversion (feature `json`).
//! - [`YamlConversion`]: `serde_yaml` backed conversion (feature `yaml`).
//!
//! Loading never decodes twice: the type name is sniffed from the raw text
//! with a line-oriented pattern, the source is rewound, and the value is decoded
//! once into a fresh instance of the named type.

// -----------------------------------------------------------------------------
// Modules

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "yaml")]
mod yaml;

// -----------------------------------------------------------------------------
// Exports

#[cfg(feature = "json")]
pub use json::JsonConversion;
#[cfg(feature = "yaml")]
pub use yaml::YamlConversion;

use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use regex::Regex;
use serde_core::Serialize;

use crate::{Mapper, SerialError, Tagged};

// -----------------------------------------------------------------------------
// Conversion

/// A text encoding that can locate the type tag of a top-level value.
pub trait Conversion {
    /// Reads the type name from the tag line of `reader`.
    ///
    /// The reader is rewound to where it started before a successful return.
    ///
    /// # Errors
    ///
    /// [`SerialError::TypeTagNotFound`] if no line holds a type tag.
    fn sniff_type_name<R: Read + Seek>(&self, reader: &mut R) -> Result<String, SerialError>;

    /// Decodes the value in `reader` into `item`.
    fn decode<R: Read>(&self, item: &mut dyn Tagged, reader: R) -> Result<(), SerialError>;

    /// Encodes `value` into `writer`.
    fn encode<W: Write, T: Serialize + ?Sized>(&self, value: &T, writer: W) -> Result<(), SerialError>;
}

/// Scans `reader` line by line for `pattern`, returning its first capture group
/// with surrounding quotes and whitespace removed.
///
/// Lines are matched without their line ending. Invalid UTF-8 is replaced,
/// so binary noise before the tag line is skipped rather than rejected.
///
/// The reader is rewound to its starting position when the tag is found.
pub fn sniff_lines<R: Read + Seek>(reader: &mut R, pattern: &Regex) -> Result<String, SerialError> {
    let start = reader.stream_position()?;

    let mut lines = BufReader::new(&mut *reader);
    let mut line = Vec::new();
    let mut number = 0_usize;
    let found = loop {
        line.clear();
        if lines.read_until(b'\n', &mut line)? == 0 {
            break None;
        }
        number += 1;

        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\n', '\r']);
        if let Some(name) = pattern.captures(text).and_then(|caps| caps.get(1)) {
            let name = name.as_str().trim_matches(['\'', '"', ' ', '\t']);
            if !name.is_empty() {
                log::trace!("type tag `{name}` on line {number}");
                break Some(name.to_owned());
            }
        }
    };
    drop(lines);

    let name = found.ok_or(SerialError::TypeTagNotFound)?;
    reader.seek(SeekFrom::Start(start))?;
    Ok(name)
}

// -----------------------------------------------------------------------------
// Converter

/// Loads and saves tagged values in the format of `C`.
///
/// Saving goes through [`Mapper::to_map`], so the written document carries the
/// type tag. Loading sniffs the tag, makes an instance and decodes into it.
///
/// # Examples
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use vc_serial::convert::{Converter, JsonConversion};
/// use vc_serial::{Mapper, RegistryArc, derive::Tagged};
///
/// #[derive(Tagged, Serialize, Deserialize, Default, Debug, PartialEq)]
/// pub struct Widget {
///     name: String,
/// }
///
/// let registry = RegistryArc::default();
/// registry.add_alias::<Widget>("w").unwrap();
/// registry.register::<Widget>().unwrap();
///
/// let converter = Converter::new(JsonConversion::compact(), Mapper::new(registry));
/// let text = converter.save_to_string(&Widget { name: "x".into() }).unwrap();
/// assert_eq!(text, r#"{"<type>":"[w]Widget","name":"x"}"#);
///
/// let loaded = converter.load_from_str(&text).unwrap();
/// assert_eq!(loaded.take::<Widget>().unwrap(), Widget { name: "x".into() });
/// ```
#[derive(Clone, Debug)]
pub struct Converter<C> {
    conversion: C,
    mapper: Mapper,
}

impl<C: Conversion> Converter<C> {
    #[inline]
    pub fn new(conversion: C, mapper: Mapper) -> Self {
        Self { conversion, mapper }
    }

    /// A converter over the [global](crate::registry::global) registry.
    #[inline]
    pub fn global(conversion: C) -> Self {
        Self::new(conversion, Mapper::global())
    }

    #[inline]
    pub fn conversion(&self) -> &C {
        &self.conversion
    }

    #[inline]
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    // -------------------------------------------------------------------------
    // Load

    /// Loads a value of the type named by the source's type tag.
    ///
    /// # Errors
    ///
    /// - [`SerialError::TypeTagNotFound`] if the source has no tag line.
    /// - [`RegistryError::NotRegistered`] if the tagged name is unknown.
    /// - [`SerialError::Decode`] if the source does not match the type.
    /// - [`SerialError::Io`] if reading fails.
    ///
    /// [`RegistryError::NotRegistered`]: crate::RegistryError::NotRegistered
    pub fn load_from_reader<R: Read + Seek>(&self, mut reader: R) -> Result<Box<dyn Tagged>, SerialError> {
        let name = self.conversion.sniff_type_name(&mut reader)?;
        let mut item = self.mapper.registry().make(&name)?;
        log::trace!("decoding `{name}`");

        self.mapper.attached(&mut *item, |item| {
            self.conversion.decode(item, BufReader::new(&mut reader))
        })?;
        Ok(item)
    }

    /// See [`load_from_reader`](Self::load_from_reader).
    #[inline]
    pub fn load_from_str(&self, source: &str) -> Result<Box<dyn Tagged>, SerialError> {
        self.load_from_reader(std::io::Cursor::new(source.as_bytes()))
    }

    /// Loads from the file at `path`, which is closed before returning.
    ///
    /// I/O failures are reported with the path.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Box<dyn Tagged>, SerialError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(SerialError::io(Some(path.to_path_buf())))?;
        self.load_from_reader(file).map_err(|err| with_path(err, path))
    }

    /// [`load_from_reader`](Self::load_from_reader) followed by a registry cast.
    pub fn load_as<U: ?Sized + 'static, R: Read + Seek>(&self, reader: R) -> Result<Box<U>, SerialError> {
        self.cast(self.load_from_reader(reader)?)
    }

    /// [`load_from_str`](Self::load_from_str) followed by a registry cast.
    pub fn load_from_str_as<U: ?Sized + 'static>(&self, source: &str) -> Result<Box<U>, SerialError> {
        self.cast(self.load_from_str(source)?)
    }

    /// [`load_from_file`](Self::load_from_file) followed by a registry cast.
    pub fn load_from_file_as<U: ?Sized + 'static>(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Box<U>, SerialError> {
        self.cast(self.load_from_file(path)?)
    }

    fn cast<U: ?Sized + 'static>(&self, item: Box<dyn Tagged>) -> Result<Box<U>, SerialError> {
        Ok(self.mapper.registry().read().cast::<U>(item)?)
    }

    // -------------------------------------------------------------------------
    // Save

    /// Writes `item` with its type tag.
    ///
    /// # Errors
    ///
    /// See [`Mapper::to_map`], plus [`SerialError::Encode`] if writing fails.
    pub fn save_to_writer<W: Write>(&self, item: &dyn Tagged, writer: W) -> Result<(), SerialError> {
        let map = self.mapper.to_map(item)?;
        log::trace!("encoding `{}`", item.reflect_type_path());
        self.conversion.encode(&map, writer)
    }

    /// See [`save_to_writer`](Self::save_to_writer).
    pub fn save_to_string(&self, item: &dyn Tagged) -> Result<String, SerialError> {
        let mut buffer = Vec::new();
        self.save_to_writer(item, &mut buffer)?;
        String::from_utf8(buffer).map_err(SerialError::encode)
    }

    /// Creates or truncates the file at `path` and writes `item` to it.
    ///
    /// The file is flushed and synced, so failures while closing are reported too.
    pub fn save_to_file(&self, item: &dyn Tagged, path: impl AsRef<Path>) -> Result<(), SerialError> {
        let path = path.as_ref();
        let io = || SerialError::io(Some(path.to_path_buf()));

        let file = File::create(path).map_err(io())?;
        let mut writer = BufWriter::new(file);
        self.save_to_writer(item, &mut writer)
            .map_err(|err| with_path(err, path))?;

        let file = writer.into_inner().map_err(|err| io()(err.into_error()))?;
        file.sync_all().map_err(io())
    }
}

fn with_path(err: SerialError, path: &Path) -> SerialError {
    match err {
        SerialError::Io { path: None, source } => SerialError::Io {
            path: Some(path.to_path_buf()),
            source,
        },
        err => err,
    }
}

// -----------------------------------------------------------------------------
// Tests
