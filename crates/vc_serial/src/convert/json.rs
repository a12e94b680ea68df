use alloc::string::String;
use std::io::{Read, Seek, Write};
use std::sync::LazyLock;

use regex::Regex;
use serde_core::Serialize;

use crate::convert::{Conversion, sniff_lines};
use crate::{SerialError, Tagged};

/// Matches the tag entry anywhere on a line, so compact documents sniff too.
static TYPE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""<type>"\s*:\s*"((?:[^"\\]|\\.)+)""#).expect("type tag pattern is valid")
});

// -----------------------------------------------------------------------------
// JsonConversion

/// JSON through `serde_json`.
///
/// Tags are found by the first `"<type>": "..."` entry in the text. Maps are
/// written with sorted keys, so the tag of the top-level value comes before any
/// nested one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JsonConversion {
    pretty: bool,
}

impl Default for JsonConversion {
    /// See [`JsonConversion::pretty`].
    #[inline]
    fn default() -> Self {
        Self::pretty()
    }
}

impl JsonConversion {
    /// Indented output, one entry per line.
    #[inline]
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Single line output.
    #[inline]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    #[inline]
    pub const fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Conversion for JsonConversion {
    fn sniff_type_name<R: Read + Seek>(&self, reader: &mut R) -> Result<String, SerialError> {
        sniff_lines(reader, &TYPE_TAG)
    }

    fn decode<R: Read>(&self, item: &mut dyn Tagged, reader: R) -> Result<(), SerialError> {
        let mut de = serde_json::Deserializer::from_reader(reader);
        item.decode(&mut <dyn erased_serde::Deserializer>::erase(&mut de))
            .map_err(SerialError::decode)?;
        de.end().map_err(SerialError::decode)
    }

    fn encode<W: Write, T: Serialize + ?Sized>(&self, value: &T, writer: W) -> Result<(), SerialError> {
        if self.pretty {
            serde_json::to_writer_pretty(writer, value).map_err(SerialError::encode)
        } else {
            serde_json::to_writer(writer, value).map_err(SerialError::encode)
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
