use alloc::string::String;
use std::io::{Read, Seek, Write};
use std::sync::LazyLock;

use regex::Regex;
use serde_core::Serialize;

use crate::convert::{Conversion, sniff_lines};
use crate::{SerialError, Tagged};

/// Matches a tag entry at column 0, the only place a top-level key can be.
static TYPE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^['"]?<type>['"]?:\s+(.+)$"#).expect("type tag pattern is valid")
});

// -----------------------------------------------------------------------------
// YamlConversion

/// YAML through `serde_yaml`.
///
/// Tags are found by the first unindented `<type>: ...` line, so comments and
/// nested values before it are skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct YamlConversion;

impl Conversion for YamlConversion {
    fn sniff_type_name<R: Read + Seek>(&self, reader: &mut R) -> Result<String, SerialError> {
        sniff_lines(reader, &TYPE_TAG)
    }

    fn decode<R: Read>(&self, item: &mut dyn Tagged, reader: R) -> Result<(), SerialError> {
        let de = serde_yaml::Deserializer::from_reader(reader);
        item.decode(&mut <dyn erased_serde::Deserializer>::erase(de))
            .map_err(SerialError::decode)
    }

    fn encode<W: Write, T: Serialize + ?Sized>(&self, value: &T, writer: W) -> Result<(), SerialError> {
        serde_yaml::to_writer(writer, value).map_err(SerialError::encode)
    }
}

// -----------------------------------------------------------------------------
// Tests
