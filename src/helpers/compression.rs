use std::io::{Read, Write};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use crate::config::constants::COMPRESSION_THRESHOLD_BYTES;
use crate::errors::{RevlineError, RevlineResult};

/// A wire field in exactly one of its two representations.
#[derive(Debug, Clone, Default)]
pub struct PackedField {
    pub plain: Option<String>,
    pub compressed: Option<String>,
}

/// Fields above the size threshold travel gzip-compressed and
/// base64-encoded; smaller fields travel as-is. A compression failure falls
/// back to the plain representation rather than losing the field.
pub fn pack_field(value: &str) -> PackedField {
    if value.is_empty() {
        return PackedField::default();
    }
    if value.len() <= COMPRESSION_THRESHOLD_BYTES {
        return PackedField {
            plain: Some(value.to_string()),
            compressed: None,
        };
    }
    match compress(value) {
        Ok(encoded) => PackedField {
            plain: None,
            compressed: Some(encoded),
        },
        Err(e) => {
            log::error!("⚠️ Field compression failed, sending plain ({} bytes): {}", value.len(), e);
            PackedField {
                plain: Some(value.to_string()),
                compressed: None,
            }
        }
    }
}

/// Decodes whichever representation is present; the compressed one wins
/// when both are set.
pub fn unpack_field(plain: Option<&str>, compressed: Option<&str>) -> RevlineResult<Option<String>> {
    if let Some(encoded) = compressed {
        return decompress(encoded).map(Some);
    }
    Ok(plain.map(|s| s.to_string()))
}

fn compress(value: &str) -> RevlineResult<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(value.as_bytes())?;
    let bytes = encoder.finish()?;
    Ok(STANDARD.encode(bytes))
}

fn decompress(encoded: &str) -> RevlineResult<String> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| RevlineError::parse_error("base64", &e.to_string(), None))?;
    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut value = String::new();
    decoder.read_to_string(&mut value)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_field_stays_plain() {
        let packed = pack_field("short patch");
        assert_eq!(packed.plain.as_deref(), Some("short patch"));
        assert!(packed.compressed.is_none());
    }

    #[test]
    fn empty_field_packs_to_nothing() {
        let packed = pack_field("");
        assert!(packed.plain.is_none());
        assert!(packed.compressed.is_none());
    }

    #[test]
    fn large_field_round_trips_through_compression() {
        let original = "fn main() { println!(\"hello\"); }\n".repeat(100);
        let packed = pack_field(&original);
        assert!(packed.plain.is_none());
        let encoded = packed.compressed.expect("large field should compress");
        let restored = unpack_field(None, Some(&encoded)).unwrap();
        assert_eq!(restored.as_deref(), Some(original.as_str()));
    }

    #[test]
    fn unpack_prefers_compressed_representation() {
        let original = "line\n".repeat(400);
        let packed = pack_field(&original);
        let restored = unpack_field(Some("stale"), packed.compressed.as_deref()).unwrap();
        assert_eq!(restored.as_deref(), Some(original.as_str()));
    }

    #[test]
    fn invalid_base64_is_a_parse_error() {
        assert!(unpack_field(None, Some("not base64 🚫")).is_err());
    }
}
