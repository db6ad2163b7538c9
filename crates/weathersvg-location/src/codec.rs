//! Byte-level encodings used to shrink and transport location tokens.

use std::io::{self, Read, Write};

use base64::{engine::general_purpose, Engine};
use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};

/// Encode bytes as base64url without padding.
pub fn encode_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url.
///
/// Trailing `=` padding is tolerated so tokens copied from tools that
/// re-pad their output still decode.
pub fn decode_base64url(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(text.trim_end_matches('='))
}

/// Compress with raw DEFLATE (no zlib or gzip framing).
pub fn compress_raw(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(bytes.len()), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Inverse of [`compress_raw`].
pub fn decompress_raw(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(bytes);
    let mut out = Vec::with_capacity(bytes.len() * 2);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64url_strips_padding() {
        // 1 and 2 byte inputs would normally carry "==" and "="
        assert_eq!(encode_base64url(&[0xff]), "_w");
        assert_eq!(encode_base64url(&[0xfb, 0xff]), "-_8");
        assert_eq!(encode_base64url(b"abc"), "YWJj");
    }

    #[test]
    fn test_base64url_decodes_unpadded_and_padded() {
        assert_eq!(decode_base64url("_w").unwrap(), vec![0xff]);
        assert_eq!(decode_base64url("_w==").unwrap(), vec![0xff]);
        assert_eq!(decode_base64url("-_8").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_base64url_rejects_standard_alphabet() {
        assert!(decode_base64url("+/8").is_err());
        assert!(decode_base64url("not base64!").is_err());
    }

    #[test]
    fn test_compress_empty() {
        assert_eq!(compress_raw(&[]).unwrap(), vec![3, 0]);
    }

    #[test]
    fn test_decompress_empty() {
        assert!(decompress_raw(&[3, 0]).unwrap().is_empty());
    }

    #[test]
    fn test_compression_roundtrip_with_nul_bytes() {
        let data = b"Hello, world!\0Hello, world!\0\0";
        let compressed = compress_raw(data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decompress_raw(&compressed).unwrap(), data);
    }

    #[test]
    fn test_compression_roundtrip_binary() {
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let compressed = compress_raw(&data).unwrap();
        assert_eq!(decompress_raw(&compressed).unwrap(), data);
    }

    #[test]
    fn test_decompress_rejects_garbage() {
        // BTYPE=11 is reserved
        assert!(decompress_raw(&[0xff, 0xff, 0xff]).is_err());
    }
}
