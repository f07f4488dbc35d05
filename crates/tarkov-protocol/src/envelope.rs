//! Response envelope codec
//!
//! Every backend response is a zlib-compressed JSON document shaped as
//! `{ "data": ..., "err": <int>, "errmsg": <string> }`. Decoding runs
//! status check, inflate, parse and validate in that order and stops at the
//! first failure.

use flate2::Compression;
use flate2::read::{ZlibDecoder, ZlibEncoder};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

use crate::codes::ErrorCode;
use crate::error::{ProtocolError, Result};
use crate::transport::TransportResponse;

/// Upper bound on inflated payload size (256 MB)
///
/// The item catalog is the largest document the backend serves and inflates
/// to well under this.
pub const MAX_DECOMPRESSION_SIZE: usize = 256 * 1024 * 1024;

/// Decoded `{data, err, errmsg}` wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub data: Value,
    pub err: ErrorCode,
    pub errmsg: String,
}

impl ResponseEnvelope {
    /// Successful envelope carrying `data`
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            err: ErrorCode::OK,
            errmsg: String::new(),
        }
    }

    /// Failed envelope with the given code and message
    pub fn error(err: ErrorCode, errmsg: impl Into<String>) -> Self {
        Self {
            data: Value::Null,
            err,
            errmsg: errmsg.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.err.is_ok()
    }

    /// Validate a parsed JSON document into an envelope
    ///
    /// `err` and `errmsg` must both be present, as must `data` (which may be
    /// `null`). A non-string `errmsg` is tolerated and read as empty.
    pub fn from_document(mut document: Value) -> Result<Self> {
        let Some(root) = document.as_object_mut() else {
            return Err(ProtocolError::malformed("response root is not an object"));
        };

        if !root.contains_key("err") || !root.contains_key("errmsg") {
            return Err(ProtocolError::malformed("'err' or 'errmsg' key is not available"));
        }
        let Some(data) = root.remove("data") else {
            return Err(ProtocolError::malformed("'data' key is not available"));
        };

        let err = root
            .get("err")
            .and_then(Value::as_i64)
            .map(ErrorCode)
            .ok_or_else(|| ProtocolError::malformed("'err' is not an integer"))?;

        let errmsg = root
            .get("errmsg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(Self { data, err, errmsg })
    }
}

/// Decode a transport response into an envelope
pub fn decode_response(response: &TransportResponse) -> Result<ResponseEnvelope> {
    decode(response.status, &response.body)
}

/// Decode raw response bytes received with `status`
pub fn decode(status: StatusCode, payload: &[u8]) -> Result<ResponseEnvelope> {
    // Non-200 bodies are never inflated
    if status != StatusCode::OK {
        return Err(ProtocolError::HttpStatus(status));
    }

    let inflated = decompress(payload)?;
    let document: Value = serde_json::from_slice(&inflated)?;

    ResponseEnvelope::from_document(document)
}

/// Inflate a zlib buffer into a growable output buffer
pub fn decompress(payload: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut decompressed = Vec::with_capacity(payload.len().saturating_mul(4));

    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = decoder
            .read(&mut buffer)
            .map_err(|e| ProtocolError::Decompress(format!("zlib decompression failed: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        if decompressed.len() + bytes_read > MAX_DECOMPRESSION_SIZE {
            return Err(ProtocolError::Decompress(format!(
                "decompressed size exceeds limit of {MAX_DECOMPRESSION_SIZE} bytes"
            )));
        }

        decompressed.extend_from_slice(&buffer[..bytes_read]);
    }

    Ok(decompressed)
}

/// Deflate a payload the way the backend does
pub fn compress(payload: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(payload, Compression::default());
    let mut compressed = Vec::new();
    encoder
        .read_to_end(&mut compressed)
        .map_err(|e| ProtocolError::Decompress(format!("zlib compression failed: {e}")))?;
    Ok(compressed)
}

/// Serialize and compress an envelope into wire bytes
///
/// Mirror image of [`decode`]; used by mock backends and tests.
pub fn encode(envelope: &ResponseEnvelope) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(envelope)?;
    compress(&json)
}
