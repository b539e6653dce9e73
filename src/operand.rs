//! Byte sources and sinks participating in a pipeline.
//!
//! An [`Operand`] is created by the caller and bound to a numeric io id when
//! it is attached to the builder (decode, encode or watermark). Source
//! operands are read once during execution; sink operands receive the
//! engine's output bytes afterwards.

use std::{collections::BTreeMap, fs, io::Read, path::PathBuf};

use crate::error::{FramewiseError, FramewiseResult};

/// Cap on the bytes accepted from a URL response body.
const MAX_FETCH_BYTES: u64 = 256 * 1024 * 1024;

/// A typed source or sink of raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Reads from or writes to a filesystem path.
    File { path: PathBuf },
    /// Fetches bytes over HTTP. Read-only: a URL cannot be an output.
    Url { url: String },
    /// Wraps caller-supplied bytes. Read-only.
    Buffer { bytes: Vec<u8> },
    /// Captures written output bytes under a key in the result mapping.
    Capture { key: String },
}

impl Operand {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url { url: url.into() }
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Buffer {
            bytes: bytes.into(),
        }
    }

    pub fn capture(key: impl Into<String>) -> Self {
        Self::Capture { key: key.into() }
    }

    /// Reads the operand's bytes for submission to the engine.
    pub fn read_bytes(&self) -> FramewiseResult<Vec<u8>> {
        match self {
            Operand::File { path } => fs::read(path)
                .map_err(|e| FramewiseError::operand_io(format!("read {}: {e}", path.display()))),
            Operand::Url { url } => {
                let response = ureq::get(url)
                    .call()
                    .map_err(|e| FramewiseError::operand_io(format!("fetch {url}: {e}")))?;
                read_capped(url, response.into_body().into_reader(), MAX_FETCH_BYTES)
            }
            Operand::Buffer { bytes } => Ok(bytes.clone()),
            Operand::Capture { key } => Err(FramewiseError::operand_io(format!(
                "capture operand '{key}' has no bytes to read"
            ))),
        }
    }

    /// Routes engine output bytes into the operand's sink. Captured buffers
    /// land in `outputs` under their key. Write failures propagate.
    pub fn write_bytes(
        &self,
        data: &[u8],
        outputs: &mut BTreeMap<String, Vec<u8>>,
    ) -> FramewiseResult<()> {
        match self {
            Operand::File { path } => fs::write(path, data)
                .map_err(|e| FramewiseError::operand_io(format!("write {}: {e}", path.display()))),
            Operand::Url { url } => Err(FramewiseError::operand_io(format!(
                "url operand '{url}' cannot receive output"
            ))),
            Operand::Buffer { .. } => Err(FramewiseError::operand_io(
                "buffer operand cannot receive output; use a capture operand",
            )),
            Operand::Capture { key } => {
                outputs.insert(key.clone(), data.to_vec());
                Ok(())
            }
        }
    }
}

/// Reads a response body up to `cap` bytes. A body larger than the cap is an
/// error; a truncated prefix must never reach the engine as a valid source.
fn read_capped(url: &str, reader: impl Read, cap: u64) -> FramewiseResult<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(cap + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| FramewiseError::operand_io(format!("fetch {url}: {e}")))?;
    if bytes.len() as u64 > cap {
        return Err(FramewiseError::operand_io(format!(
            "fetch {url}: response body exceeds the {cap} byte limit"
        )));
    }
    Ok(bytes)
}

/// Whether an operand feeds bytes into the engine or receives them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// An operand bound to its io id. The id is assigned exactly once, by the
/// builder, at registration.
#[derive(Clone, Debug)]
pub struct BoundOperand {
    pub io_id: u32,
    pub direction: Direction,
    pub operand: Operand,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_reads_its_bytes() {
        let operand = Operand::bytes(vec![1, 2, 3]);
        assert_eq!(operand.read_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn capture_collects_output_under_key() {
        let operand = Operand::capture("thumb");
        let mut outputs = BTreeMap::new();
        operand.write_bytes(&[9, 9], &mut outputs).unwrap();
        assert_eq!(outputs.get("thumb").map(Vec::as_slice), Some(&[9u8, 9][..]));
    }

    #[test]
    fn capture_cannot_be_read() {
        assert!(matches!(
            Operand::capture("k").read_bytes(),
            Err(FramewiseError::OperandIo(_))
        ));
    }

    #[test]
    fn url_cannot_receive_output() {
        let mut outputs = BTreeMap::new();
        assert!(matches!(
            Operand::url("https://example.com/a.jpg").write_bytes(&[], &mut outputs),
            Err(FramewiseError::OperandIo(_))
        ));
    }

    #[test]
    fn missing_file_read_propagates() {
        let operand = Operand::file("/definitely/not/here.jpg");
        assert!(matches!(
            operand.read_bytes(),
            Err(FramewiseError::OperandIo(_))
        ));
    }

    #[test]
    fn capped_read_accepts_bodies_at_the_limit() {
        let body = vec![7u8; 16];
        let bytes = read_capped("https://example.com/a.jpg", &body[..], 16).unwrap();
        assert_eq!(bytes, body);
    }

    #[test]
    fn oversized_body_is_an_error_not_a_truncated_prefix() {
        let body = vec![7u8; 17];
        let result = read_capped("https://example.com/a.jpg", &body[..], 16);
        match result {
            Err(FramewiseError::OperandIo(msg)) => assert!(msg.contains("exceeds")),
            other => panic!("expected operand io error, got {other:?}"),
        }
    }

    #[test]
    fn direction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Direction::In).unwrap(),
            serde_json::json!("in")
        );
        assert_eq!(
            serde_json::to_value(Direction::Out).unwrap(),
            serde_json::json!("out")
        );
    }
}
