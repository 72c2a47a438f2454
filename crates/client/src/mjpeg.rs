//! Incremental parser for `multipart/x-mixed-replace` JPEG streams.
//!
//! The backend annotates each frame server-side and emits parts of the
//! form:
//!
//! ```text
//! --frame\r\n
//! Content-Type: image/jpeg\r\n
//! \r\n
//! <jpeg bytes>\r\n
//! ```
//!
//! Parts may carry a `Content-Length` header; without one the body runs
//! up to the next boundary line. The final part of a stream that ends
//! without a closing boundary is recovered by [`MjpegParser::finish`].

use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};

use crate::backend::FrameStream;
use crate::error::ApiError;

/// Boundary used when the response does not declare one.
pub const DEFAULT_BOUNDARY: &str = "frame";

/// Largest part body accepted before the stream is rejected.
pub const MAX_FRAME_BYTES: usize = 32 * 1024 * 1024;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Extract the `boundary` parameter from a `Content-Type` header value.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .map(str::trim)
        .find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("boundary")
                .then(|| value.trim().trim_matches('"').to_string())
        })
        .filter(|b| !b.is_empty())
}

/// Accumulates body chunks and yields complete JPEG frames.
pub struct MjpegParser {
    /// `--` followed by the boundary token.
    delimiter: Vec<u8>,
    /// `\r\n` followed by the delimiter; terminates a length-less body.
    terminator: Vec<u8>,
    buf: BytesMut,
}

impl MjpegParser {
    pub fn new(boundary: &str) -> Self {
        let boundary = boundary.strip_prefix("--").unwrap_or(boundary);
        let delimiter = format!("--{boundary}").into_bytes();
        let mut terminator = b"\r\n".to_vec();
        terminator.extend_from_slice(&delimiter);
        Self {
            delimiter,
            terminator,
            buf: BytesMut::new(),
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete frame, if the buffer holds one.
    ///
    /// A part whose body exceeds [`MAX_FRAME_BYTES`] is a decode error.
    pub fn next_frame(&mut self) -> Result<Option<Bytes>, ApiError> {
        let Some(part) = self.locate_part() else {
            return Ok(None);
        };

        let body_end = match part.content_length {
            Some(len) => {
                let end = part
                    .body_start
                    .checked_add(len)
                    .filter(|_| len <= MAX_FRAME_BYTES)
                    .ok_or_else(|| oversized(len))?;
                if self.buf.len() < end {
                    return Ok(None);
                }
                end
            }
            None => match find(&self.buf[part.body_start..], &self.terminator) {
                Some(pos) => part.body_start + pos,
                None => {
                    let buffered = self.buf.len() - part.body_start;
                    if buffered > MAX_FRAME_BYTES {
                        return Err(oversized(buffered));
                    }
                    return Ok(None);
                }
            },
        };

        let mut consumed = self.buf.split_to(body_end);
        Ok(Some(consumed.split_off(part.body_start).freeze()))
    }

    /// Flush the last part once the stream has ended.
    pub fn finish(&mut self) -> Result<Option<Bytes>, ApiError> {
        if let Some(frame) = self.next_frame()? {
            return Ok(Some(frame));
        }

        let Some(part) = self.locate_part() else {
            return Ok(None);
        };
        let mut body = &self.buf[part.body_start..];
        if let Some(pos) = find(body, &self.delimiter) {
            body = &body[..pos];
        }
        while let Some(rest) = body.strip_suffix(b"\r\n") {
            body = rest;
        }
        if body.is_empty() {
            return Ok(None);
        }
        let frame = Bytes::copy_from_slice(body);
        self.buf.clear();
        Ok(Some(frame))
    }

    /// Find the next part header, discarding any preamble before it.
    fn locate_part(&mut self) -> Option<PartHeader> {
        let Some(start) = find(&self.buf, &self.delimiter) else {
            // Keep a tail that could be the beginning of a split delimiter.
            let keep = self.delimiter.len().saturating_sub(1);
            if self.buf.len() > keep {
                let _ = self.buf.split_to(self.buf.len() - keep);
            }
            return None;
        };
        if start > 0 {
            let _ = self.buf.split_to(start);
        }

        let headers_start = self.delimiter.len();
        let header_len = find(&self.buf[headers_start..], HEADER_END)?;
        let headers = &self.buf[headers_start..headers_start + header_len];

        Some(PartHeader {
            content_length: content_length(headers),
            body_start: headers_start + header_len + HEADER_END.len(),
        })
    }
}

struct PartHeader {
    content_length: Option<usize>,
    body_start: usize,
}

fn content_length(headers: &[u8]) -> Option<usize> {
    String::from_utf8_lossy(headers).lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-length")
            .then(|| value.trim().parse().ok())
            .flatten()
    })
}

fn oversized(len: usize) -> ApiError {
    ApiError::Decode(format!(
        "frame of {len} bytes exceeds the {MAX_FRAME_BYTES} byte limit"
    ))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

enum ReadState {
    Reading,
    Done,
}

/// Turn a raw body stream into a stream of frames.
///
/// A body or decode error is yielded once and ends the stream.
pub fn frames<S>(body: S, boundary: &str) -> FrameStream
where
    S: Stream<Item = Result<Bytes, ApiError>> + Send + 'static,
{
    let body: Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>> = Box::pin(body);
    let parser = MjpegParser::new(boundary);

    futures::stream::unfold(
        (body, parser, ReadState::Reading),
        |(mut body, mut parser, state)| async move {
            if let ReadState::Done = state {
                return None;
            }
            loop {
                match parser.next_frame() {
                    Ok(Some(frame)) => {
                        return Some((Ok(frame), (body, parser, ReadState::Reading)));
                    }
                    Ok(None) => {}
                    Err(e) => return Some((Err(e), (body, parser, ReadState::Done))),
                }
                match body.next().await {
                    Some(Ok(chunk)) => parser.push(&chunk),
                    Some(Err(e)) => return Some((Err(e), (body, parser, ReadState::Done))),
                    None => {
                        return parser
                            .finish()
                            .transpose()
                            .map(|item| (item, (body, parser, ReadState::Done)));
                    }
                }
            }
        },
    )
    .boxed()
}
