//! Line-delimited JSON decoding for the lichess feeds.

use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use serde::de::DeserializeOwned;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;
use tracing::warn;

use crate::error::AppError;

/// Longest line accepted before the stream is treated as broken.
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Turn a byte stream into a stream of decoded events.
///
/// Blank keep-alive lines and lines that fail to decode are skipped; read
/// errors are passed through so the consumer can end its loop.
pub fn decode_lines<T, S>(bytes: S) -> BoxStream<'static, Result<T, AppError>>
where
    T: DeserializeOwned + Send + 'static,
    S: Stream<Item = std::io::Result<Bytes>> + Send + 'static,
{
    let reader = StreamReader::new(bytes);
    FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_LINE_BYTES))
        .filter_map(|line| async move {
            match line {
                Ok(line) => parse_line::<T>(&line).map(Ok),
                Err(err) => Some(Err(AppError::upstream("event stream read failed", err))),
            }
        })
        .boxed()
}

/// Decode one line; `None` for blank or malformed lines.
pub fn parse_line<T: DeserializeOwned>(line: &str) -> Option<T> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "skipping malformed event line");
            None
        }
    }
}
