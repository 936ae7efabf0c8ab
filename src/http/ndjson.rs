//! Decoding of newline-delimited JSON bodies into a lazy stream of records.

use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::pin::Pin;

use super::error::{FetchError, Upstream};
use crate::domain::Validate;

/// Longest line accepted from a stream body.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

struct LineReader<S> {
    chunks: Pin<Box<S>>,
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a newline.
    scanned: usize,
    max_line_bytes: usize,
    /// Dropping the rest of an oversized line.
    discarding: bool,
    finished: bool,
}

impl<S> LineReader<S> {
    /// Pops the next complete line, without its terminator.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') else {
            self.scanned = self.buffer.len();
            return None;
        };
        let end = self.scanned + offset;
        self.scanned = 0;

        let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    /// Whatever is left once the body ended without a trailing newline.
    fn take_rest(&mut self) -> Option<Vec<u8>> {
        self.scanned = 0;
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

fn too_long(upstream: Upstream, status: StatusCode, max_line_bytes: usize) -> FetchError {
    FetchError::MalformedResponse {
        upstream,
        status,
        message: format!("line exceeds {} bytes", max_line_bytes),
    }
}

fn decode_line<T>(upstream: Upstream, status: StatusCode, line: &[u8]) -> Result<T, FetchError>
where
    T: DeserializeOwned + Validate,
{
    let record: T = serde_json::from_slice(line).map_err(|e| FetchError::MalformedResponse {
        upstream,
        status,
        message: format!("invalid JSON line: {}", e),
    })?;
    record
        .validate()
        .map_err(|e| FetchError::MalformedResponse {
            upstream,
            status,
            message: e.to_string(),
        })?;
    Ok(record)
}

/// Turns a chunked body into one decoded record per non-blank line.
///
/// A line that fails to decode, or runs past [`MAX_LINE_BYTES`], yields a
/// `MalformedResponse` item and the stream carries on. A transport error ends
/// the stream after yielding it.
pub fn decode_lines<S, B, T>(
    upstream: Upstream,
    status: StatusCode,
    chunks: S,
) -> BoxStream<'static, Result<T, FetchError>>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]>,
    T: DeserializeOwned + Validate + Send + 'static,
{
    decode_lines_with_limit(upstream, status, chunks, MAX_LINE_BYTES)
}

fn decode_lines_with_limit<S, B, T>(
    upstream: Upstream,
    status: StatusCode,
    chunks: S,
    max_line_bytes: usize,
) -> BoxStream<'static, Result<T, FetchError>>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + 'static,
    B: AsRef<[u8]>,
    T: DeserializeOwned + Validate + Send + 'static,
{
    let reader = LineReader {
        chunks: Box::pin(chunks),
        buffer: Vec::new(),
        scanned: 0,
        max_line_bytes,
        discarding: false,
        finished: false,
    };

    stream::unfold(reader, move |mut reader| async move {
        loop {
            if let Some(line) = reader.next_line() {
                if reader.discarding {
                    // tail of an oversized line
                    reader.discarding = false;
                    continue;
                }
                if is_blank(&line) {
                    continue;
                }
                if line.len() > reader.max_line_bytes {
                    let err = too_long(upstream, status, reader.max_line_bytes);
                    return Some((Err(err), reader));
                }
                return Some((decode_line(upstream, status, &line), reader));
            }

            if reader.discarding {
                reader.clear();
            } else if reader.buffer.len() > reader.max_line_bytes {
                reader.clear();
                reader.discarding = true;
                let err = too_long(upstream, status, reader.max_line_bytes);
                return Some((Err(err), reader));
            }

            if reader.finished {
                let line = reader.take_rest().filter(|line| !is_blank(line))?;
                return Some((decode_line(upstream, status, &line), reader));
            }

            match reader.chunks.next().await {
                Some(Ok(chunk)) => reader.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    reader.finished = true;
                    reader.clear();
                    return Some((Err(FetchError::transport(upstream, &e)), reader));
                }
                None => reader.finished = true,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MovieInfo;

    type Chunk = Result<Vec<u8>, reqwest::Error>;

    fn chunks(parts: &[&str]) -> impl Stream<Item = Chunk> + Send + 'static {
        let owned: Vec<Chunk> = parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        stream::iter(owned)
    }

    async fn collect(parts: &[&str]) -> Vec<Result<MovieInfo, FetchError>> {
        decode_lines(Upstream::MovieInfo, StatusCode::OK, chunks(parts))
            .collect()
            .await
    }

    const FIRST: &str = r#"{"movieInfoId":"1","name":"Batman Begins","year":2005,"cast":["Christian Bale"],"releaseDate":"2005-06-15"}"#;
    const SECOND: &str = r#"{"movieInfoId":"2","name":"The Dark Knight","year":2008,"cast":["Heath Ledger"],"releaseDate":"2008-07-18"}"#;

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let body = format!("{}\n{}\n", FIRST, SECOND);
        let (head, tail) = body.split_at(40);

        let items = collect(&[head, tail]).await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().title, "Batman Begins");
        assert_eq!(items[1].as_ref().unwrap().release_year, 2008);
    }

    #[tokio::test]
    async fn test_last_line_without_newline_and_blank_lines() {
        let body = format!("\n{}\r\n\n  \n{}", FIRST, SECOND);
        let items = collect(&[&body]).await;

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.is_ok()));
    }

    #[tokio::test]
    async fn test_malformed_line_yields_error_and_continues() {
        let body = format!("{}\nnot json\n{}\n", FIRST, SECOND);
        let items = collect(&[&body]).await;

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(matches!(
            items[1],
            Err(FetchError::MalformedResponse { .. })
        ));
        assert!(items[2].is_ok());
    }

    #[tokio::test]
    async fn test_invalid_record_is_malformed() {
        let blank_title = r#"{"movieInfoId":"3","name":"","year":2008,"cast":[],"releaseDate":"2008-07-18"}"#;
        let items = collect(&[blank_title]).await;

        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0],
            Err(FetchError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_body_is_empty_stream() {
        assert!(collect(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_line_is_dropped_and_stream_continues() {
        let long_line = "x".repeat(300);
        let body = [
            &long_line[..100],
            &long_line[100..250],
            &long_line[250..],
            "\n",
            FIRST,
            "\n",
        ];

        let items: Vec<Result<MovieInfo, FetchError>> =
            decode_lines_with_limit(Upstream::MovieInfo, StatusCode::OK, chunks(&body), 200)
                .collect()
                .await;

        assert_eq!(items.len(), 2);
        match &items[0] {
            Err(FetchError::MalformedResponse { message, .. }) => {
                assert_eq!(message, "line exceeds 200 bytes");
            }
            other => panic!("unexpected item: {:?}", other),
        }
        assert_eq!(items[1].as_ref().unwrap().id, "1");
    }

    #[tokio::test]
    async fn test_oversized_line_within_one_chunk() {
        let body = format!("{}\n{}\n", "y".repeat(500), FIRST);

        let items: Vec<Result<MovieInfo, FetchError>> =
            decode_lines_with_limit(Upstream::MovieInfo, StatusCode::OK, chunks(&[&body]), 200)
                .collect()
                .await;

        assert_eq!(items.len(), 2);
        assert!(matches!(
            items[0],
            Err(FetchError::MalformedResponse { .. })
        ));
        assert!(items[1].is_ok());
    }

    #[tokio::test]
    async fn test_unterminated_oversized_body_ends_after_one_error() {
        let part = "z".repeat(150);
        let items: Vec<Result<MovieInfo, FetchError>> = decode_lines_with_limit(
            Upstream::MovieInfo,
            StatusCode::OK,
            chunks(&[&part, &part, &part]),
            200,
        )
        .collect()
        .await;

        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
