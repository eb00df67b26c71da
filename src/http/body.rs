//! Response body types
//!
//! Every response leaves the server as a [`ResponseBody`]: either a buffered
//! `Full<Bytes>` or a [`FileBody`] that reads a file in fixed-size chunks.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

/// Chunk size used when streaming files
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Boxed body type used for every outbound response
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Buffered body from anything convertible to `Bytes`
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body with no content
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Streams an open file as a sequence of data frames
///
/// Stops after `len` bytes even if the file grew after it was opened; a file
/// that shrank ends the stream early.
#[derive(Debug)]
pub struct FileBody {
    file: File,
    remaining: u64,
    buf: Vec<u8>,
}

impl FileBody {
    pub fn new(file: File, len: u64) -> Self {
        Self {
            file,
            remaining: len,
            buf: vec![0; CHUNK_SIZE],
        }
    }

    pub fn boxed(self) -> ResponseBody {
        BodyExt::boxed_unsync(self)
    }
}

impl Body for FileBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.remaining == 0 {
            return Poll::Ready(None);
        }

        let want = usize::try_from(this.remaining).map_or(CHUNK_SIZE, |r| r.min(CHUNK_SIZE));
        let mut read_buf = ReadBuf::new(&mut this.buf[..want]);

        match Pin::new(&mut this.file).poll_read(cx, &mut read_buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => Poll::Ready(Some(Err(e))),
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    // Truncated underneath us
                    this.remaining = 0;
                    return Poll::Ready(None);
                }
                this.remaining -= filled.len() as u64;
                Poll::Ready(Some(Ok(Frame::data(Bytes::copy_from_slice(filled)))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn collect(body: ResponseBody) -> Bytes {
        body.collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_full_and_empty() {
        assert_eq!(collect(full("hello")).await, Bytes::from("hello"));
        assert!(collect(empty()).await.is_empty());
    }

    #[tokio::test]
    async fn test_file_body_streams_in_chunks() {
        let data: Vec<u8> = (0..CHUNK_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&data).unwrap();

        let file = File::open(tmp.path()).await.unwrap();
        let body = FileBody::new(file, data.len() as u64);
        assert_eq!(body.size_hint().exact(), Some(data.len() as u64));

        let mut body = body;
        let mut frames = 0;
        let mut out = Vec::new();
        while let Some(frame) = body.frame().await {
            out.extend_from_slice(&frame.unwrap().into_data().unwrap());
            frames += 1;
        }
        assert_eq!(frames, 3);
        assert_eq!(out, data);
        assert!(body.is_end_stream());
    }

    #[tokio::test]
    async fn test_file_body_stops_at_len() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"0123456789").unwrap();

        let file = File::open(tmp.path()).await.unwrap();
        let out = collect(FileBody::new(file, 4).boxed()).await;
        assert_eq!(out, Bytes::from("0123"));
    }
}
