//! Random payload bodies
//!
//! [`RandomStream`] produces pseudorandom data one chunk per poll, pausing between
//! chunks and optionally stopping short at an abort boundary. Nothing is generated
//! until hyper polls for the next frame, so a disconnected client stops generation.

use hyper::body::{Body, Bytes, Frame, SizeHint};
use rand::RngCore;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::Sleep;

/// Fill a buffer of `len` pseudorandom bytes
pub fn random_bytes(len: usize) -> Bytes {
    let mut buf = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut buf);
    Bytes::from(buf)
}

/// Paced stream of random chunks
pub struct RandomStream {
    chunk_size: usize,
    /// Byte offset where the stream ends: the total size or the abort boundary
    end: u64,
    sent: u64,
    delay: Duration,
    pacing: Option<Pin<Box<Sleep>>>,
    /// Set by the first `poll_frame`; until then the stream never reports its end,
    /// so hyper frames the response from the handler's headers even for empty bodies
    polled: bool,
}

impl RandomStream {
    /// Stream `total` bytes in `chunk_size` pieces, stopping early at `abort_at`
    pub fn new(total: u64, abort_at: u64, chunk_size: usize, delay: Duration) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            end: total.min(abort_at),
            sent: 0,
            delay,
            pacing: None,
            polled: false,
        }
    }

    /// Bytes this stream will emit in total (for test validation only)
    #[cfg(test)]
    pub const fn total_len(&self) -> u64 {
        self.end
    }

    fn remaining(&self) -> u64 {
        self.end - self.sent
    }

    /// Size of the next chunk; the last one is cut at the end boundary
    fn next_chunk_len(&self) -> usize {
        usize::try_from(self.remaining()).map_or(self.chunk_size, |r| r.min(self.chunk_size))
    }
}

impl Body for RandomStream {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        this.polled = true;

        if let Some(sleep) = this.pacing.as_mut() {
            if sleep.as_mut().poll(cx).is_pending() {
                return Poll::Pending;
            }
            this.pacing = None;
        }

        if this.remaining() == 0 {
            return Poll::Ready(None);
        }

        let len = this.next_chunk_len();
        let chunk = random_bytes(len);
        this.sent += len as u64;

        if this.remaining() > 0 && !this.delay.is_zero() {
            this.pacing = Some(Box::pin(tokio::time::sleep(this.delay)));
        }

        Poll::Ready(Some(Ok(Frame::data(chunk))))
    }

    fn is_end_stream(&self) -> bool {
        self.polled && self.remaining() == 0
    }

    /// Never exact: framing is decided by the handler's headers, not by hyper
    fn size_hint(&self) -> SizeHint {
        let mut hint = SizeHint::new();
        hint.set_lower(self.remaining());
        hint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    const CHUNK: usize = 1024;

    async fn collect_frames(stream: RandomStream) -> Vec<usize> {
        let mut body = stream;
        let mut sizes = Vec::new();
        while let Some(frame) = body.frame().await {
            let data = frame.unwrap().into_data().unwrap();
            sizes.push(data.len());
        }
        sizes
    }

    #[test]
    fn test_random_bytes_len() {
        assert_eq!(random_bytes(0).len(), 0);
        assert_eq!(random_bytes(CHUNK).len(), CHUNK);
    }

    #[tokio::test]
    async fn test_full_stream() {
        let stream = RandomStream::new(3 * CHUNK as u64, 3 * CHUNK as u64, CHUNK, Duration::ZERO);
        assert_eq!(collect_frames(stream).await, vec![CHUNK, CHUNK, CHUNK]);
    }

    #[tokio::test]
    async fn test_abort_on_chunk_boundary() {
        let stream = RandomStream::new(4 * CHUNK as u64, 2 * CHUNK as u64, CHUNK, Duration::ZERO);
        assert_eq!(stream.total_len(), 2 * CHUNK as u64);
        assert_eq!(collect_frames(stream).await, vec![CHUNK, CHUNK]);
    }

    #[tokio::test]
    async fn test_abort_mid_chunk() {
        let stream = RandomStream::new(4 * CHUNK as u64, 1500, CHUNK, Duration::ZERO);
        assert_eq!(collect_frames(stream).await, vec![CHUNK, 1500 - CHUNK]);
    }

    #[tokio::test]
    async fn test_abort_beyond_total() {
        let stream = RandomStream::new(2 * CHUNK as u64, 10 * CHUNK as u64, CHUNK, Duration::ZERO);
        assert_eq!(collect_frames(stream).await, vec![CHUNK, CHUNK]);
    }

    #[tokio::test]
    async fn test_empty_stream_ends_only_after_first_poll() {
        let mut stream = RandomStream::new(0, 0, CHUNK, Duration::ZERO);
        assert!(!stream.is_end_stream());
        assert!(stream.frame().await.is_none());
        assert!(stream.is_end_stream());
    }

    #[tokio::test]
    async fn test_abort_at_zero_ends_after_first_poll() {
        let mut stream = RandomStream::new(4 * CHUNK as u64, 0, CHUNK, Duration::ZERO);
        assert!(!stream.is_end_stream());
        assert!(stream.frame().await.is_none());
        assert!(stream.is_end_stream());
    }

    #[test]
    fn test_size_hint_is_never_exact() {
        let stream = RandomStream::new(2 * CHUNK as u64, 2 * CHUNK as u64, CHUNK, Duration::ZERO);
        let hint = stream.size_hint();
        assert_eq!(hint.lower(), 2 * CHUNK as u64);
        assert_eq!(hint.exact(), None);
    }

    #[tokio::test]
    async fn test_pacing_between_chunks() {
        let delay = Duration::from_millis(20);
        let stream = RandomStream::new(3 * CHUNK as u64, 3 * CHUNK as u64, CHUNK, delay);

        let started = std::time::Instant::now();
        let sizes = collect_frames(stream).await;
        let elapsed = started.elapsed();

        assert_eq!(sizes.len(), 3);
        // Two pauses between three chunks, none after the last
        assert!(elapsed >= delay * 2, "finished too fast: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_chunks_are_random() {
        let mut stream =
            RandomStream::new(2 * CHUNK as u64, 2 * CHUNK as u64, CHUNK, Duration::ZERO);
        let first = stream.frame().await.unwrap().unwrap().into_data().unwrap();
        let second = stream.frame().await.unwrap().unwrap().into_data().unwrap();
        assert_ne!(first, second);
    }
}
