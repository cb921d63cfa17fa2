use super::stats::ServerStats;
use crate::frame::FrameCache;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, trace};

/// Multipart boundary token shared by the response header and frame parts
pub const BOUNDARY: &str = "frame";

/// Serve the MJPEG multipart protocol to one viewer until its socket fails.
///
/// The loop ticks at the target cadence regardless of how fast the capture
/// producer runs: an unchanged frame is re-sent, a burst of new frames means
/// intermediate ones are never observed by this viewer. Ticks with an empty
/// cache write nothing, so a viewer connected before the first capture sees
/// valid headers and then silence until frames arrive.
pub async fn serve_mjpeg<W>(
    writer: &mut W,
    cache: &FrameCache,
    frame_interval: Duration,
    stats: &ServerStats,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = format!(
        "HTTP/1.1 200 OK\r\n\
         Content-Type: multipart/x-mixed-replace; boundary={}\r\n\
         Cache-Control: no-cache\r\n\
         \r\n",
        BOUNDARY
    );
    writer.write_all(head.as_bytes()).await?;
    writer.flush().await?;

    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut frames_sent = 0u64;
    let mut bytes_sent = 0u64;
    let stream_start = std::time::Instant::now();

    loop {
        ticker.tick().await;

        let Some(frame) = cache.latest() else {
            trace!("No frame available for streaming yet");
            continue;
        };

        let part_head = format!(
            "--{}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            BOUNDARY,
            frame.len()
        );
        writer.write_all(part_head.as_bytes()).await?;
        writer.write_all(&frame.data).await?;
        writer.write_all(b"\r\n").await?;
        writer.flush().await?;

        frames_sent += 1;
        bytes_sent += frame.len() as u64;
        stats.frame_streamed(frame.len());

        debug!(
            "Streamed frame {} ({} bytes, {} sent to this viewer)",
            frame.id,
            frame.len(),
            frames_sent
        );

        if frames_sent > 0 && frames_sent % 300 == 0 {
            let elapsed = stream_start.elapsed().as_secs_f64();
            info!(
                "Viewer stats: {} frames, {:.1} FPS, {:.2} MB total",
                frames_sent,
                frames_sent as f64 / elapsed,
                bytes_sent as f64 / 1_048_576.0
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Arc;
    use tokio::io::duplex;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_headers_without_frames() {
        let cache = Arc::new(FrameCache::new());
        let stats = Arc::new(ServerStats::new());
        let (mut client, mut server) = duplex(64 * 1024);

        let handle = {
            let cache = Arc::clone(&cache);
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                let _ = serve_mjpeg(&mut server, &cache, Duration::from_millis(5), &stats).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(40)).await;

        let mut buffer = vec![0u8; 4096];
        let n = client.read(&mut buffer).await.unwrap();
        let received = String::from_utf8_lossy(&buffer[..n]).to_string();

        // Valid multipart headers arrive immediately, but no parts yet
        assert!(received.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(received.contains("multipart/x-mixed-replace; boundary=frame"));
        assert!(received.contains("Cache-Control: no-cache"));
        assert!(!received.contains("--frame"));
        assert_eq!(stats.snapshot().frames_streamed, 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_frame_part_format() {
        let cache = Arc::new(FrameCache::new());
        let stats = Arc::new(ServerStats::new());
        let jpeg = Bytes::from_static(&[0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9]);
        cache.store(jpeg.clone());

        let (mut client, mut server) = duplex(64 * 1024);

        let handle = {
            let cache = Arc::clone(&cache);
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                let _ = serve_mjpeg(&mut server, &cache, Duration::from_millis(5), &stats).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(40)).await;

        let mut buffer = vec![0u8; 16 * 1024];
        let n = client.read(&mut buffer).await.unwrap();
        let received = String::from_utf8_lossy(&buffer[..n]).to_string();

        assert!(received.contains("--frame\r\n"));
        assert!(received.contains("Content-Type: image/jpeg\r\n"));
        assert!(received.contains(&format!("Content-Length: {}\r\n", jpeg.len())));
        assert!(stats.snapshot().frames_streamed >= 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_same_frame_resent_across_ticks() {
        let cache = Arc::new(FrameCache::new());
        let stats = Arc::new(ServerStats::new());
        cache.store(Bytes::from_static(b"jpegdata"));

        let (mut client, mut server) = duplex(256 * 1024);

        let handle = {
            let cache = Arc::clone(&cache);
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                let _ = serve_mjpeg(&mut server, &cache, Duration::from_millis(2), &stats).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(60)).await;

        let mut buffer = vec![0u8; 64 * 1024];
        let n = client.read(&mut buffer).await.unwrap();
        let received = String::from_utf8_lossy(&buffer[..n]).to_string();

        // One stored frame produces many parts at the cadence
        assert!(received.matches("--frame\r\n").count() >= 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_loop_ends_on_write_failure() {
        let cache = Arc::new(FrameCache::new());
        let stats = Arc::new(ServerStats::new());
        cache.store(Bytes::from_static(b"jpegdata"));

        let (client, mut server) = duplex(1024);
        drop(client);

        let result = serve_mjpeg(&mut server, &cache, Duration::from_millis(1), &stats).await;
        assert!(result.is_err());
    }
}
