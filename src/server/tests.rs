use super::server::StreamServerBuilder;
use crate::{
    config::{DiscoveryConfig, ServerConfig},
    frame::FrameCache,
    geometry::ScreenGeometry,
    gesture::{GestureDispatch, GestureRegistry, MockGestureDispatch},
    volume::VolumeControl,
};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

struct TestServer {
    addr: SocketAddr,
    cache: Arc<FrameCache>,
    registry: Arc<GestureRegistry>,
    stats: Arc<super::stats::ServerStats>,
    shutdown: CancellationToken,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn test_config() -> ServerConfig {
    ServerConfig {
        ip: "127.0.0.1".to_string(),
        port: 0,
        target_fps: 60,
    }
}

async fn start_server() -> TestServer {
    let cache = Arc::new(FrameCache::new());
    let registry = Arc::new(GestureRegistry::new());
    let volume = Arc::new(VolumeControl::new(15, 7));
    let shutdown = CancellationToken::new();

    let server = StreamServerBuilder::new()
        .config(test_config())
        .discovery(DiscoveryConfig {
            enabled: false,
            service_name: "mote".to_string(),
            service_type: "_http._tcp".to_string(),
        })
        .cache(Arc::clone(&cache))
        .volume(volume)
        .registry(Arc::clone(&registry))
        .geometry(ScreenGeometry::new(400, 240, 1080, 1920))
        .shutdown(shutdown.clone())
        .build()
        .unwrap();

    let listener = server.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stats = server.stats();

    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });

    TestServer {
        addr,
        cache,
        registry,
        stats,
        shutdown,
    }
}

/// Send one request and read until the server closes the connection
async fn request(addr: SocketAddr, path: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    socket
        .write_all(format!("GET {} HTTP/1.1\r\nHost: test\r\n\r\n", path).as_bytes())
        .await
        .unwrap();

    let mut response = Vec::new();
    socket.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

fn body_of(response: &str) -> &str {
    response.split("\r\n\r\n").nth(1).unwrap_or("")
}

fn json_body(response: &str) -> serde_json::Value {
    serde_json::from_str(body_of(response)).unwrap()
}

/// Read whatever arrives on the socket within the window
async fn read_for(socket: &mut TcpStream, window: Duration) -> Vec<u8> {
    let mut collected = Vec::new();
    let mut buffer = vec![0u8; 16 * 1024];
    let deadline = tokio::time::Instant::now() + window;

    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            break;
        }
        match timeout(remaining, socket.read(&mut buffer)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => collected.extend_from_slice(&buffer[..n]),
            _ => break,
        }
    }

    collected
}

#[tokio::test]
async fn test_status_endpoint_over_socket() {
    let server = start_server().await;

    let response = request(server.addr, "/status").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(response.contains("Access-Control-Allow-Origin: *\r\n"));

    let body = json_body(&response);
    assert_eq!(body["volume"], 7);
    assert_eq!(body["max"], 15);
    assert_eq!(body["width"], 400);
    assert_eq!(body["realHeight"], 1920);
    assert_eq!(body["touchEnabled"], false);
}

#[tokio::test]
async fn test_unknown_path_returns_404() {
    let server = start_server().await;

    let response = request(server.addr, "/nope").await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(body_of(&response), "Not Found");
}

#[tokio::test]
async fn test_malformed_request_line_closed_without_response() {
    let server = start_server().await;

    let mut socket = TcpStream::connect(server.addr).await.unwrap();
    socket.write_all(b"GARBAGE\r\n").await.unwrap();

    let mut response = Vec::new();
    socket.read_to_end(&mut response).await.unwrap();
    assert!(response.is_empty());
}

#[tokio::test]
async fn test_connection_closed_before_request_line() {
    let server = start_server().await;

    // Opening and closing without sending anything must not disturb the
    // listener; a follow-up request still works.
    let socket = TcpStream::connect(server.addr).await.unwrap();
    drop(socket);

    let response = request(server.addr, "/status").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_volume_set_and_readback() {
    let server = start_server().await;

    let response = request(server.addr, "/volume/set/12").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body_of(&response), "OK");

    let body = json_body(&request(server.addr, "/status").await);
    assert_eq!(body["volume"], 12);

    let response = request(server.addr, "/volume/set/loud").await;
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    let body = json_body(&request(server.addr, "/status").await);
    assert_eq!(body["volume"], 12);
}

#[tokio::test]
async fn test_volume_up_down_mute() {
    let server = start_server().await;

    assert_eq!(body_of(&request(server.addr, "/volume/up").await), "OK");
    let body = json_body(&request(server.addr, "/status").await);
    assert_eq!(body["volume"], 8);

    request(server.addr, "/volume/mute").await;
    let body = json_body(&request(server.addr, "/status").await);
    assert_eq!(body["volume"], 0);

    request(server.addr, "/volume/mute").await;
    let body = json_body(&request(server.addr, "/status").await);
    assert_eq!(body["volume"], 8);
}

#[tokio::test]
async fn test_touch_unavailable_then_available() {
    let server = start_server().await;

    let response = request(server.addr, "/touch?x=10&y=20").await;
    assert!(response.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
    assert!(json_body(&response)["error"].is_string());

    let mock = Arc::new(MockGestureDispatch::new());
    server
        .registry
        .register(Arc::clone(&mock) as Arc<dyn GestureDispatch>)
        .unwrap();

    let response = request(server.addr, "/touch?x=10&y=20").await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

    let body = json_body(&response);
    assert_eq!(body["ok"], true);
    assert!((body["x"].as_f64().unwrap() - 27.0).abs() < 1e-3);
    assert!((body["y"].as_f64().unwrap() - 160.0).abs() < 1e-3);
    assert_eq!(mock.dispatch_count(), 1);
}

#[tokio::test]
async fn test_gesture_missing_params_never_dispatch() {
    let server = start_server().await;

    let mock = Arc::new(MockGestureDispatch::new());
    server
        .registry
        .register(Arc::clone(&mock) as Arc<dyn GestureDispatch>)
        .unwrap();

    for path in ["/touch?y=20", "/swipe?x1=1&x2=2&y2=3", "/longpress?x=5"] {
        let response = request(server.addr, path).await;
        assert!(
            response.starts_with("HTTP/1.1 400 Bad Request\r\n"),
            "unexpected response for {}: {}",
            path,
            response
        );
    }
    assert_eq!(mock.dispatch_count(), 0);
}

#[tokio::test]
async fn test_stream_before_first_frame() {
    let server = start_server().await;

    let mut socket = TcpStream::connect(server.addr).await.unwrap();
    socket
        .write_all(b"GET /stream HTTP/1.1\r\nHost: test\r\n\r\n")
        .await
        .unwrap();

    let received = read_for(&mut socket, Duration::from_millis(100)).await;
    let text = String::from_utf8_lossy(&received).to_string();

    // Headers right away, zero frame parts, no disconnect
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.contains("multipart/x-mixed-replace; boundary=frame"));
    assert!(!text.contains("--frame"));

    // First store starts the parts flowing on the same connection
    server.cache.store(Bytes::from_static(b"jpegbytes"));
    let received = read_for(&mut socket, Duration::from_millis(150)).await;
    let text = String::from_utf8_lossy(&received).to_string();
    assert!(text.contains("--frame\r\n"));
    assert!(text.contains("Content-Length: 9\r\n"));
}

#[tokio::test]
async fn test_concurrent_viewers_are_independent() {
    let server = start_server().await;
    let jpeg = b"\xFF\xD8 fake jpeg payload \xFF\xD9";
    server.cache.store(Bytes::from_static(jpeg));

    let mut viewers = Vec::new();
    for endpoint in ["/", "/stream", "/stream"] {
        let mut socket = TcpStream::connect(server.addr).await.unwrap();
        socket
            .write_all(format!("GET {} HTTP/1.1\r\nHost: test\r\n\r\n", endpoint).as_bytes())
            .await
            .unwrap();
        viewers.push(socket);
    }

    for socket in viewers.iter_mut() {
        let received = read_for(socket, Duration::from_millis(150)).await;
        let text = String::from_utf8_lossy(&received).to_string();
        assert!(text.contains("--frame\r\n"));
        assert!(text.contains("Content-Type: image/jpeg\r\n"));
        assert!(text.contains(&format!("Content-Length: {}\r\n", jpeg.len())));
    }

    // Killing one viewer leaves the others streaming
    let dropped = viewers.remove(0);
    drop(dropped);
    tokio::time::sleep(Duration::from_millis(50)).await;

    for socket in viewers.iter_mut() {
        let received = read_for(socket, Duration::from_millis(150)).await;
        assert!(String::from_utf8_lossy(&received).contains("--frame\r\n"));
    }
}

#[tokio::test]
async fn test_request_headers_are_ignored() {
    let server = start_server().await;

    let mut socket = TcpStream::connect(server.addr).await.unwrap();
    socket
        .write_all(b"GET /status HTTP/1.1\r\nX-Strange-Header: ...\r\nAnother: one\r\n\r\n")
        .await
        .unwrap();

    let mut response = Vec::new();
    socket.read_to_end(&mut response).await.unwrap();
    assert!(String::from_utf8_lossy(&response).starts_with("HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_stats_track_streams_and_requests() {
    let server = start_server().await;
    server.cache.store(Bytes::from_static(b"jpeg"));

    request(server.addr, "/status").await;
    request(server.addr, "/volume/up").await;

    let mut socket = TcpStream::connect(server.addr).await.unwrap();
    socket
        .write_all(b"GET /stream HTTP/1.1\r\n\r\n")
        .await
        .unwrap();
    let _ = read_for(&mut socket, Duration::from_millis(100)).await;
    drop(socket);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = server.stats.snapshot();
    assert!(snapshot.connections_accepted >= 3);
    assert_eq!(snapshot.requests_served, 2);
    assert!(snapshot.frames_streamed >= 1);
    assert!(snapshot.bytes_streamed >= 4);
}
