use super::control::ControlHandler;
use super::stats::ServerStats;
use super::stream::serve_mjpeg;
use crate::config::{DiscoveryConfig, ServerConfig};
use crate::discovery::{NoopAdvertiser, ServiceAdvertiser};
use crate::error::{MotecastError, Result, ServerError};
use crate::frame::FrameCache;
use crate::geometry::ScreenGeometry;
use crate::gesture::GestureRegistry;
use crate::server::request::RequestLine;
use crate::volume::VolumeControl;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, BufWriter};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle of one accepted connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Socket accepted, request line not yet parsed
    Connected,
    /// Multipart headers sent, frame loop running
    Streaming,
    /// Terminal: write failure, socket closure, or handler exit
    Closed,
}

/// State shared by every connection task
struct ConnectionContext {
    cache: Arc<FrameCache>,
    control: ControlHandler,
    stats: Arc<ServerStats>,
    frame_interval: Duration,
}

/// Streaming-and-control server: accepts TCP connections, parses one
/// request line each, and routes to the MJPEG stream or a control endpoint.
///
/// Each connection runs in its own task; a failure inside one handler
/// terminates only that connection, never the listener or its siblings.
/// There is no connection ceiling and no idle timeout: a viewer that never
/// reads holds its task until its socket dies. That resource-exhaustion
/// exposure is accepted for this server's scope.
pub struct StreamServer {
    pub(crate) config: ServerConfig,
    discovery: DiscoveryConfig,
    context: Arc<ConnectionContext>,
    advertiser: Arc<dyn ServiceAdvertiser>,
    shutdown: CancellationToken,
}

impl StreamServer {
    /// Bind the configured listen address
    pub async fn bind(&self) -> Result<TcpListener> {
        let address = format!("{}:{}", self.config.ip, self.config.port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| ServerError::BindFailed {
                address: address.clone(),
                source: e,
            })?;

        info!("Server listening on {}", address);
        Ok(listener)
    }

    /// Bind, advertise, and run the accept loop until shutdown
    pub async fn start(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Run the accept loop on an already-bound listener.
    ///
    /// Service advertisement is best-effort: a failure is logged and
    /// serving proceeds regardless.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        if self.discovery.enabled {
            let port = listener
                .local_addr()
                .map(|addr| addr.port())
                .unwrap_or(self.config.port);

            if let Err(e) = self.advertiser.advertise(
                &self.discovery.service_name,
                &self.discovery.service_type,
                port,
            ) {
                warn!("Service advertisement failed (continuing): {}", e);
            }
        }

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested, stopping accept loop");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((socket, peer)) => {
                            self.context.stats.connection_accepted();
                            let context = Arc::clone(&self.context);
                            tokio::spawn(async move {
                                handle_connection(context, socket, peer).await;
                            });
                        }
                        Err(e) => {
                            warn!("Accept failed: {}", e);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Token that stops the accept loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Server-wide statistics
    pub fn stats(&self) -> Arc<ServerStats> {
        Arc::clone(&self.context.stats)
    }
}

/// Serve one accepted connection to completion.
///
/// Reads exactly one request line; everything after it (headers, body) is
/// ignored. A malformed or absent request line closes the socket with no
/// response bytes at all.
async fn handle_connection(context: Arc<ConnectionContext>, socket: TcpStream, peer: SocketAddr) {
    let mut state = ClientState::Connected;
    debug!("Connection from {} ({:?})", peer, state);

    let (read_half, write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);
    let mut writer = BufWriter::new(write_half);

    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) => {
            debug!("Connection from {} closed before a request line", peer);
            return;
        }
        Ok(_) => {}
        Err(e) => {
            debug!("Failed to read request line from {}: {}", peer, e);
            context.stats.connection_error();
            return;
        }
    }

    let request = match RequestLine::parse(line.trim_end()) {
        Ok(request) => request,
        Err(e) => {
            debug!("Malformed request from {}: {}", peer, e);
            context.stats.connection_error();
            return;
        }
    };

    match request.route() {
        "/" | "/stream" => {
            state = ClientState::Streaming;
            info!("Viewer connected from {} ({:?})", peer, state);
            context.stats.stream_started();

            let result = serve_mjpeg(
                &mut writer,
                &context.cache,
                context.frame_interval,
                &context.stats,
            )
            .await;

            context.stats.stream_ended();
            if let Err(e) = result {
                debug!("Viewer {} disconnected: {}", peer, e);
            }
        }
        _ => {
            // Headers are ignored, but drain them so closing the socket
            // after the response cannot reset unread client data.
            drain_headers(&mut reader).await;

            let response = context.control.handle(&request).await;
            context.stats.request_served();

            if let Err(e) = response.write_to(&mut writer).await {
                debug!("Failed to answer {} from {}: {}", request.path, peer, e);
                context.stats.connection_error();
            }
        }
    }

    state = ClientState::Closed;
    debug!("Connection from {} done ({:?})", peer, state);
}

/// Read and discard header lines up to the blank line ending the request
async fn drain_headers<R>(reader: &mut R)
where
    R: AsyncBufReadExt + Unpin,
{
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if line == "\r\n" || line == "\n" {
                    break;
                }
            }
        }
    }
}

/// Stream server builder for configuration
pub struct StreamServerBuilder {
    config: Option<ServerConfig>,
    discovery: Option<DiscoveryConfig>,
    cache: Option<Arc<FrameCache>>,
    volume: Option<Arc<VolumeControl>>,
    registry: Option<Arc<GestureRegistry>>,
    geometry: Option<ScreenGeometry>,
    advertiser: Option<Arc<dyn ServiceAdvertiser>>,
    shutdown: Option<CancellationToken>,
}

impl StreamServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            discovery: None,
            cache: None,
            volume: None,
            registry: None,
            geometry: None,
            advertiser: None,
            shutdown: None,
        }
    }

    /// Set the server configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the discovery configuration
    pub fn discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Set the frame cache
    pub fn cache(mut self, cache: Arc<FrameCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the volume control
    pub fn volume(mut self, volume: Arc<VolumeControl>) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Set the gesture registry
    pub fn registry(mut self, registry: Arc<GestureRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the screen geometry for coordinate mapping
    pub fn geometry(mut self, geometry: ScreenGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Set the service advertiser (defaults to a no-op)
    pub fn advertiser(mut self, advertiser: Arc<dyn ServiceAdvertiser>) -> Self {
        self.advertiser = Some(advertiser);
        self
    }

    /// Set the shutdown token (defaults to a fresh one)
    pub fn shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Build the stream server
    pub fn build(self) -> Result<StreamServer> {
        let config = self.config.ok_or_else(|| {
            MotecastError::Server(ServerError::StartupFailed {
                details: "Server configuration is required".to_string(),
            })
        })?;

        let cache = self.cache.ok_or_else(|| {
            MotecastError::Server(ServerError::StartupFailed {
                details: "Frame cache is required".to_string(),
            })
        })?;

        let volume = self.volume.ok_or_else(|| {
            MotecastError::Server(ServerError::StartupFailed {
                details: "Volume control is required".to_string(),
            })
        })?;

        let registry = self.registry.ok_or_else(|| {
            MotecastError::Server(ServerError::StartupFailed {
                details: "Gesture registry is required".to_string(),
            })
        })?;

        let geometry = self.geometry.ok_or_else(|| {
            MotecastError::Server(ServerError::StartupFailed {
                details: "Screen geometry is required".to_string(),
            })
        })?;

        let frame_interval =
            Duration::from_micros(1_000_000u64 / config.target_fps.max(1) as u64);

        let context = Arc::new(ConnectionContext {
            cache: Arc::clone(&cache),
            control: ControlHandler::new(volume, registry, geometry),
            stats: Arc::new(ServerStats::new()),
            frame_interval,
        });

        Ok(StreamServer {
            config,
            discovery: self.discovery.unwrap_or_else(default_discovery),
            context,
            advertiser: self
                .advertiser
                .unwrap_or_else(|| Arc::new(NoopAdvertiser) as Arc<dyn ServiceAdvertiser>),
            shutdown: self.shutdown.unwrap_or_default(),
        })
    }
}

fn default_discovery() -> DiscoveryConfig {
    crate::config::MotecastConfig::default().discovery
}

impl Default for StreamServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
