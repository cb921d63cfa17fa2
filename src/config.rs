use crate::geometry::ScreenGeometry;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MotecastConfig {
    pub server: ServerConfig,
    pub screen: ScreenConfig,
    pub volume: VolumeConfig,
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind to
    #[serde(default = "default_server_ip")]
    pub ip: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Target streaming frame rate per viewer
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScreenConfig {
    /// Scaled-down capture resolution (width, height)
    #[serde(default = "default_capture_resolution")]
    pub capture_resolution: (u32, u32),

    /// Real device screen resolution (width, height)
    #[serde(default = "default_device_resolution")]
    pub device_resolution: (u32, u32),
}

impl ScreenConfig {
    pub fn geometry(&self) -> ScreenGeometry {
        ScreenGeometry::new(
            self.capture_resolution.0,
            self.capture_resolution.1,
            self.device_resolution.0,
            self.device_resolution.1,
        )
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VolumeConfig {
    /// Maximum volume level
    #[serde(default = "default_volume_max")]
    pub max: i32,

    /// Volume level at startup
    #[serde(default = "default_volume_initial")]
    pub initial: i32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscoveryConfig {
    /// Whether to attempt best-effort service advertisement at startup
    #[serde(default = "default_discovery_enabled")]
    pub enabled: bool,

    /// Service name to advertise
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Service type to advertise
    #[serde(default = "default_service_type")]
    pub service_type: String,
}

impl MotecastConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("motecast.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            // Start with default values
            .set_default("server.ip", default_server_ip())?
            .set_default("server.port", default_server_port() as i64)?
            .set_default("server.target_fps", default_target_fps() as i64)?
            .set_default(
                "screen.capture_resolution",
                vec![
                    default_capture_resolution().0 as i64,
                    default_capture_resolution().1 as i64,
                ],
            )?
            .set_default(
                "screen.device_resolution",
                vec![
                    default_device_resolution().0 as i64,
                    default_device_resolution().1 as i64,
                ],
            )?
            .set_default("volume.max", default_volume_max() as i64)?
            .set_default("volume.initial", default_volume_initial() as i64)?
            .set_default("discovery.enabled", default_discovery_enabled())?
            .set_default("discovery.service_name", default_service_name())?
            .set_default("discovery.service_type", default_service_type())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with MOTECAST_ prefix
            .add_source(Environment::with_prefix("MOTECAST").separator("_"))
            .build()?;

        let config: MotecastConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.target_fps == 0 {
            return Err(ConfigError::Message(
                "Server target_fps must be greater than 0".to_string(),
            ));
        }

        if self.screen.capture_resolution.0 == 0 || self.screen.capture_resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Capture resolution must be greater than 0".to_string(),
            ));
        }

        if self.screen.device_resolution.0 == 0 || self.screen.device_resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Device resolution must be greater than 0".to_string(),
            ));
        }

        if self.volume.max < 0 {
            return Err(ConfigError::Message(
                "Volume max must not be negative".to_string(),
            ));
        }

        if self.volume.initial < 0 || self.volume.initial > self.volume.max {
            return Err(ConfigError::Message(
                "Volume initial must be within [0, max]".to_string(),
            ));
        }

        if self.discovery.service_name.is_empty() {
            return Err(ConfigError::Message(
                "Discovery service_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for MotecastConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                ip: default_server_ip(),
                port: default_server_port(),
                target_fps: default_target_fps(),
            },
            screen: ScreenConfig {
                capture_resolution: default_capture_resolution(),
                device_resolution: default_device_resolution(),
            },
            volume: VolumeConfig {
                max: default_volume_max(),
                initial: default_volume_initial(),
            },
            discovery: DiscoveryConfig {
                enabled: default_discovery_enabled(),
                service_name: default_service_name(),
                service_type: default_service_type(),
            },
        }
    }
}

// Default value functions
fn default_server_ip() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    8080
}
fn default_target_fps() -> u32 {
    30
}

fn default_capture_resolution() -> (u32, u32) {
    (400, 240)
}
fn default_device_resolution() -> (u32, u32) {
    (1080, 1920)
}

fn default_volume_max() -> i32 {
    15
}
fn default_volume_initial() -> i32 {
    7
}

fn default_discovery_enabled() -> bool {
    true
}
fn default_service_name() -> String {
    "mote".to_string()
}
fn default_service_type() -> String {
    "_http._tcp".to_string()
}
