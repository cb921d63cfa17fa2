use thiserror::Error;

#[derive(Error, Debug)]
pub enum MotecastError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Gesture error: {0}")]
    Gesture(#[from] GestureError),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl MotecastError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the streaming/control server itself.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    BindFailed {
        address: String,
        source: std::io::Error,
    },

    #[error("Server startup failed: {details}")]
    StartupFailed { details: String },
}

/// Per-request failures. These answer or close a single connection and are
/// never fatal to the listener.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Malformed request line")]
    MalformedRequestLine,
}

#[derive(Error, Debug)]
pub enum GestureError {
    #[error("No gesture dispatcher registered")]
    Unavailable,

    #[error("Gesture injection not supported on this platform")]
    Unsupported,
}

pub type Result<T> = std::result::Result<T, MotecastError>;
