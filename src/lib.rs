pub mod config;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gesture;
pub mod server;
pub mod source;
pub mod volume;

pub use config::MotecastConfig;
pub use discovery::{LoggingAdvertiser, NoopAdvertiser, ServiceAdvertiser};
pub use error::{MotecastError, Result};
pub use frame::{Frame, FrameCache, FrameCacheStatsSnapshot};
pub use geometry::{CoordinateMapper, ScreenGeometry};
pub use gesture::{GestureDispatch, GestureRegistry, GestureRequest, MockGestureDispatch};
pub use server::{ClientState, ServerStats, ServerStatsSnapshot, StreamServer, StreamServerBuilder};
pub use source::FileFrameSource;
pub use volume::{VolumeControl, VolumeState};
