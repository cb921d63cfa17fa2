mod control;
mod request;
mod response;
mod server;
mod stats;
mod stream;
#[cfg(test)]
mod tests;

pub use control::ControlHandler;
pub use request::RequestLine;
pub use response::{ControlResponse, ResponseBody};
pub use server::{ClientState, StreamServer, StreamServerBuilder};
pub use stats::{ServerStats, ServerStatsSnapshot};
