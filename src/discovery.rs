use crate::error::Result;
use tracing::info;

/// Seam for the local-network advertisement collaborator.
///
/// Registration is fire-and-forget: the server calls `advertise` once at
/// startup, logs a failure, and serves either way. Actual mDNS/DNS-SD
/// plumbing lives outside this crate.
pub trait ServiceAdvertiser: Send + Sync {
    fn advertise(&self, service_name: &str, service_type: &str, port: u16) -> Result<()>;
}

/// Advertiser that does nothing, for tests and embedding
pub struct NoopAdvertiser;

impl ServiceAdvertiser for NoopAdvertiser {
    fn advertise(&self, _service_name: &str, _service_type: &str, _port: u16) -> Result<()> {
        Ok(())
    }
}

/// Advertiser that records the registration in the log so an operator can
/// wire up an external responder by hand
pub struct LoggingAdvertiser;

impl ServiceAdvertiser for LoggingAdvertiser {
    fn advertise(&self, service_name: &str, service_type: &str, port: u16) -> Result<()> {
        info!(
            "Would advertise service '{}' ({}) on port {}",
            service_name, service_type, port
        );
        Ok(())
    }
}
