//! Host adapter surface.
//!
//! The worker never talks to clients or windows directly; it asks the
//! host. Hosts embedding the worker implement this trait, tests use a
//! recording stub, and the standalone binary runs with [`NullHost`].

/// Capabilities the embedding host exposes to the worker.
pub trait Host: Send + Sync {
    /// Take control of all active clients, including in-flight
    /// sessions started under a previous cache generation.
    fn claim_clients(&self);

    /// Open (or focus) a client view on the given URL.
    fn open_window(&self, url: &str);
}

/// Host that ignores every request. Used by the standalone binary,
/// which has no client views to claim or open.
pub struct NullHost;

impl Host for NullHost {
    fn claim_clients(&self) {}

    fn open_window(&self, url: &str) {
        tracing::debug!(url, "no host window surface, open_window dropped");
    }
}
