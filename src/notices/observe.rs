//! # Core observer trait
//!
//! `Observe` is the extension point for plugging custom notice handlers into
//! the scheduler. Each observer is driven by a dedicated worker loop fed by a
//! bounded queue owned by the [`ObserverSet`](crate::notices::ObserverSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) - they do **not** block the
//!   scheduler loop nor other observers.
//! - Each observer **declares** its preferred queue capacity via
//!   [`Observe::queue_capacity`]. If a queue overflows, notices for that
//!   observer are **dropped** (warn).

use async_trait::async_trait;

use super::notice::Notice;

/// Contract for notice observers.
///
/// Called from an observer-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Handles a single notice for this observer.
    async fn on_notice(&self, notice: &Notice);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this observer's queue.
    ///
    /// On overflow, notices for this observer are **dropped** (warn).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
