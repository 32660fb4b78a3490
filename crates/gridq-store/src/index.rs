//! Secondary index maintenance hooks
//!
//! Indexes register against a partition under an extractor identity and are
//! kept in sync purely by hooks fired on entry insert/remove. An index is a
//! cache over the partition's entries, never a source of truth: consumers
//! must tolerate it being stale relative to the entries themselves.
//!
//! Capability discovery happens through `as_any_arc`: a caller that needs a
//! richer interface than raw maintenance (cursor resolution, sorted views)
//! downcasts to the concrete index type and treats a failed downcast as a
//! configuration error.

use std::any::Any;
use std::sync::Arc;

/// A secondary index maintained against a partition's entries.
///
/// Hooks are infallible: an index that cannot interpret an entry (e.g. a
/// key written by a different subsystem) must ignore it rather than fail
/// the mutation that triggered the hook.
pub trait MapIndex: Send + Sync + 'static {
    /// Entry inserted or replaced. `old` is the prior value when the key
    /// was already present.
    fn on_insert(&self, key: &[u8], old: Option<&[u8]>, new: &[u8]);

    /// Entry removed. `old` is the value that was removed.
    fn on_remove(&self, key: &[u8], old: &[u8]);

    /// Capability downcast support.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}
