//! Non-fatal anomaly reporting.
//!
//! Readers tolerate a range of structural oddities produced by buggy or
//! older writers (unknown table-of-contents names, reserved non-zero
//! bytes, out-of-order leaf records) without failing outright. Those
//! anomalies are surfaced through a handler reference threaded down through
//! a single read call, rather than a process-wide or thread-local slot, so
//! the handler can borrow state local to that call (a `Vec` the caller is
//! collecting into, for instance) instead of needing to own everything it
//! touches.

/// A single non-fatal anomaly observed while reading or writing a
/// container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The allocator's reserved word following `blockCount` was non-zero.
    ReservedNonZero { location: &'static str },
    /// A table-of-contents entry used a name other than `"DSDB"`.
    UnknownTableOfContentsName { name: String, block: u32 },
    /// Two adjacent records in a leaf were not in increasing order.
    OutOfOrderLeafRecords { block: u32, index: usize },
}

/// Reports `diagnostic` to `handler` and logs it at `warn` level.
pub(crate) fn report(handler: &mut dyn FnMut(Diagnostic), diagnostic: Diagnostic) {
    log::warn!("diagnostic: {diagnostic:?}");
    handler(diagnostic);
}
