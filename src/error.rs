/// The error returned when a table cannot be sized as requested.
///
/// Returned by the `try_*` constructors and by `try_reserve`. A failed call
/// leaves the table it was called on untouched.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TryReserveError {
    /// The prime capacity needed to satisfy the request does not fit in a
    /// `usize`.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocator could not provide the slot array.
    #[error("failed to allocate a table of {slots} slots")]
    AllocError {
        /// Number of slots that were requested.
        slots: usize,
    },
}
