//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Rows that are merged from change notifications (see `npi-inventory::live`)
/// are matched on this identity.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
