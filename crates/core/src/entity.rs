//! Entity trait: backend records addressed by a numeric identifier.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier, if the backend sent one.
    fn id(&self) -> Option<Self::Id>;
}

/// Locate a record in an already-fetched list.
pub fn find_by_id<E: Entity>(items: &[E], id: E::Id) -> Option<&E> {
    items.iter().find(|e| e.id() == Some(id))
}
