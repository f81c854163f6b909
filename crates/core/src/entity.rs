//! Entity trait: identity + continuity across state changes.

use chrono::{DateTime, Utc};

/// A record with a stable identity and an audit trail of when it was
/// created and last modified.
///
/// Two entities with the same `id` are the same entity, regardless of the
/// values of their other fields.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// When the entity was first stored. Never changes afterwards.
    fn created_at(&self) -> DateTime<Utc>;

    /// When the entity was last mutated.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Record that the entity was mutated at `at`.
    fn touch(&mut self, at: DateTime<Utc>);
}
