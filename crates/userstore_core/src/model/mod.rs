//! Domain records managed by repositories.
//!
//! # Responsibility
//! - Define plain data shapes for full records and their write payloads.
//! - Own field-level write semantics (full replace vs partial merge).
//!
//! # Invariants
//! - Every entity is identified by an `EntityId` assigned by a repository.
//! - Callers never choose identifiers; create payloads carry none.

pub mod user;

/// Repository-assigned integer identifier.
///
/// Starts at 1 and is never reused within one repository instance.
pub type EntityId = i64;

/// Domain record that a repository can own.
///
/// The associated payload types let one generic repository implementation
/// serve any entity shape.
pub trait Entity: Clone {
    /// Input for creating a new record. Carries no identifier.
    type Create;
    /// Input for modifying a record. Every field is independently optional.
    type Update;

    fn id(&self) -> EntityId;

    /// Builds a full record from a create payload and an assigned id.
    fn from_create(id: EntityId, payload: &Self::Create) -> Self;

    /// Full replace: writes every payload field verbatim, absent ones included.
    fn replace(&mut self, payload: &Self::Update);

    /// Partial merge: writes only payload fields that are present.
    fn merge(&mut self, payload: &Self::Update);
}
