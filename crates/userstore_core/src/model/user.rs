//! User domain model.
//!
//! # Invariants
//! - `id` is assigned once by the owning repository and never changes.
//! - Records built from `UserCreate` carry all four scalar fields.
//! - A full-replace update may leave scalar fields unset; that state is
//!   representable on `User` so stored values can mirror the payload verbatim.

use super::{Entity, EntityId};
use serde::{Deserialize, Serialize};

/// Full user record as returned by every repository backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Expected unique across the collection; enforced by the SQLite backend only.
    pub username: Option<String>,
    /// Expected unique across the collection; enforced by the SQLite backend only.
    pub email: Option<String>,
}

/// Payload for creating a user. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreate {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
}

/// Payload for `update` and `patch`.
///
/// `None` means "absent": `patch` leaves the stored value alone, while
/// `update` writes it through as an unset value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserCreate {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            username: username.into(),
            email: email.into(),
        }
    }
}

impl UserUpdate {
    /// Payload with every field present.
    pub fn all(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            username: Some(username.into()),
            email: Some(email.into()),
        }
    }

    /// Returns whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.email.is_none()
    }
}

impl Entity for User {
    type Create = UserCreate;
    type Update = UserUpdate;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_create(id: EntityId, payload: &UserCreate) -> Self {
        Self {
            id,
            first_name: Some(payload.first_name.clone()),
            last_name: Some(payload.last_name.clone()),
            username: Some(payload.username.clone()),
            email: Some(payload.email.clone()),
        }
    }

    fn replace(&mut self, payload: &UserUpdate) {
        self.first_name = payload.first_name.clone();
        self.last_name = payload.last_name.clone();
        self.username = payload.username.clone();
        self.email = payload.email.clone();
    }

    fn merge(&mut self, payload: &UserUpdate) {
        merge_field(&mut self.first_name, &payload.first_name);
        merge_field(&mut self.last_name, &payload.last_name);
        merge_field(&mut self.username, &payload.username);
        merge_field(&mut self.email, &payload.email);
    }
}

fn merge_field(target: &mut Option<String>, value: &Option<String>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}
