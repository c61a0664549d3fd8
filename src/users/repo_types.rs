use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const DEFAULT_NAME: &str = "Guest";
pub const DEFAULT_LANGUAGE: &str = "English";

/// User record in the database. Serializes to the public user view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON

    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,

    pub blood_group: Option<String>,
    pub blood_pressure: Option<String>,

    pub language: String,
}

/// Values needed to insert a new user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub contact: Option<String>,
}

impl NewUser {
    /// Materializes the row as the store would, with defaults filled in.
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            age: None,
            gender: None,
            contact: self.contact,
            address: None,
            blood_group: None,
            blood_pressure: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// A partial profile update. Outer `None` leaves the field untouched; for
/// nullable fields `Some(None)` clears it. The password hash is never part of
/// a patch, see [`UserRepo::replace_password_hash`](crate::users::UserRepo::replace_password_hash).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub age: Option<Option<i32>>,
    pub gender: Option<Option<String>>,
    pub contact: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub blood_group: Option<Option<String>>,
    pub blood_pressure: Option<Option<String>>,
    pub language: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(self, user: &mut User) {
        if let Some(v) = self.name {
            user.name = v;
        }
        if let Some(v) = self.age {
            user.age = v;
        }
        if let Some(v) = self.gender {
            user.gender = v;
        }
        if let Some(v) = self.contact {
            user.contact = v;
        }
        if let Some(v) = self.address {
            user.address = v;
        }
        if let Some(v) = self.blood_group {
            user.blood_group = v;
        }
        if let Some(v) = self.blood_pressure {
            user.blood_pressure = v;
        }
        if let Some(v) = self.language {
            user.language = v;
        }
    }
}
