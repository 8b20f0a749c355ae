//! User accounts stored in the `User` collection.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Persisted user record. `password` holds the argon2 PHC string, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
}

impl User {
    /// New record without an identifier; the store assigns one on insert.
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: None,
            email,
            password_hash,
        }
    }

    /// Identity for token issuance. `None` until the record has been stored.
    pub fn identity(&self) -> Option<Identity> {
        self.id.map(|id| Identity {
            id: id.to_hex(),
            email: self.email.clone(),
        })
    }
}

/// Authenticated principal carried in tokens and request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
}
