use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};

/// The two roles that take part in scheduling.
///
/// Owners publish availability and may cancel appointments made against it;
/// consumers book open slots. The JSON form also accepts the `professor` and
/// `student` aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "professor")]
    Owner,
    #[serde(alias = "student")]
    Consumer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Consumer => "consumer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" | "professor" => Ok(Role::Owner),
            "consumer" | "student" => Ok(Role::Consumer),
            other => Err(BookingError::Validation(format!("Unknown role: {}", other))),
        }
    }
}

/// Caller identity, already verified by the authentication collaborator.
///
/// Every core operation takes one of these; the core trusts it completely
/// and only checks the role against what the operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub id: Uuid,
    pub role: Role,
}

impl AuthenticatedIdentity {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn owner(id: Uuid) -> Self {
        Self::new(id, Role::Owner)
    }

    pub fn consumer(id: Uuid) -> Self {
        Self::new(id, Role::Consumer)
    }

    /// Fails with `Forbidden` unless the identity carries `role`.
    pub fn require_role(&self, role: Role) -> BookingResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(BookingError::Forbidden(format!("{}s only", role)))
        }
    }
}

/// Public profile of a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn identity(&self) -> AuthenticatedIdentity {
        AuthenticatedIdentity::new(self.id, self.role)
    }
}

/// The subset of a profile shown to the other party of an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<UserProfile> for PublicProfile {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            email: profile.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> BookingResult<()> {
        if self.username.trim().is_empty() {
            return Err(BookingError::Validation("username must not be empty".to_string()));
        }
        if !self.email.contains('@') {
            return Err(BookingError::Validation(format!(
                "invalid email address: {}",
                self.email
            )));
        }
        Ok(())
    }
}
