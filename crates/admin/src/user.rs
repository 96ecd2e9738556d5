//! Staff user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradeerp_core::{DomainError, DomainResult, Entity, typed_id};

typed_id!(
    /// Unique identifier for a user.
    UserId,
    "user id"
);

// ─────────────────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Staff => "STAFF",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    display_name: String,
    role: Role,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn validate_username(username: &str) -> DomainResult<()> {
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(DomainError::validation(
            "username must be between 3 and 32 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'))
    {
        return Err(DomainError::validation(
            "username may only contain lower-case letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> DomainResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => {
            Ok(())
        }
        _ => Err(DomainError::validation(format!("email is not valid: '{email}'"))),
    }
}

impl User {
    /// Create an active user. Username uniqueness is checked by the service.
    pub fn create(id: UserId, input: NewUser, now: DateTime<Utc>) -> DomainResult<Self> {
        let username = input.username.trim().to_ascii_lowercase();
        validate_username(&username)?;
        let email = input.email.trim().to_string();
        validate_email(&email)?;
        let display_name = input.display_name.trim().to_string();
        if display_name.is_empty() {
            return Err(DomainError::validation("display_name must not be empty"));
        }

        Ok(Self {
            id,
            username,
            email,
            display_name,
            role: input.role,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn change_role(&mut self, role: Role, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::business(
                "USER_INACTIVE",
                format!("user {} is deactivated", self.username),
            ));
        }
        if self.role == role {
            return Err(DomainError::business(
                "USER_ROLE_UNCHANGED",
                format!("user {} already has role {}", self.username, role.as_str()),
            ));
        }
        self.role = role;
        self.updated_at = now;
        Ok(())
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::business(
                "USER_ALREADY_INACTIVE",
                format!("user {} is already deactivated", self.username),
            ));
        }
        self.active = false;
        self.updated_at = now;
        Ok(())
    }

    pub fn reactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.active {
            return Err(DomainError::business(
                "USER_ALREADY_ACTIVE",
                format!("user {} is already active", self.username),
            ));
        }
        self.active = true;
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> DomainResult<User> {
        User::create(
            UserId::generate(),
            NewUser {
                username: username.to_string(),
                email: email.to_string(),
                display_name: "Kim Minji".to_string(),
                role: Role::Staff,
            },
            Utc::now(),
        )
    }

    #[test]
    fn create_lowercases_username() {
        let user = new_user("  MinJi.Kim ", "minji@example.com").unwrap();
        assert_eq!(user.username(), "minji.kim");
        assert_eq!(user.role(), Role::Staff);
        assert!(user.is_active());
    }

    #[test]
    fn create_rejects_bad_username_and_email() {
        assert!(matches!(new_user("ab", "a@b.co"), Err(DomainError::Validation(_))));
        assert!(matches!(new_user("has space", "a@b.co"), Err(DomainError::Validation(_))));
        assert!(matches!(new_user("valid", "not-an-email"), Err(DomainError::Validation(_))));
        assert!(matches!(new_user("valid", "@example.com"), Err(DomainError::Validation(_))));
    }

    #[test]
    fn deactivated_user_cannot_change_role() {
        let mut user = new_user("minji", "minji@example.com").unwrap();
        user.change_role(Role::Manager, Utc::now()).unwrap();
        assert_eq!(user.role(), Role::Manager);

        user.deactivate(Utc::now()).unwrap();
        let err = user.change_role(Role::Admin, Utc::now()).unwrap_err();
        assert_eq!(err.code(), Some("USER_INACTIVE"));
        assert_eq!(user.role(), Role::Manager);
    }

    #[test]
    fn same_role_is_rejected() {
        let mut user = new_user("minji", "minji@example.com").unwrap();
        let err = user.change_role(Role::Staff, Utc::now()).unwrap_err();
        assert_eq!(err.code(), Some("USER_ROLE_UNCHANGED"));
    }
}
