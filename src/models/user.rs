use serde::{Deserialize, Serialize};

use super::{ValidationError, optional_text};

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 32;
pub const MAX_NAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 8;

/// User record without the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub last_login: Option<String>,
    pub refresh_token_version: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.username.clone(),
        }
    }
}

/// Authenticated caller, resolved from an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl NewUser {
    pub fn normalized(self) -> Result<Self, ValidationError> {
        Ok(Self {
            username: validate_username(&self.username)?,
            email: validate_email(&self.email)?,
            password: validate_password(self.password)?,
            first_name: optional_text("First name", self.first_name, MAX_NAME_LEN)?,
            last_name: optional_text("Last name", self.last_name, MAX_NAME_LEN)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileChanges {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileChanges {
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let changes = Self {
            email: self.email.as_deref().map(validate_email).transpose()?,
            first_name: optional_text("First name", self.first_name, MAX_NAME_LEN)?,
            last_name: optional_text("Last name", self.last_name, MAX_NAME_LEN)?,
        };

        if changes.email.is_none() && changes.first_name.is_none() && changes.last_name.is_none()
        {
            return Err(ValidationError::new("No updates provided"));
        }
        Ok(changes)
    }
}

pub fn validate_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();
    let len = trimmed.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&len) {
        return Err(ValidationError::new(format!(
            "Username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"
        )));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("Username cannot contain whitespace"));
    }
    Ok(trimmed.to_string())
}

pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        });

    if !valid {
        return Err(ValidationError::new("Invalid email format"));
    }
    Ok(email)
}

pub fn validate_password(password: String) -> Result<String, ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(ValidationError::new(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(ValidationError::new(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("Password must contain at least one digit"));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> User {
        User {
            id: 1,
            username: "jdoe".to_string(),
            email: "j@example.com".to_string(),
            first_name: first.map(ToString::to_string),
            last_name: last.map(ToString::to_string),
            is_active: true,
            last_login: None,
            refresh_token_version: 0,
            created_at: String::new(),
            updated_at: None,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(user(Some("John"), Some("Doe")).full_name(), "John Doe");
        assert_eq!(user(Some("John"), None).full_name(), "John");
        assert_eq!(user(None, Some("Doe")).full_name(), "Doe");
        assert_eq!(user(None, None).full_name(), "jdoe");
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(
            validate_email("  John@Example.COM ").unwrap(),
            "john@example.com"
        );
        assert!(validate_email("john.example.com").is_err());
        assert!(validate_email("john@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Secret123".to_string()).is_ok());
        assert!(validate_password("Short1A".to_string()).is_err());
        assert!(validate_password("alllowercase1".to_string()).is_err());
        assert!(validate_password("ALLUPPERCASE1".to_string()).is_err());
        assert!(validate_password("NoDigitsHere".to_string()).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username(" john_doe ").unwrap(), "john_doe");
        assert!(validate_username("jo").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("john doe").is_err());
    }

    #[test]
    fn test_profile_changes_require_field() {
        assert!(ProfileChanges::default().normalized().is_err());

        let changes = ProfileChanges {
            first_name: Some("  Jane ".to_string()),
            ..Default::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(changes.first_name.as_deref(), Some("Jane"));
    }
}
