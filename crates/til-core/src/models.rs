//! Entity types and request/response payloads for TIL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user. Owns zero or more acronyms.
///
/// The password hash stays inside the service; API responses use
/// [`PublicUser`] instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email: String,
    pub profile_picture: Option<String>,
    /// Set when the account was created through Google login.
    pub google_identity: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user, safe to return from any endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

impl User {
    /// Strip credentials for external consumption.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
        }
    }
}

/// The primary content entity: a short/long form pair owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acronym {
    pub id: Uuid,
    pub short: String,
    pub long: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A reusable text tag attachable to many acronyms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Opaque bearer credential for the JSON API and the website session.
///
/// Tokens carry no expiry: a stored token is valid until revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: Uuid,
    pub value: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request for registering a user. The plaintext password is hashed at the
/// handler boundary and never stored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub username: String,
    pub password: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

/// Request for creating or fully overwriting an acronym.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAcronymRequest {
    pub short: String,
    pub long: String,
}

/// Request for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

/// Validate an acronym payload before it reaches the store.
pub fn validate_acronym(req: &CreateAcronymRequest) -> std::result::Result<(), String> {
    if req.short.trim().is_empty() {
        return Err("Short form cannot be empty".to_string());
    }
    if req.long.trim().is_empty() {
        return Err("Long form cannot be empty".to_string());
    }
    Ok(())
}

/// Validate a category name.
///
/// Rules:
/// - Length between 1-100 characters
/// - No leading or trailing whitespace
pub fn validate_category_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    if name.len() > 100 {
        return Err("Category name must be 100 characters or less".to_string());
    }
    if name != name.trim() {
        return Err("Category name cannot start or end with whitespace".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Tim Berners-Lee".to_string(),
            username: "timbl".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            email: "tim@example.com".to_string(),
            profile_picture: None,
            google_identity: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("$2b$"));
        assert!(json.contains("timbl"));
    }

    #[test]
    fn test_to_public_projection() {
        let user = sample_user();
        let public = user.to_public();
        assert_eq!(public.id, user.id);
        assert_eq!(public.username, "timbl");
        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("email").is_none());
    }

    #[test]
    fn test_validate_acronym_rejects_empty_short() {
        let req = CreateAcronymRequest {
            short: "  ".to_string(),
            long: "Oh My God".to_string(),
        };
        assert!(validate_acronym(&req).is_err());
    }

    #[test]
    fn test_validate_acronym_accepts_valid() {
        let req = CreateAcronymRequest {
            short: "OMG".to_string(),
            long: "Oh My God".to_string(),
        };
        assert!(validate_acronym(&req).is_ok());
    }

    #[test]
    fn test_validate_category_name_rejects_empty() {
        assert!(validate_category_name("").is_err());
    }

    #[test]
    fn test_validate_category_name_rejects_padding() {
        assert!(validate_category_name(" Funny").is_err());
        assert!(validate_category_name("Funny ").is_err());
    }

    #[test]
    fn test_validate_category_name_rejects_overlong() {
        let name = "x".repeat(101);
        assert!(validate_category_name(&name).is_err());
    }

    #[test]
    fn test_validate_category_name_is_case_preserving() {
        // Names are case-sensitive throughout; validation must not fold case.
        assert!(validate_category_name("Funny").is_ok());
        assert!(validate_category_name("funny").is_ok());
    }
}
