use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The resolved identity of a request: a real user, or a guest carrying a
/// client-generated UUID.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl CurrentUser {
    /// The author label captured onto comments at post time.
    pub fn display_label(&self) -> String {
        let label = self
            .name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.email.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("User");
        label.chars().take(200).collect()
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_label_prefers_name_then_email() {
        let mut u = CurrentUser {
            id: Uuid::new_v4(),
            email: Some("a@x.com".to_string()),
            name: Some("Alice".to_string()),
        };
        assert_eq!(u.display_label(), "Alice");
        u.name = None;
        assert_eq!(u.display_label(), "a@x.com");
        u.email = None;
        assert_eq!(u.display_label(), "User");
    }

    #[test]
    fn display_label_is_capped_at_200_chars() {
        let u = CurrentUser {
            id: Uuid::new_v4(),
            email: None,
            name: Some("x".repeat(300)),
        };
        assert_eq!(u.display_label().len(), 200);
    }
}
