use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, message = "password must be at least 5 characters"))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Тело PUT/PATCH /users/me/: меняются только переданные поля
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 5, message = "password must be at least 5 characters"))]
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Пользователь без пароля - для ответов API
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    // Найти активного пользователя по email
    pub async fn find_active_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, first_name, last_name, is_active, date_joined
             FROM users
             WHERE email = $1 AND is_active = TRUE",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn find(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, first_name, last_name, is_active, date_joined
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn register(pool: &PgPool, new_user: NewUser) -> Result<User, AppError> {
        new_user.validate()?;

        let NewUser { email, password, first_name, last_name } = new_user;
        let email = email.trim().to_lowercase();
        let password_hash = hash_password(password).await?;

        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, first_name, last_name)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, password_hash, first_name, last_name, is_active, date_joined",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(&first_name)
        .bind(&last_name)
        .fetch_one(pool)
        .await;

        match result {
            Ok(user) => {
                tracing::info!(user_id = user.id, "user registered");
                Ok(user)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::validation("user with this email already exists"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_profile(pool: &PgPool, id: i64, changes: UpdateProfile) -> Result<Option<User>, AppError> {
        changes.validate()?;

        let UpdateProfile { email, password, first_name, last_name } = changes;
        let email = email.map(|e| e.trim().to_lowercase());
        let password_hash = match password {
            Some(password) => Some(hash_password(password).await?),
            None => None,
        };

        let result = sqlx::query_as::<_, User>(
            "UPDATE users SET
                 email = COALESCE($2, email),
                 password_hash = COALESCE($3, password_hash),
                 first_name = COALESCE($4, first_name),
                 last_name = COALESCE($5, last_name)
             WHERE id = $1
             RETURNING id, email, password_hash, first_name, last_name, is_active, date_joined",
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(pool)
        .await;

        match result {
            Ok(user) => {
                tracing::info!(user_id = id, "user profile updated");
                Ok(user)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::validation("user with this email already exists"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn verify_password(&self, password: &str) -> bool {
        let hash = self.password_hash.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }
}

// bcrypt нагружает CPU - уводим с async-потоков
async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: user.date_joined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_requires_email_and_password() {
        let bad = NewUser {
            email: "not-an-email".into(),
            password: "123".into(),
            first_name: String::new(),
            last_name: String::new(),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn profile_update_accepts_partial_bodies() {
        let changes: UpdateProfile = serde_json::from_str(r#"{"first_name": "Ivan"}"#).unwrap();
        assert_eq!(changes.first_name.as_deref(), Some("Ivan"));
        assert!(changes.email.is_none() && changes.password.is_none() && changes.last_name.is_none());
        assert!(changes.validate().is_ok());

        let empty: UpdateProfile = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn profile_update_validates_the_fields_it_carries() {
        let bad = UpdateProfile {
            email: Some("nope".into()),
            password: Some("123".into()),
            ..UpdateProfile::default()
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[tokio::test]
    async fn password_is_checked_against_bcrypt_hash() {
        let user = User {
            id: 1,
            email: "testuser@test.com".into(),
            password_hash: bcrypt::hash("testpass", 4).unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            date_joined: Utc::now(),
        };
        assert!(user.verify_password("testpass").await);
        assert!(!user.verify_password("wrong").await);
    }
}
