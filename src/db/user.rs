//! User database operations for authentication

use chrono::Utc;
use uuid::Uuid;

use super::AppState;
use crate::auth::model::User;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, refresh_token, created_at, updated_at";

impl AppState {
    /// Get user by username
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn get_user_by_id(&self, user_id: &Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Get user by refresh token
    pub async fn get_user_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE refresh_token = ?"
        ))
        .bind(refresh_token)
        .fetch_optional(&self.pool)
        .await
    }

    /// Create new user
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    /// Store or clear the user's refresh token (one session per user)
    pub async fn update_user_refresh_token(
        &self,
        user_id: &Uuid,
        refresh_token: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET refresh_token = ?, updated_at = ? WHERE id = ?")
            .bind(refresh_token)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
