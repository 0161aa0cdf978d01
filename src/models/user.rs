use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i32,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub phone_number: Option<String>,
}

impl User {
    pub async fn find_by_email(email: &str, db: &Database) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password, role, created_at, updated_at
             FROM users
             WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&db.pool)
        .await
    }

    /// Inserts the user and an empty-or-filled profile row in one transaction.
    /// A duplicate email surfaces as a unique violation.
    pub async fn register(
        db: &Database,
        email: &str,
        password_hash: &str,
        profile: &Profile,
    ) -> Result<(User, Profile), sqlx::Error> {
        let mut tx = db.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password, role, created_at)
             VALUES ($1, $2, 'user', NOW())
             RETURNING id, email, password, role, created_at, updated_at",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await?;

        let profile = sqlx::query_as::<_, Profile>(
            "INSERT INTO profile (user_id, firstname, lastname, phone_number)
             VALUES ($1, $2, $3, $4)
             RETURNING user_id, firstname, lastname, phone_number",
        )
        .bind(user.id)
        .bind(&profile.firstname)
        .bind(&profile.lastname)
        .bind(&profile.phone_number)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((user, profile))
    }
}

impl Profile {
    pub async fn find(user_id: i32, db: &Database) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            "SELECT user_id, firstname, lastname, phone_number FROM profile WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&db.pool)
        .await
    }

    /// Replaces all profile fields. Returns `false` if the user has no profile row.
    pub async fn replace(&self, db: &Database) -> Result<bool, sqlx::Error> {
        let mut tx = db.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE profile
             SET firstname = $1, lastname = $2, phone_number = $3
             WHERE user_id = $4",
        )
        .bind(&self.firstname)
        .bind(&self.lastname)
        .bind(&self.phone_number)
        .bind(self.user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE users SET updated_at = NOW() WHERE id = $1")
            .bind(self.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
