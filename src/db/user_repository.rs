use crate::models::User;
use sqlx::SqlitePool;
use time::OffsetDateTime;

pub struct UserRepository<'a> {
    pub pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, name: &str, email: &str) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(OffsetDateTime::now_utc())
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Resolve a monitor owner to the address alerts go to.
    pub async fn get_email_by_id(&self, user_id: i64) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT email FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|(email,)| email))
    }

    pub async fn get_by_id(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
    }
}
