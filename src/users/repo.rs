use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::users::repo_types::{NewUser, User, UserPatch};

const USER_COLUMNS: &str = "id, email, password_hash, name, age, gender, contact, address, \
                            blood_group, blood_pressure, language";

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistent store for user rows.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Inserts a row. Fails with [`RepoError::DuplicateEmail`] when the
    /// email is already taken.
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError>;

    /// Applies `patch` to the row in one atomic commit and returns the
    /// updated row, or `None` when no row has this id.
    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, RepoError>;

    /// Swaps the password hash only if it still equals `expected`. Returns
    /// false when the row is gone or its hash changed since it was read.
    async fn replace_password_hash(
        &self,
        id: i64,
        expected: &str,
        new_hash: &str,
    ) -> Result<bool, RepoError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        // Uniqueness comes from the UNIQUE constraint on users.email.
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, name, contact)
            VALUES ($1, $2, COALESCE($3, 'Guest'), $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.name)
        .bind(&new_user.contact)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(RepoError::DuplicateEmail)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, RepoError> {
        let mut tx = self.db.begin().await?;

        let Some(mut user) = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        if patch.is_empty() {
            tx.commit().await?;
            return Ok(Some(user));
        }

        patch.apply_to(&mut user);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2, age = $3, gender = $4, contact = $5, address = $6,
                blood_group = $7, blood_pressure = $8, language = $9
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.name)
        .bind(user.age)
        .bind(&user.gender)
        .bind(&user.contact)
        .bind(&user.address)
        .bind(&user.blood_group)
        .bind(&user.blood_pressure)
        .bind(&user.language)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(user_id = id, "user row updated");
        Ok(Some(user))
    }

    async fn replace_password_hash(
        &self,
        id: i64,
        expected: &str,
        new_hash: &str,
    ) -> Result<bool, RepoError> {
        // The WHERE clause is re-evaluated under the row lock, so of two
        // racing swaps from the same hash only one matches.
        let done = sqlx::query(
            "UPDATE users SET password_hash = $3 WHERE id = $1 AND password_hash = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(new_hash)
        .execute(&self.db)
        .await?;
        Ok(done.rows_affected() == 1)
    }
}
