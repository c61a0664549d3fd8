use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::users::{NewUser, User, UserRepo};

/// Argon2id hash with default cost parameters that matches no password.
/// Checked on the unknown-email path so login takes as long either way.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$\
                          AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hashes the password and inserts the row. The store's unique constraint
/// decides duplicate emails.
pub async fn register_user(
    users: &dyn UserRepo,
    email: String,
    password: &str,
    name: Option<String>,
    contact: Option<String>,
) -> Result<User, ApiError> {
    let password_hash = hash_password(password)?;
    let user = users
        .create(NewUser {
            email,
            password_hash,
            name,
            contact,
        })
        .await
        .inspect_err(|e| warn!(error = %e, "create user failed"))?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Looks the account up by email and checks the password.
pub async fn authenticate(
    users: &dyn UserRepo,
    email: &str,
    password: &str,
) -> Result<User, ApiError> {
    let Some(user) = users.find_by_email(email).await? else {
        let _ = verify_password(password, DUMMY_HASH);
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials("Invalid credentials"));
    };

    if !verify_password(password, &user.password_hash) {
        warn!(email = %email, user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials("Invalid credentials"));
    }

    Ok(user)
}

/// Replaces the password hash after re-checking the old password. The swap
/// only lands if the stored hash is still the one that was verified, so of
/// two concurrent changes from the same old password one fails.
pub async fn change_password(
    users: &dyn UserRepo,
    user_id: i64,
    old_password: &str,
    new_password: &str,
) -> Result<(), ApiError> {
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    if !verify_password(old_password, &user.password_hash) {
        warn!(user_id, "change password: old password incorrect");
        return Err(ApiError::InvalidCredentials("Old password incorrect"));
    }

    let new_hash = hash_password(new_password)?;
    if !users
        .replace_password_hash(user_id, &user.password_hash, &new_hash)
        .await?
    {
        return match users.find_by_id(user_id).await? {
            Some(_) => {
                warn!(user_id, "change password: hash changed concurrently");
                Err(ApiError::InvalidCredentials("Old password incorrect"))
            }
            None => Err(ApiError::UserNotFound),
        };
    }

    info!(user_id, "password changed");
    Ok(())
}
