use sqlx::PgPool;
use tracing::info;

use super::password::{hash_password, verify_password};
use crate::{
    error::{is_unique_violation, ApiError},
    users::repo::{Account, NewAccount},
};

/// Create an account, enforcing email uniqueness.
///
/// The read-then-insert pair is not atomic; concurrent registration with
/// the same email falls through to the unique constraint, which comes
/// back as `DuplicateAccount` instead of a 500.
pub async fn register_account(db: &PgPool, new: NewAccount) -> Result<Account, ApiError> {
    if Account::find_by_email(db, &new.email).await?.is_some() {
        return Err(ApiError::DuplicateAccount);
    }

    // Argon2 is CPU-bound; keep it off the request-handling threads.
    let password = new.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(anyhow::Error::from)??;

    let account = match Account::insert(db, &new.name, &new.email, &password_hash, new.role).await
    {
        Ok(account) => account,
        Err(err) if is_unique_violation(&err) => return Err(ApiError::DuplicateAccount),
        Err(err) => return Err(err.into()),
    };

    info!(
        account_id = account.id,
        email = %account.email,
        role = %account.role,
        "account created"
    );
    Ok(account)
}

/// Check credentials. An unknown email and a wrong password produce the
/// same error so callers cannot probe which emails are registered.
pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> Result<Account, ApiError> {
    let Some(account) = Account::find_by_email(db, email).await? else {
        return Err(ApiError::InvalidCredentials);
    };

    let password = password.to_owned();
    let digest = account.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &digest))
        .await
        .map_err(anyhow::Error::from)??;

    if !ok {
        return Err(ApiError::InvalidCredentials);
    }
    Ok(account)
}
