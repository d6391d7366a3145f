use sqlx::PgPool;
use tracing::info;

use super::{
    dto::UpdateUserRequest,
    repo::{Account, AccountChanges},
};
use crate::{
    auth::{
        claims::{CurrentUser, Role},
        password::hash_password,
    },
    error::{is_unique_violation, ApiError},
};

/// Ownership rule for mutating an account: the requester must be the
/// target itself or an admin, and only admins may touch the role field.
/// Pure policy check, no IO; evaluated before the target's existence so a
/// non-owner probing a missing id still sees 403.
pub fn authorize_account_change(
    requester: &CurrentUser,
    target_id: i64,
    touches_role: bool,
) -> Result<(), ApiError> {
    let is_self = requester.id == target_id;
    let is_admin = requester.role == Role::Admin;

    if !is_self && !is_admin {
        return Err(ApiError::Forbidden(
            "Forbidden: cannot modify other users".into(),
        ));
    }
    if touches_role && !is_admin {
        return Err(ApiError::Forbidden(
            "Forbidden: only admin can change role".into(),
        ));
    }
    Ok(())
}

pub async fn list_accounts(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Account>, ApiError> {
    Ok(Account::list_recent(db, limit.clamp(1, 100), offset.max(0)).await?)
}

pub async fn get_account(db: &PgPool, id: i64) -> Result<Account, ApiError> {
    Account::find_by_id(db, id)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

pub async fn update_account(
    db: &PgPool,
    id: i64,
    updates: UpdateUserRequest,
    requester: &CurrentUser,
) -> Result<Account, ApiError> {
    authorize_account_change(requester, id, updates.role.is_some())?;

    let password_hash = match updates.password {
        Some(password) => Some(
            tokio::task::spawn_blocking(move || hash_password(&password))
                .await
                .map_err(anyhow::Error::from)??,
        ),
        None => None,
    };

    let changes = AccountChanges {
        name: updates.name,
        email: updates.email,
        password_hash,
        role: updates.role,
    };

    match Account::update(db, id, &changes).await {
        Ok(Some(account)) => {
            info!(account_id = id, requester = requester.id, "account updated");
            Ok(account)
        }
        Ok(None) => Err(ApiError::NotFound("User")),
        Err(err) if is_unique_violation(&err) => Err(ApiError::DuplicateAccount),
        Err(err) => Err(err.into()),
    }
}

pub async fn delete_account(
    db: &PgPool,
    id: i64,
    requester: &CurrentUser,
) -> Result<Account, ApiError> {
    authorize_account_change(requester, id, false)?;

    match Account::delete(db, id).await? {
        Some(account) => {
            info!(account_id = id, requester = requester.id, "account deleted");
            Ok(account)
        }
        None => Err(ApiError::NotFound("User")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requester(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            email: format!("user{id}@x.com"),
            role,
            name: format!("User {id}"),
        }
    }

    #[test]
    fn self_may_edit_own_plain_fields() {
        assert!(authorize_account_change(&requester(5, Role::User), 5, false).is_ok());
    }

    #[test]
    fn self_cannot_change_own_role() {
        let err = authorize_account_change(&requester(5, Role::User), 5, true).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn user_cannot_touch_other_accounts() {
        let err = authorize_account_change(&requester(9, Role::User), 7, false).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn admin_may_touch_any_account() {
        assert!(authorize_account_change(&requester(9, Role::Admin), 7, false).is_ok());
        assert!(authorize_account_change(&requester(9, Role::Admin), 7, true).is_ok());
        assert!(authorize_account_change(&requester(9, Role::Admin), 9, true).is_ok());
    }
}
