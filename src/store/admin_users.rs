use sqlx::MySqlPool;
use sqlx::types::Json;

use crate::error::{AppError, AppResult};
use crate::model::admin_user::{AdminUser, AdminUserRow, AdminUserView};

const SELECT_ADMIN: &str = r#"
    SELECT email, is_primary, can_manage_admins, department_ids, created_at, updated_at
    FROM admin_users
"#;

pub async fn get_admin_user(pool: &MySqlPool, email: &str) -> AppResult<Option<AdminUser>> {
    let sql = format!("{SELECT_ADMIN} WHERE email = ?");
    let row = sqlx::query_as::<_, AdminUserRow>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::store("getAdminUser", e))?;
    Ok(row.map(AdminUser::from))
}

pub async fn is_primary_admin(pool: &MySqlPool, email: &str) -> AppResult<bool> {
    Ok(get_admin_user(pool, email)
        .await?
        .is_some_and(|admin| admin.is_primary))
}

/// Primary admins first, then by email.
pub async fn list_admin_users(pool: &MySqlPool) -> AppResult<Vec<AdminUserRow>> {
    let sql = format!("{SELECT_ADMIN} ORDER BY is_primary DESC, email ASC");
    sqlx::query_as::<_, AdminUserRow>(&sql)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::store("listAdminUsers", e))
}

/// Gives every protected email a full-access primary row, so a fresh
/// deployment has an admin who can add the rest. Existing rows are kept.
pub async fn seed_protected_admins(pool: &MySqlPool, emails: &[String]) -> AppResult<u64> {
    let mut added = 0;
    for email in emails {
        let result = sqlx::query(
            r#"
            INSERT IGNORE INTO admin_users (email, is_primary, can_manage_admins, department_ids)
            VALUES (?, 1, 1, JSON_ARRAY())
            "#,
        )
        .bind(email.trim().to_lowercase())
        .execute(pool)
        .await
        .map_err(|e| AppError::store("seedProtectedAdmins", e))?;
        added += result.rows_affected();
    }
    Ok(added)
}

/// Rules around the protected primary admin accounts.
#[derive(Debug, Clone, Copy)]
pub struct AdminPolicy<'a> {
    protected: &'a [String],
}

impl<'a> AdminPolicy<'a> {
    pub fn new(protected: &'a [String]) -> Self {
        Self { protected }
    }

    pub fn is_protected(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.protected.iter().any(|p| *p == email)
    }

    fn require_manager(&self, caller: &AdminUser) -> AppResult<()> {
        if caller.can_manage_admins {
            Ok(())
        } else {
            Err(AppError::Forbidden("No admin-management access".into()))
        }
    }

    pub fn check_upsert(
        &self,
        caller: &AdminUser,
        existing: Option<&AdminUser>,
        target: &AdminUser,
    ) -> AppResult<()> {
        self.require_manager(caller)?;
        let caller_protected = self.is_protected(&caller.email);

        if self.is_protected(&target.email) {
            if !caller_protected {
                return Err(AppError::Forbidden(
                    "Only protected primary admins can change a protected admin".into(),
                ));
            }
            if !target.is_primary {
                return Err(AppError::Forbidden(
                    "Protected primary admins must stay primary".into(),
                ));
            }
            if !target.can_manage_admins || !target.department_ids.is_empty() {
                return Err(AppError::Forbidden(
                    "Protected primary admins keep full access".into(),
                ));
            }
        }

        let scope = caller.scope();
        let beyond_caller = !scope.covers(&target.department_ids)
            || existing.is_some_and(|a| !scope.covers(&a.department_ids));
        if beyond_caller {
            return Err(AppError::Forbidden(
                "You can't grant or edit access outside your departments".into(),
            ));
        }

        let was_primary = existing.is_some_and(|a| a.is_primary);
        if was_primary != target.is_primary && !caller_protected {
            return Err(AppError::Forbidden(
                "Only protected primary admins can change primary admin status".into(),
            ));
        }
        Ok(())
    }

    pub fn check_delete(
        &self,
        caller: &AdminUser,
        email: &str,
        existing: Option<&AdminUser>,
    ) -> AppResult<()> {
        self.require_manager(caller)?;
        if self.is_protected(email) {
            return Err(AppError::Forbidden("Protected primary admin".into()));
        }
        if existing.is_some_and(|a| !caller.scope().covers(&a.department_ids)) {
            return Err(AppError::Forbidden(
                "You can't grant or edit access outside your departments".into(),
            ));
        }
        Ok(())
    }

    pub fn view(&self, row: AdminUserRow) -> AdminUserView {
        let removable = !self.is_protected(&row.email);
        let created_at = row.created_at;
        let updated_at = row.updated_at;
        AdminUserView {
            admin: row.into(),
            created_at,
            updated_at,
            removable,
        }
    }
}

pub async fn upsert_admin_user(
    pool: &MySqlPool,
    policy: AdminPolicy<'_>,
    caller: &AdminUser,
    mut target: AdminUser,
) -> AppResult<AdminUser> {
    target.email = target.email.trim().to_lowercase();
    target.department_ids.sort_unstable();
    target.department_ids.dedup();

    let existing = get_admin_user(pool, &target.email).await?;
    policy.check_upsert(caller, existing.as_ref(), &target)?;

    sqlx::query(
        r#"
        INSERT INTO admin_users (email, is_primary, can_manage_admins, department_ids)
        VALUES (?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            is_primary = VALUES(is_primary),
            can_manage_admins = VALUES(can_manage_admins),
            department_ids = VALUES(department_ids)
        "#,
    )
    .bind(&target.email)
    .bind(target.is_primary)
    .bind(target.can_manage_admins)
    .bind(Json(&target.department_ids))
    .execute(pool)
    .await
    .map_err(|e| AppError::store("upsertAdminUser", e))?;

    Ok(target)
}

pub async fn delete_admin_user(
    pool: &MySqlPool,
    policy: AdminPolicy<'_>,
    caller: &AdminUser,
    email: &str,
) -> AppResult<()> {
    let email = email.trim().to_lowercase();
    let existing = get_admin_user(pool, &email).await?;
    policy.check_delete(caller, &email, existing.as_ref())?;

    let result = sqlx::query("DELETE FROM admin_users WHERE email = ?")
        .bind(&email)
        .execute(pool)
        .await
        .map_err(|e| AppError::store("deleteAdminUser", e))?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Admin not found".into()));
    }
    Ok(())
}
