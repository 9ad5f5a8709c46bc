use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;

#[derive(Debug, sqlx::FromRow)]
pub struct AdminUserRow {
    pub email: String,
    pub is_primary: bool,
    pub can_manage_admins: bool,
    pub department_ids: Json<Vec<u64>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdminUser {
    #[schema(example = "ops@brink.eu")]
    pub email: String,
    pub is_primary: bool,
    pub can_manage_admins: bool,
    /// Empty means every department
    #[schema(example = json!([1, 4]))]
    pub department_ids: Vec<u64>,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        Self {
            email: row.email,
            is_primary: row.is_primary,
            can_manage_admins: row.can_manage_admins,
            department_ids: row.department_ids.0,
        }
    }
}

impl AdminUser {
    pub fn scope(&self) -> DepartmentScope {
        if self.department_ids.is_empty() {
            DepartmentScope::All
        } else {
            DepartmentScope::Only(self.department_ids.clone())
        }
    }

    pub fn role_label(&self) -> &'static str {
        if self.is_primary { "Primary admin" } else { "Admin" }
    }
}

/// Which departments' rows a caller may read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentScope {
    All,
    Only(Vec<u64>),
}

impl DepartmentScope {
    pub fn single(department_id: u64) -> Self {
        DepartmentScope::Only(vec![department_id])
    }

    pub fn allows(&self, department_id: u64) -> bool {
        match self {
            DepartmentScope::All => true,
            DepartmentScope::Only(ids) => ids.contains(&department_id),
        }
    }

    /// Whether an admin limited to `ids` sees nothing outside this scope.
    /// An empty list means every department.
    pub fn covers(&self, ids: &[u64]) -> bool {
        match self {
            DepartmentScope::All => true,
            DepartmentScope::Only(mine) => !ids.is_empty() && ids.iter().all(|id| mine.contains(id)),
        }
    }

    /// Narrows a requested department filter to what the scope permits.
    /// `Some(vec![])` means nothing is visible.
    pub fn constrain(&self, requested: Option<u64>) -> Option<Vec<u64>> {
        match (self, requested) {
            (DepartmentScope::All, None) => None,
            (DepartmentScope::All, Some(id)) => Some(vec![id]),
            (DepartmentScope::Only(ids), None) => Some(ids.clone()),
            (DepartmentScope::Only(ids), Some(id)) => {
                Some(ids.iter().copied().filter(|d| *d == id).collect())
            }
        }
    }
}

/// Listing entry for the admin-accounts table.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminUserView {
    #[serde(flatten)]
    pub admin: AdminUser,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
    /// False for protected primary admins, whoever is asking
    pub removable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(ids: Vec<u64>) -> AdminUser {
        AdminUser {
            email: "a@brink.eu".into(),
            is_primary: false,
            can_manage_admins: false,
            department_ids: ids,
        }
    }

    #[test]
    fn empty_department_list_grants_everything() {
        let scope = admin(vec![]).scope();
        assert_eq!(scope, DepartmentScope::All);
        assert!(scope.allows(42));
        assert_eq!(scope.constrain(None), None);
        assert_eq!(scope.constrain(Some(7)), Some(vec![7]));
    }

    #[test]
    fn restricted_scope_narrows_filters() {
        let scope = admin(vec![1, 2]).scope();
        assert!(scope.allows(2));
        assert!(!scope.allows(3));
        assert_eq!(scope.constrain(None), Some(vec![1, 2]));
        assert_eq!(scope.constrain(Some(2)), Some(vec![2]));
        assert_eq!(scope.constrain(Some(3)), Some(vec![]));
    }

    #[test]
    fn covering_needs_a_subset_of_a_restricted_scope() {
        let scoped = admin(vec![1, 2]).scope();
        assert!(scoped.covers(&[2]));
        assert!(scoped.covers(&[1, 2]));
        assert!(!scoped.covers(&[2, 3]));
        // every department
        assert!(!scoped.covers(&[]));

        assert!(DepartmentScope::All.covers(&[]));
        assert!(DepartmentScope::All.covers(&[9]));
    }
}
