use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ManagerUser {
    #[schema(example = "lead@brink.eu")]
    pub email: String,
    #[schema(example = 3)]
    pub department_id: u64,
}

/// Department scope granted to a manager session after a successful PIN check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UnlockedDepartment {
    #[schema(example = 3)]
    pub department_id: u64,
    #[schema(example = "Support")]
    pub department_name: String,
}

/// A manager row as the PIN check sees it. Never serialized.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ManagerCredential {
    pub department_id: u64,
    pub department_name: Option<String>,
    pub pin_hash: String,
}

impl ManagerCredential {
    pub fn unlocked(&self) -> UnlockedDepartment {
        UnlockedDepartment {
            department_id: self.department_id,
            department_name: self.department_name.clone().unwrap_or_default(),
        }
    }
}

/// What a session holds after unlocking. The hash is salted per save, so
/// moving the manager or resetting the PIN makes the unlock stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerUnlock {
    pub department: UnlockedDepartment,
    pub pin_hash: String,
}

impl ManagerUnlock {
    pub fn new(department: UnlockedDepartment, credential: &ManagerCredential) -> Self {
        Self {
            department,
            pin_hash: credential.pin_hash.clone(),
        }
    }

    pub fn still_valid(&self, current: Option<&ManagerCredential>) -> bool {
        current.is_some_and(|c| {
            c.department_id == self.department.department_id && c.pin_hash == self.pin_hash
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(department_id: u64, pin_hash: &str) -> ManagerCredential {
        ManagerCredential {
            department_id,
            department_name: Some("Support".into()),
            pin_hash: pin_hash.into(),
        }
    }

    #[test]
    fn unlock_goes_stale_when_the_row_changes() {
        let row = credential(3, "$argon2id$a");
        let unlock = ManagerUnlock::new(row.unlocked(), &row);
        assert!(unlock.still_valid(Some(&row)));

        // removed
        assert!(!unlock.still_valid(None));
        // moved to another department
        assert!(!unlock.still_valid(Some(&credential(4, "$argon2id$a"))));
        // PIN reset
        assert!(!unlock.still_valid(Some(&credential(3, "$argon2id$b"))));
    }
}
