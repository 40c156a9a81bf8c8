use crate::models::RoleInfo;

/// Role names that grant the admin experience
const ADMIN_ROLE_NAMES: [&str; 2] = ["admin", "super-admin"];

/// What the signed-in account is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    pub fn from_roles(roles: &[RoleInfo]) -> Self {
        if is_admin_role_set(roles) {
            Role::Admin
        } else {
            Role::Customer
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

/// True iff any role in the set is admin-designated.
pub fn is_admin_role_set(roles: &[RoleInfo]) -> bool {
    roles
        .iter()
        .any(|r| ADMIN_ROLE_NAMES.contains(&r.name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> RoleInfo {
        RoleInfo {
            id: 1,
            name: name.to_string(),
            guard_name: Some("api".to_string()),
            permissions: None,
        }
    }

    #[test]
    fn test_admin_roles() {
        assert!(is_admin_role_set(&[role("admin")]));
        assert!(is_admin_role_set(&[role("customer"), role("super-admin")]));
    }

    #[test]
    fn test_non_admin_roles() {
        assert!(!is_admin_role_set(&[]));
        assert!(!is_admin_role_set(&[role("customer")]));
        // Exact names only
        assert!(!is_admin_role_set(&[role("Admin")]));
        assert!(!is_admin_role_set(&[role("administrator")]));
    }

    #[test]
    fn test_role_from_roles() {
        assert_eq!(Role::from_roles(&[role("admin")]), Role::Admin);
        assert_eq!(Role::from_roles(&[role("customer")]), Role::Customer);
        assert_eq!(Role::Admin.display_name(), "admin");
    }
}
