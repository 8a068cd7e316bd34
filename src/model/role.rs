#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            _ => None,
        }
    }

    /// Reviewer roles: allowed to approve/reject leave and browse records
    /// belonging to other people.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Hr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_ids_are_rejected() {
        assert_eq!(Role::from_id(2), Some(Role::Hr));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn only_admin_and_hr_are_staff() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Hr.is_staff());
        assert!(!Role::Employee.is_staff());
    }
}
