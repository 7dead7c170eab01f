/// Roles encoded in the `role` claim of a bearer token.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    System = 4,
    ApiUser = 5,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::System),
            5 => Some(Role::ApiUser),
            _ => None,
        }
    }

    /// Roles allowed to read any employee's attendance.
    pub fn sees_all_attendance(self) -> bool {
        matches!(self, Role::Admin | Role::Hr | Role::System)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_ids_only() {
        assert_eq!(Role::from_id(2), Some(Role::Hr));
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(6), None);
    }

    #[test]
    fn employees_are_scoped_to_themselves() {
        assert!(Role::Admin.sees_all_attendance());
        assert!(Role::Hr.sees_all_attendance());
        assert!(!Role::Employee.sees_all_attendance());
        assert!(!Role::ApiUser.sees_all_attendance());
    }
}
