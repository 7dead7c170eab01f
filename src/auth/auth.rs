use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized,
};
use futures::future::{Ready, ready};

/// Caller identity placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized("Missing token"))),
        }
    }
}

impl AuthUser {
    /// Employees may only read their own attendance; HR and admins read anyone's.
    /// `employee_id` is compared as given, callers trim it first.
    pub fn require_attendance_access(&self, employee_id: &str) -> actix_web::Result<()> {
        if self.role.sees_all_attendance() {
            return Ok(());
        }

        match self.employee_id {
            Some(own) if own.to_string() == employee_id => Ok(()),
            Some(_) => Err(actix_web::error::ErrorForbidden(
                "Employees can only view their own attendance",
            )),
            None => Err(actix_web::error::ErrorForbidden("No employee profile")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, employee_id: Option<u64>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "u".into(),
            role,
            employee_id,
        }
    }

    #[test]
    fn employee_sees_only_self() {
        let me = user(Role::Employee, Some(1000));
        assert!(me.require_attendance_access("1000").is_ok());
        assert!(me.require_attendance_access("1001").is_err());
        assert!(me.require_attendance_access(" 1000").is_err());
        assert!(user(Role::Employee, None).require_attendance_access("1000").is_err());
    }

    #[test]
    fn hr_sees_everyone() {
        assert!(user(Role::Hr, None).require_attendance_access("42").is_ok());
    }
}
