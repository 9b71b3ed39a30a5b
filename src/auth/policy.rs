use uuid::Uuid;

use crate::auth::repo::Role;
use crate::error::ApiError;

/// The authenticated identity, passed explicitly through call chains.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin role required".into()))
        }
    }

    /// Owner-or-admin rule used for bookings and payments.
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<(), ApiError> {
        if self.id == owner_id || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "you can only interact with your own resources".into(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(roles: Vec<Role>) -> Principal {
        Principal {
            id: Uuid::new_v4(),
            roles,
        }
    }

    #[test]
    fn admin_passes_both_checks() {
        let p = principal(vec![Role::Customer, Role::Admin]);
        assert!(p.require_admin().is_ok());
        assert!(p.require_owner_or_admin(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn owner_passes_owner_check_but_not_admin_check() {
        let p = principal(vec![Role::Customer]);
        assert!(p.require_owner_or_admin(p.id).is_ok());
        assert!(matches!(p.require_admin(), Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn stranger_is_rejected() {
        let p = principal(vec![Role::Customer]);
        let other = Uuid::new_v4();
        assert!(matches!(
            p.require_owner_or_admin(other),
            Err(ApiError::Forbidden(_))
        ));
    }
}
