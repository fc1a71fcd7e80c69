//! Role checks. Nothing is cached: each call reads the profile again.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Profile, Role};

/// Roles allowed to change the catalog or register movements.
pub const STOCK_EDITORS: &[Role] = &[Role::Admin, Role::Employee];

/// A missing profile or an unrecognised role label never passes.
pub fn role_allowed(profile: Option<&Profile>, allowed: &[Role]) -> bool {
    profile
        .and_then(Profile::role)
        .is_some_and(|role| allowed.contains(&role))
}

pub async fn require_role(
    pool: &PgPool,
    user_id: Uuid,
    allowed: &[Role],
) -> Result<Profile, AppError> {
    let profile = db::profiles::find_by_user(pool, user_id).await?;
    if !role_allowed(profile.as_ref(), allowed) {
        tracing::debug!(%user_id, "Role gate denied access");
        return Err(AppError::Forbidden(
            "Your role does not allow this action".to_string(),
        ));
    }
    profile.ok_or_else(|| AppError::Forbidden("Profile required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(role: &str) -> Profile {
        Profile {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            name: "Someone".to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn editors_gate_admits_employee_and_admin() {
        assert!(role_allowed(Some(&profile("employee")), STOCK_EDITORS));
        assert!(role_allowed(Some(&profile("admin")), STOCK_EDITORS));
    }

    #[test]
    fn editors_gate_denies_auditor() {
        assert!(!role_allowed(Some(&profile("auditor")), STOCK_EDITORS));
    }

    #[test]
    fn missing_or_unknown_profile_is_denied() {
        assert!(!role_allowed(None, STOCK_EDITORS));
        assert!(!role_allowed(Some(&profile("owner")), STOCK_EDITORS));
    }

    #[test]
    fn gate_respects_the_given_set() {
        assert!(role_allowed(Some(&profile("auditor")), &[Role::Auditor]));
        assert!(!role_allowed(Some(&profile("admin")), &[]));
    }
}
