//! Authorization guard.
//!
//! Resolvers call the guard with their context and the roles the operation
//! permits before touching state. The guard is a pure predicate: same
//! inputs, same outcome.

use okary_storage::Role;

use crate::{AuthError, ExecutionContext, Principal, UnauthorizedReason};

/// Requires an authenticated principal whose role is in `allowed`.
///
/// An empty allowlist only requires authentication.
///
/// # Errors
///
/// * `Unauthorized(NoCredential)` - the context has no principal
/// * `Unauthorized(InsufficientRole)` - the role is not allowed
pub fn require<'a>(ctx: &'a ExecutionContext, allowed: &[Role]) -> Result<&'a Principal, AuthError> {
    let principal = ctx
        .principal()
        .ok_or(AuthError::Unauthorized(UnauthorizedReason::NoCredential))?;

    if allowed.is_empty() || allowed.contains(&principal.role) {
        Ok(principal)
    } else {
        Err(AuthError::Unauthorized(UnauthorizedReason::InsufficientRole))
    }
}

/// Requires a principal that either owns the resource (`owner_id`) or holds
/// one of the `allowed` roles.
///
/// With an empty allowlist only the owner passes.
pub fn require_owner_or<'a>(
    ctx: &'a ExecutionContext,
    owner_id: i64,
    allowed: &[Role],
) -> Result<&'a Principal, AuthError> {
    let principal = ctx
        .principal()
        .ok_or(AuthError::Unauthorized(UnauthorizedReason::NoCredential))?;

    if principal.id == owner_id || allowed.contains(&principal.role) {
        Ok(principal)
    } else {
        Err(AuthError::Unauthorized(UnauthorizedReason::InsufficientRole))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_with(role: Role) -> ExecutionContext {
        ExecutionContext::authenticated(Principal {
            id: 7,
            username: "ana".to_string(),
            email: "a@b.com".to_string(),
            role,
        })
    }

    fn reason(result: Result<&Principal, AuthError>) -> Option<UnauthorizedReason> {
        match result {
            Err(AuthError::Unauthorized(reason)) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn test_admin_in_allowlist() {
        let ctx = ctx_with(Role::Admin);
        let principal = require(&ctx, &[Role::Admin, Role::User]).unwrap();
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn test_user_not_in_allowlist() {
        let ctx = ctx_with(Role::User);
        assert_eq!(
            reason(require(&ctx, &[Role::Admin])),
            Some(UnauthorizedReason::InsufficientRole)
        );
    }

    #[test]
    fn test_no_principal_always_rejected() {
        let ctx = ExecutionContext::anonymous();
        for allowed in [&[][..], &[Role::User][..], &[Role::Admin, Role::User][..]] {
            assert_eq!(
                reason(require(&ctx, allowed)),
                Some(UnauthorizedReason::NoCredential)
            );
        }
    }

    #[test]
    fn test_empty_allowlist_only_requires_authentication() {
        for role in [Role::User, Role::Admin] {
            let ctx = ctx_with(role);
            assert!(require(&ctx, &[]).is_ok());
        }
    }

    #[test]
    fn test_repeated_calls_agree() {
        let admin = ctx_with(Role::Admin);
        let user = ctx_with(Role::User);
        let anonymous = ExecutionContext::anonymous();

        for _ in 0..3 {
            assert!(require(&admin, &[Role::Admin]).is_ok());
            assert_eq!(
                reason(require(&user, &[Role::Admin])),
                Some(UnauthorizedReason::InsufficientRole)
            );
            assert_eq!(
                reason(require(&anonymous, &[])),
                Some(UnauthorizedReason::NoCredential)
            );
        }
        assert_eq!(admin, ctx_with(Role::Admin));
    }

    #[test]
    fn test_owner_passes_without_role() {
        let ctx = ctx_with(Role::User);
        assert!(require_owner_or(&ctx, 7, &[Role::Admin]).is_ok());
        assert!(require_owner_or(&ctx, 7, &[]).is_ok());
    }

    #[test]
    fn test_non_owner_needs_role() {
        let user = ctx_with(Role::User);
        assert_eq!(
            reason(require_owner_or(&user, 8, &[Role::Admin])),
            Some(UnauthorizedReason::InsufficientRole)
        );

        let admin = ctx_with(Role::Admin);
        assert!(require_owner_or(&admin, 8, &[Role::Admin]).is_ok());
        assert!(require_owner_or(&admin, 8, &[]).is_err());
    }

    #[test]
    fn test_owner_check_requires_principal() {
        let ctx = ExecutionContext::anonymous();
        assert_eq!(
            reason(require_owner_or(&ctx, 7, &[Role::Admin])),
            Some(UnauthorizedReason::NoCredential)
        );
    }
}
