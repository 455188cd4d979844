//! Role allowlists shared by the resolvers and the image routes.

use okary_storage::Role;

/// Administrators only.
pub const ADMIN: &[Role] = &[Role::Admin];

/// Any signed-in account.
pub const MEMBERS: &[Role] = &[Role::Admin, Role::User];
