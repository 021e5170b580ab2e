use vitrina_auth::Role;
use vitrina_core::{TenantId, UserId};

/// Authenticated request context, inserted by the session middleware.
///
/// This is immutable and must be present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    user_id: UserId,
    tenant_id: TenantId,
    role: Role,
    /// Digest of the presented session token; logout deletes by it.
    token_digest: String,
}

impl RequestContext {
    pub fn new(user_id: UserId, tenant_id: TenantId, role: Role, token_digest: String) -> Self {
        Self {
            user_id,
            tenant_id,
            role,
            token_digest,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn token_digest(&self) -> &str {
        &self.token_digest
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this caller may manage a row owned by `owner`.
    ///
    /// Non-admins only manage their own rows; handlers answer 404 (not 403)
    /// when this is false, so foreign ids stay indistinguishable from
    /// missing ones.
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.user_id == owner || self.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: Role) -> RequestContext {
        RequestContext::new(UserId::new(), TenantId::new(), role, "digest".to_string())
    }

    #[test]
    fn owners_manage_their_own_rows() {
        let ctx = ctx(Role::user());
        assert!(ctx.can_manage(ctx.user_id()));
        assert!(!ctx.can_manage(UserId::new()));
    }

    #[test]
    fn agencies_get_no_cross_owner_access() {
        let ctx = ctx(Role::agency());
        assert!(!ctx.can_manage(UserId::new()));
    }

    #[test]
    fn admins_manage_everything() {
        let ctx = ctx(Role::admin());
        assert!(ctx.can_manage(UserId::new()));
    }
}
