use npi_auth::PrincipalId;
use npi_core::UserId;

/// Principal context for a request (authenticated identity).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal_id: PrincipalId,
    email: Option<String>,
}

impl PrincipalContext {
    pub fn new(principal_id: PrincipalId, email: Option<String>) -> Self {
        Self { principal_id, email }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Actor stamped on writes made in this request.
    pub fn actor(&self) -> Option<UserId> {
        Some(self.principal_id.user_id())
    }
}
