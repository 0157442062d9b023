use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_STAFF};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject identifier issued by the identity provider
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Staff can upload and edit any document; admins are staff too
    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.has_role(ROLE_STAFF)
    }

    /// Owners may edit their own uploads, staff may edit everything
    pub fn can_modify(&self, uploaded_by: Option<&str>) -> bool {
        self.is_staff() || uploaded_by == Some(self.sub.as_str())
    }
}
