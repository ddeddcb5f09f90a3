use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::TENANT_COLUMN;

/// Staff function determining which tables are relevant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoleId {
    Owner,
    Manager,
    FrontDesk,
    Housekeeping,
    Maintenance,
    Pos,
    SuperAdmin,
    /// Any role string the access map does not know. Observes nothing.
    Unknown(String),
}

impl RoleId {
    pub fn as_str(&self) -> &str {
        match self {
            RoleId::Owner => "OWNER",
            RoleId::Manager => "MANAGER",
            RoleId::FrontDesk => "FRONT_DESK",
            RoleId::Housekeeping => "HOUSEKEEPING",
            RoleId::Maintenance => "MAINTENANCE",
            RoleId::Pos => "POS",
            RoleId::SuperAdmin => "SUPER_ADMIN",
            RoleId::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, RoleId::Unknown(_))
    }
}

impl FromStr for RoleId {
    type Err = Infallible;

    /// Case-insensitive; `front-desk`, `front_desk` and `FRONT_DESK` are equal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Ok(match normalized.as_str() {
            "OWNER" => RoleId::Owner,
            "MANAGER" => RoleId::Manager,
            "FRONT_DESK" => RoleId::FrontDesk,
            "HOUSEKEEPING" => RoleId::Housekeeping,
            "MAINTENANCE" => RoleId::Maintenance,
            "POS" => RoleId::Pos,
            "SUPER_ADMIN" => RoleId::SuperAdmin,
            _ => RoleId::Unknown(s.to_string()),
        })
    }
}

impl From<String> for RoleId {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(role) => role,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for RoleId {
    fn from(value: &str) -> Self {
        RoleId::from(value.to_string())
    }
}

impl From<RoleId> for String {
    fn from(value: RoleId) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RoleId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one logical multiplexed channel: one tenant seen through one role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionScope {
    tenant_id: String,
    role: RoleId,
    /// Signed-in staff member, used to target staff notifications
    user_id: Option<String>,
}

impl SubscriptionScope {
    pub fn new(
        tenant_id: impl Into<String>,
        role: impl Into<RoleId>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            role: role.into(),
            user_id: None,
        }
    }

    pub fn with_user(
        mut self,
        user_id: impl Into<String>,
    ) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Builds a scope from session context. Missing or blank tenant/role
    /// yields `None`: nothing to subscribe to.
    pub fn from_session(
        tenant_id: Option<&str>,
        role: Option<&str>,
    ) -> Option<Self> {
        let tenant_id = tenant_id.map(str::trim).filter(|t| !t.is_empty())?;
        let role = role.map(str::trim).filter(|r| !r.is_empty())?;
        Some(Self::new(tenant_id, role))
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn role(&self) -> &RoleId {
        &self.role
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Server-side row filter, e.g. `tenant_id=eq.T1`
    pub fn tenant_filter(&self) -> String {
        format!("{}=eq.{}", TENANT_COLUMN, self.tenant_id)
    }
}

impl fmt::Display for SubscriptionScope {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.role)
    }
}
