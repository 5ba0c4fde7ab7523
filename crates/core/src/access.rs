#![forbid(unsafe_code)]

use crate::status::StatusParseError;

/// Capabilities are decided once from the actor's role; business logic asks
/// `actor.can(...)` and never compares role names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    ViewJobs,
    ManageJobs,
    EditLockedJob,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Owner,
    Admin,
    Manager,
    Technician,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Technician => "technician",
        }
    }

    pub fn parse(value: &str) -> Result<Self, StatusParseError> {
        match value.trim() {
            "owner" => Ok(Role::Owner),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "technician" => Ok(Role::Technician),
            other => Err(StatusParseError {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }

    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Owner | Role::Admin | Role::Manager => &[
                Capability::ViewJobs,
                Capability::ManageJobs,
                Capability::EditLockedJob,
            ],
            Role::Technician => &[Capability::ViewJobs, Capability::ManageJobs],
        }
    }
}

/// The acting user, already authenticated and resolved to a company by the
/// caller. This core only consumes it for capability checks.
#[derive(Clone, Debug)]
pub struct Actor {
    pub user_id: String,
    pub company_id: String,
    pub role: Role,
}

impl Actor {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.capabilities().contains(&capability)
    }
}
