use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// The three actor roles. Exactly one is assigned to an account at
/// provisioning time and stored on the user record; it is never
/// inferred from capabilities at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Authors and submits proposals; sees only their own.
    Applicant,
    /// Approves, rejects, and assigns proposals; sees all of them.
    Reviewer,
    /// Executes assigned proposals; sees only those assigned to them.
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Reviewer => "reviewer",
            Role::Staff => "staff",
        }
    }

    /// Human label for error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Reviewer => "reviewer",
            Role::Staff => "staff member",
        }
    }

    /// Parse a stored role attribute. Anything unrecognized is a
    /// denial, not a default; an account with a missing or mangled
    /// role gets no access at all.
    pub fn parse(value: &str) -> Result<Role, AppError> {
        match value {
            "applicant" => Ok(Role::Applicant),
            "reviewer" => Ok(Role::Reviewer),
            "staff" => Ok(Role::Staff),
            other => Err(AppError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
