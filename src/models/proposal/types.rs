use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Proposal lifecycle status. Closed set: nothing outside these six
/// values ever reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Submitted,
    UnderReview,
    AssignedToStaff,
    Approved,
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Submitted => "submitted",
            Status::UnderReview => "under_review",
            Status::AssignedToStaff => "assigned_to_staff",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Result<Status, AppError> {
        match value {
            "draft" => Ok(Status::Draft),
            "submitted" => Ok(Status::Submitted),
            "under_review" => Ok(Status::UnderReview),
            "assigned_to_staff" => Ok(Status::AssignedToStaff),
            "approved" => Ok(Status::Approved),
            "rejected" => Ok(Status::Rejected),
            other => Err(AppError::Validation(format!(
                "'{other}' is not a recognized proposal status"
            ))),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full proposal record as stored and returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct Proposal {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub domain: String,
    pub budget: Option<i64>,
    pub status: Status,
    pub author_id: i64,
    pub author_name: String,
    pub assigned_staff: Option<String>,
    pub reviewer: Option<String>,
    pub created_at: String,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub completion_percentage: Option<i64>,
}

/// One persisted reviewer feedback entry.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackEntry {
    pub id: i64,
    pub proposal_id: i64,
    pub reviewer_name: String,
    pub body: String,
    pub created_at: String,
}

/// Body for creating a proposal. `submit: true` skips the draft stage.
#[derive(Debug, Deserialize)]
pub struct ProposalForm {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub domain: String,
    pub budget: Option<i64>,
    #[serde(default)]
    pub submit: bool,
}

/// Staff-facing execution metadata, meaningful once assigned.
#[derive(Debug, Deserialize)]
pub struct ProgressForm {
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub completion_percentage: Option<i64>,
}

/// Sort keys for the reviewer's list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Recent,
    BudgetHigh,
    BudgetLow,
    Title,
}

impl SortKey {
    /// Unknown keys fall back to `recent`, the view's default.
    pub fn parse(value: &str) -> SortKey {
        match value {
            "budget-high" => SortKey::BudgetHigh,
            "budget-low" => SortKey::BudgetLow,
            "title" => SortKey::Title,
            _ => SortKey::Recent,
        }
    }
}

/// Query parameters accepted by the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub domain: Option<String>,
    pub sort: Option<String>,
}
