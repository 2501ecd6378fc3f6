//! In-memory shaping of proposal lists: status/domain filters plus the
//! four reviewer sort orders.

use super::types::{ListQuery, Proposal, SortKey};

/// `"all"` and absent both mean "no filter".
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty() && *v != "all")
}

/// Status filters match exactly, with one aggregate exception: the
/// `under_review` filter matches any status containing "review".
pub fn status_matches(filter: &str, status: &str) -> bool {
    if filter == "under_review" {
        status.contains("review")
    } else {
        status == filter
    }
}

/// Apply filters (AND-combined) then sort. The sort is stable, so
/// entries that compare equal keep their store order.
pub fn apply(mut items: Vec<Proposal>, query: &ListQuery) -> Vec<Proposal> {
    if let Some(status) = active(&query.status) {
        items.retain(|p| status_matches(status, p.status.as_str()));
    }
    if let Some(domain) = active(&query.domain) {
        items.retain(|p| p.domain == domain);
    }

    let key = SortKey::parse(query.sort.as_deref().unwrap_or("recent"));
    match key {
        // created_at is RFC 3339, so lexicographic order is chronological.
        SortKey::Recent => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::BudgetHigh => {
            items.sort_by(|a, b| b.budget.unwrap_or(0).cmp(&a.budget.unwrap_or(0)))
        }
        SortKey::BudgetLow => {
            items.sort_by(|a, b| a.budget.unwrap_or(0).cmp(&b.budget.unwrap_or(0)))
        }
        SortKey::Title => items.sort_by(|a, b| a.title.cmp(&b.title)),
    }

    items
}
