//! Task listing and completion against the two visit-task categories.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::http::{build_headers, ApiEnvelope, HeaderProfile, HttpContext};
use crate::session::Session;
use crate::utils::constants::ALREADY_DONE_MESSAGE;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskCategory {
    UserVisit,
    AdvanceVisit,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 2] = [TaskCategory::UserVisit, TaskCategory::AdvanceVisit];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserVisit => "user-visit",
            Self::AdvanceVisit => "advance-visit",
        }
    }

    pub fn list_path(self) -> &'static str {
        match self {
            Self::UserVisit => "/api/task/user-visit",
            Self::AdvanceVisit => "/api/task/advance-visit",
        }
    }

    pub fn done_path(self) -> &'static str {
        match self {
            Self::UserVisit => "/api/task/user-visit/done",
            Self::AdvanceVisit => "/api/task/advance-visit/done",
        }
    }
}

// ---------------------------------------------------------------------------
// Wire and local task shapes
// ---------------------------------------------------------------------------

// Listing entry. Status 1 means available/incomplete.
#[derive(Debug, Deserialize)]
struct TaskRecord {
    task_code: String,
    title: String,
    #[serde(default)]
    reward_point: i64,
    status: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Task {
    pub code: String,
    pub title: String,
    pub points: i64,
    pub category: TaskCategory,
    pub status: TaskStatus,
}

const AVAILABLE_STATUS: i64 = 1;

fn collect_available(records: BTreeMap<String, TaskRecord>, category: TaskCategory) -> Vec<Task> {
    records
        .into_values()
        .filter(|record| record.status == AVAILABLE_STATUS)
        .map(|record| Task {
            code: record.task_code,
            title: record.title,
            points: record.reward_point,
            category,
            status: TaskStatus::Pending,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Fetch both category listings sequentially and merge the available entries.
/// The session absorbs each response's cookies in order, so the second
/// listing's `set-cookie` wins when both rotate. Any HTTP failure surfaces as
/// an error so the caller can skip the account; the session keeps whatever
/// state it had absorbed up to that point.
pub async fn fetch_tasks(http: &HttpContext<'_>, session: &mut Session) -> Result<Vec<Task>> {
    let mut tasks = Vec::new();
    for category in TaskCategory::ALL {
        let headers = build_headers(HeaderProfile::Global, http.api_base, Some(session), None);
        let response = http
            .request("GET", &http.url(category.list_path()), None, headers)
            .await?;
        session.absorb(&response.headers);
        let listing: ApiEnvelope<BTreeMap<String, TaskRecord>> =
            response.envelope().unwrap_or(ApiEnvelope {
                code: 0,
                message: String::new(),
                data: None,
            });
        if let Some(records) = listing.data {
            tasks.extend(collect_available(records, category));
        }
    }
    Ok(tasks)
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    /// The server already counted this task; treated as success.
    AlreadyDone,
    /// Rejected by the server for a business reason; non-fatal.
    Rejected(String),
    /// The HTTP layer gave up after retries; non-fatal for the account.
    TransportFailed(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::AlreadyDone)
    }
}

fn classify_completion(code: i64, message: &str) -> TaskOutcome {
    if code == 0 {
        TaskOutcome::Completed
    } else if message == ALREADY_DONE_MESSAGE {
        TaskOutcome::AlreadyDone
    } else {
        TaskOutcome::Rejected(message.to_string())
    }
}

/// POST the completion call for one task. Business rejections and exhausted
/// HTTP retries are both outcomes, never errors — one bad task must not stop
/// the rest of the account's list. The session absorbs response cookies
/// regardless of outcome.
pub async fn complete_task(
    http: &HttpContext<'_>,
    session: &mut Session,
    task: &Task,
) -> TaskOutcome {
    let body = json!({ "task_code": task.code });
    let headers = build_headers(HeaderProfile::Global, http.api_base, Some(session), None);
    let response = match http
        .request("POST", &http.url(task.category.done_path()), Some(&body), headers)
        .await
    {
        Ok(response) => response,
        Err(err) => return TaskOutcome::TransportFailed(err.to_string()),
    };
    session.absorb(&response.headers);
    match response.envelope::<Value>() {
        Ok(envelope) => classify_completion(envelope.code, &envelope.message),
        Err(err) => TaskOutcome::Rejected(format!("malformed completion response: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, title: &str, points: i64, status: i64) -> (String, TaskRecord) {
        (
            code.to_string(),
            TaskRecord {
                task_code: code.to_string(),
                title: title.to_string(),
                reward_point: points,
                status,
            },
        )
    }

    #[test]
    fn test_collect_available_filters_status() {
        let records: BTreeMap<String, TaskRecord> = [
            record("T1", "Visit home", 10, 1),
            record("T2", "Share post", 20, 0),
            record("T3", "Daily check-in", 5, 1),
            record("T4", "Join channel", 15, 1),
            record("T5", "Invite friend", 30, 0),
        ]
        .into_iter()
        .collect();

        let tasks = collect_available(records, TaskCategory::UserVisit);
        assert_eq!(tasks.len(), 3);
        assert!(tasks.iter().all(|t| t.category == TaskCategory::UserVisit));
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
        let daily = tasks
            .iter()
            .find(|t| t.code == "T3")
            .expect("T3 survives the filter");
        assert_eq!(daily.title, "Daily check-in");
        assert_eq!(daily.points, 5);
    }

    #[test]
    fn test_listing_envelope_parses_mapping() {
        let raw = serde_json::json!({
            "code": 0,
            "message": "ok",
            "data": {
                "T1": { "task_code": "T1", "title": "Visit home", "reward_point": 10, "status": 1 },
                "T2": { "task_code": "T2", "title": "Share post", "reward_point": 20, "status": 0 }
            }
        });
        let envelope: ApiEnvelope<BTreeMap<String, TaskRecord>> =
            serde_json::from_value(raw).expect("parse");
        let tasks = collect_available(envelope.data.expect("data"), TaskCategory::AdvanceVisit);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].code, "T1");
    }

    #[test]
    fn test_classify_completion_success() {
        assert_eq!(classify_completion(0, ""), TaskOutcome::Completed);
    }

    #[test]
    fn test_classify_completion_already_done_is_success() {
        let outcome = classify_completion(1, ALREADY_DONE_MESSAGE);
        assert_eq!(outcome, TaskOutcome::AlreadyDone);
        assert!(outcome.is_success());
    }

    #[test]
    fn test_classify_completion_rejection_surfaces_message() {
        let outcome = classify_completion(2, "Task requires level 5");
        assert_eq!(
            outcome,
            TaskOutcome::Rejected("Task requires level 5".to_string())
        );
        assert!(!outcome.is_success());
    }
}
