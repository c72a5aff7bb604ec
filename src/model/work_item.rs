use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Work item type as reported by the service. Open-ended: projects can
/// define custom types, so this wraps the raw name instead of enumerating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemType(pub String);

impl WorkItemType {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Work item state as reported by the service. Open-ended for the same
/// reason as [`WorkItemType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemState(pub String);

impl WorkItemState {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: i32,
    pub rev: i32,
    pub title: String,
    pub state: WorkItemState,
    pub work_item_type: WorkItemType,
    /// Display name of the assignee; `None` means unassigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub iteration_path: String,
    pub area_path: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i32>,
    /// Best-effort cached title of the parent item; lookups may fail silently.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_title: Option<String>,
    pub priority: i32,
    pub created_date: DateTime<Utc>,
    pub changed_date: DateTime<Utc>,
    pub url: String,
    pub web_url: String,
}

impl WorkItem {
    /// Short label for the type column ("User Story" -> "Story").
    pub fn short_type(&self) -> &str {
        match self.work_item_type.as_str() {
            "User Story" => "Story",
            other => other,
        }
    }

    /// Last segment of the iteration path ("Project\Sprint 42" -> "Sprint 42").
    pub fn sprint_name(&self) -> &str {
        last_path_segment(&self.iteration_path)
    }

    /// Last segment of the area path.
    pub fn area_name(&self) -> &str {
        last_path_segment(&self.area_path)
    }
}

fn last_path_segment(path: &str) -> &str {
    path.rsplit('\\').next().unwrap_or(path)
}

/// State metadata for one work item type, as configured on the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateInfo {
    pub name: String,
    pub color: String,
    /// One of Proposed, InProgress, Resolved, Completed, Removed — but
    /// treated as open since the service owns the vocabulary.
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ty: &str, iteration: &str, area: &str) -> WorkItem {
        WorkItem {
            id: 1,
            rev: 1,
            title: "t".into(),
            state: WorkItemState("Active".into()),
            work_item_type: WorkItemType(ty.into()),
            assigned_to: None,
            iteration_path: iteration.into(),
            area_path: area.into(),
            description: String::new(),
            tags: vec![],
            parent_id: None,
            parent_title: None,
            priority: 2,
            created_date: Utc::now(),
            changed_date: Utc::now(),
            url: String::new(),
            web_url: String::new(),
        }
    }

    #[test]
    fn short_type_collapses_user_story() {
        assert_eq!(item("User Story", "", "").short_type(), "Story");
        assert_eq!(item("Bug", "", "").short_type(), "Bug");
        assert_eq!(item("Tech Debt", "", "").short_type(), "Tech Debt");
    }

    #[test]
    fn sprint_and_area_names_take_last_segment() {
        let wi = item("Task", "Proj\\Sprint 42", "Proj\\Team A");
        assert_eq!(wi.sprint_name(), "Sprint 42");
        assert_eq!(wi.area_name(), "Team A");
    }

    #[test]
    fn path_without_separator_is_returned_whole() {
        let wi = item("Task", "Proj", "Proj");
        assert_eq!(wi.sprint_name(), "Proj");
    }
}
