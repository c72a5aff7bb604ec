use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::Service;
use crate::config::AppConfig;
use crate::model::area::Area;
use crate::model::filter::{WorkItemQuery, FILTER_ALL};
use crate::model::iteration::{Iteration, TimeFrame};
use crate::model::team::TeamMember;
use crate::model::work_item::{StateInfo, WorkItem, WorkItemState, WorkItemType};

const API_VERSION: &str = "7.1";
/// The work-items batch endpoint caps ids per request.
const BATCH_SIZE: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Azure DevOps REST client. Authenticates with Basic auth carrying the
/// personal access token as the password.
pub struct AzdoClient {
    client: reqwest::Client,
    base_url: String,
    team_url: String,
    web_url: String,
    members_url: String,
    auth_header: String,
}

impl AzdoClient {
    pub fn new(config: &AppConfig) -> Self {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!(":{}", config.pat));
        let org_url = format!("https://dev.azure.com/{}", config.organization);
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{org_url}/{}/_apis", config.project),
            team_url: format!("{org_url}/{}/{}/_apis", config.project, config.team),
            web_url: format!("{org_url}/{}", config.project),
            members_url: format!(
                "{org_url}/_apis/projects/{}/teams/{}/members",
                config.project, config.team
            ),
            auth_header: format!("Basic {encoded}"),
        }
    }

    fn work_item_web_url(&self, id: i32) -> String {
        format!("{}/_workitems/edit/{id}", self.web_url)
    }

    fn versioned(url: &str) -> String {
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}api-version={API_VERSION}")
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body }.into());
        }
        Ok(resp)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self
            .client
            .get(Self::versioned(url))
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .send()
            .await
            .context("executing request")?;
        Self::check(resp)
            .await?
            .json()
            .await
            .context("decoding response")
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let resp = self
            .client
            .post(Self::versioned(url))
            .header("Authorization", &self.auth_header)
            .json(body)
            .send()
            .await
            .context("executing request")?;
        Self::check(resp)
            .await?
            .json()
            .await
            .context("decoding response")
    }

    /// Work item updates use the JSON Patch content type.
    async fn patch_fields(&self, id: i32, patch: &serde_json::Value) -> Result<()> {
        let url = format!("{}/wit/workitems/{id}", self.base_url);
        let resp = self
            .client
            .patch(Self::versioned(&url))
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json-patch+json")
            .body(patch.to_string())
            .send()
            .await
            .context("executing request")?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn fetch_work_item_batch(&self, ids: &[i32], fields: &str) -> Result<Vec<RawWorkItem>> {
        let id_list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/wit/workitems?ids={id_list}&fields={fields}",
            self.base_url
        );
        let resp: ValueList<RawWorkItem> = self.get_json(&url).await?;
        Ok(resp.value)
    }

    async fn fetch_full_items(&self, ids: &[i32]) -> Result<Vec<WorkItem>> {
        const FIELDS: &str = "System.Id,System.Title,System.State,System.WorkItemType,\
            System.AssignedTo,System.IterationPath,System.AreaPath,System.Description,\
            System.Tags,System.Parent,Microsoft.VSTS.Common.Priority,System.CreatedDate,\
            System.ChangedDate";

        let mut items = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(BATCH_SIZE) {
            for raw in self.fetch_work_item_batch(chunk, FIELDS).await? {
                items.push(self.convert(raw));
            }
        }
        self.populate_parent_titles(&mut items).await;
        Ok(items)
    }

    /// Fills in parent titles in one batch. Failures leave the titles empty;
    /// they are cosmetic.
    async fn populate_parent_titles(&self, items: &mut [WorkItem]) {
        let mut parent_ids: Vec<i32> = items.iter().filter_map(|item| item.parent_id).collect();
        parent_ids.sort_unstable();
        parent_ids.dedup();
        if parent_ids.is_empty() {
            return;
        }

        let Ok(parents) = self
            .fetch_work_item_batch(&parent_ids, "System.Id,System.Title")
            .await
        else {
            return;
        };

        let titles: HashMap<i32, String> = parents
            .into_iter()
            .map(|raw| (raw.id, raw.fields.title))
            .collect();
        for item in items {
            if let Some(parent_id) = item.parent_id {
                item.parent_title = titles.get(&parent_id).cloned();
            }
        }
    }

    fn convert(&self, raw: RawWorkItem) -> WorkItem {
        let fields = raw.fields;
        WorkItem {
            id: raw.id,
            rev: raw.rev,
            title: fields.title,
            state: WorkItemState(fields.state),
            work_item_type: WorkItemType(fields.work_item_type),
            assigned_to: fields.assigned_to.map(|identity| identity.display_name),
            iteration_path: fields.iteration_path,
            area_path: fields.area_path,
            description: strip_html(&fields.description),
            tags: split_tags(&fields.tags),
            parent_id: fields.parent,
            parent_title: None,
            priority: fields.priority,
            created_date: fields.created_date,
            changed_date: fields.changed_date,
            url: raw.url,
            web_url: self.work_item_web_url(raw.id),
        }
    }
}

#[async_trait]
impl Service for AzdoClient {
    async fn fetch_iterations(&self) -> Result<Vec<Iteration>> {
        let url = format!("{}/work/teamsettings/iterations", self.team_url);
        let resp: ValueList<RawIteration> = self.get_json(&url).await?;
        Ok(resp
            .value
            .into_iter()
            .map(|raw| Iteration {
                id: raw.id,
                name: raw.name,
                path: raw.path,
                start_date: raw.attributes.start_date,
                finish_date: raw.attributes.finish_date,
                time_frame: raw
                    .attributes
                    .time_frame
                    .as_deref()
                    .map(TimeFrame::parse)
                    .unwrap_or(TimeFrame::Unknown),
                url: raw.url,
            })
            .collect())
    }

    async fn fetch_areas(&self) -> Result<Vec<Area>> {
        let url = format!("{}/wit/classificationnodes/areas?$depth=10", self.base_url);
        let root: ClassificationNode = self.get_json(&url).await?;
        let mut areas = Vec::new();
        flatten_areas(&root, &mut areas);
        areas.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(areas)
    }

    async fn fetch_type_states(&self) -> Result<HashMap<String, Vec<StateInfo>>> {
        let url = format!("{}/wit/workitemtypes", self.base_url);
        let types: ValueList<RawWorkItemType> = self.get_json(&url).await?;

        let mut states_by_type = HashMap::new();
        for ty in types.value {
            let url = format!(
                "{}/wit/workitemtypes/{}/states",
                self.base_url,
                urlencoding::encode(&ty.name)
            );
            // Some system types have no states endpoint; skip them.
            let Ok(states) = self.get_json::<ValueList<RawState>>(&url).await else {
                continue;
            };
            states_by_type.insert(
                ty.name,
                states
                    .value
                    .into_iter()
                    .map(|raw| StateInfo {
                        name: raw.name,
                        color: raw.color,
                        category: raw.state_category,
                    })
                    .collect(),
            );
        }
        Ok(states_by_type)
    }

    async fn fetch_team_members(&self) -> Result<Vec<TeamMember>> {
        let resp: ValueList<RawMember> = self.get_json(&self.members_url).await?;
        Ok(resp
            .value
            .into_iter()
            .map(|raw| TeamMember {
                id: raw.identity.id,
                display_name: raw.identity.display_name,
                unique_name: raw.identity.unique_name,
            })
            .collect())
    }

    async fn query_work_items(&self, query: &WorkItemQuery) -> Result<Vec<WorkItem>> {
        let wiql = build_wiql(query);
        let url = format!("{}/wit/wiql", self.base_url);
        let resp: WiqlResponse = self
            .post_json(&url, &serde_json::json!({ "query": wiql }))
            .await?;

        let ids: Vec<i32> = resp.work_items.iter().map(|r| r.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_full_items(&ids).await
    }

    async fn update_state(&self, id: i32, new_state: &str) -> Result<()> {
        let patch = serde_json::json!([
            { "op": "add", "path": "/fields/System.State", "value": new_state }
        ]);
        self.patch_fields(id, &patch).await
    }

    async fn assign(&self, id: i32, user: &str) -> Result<()> {
        let patch = serde_json::json!([
            { "op": "add", "path": "/fields/System.AssignedTo", "value": user }
        ]);
        self.patch_fields(id, &patch).await
    }
}

/// Builds the WIQL text for the composed filter query. Single quotes in
/// values are escaped by doubling, per WIQL string literal rules.
fn build_wiql(query: &WorkItemQuery) -> String {
    let mut wiql = String::from(
        "SELECT [System.Id], [System.Title], [System.State], [System.WorkItemType]\n\
         FROM WorkItems\n\
         WHERE [System.TeamProject] = @project",
    );
    if query.sprint_path != FILTER_ALL && !query.sprint_path.is_empty() {
        wiql.push_str(&format!(
            "\n  AND [System.IterationPath] = '{}'",
            escape_wiql(&query.sprint_path)
        ));
    }
    if query.state != FILTER_ALL && !query.state.is_empty() {
        wiql.push_str(&format!(
            "\n  AND [System.State] = '{}'",
            escape_wiql(&query.state)
        ));
    }
    if query.assigned == "me" {
        wiql.push_str("\n  AND [System.AssignedTo] = @me");
    }
    if query.area_path != FILTER_ALL && !query.area_path.is_empty() {
        let path = query.area_path.trim_matches('\\');
        wiql.push_str(&format!(
            "\n  AND [System.AreaPath] UNDER '{}'",
            escape_wiql(path)
        ));
    }
    wiql.push_str("\nORDER BY [System.ChangedDate] DESC");
    wiql
}

fn escape_wiql(value: &str) -> String {
    value.replace('\'', "''")
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Descriptions arrive as HTML; reduce them to plain text for the panes.
fn strip_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    let out = out
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");
    out.trim().to_string()
}

fn flatten_areas(node: &ClassificationNode, out: &mut Vec<Area>) {
    let raw_path = if node.path.is_empty() {
        &node.name
    } else {
        &node.path
    };
    out.push(Area::new(node.id, node.name.clone(), raw_path));
    for child in &node.children {
        flatten_areas(child, out);
    }
}

// Wire types.

#[derive(Deserialize)]
struct ValueList<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
struct WiqlResponse {
    #[serde(rename = "workItems")]
    work_items: Vec<WiqlRef>,
}

#[derive(Deserialize)]
struct WiqlRef {
    id: i32,
}

#[derive(Deserialize)]
struct RawWorkItem {
    id: i32,
    rev: i32,
    fields: RawFields,
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct RawFields {
    #[serde(rename = "System.Title", default)]
    title: String,
    #[serde(rename = "System.State", default)]
    state: String,
    #[serde(rename = "System.WorkItemType", default)]
    work_item_type: String,
    #[serde(rename = "System.AssignedTo")]
    assigned_to: Option<RawIdentity>,
    #[serde(rename = "System.IterationPath", default)]
    iteration_path: String,
    #[serde(rename = "System.AreaPath", default)]
    area_path: String,
    #[serde(rename = "System.Description", default)]
    description: String,
    #[serde(rename = "System.Tags", default)]
    tags: String,
    #[serde(rename = "System.Parent")]
    parent: Option<i32>,
    #[serde(rename = "Microsoft.VSTS.Common.Priority", default)]
    priority: i32,
    #[serde(rename = "System.CreatedDate", default = "epoch")]
    created_date: DateTime<Utc>,
    #[serde(rename = "System.ChangedDate", default = "epoch")]
    changed_date: DateTime<Utc>,
}

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

#[derive(Deserialize)]
struct RawIdentity {
    #[serde(rename = "displayName", default)]
    display_name: String,
    #[serde(rename = "uniqueName", default)]
    unique_name: String,
    #[serde(default)]
    id: String,
}

#[derive(Deserialize)]
struct RawIteration {
    id: String,
    name: String,
    path: String,
    #[serde(default)]
    attributes: RawIterationAttrs,
    #[serde(default)]
    url: String,
}

#[derive(Deserialize, Default)]
struct RawIterationAttrs {
    #[serde(rename = "startDate")]
    start_date: Option<DateTime<Utc>>,
    #[serde(rename = "finishDate")]
    finish_date: Option<DateTime<Utc>>,
    #[serde(rename = "timeFrame")]
    time_frame: Option<String>,
}

#[derive(Deserialize)]
struct ClassificationNode {
    id: i32,
    name: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    children: Vec<ClassificationNode>,
}

#[derive(Deserialize)]
struct RawWorkItemType {
    name: String,
}

#[derive(Deserialize)]
struct RawState {
    name: String,
    #[serde(default)]
    color: String,
    #[serde(rename = "stateCategory", default)]
    state_category: String,
}

#[derive(Deserialize)]
struct RawMember {
    identity: RawIdentity,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(sprint: &str, state: &str, assigned: &str, area: &str) -> WorkItemQuery {
        WorkItemQuery {
            sprint_path: sprint.into(),
            state: state.into(),
            assigned: assigned.into(),
            area_path: area.into(),
        }
    }

    #[test]
    fn wiql_with_all_sentinels_has_no_filter_clauses() {
        let wiql = build_wiql(&query("all", "all", "all", "all"));
        assert!(!wiql.contains("IterationPath"));
        assert!(!wiql.contains("[System.State] ="));
        assert!(!wiql.contains("AssignedTo"));
        assert!(!wiql.contains("AreaPath"));
        assert!(wiql.contains("ORDER BY [System.ChangedDate] DESC"));
    }

    #[test]
    fn wiql_includes_each_active_dimension() {
        let wiql = build_wiql(&query("Proj\\Sprint 5", "Active", "me", "Proj\\TeamA"));
        assert!(wiql.contains("[System.IterationPath] = 'Proj\\Sprint 5'"));
        assert!(wiql.contains("[System.State] = 'Active'"));
        assert!(wiql.contains("[System.AssignedTo] = @me"));
        assert!(wiql.contains("[System.AreaPath] UNDER 'Proj\\TeamA'"));
    }

    #[test]
    fn wiql_escapes_single_quotes() {
        let wiql = build_wiql(&query("all", "Won't Fix", "all", "all"));
        assert!(wiql.contains("[System.State] = 'Won''t Fix'"));
    }

    #[test]
    fn wiql_trims_area_path_separators() {
        let wiql = build_wiql(&query("all", "all", "all", "\\Proj\\TeamA\\"));
        assert!(wiql.contains("UNDER 'Proj\\TeamA'"));
    }

    #[test]
    fn tags_split_on_semicolons_and_trim() {
        assert_eq!(split_tags("one; two ;;three"), vec!["one", "two", "three"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn strip_html_removes_tags_and_entities() {
        assert_eq!(
            strip_html("<div>a &amp; b&nbsp;<b>bold</b></div>"),
            "a & b bold"
        );
        assert_eq!(strip_html("plain"), "plain");
    }

    #[test]
    fn flatten_walks_children_and_normalizes() {
        let root = ClassificationNode {
            id: 1,
            name: "Proj".into(),
            path: "\\Proj\\Area".into(),
            children: vec![ClassificationNode {
                id: 2,
                name: "TeamA".into(),
                path: "\\Proj\\Area\\TeamA".into(),
                children: vec![],
            }],
        };
        let mut areas = Vec::new();
        flatten_areas(&root, &mut areas);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].path, "Proj");
        assert_eq!(areas[1].path, "Proj\\TeamA");
    }
}
