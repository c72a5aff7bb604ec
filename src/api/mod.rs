pub mod azdo;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::area::Area;
use crate::model::filter::WorkItemQuery;
use crate::model::iteration::Iteration;
use crate::model::team::TeamMember;
use crate::model::work_item::{StateInfo, WorkItem};

/// The work-tracking service the app talks to. One implementation exists
/// for Azure DevOps; tests substitute mocks.
#[async_trait]
pub trait Service: Send + Sync {
    async fn fetch_iterations(&self) -> Result<Vec<Iteration>>;

    /// Returns the area hierarchy flattened to a path-sorted list with
    /// normalized paths.
    async fn fetch_areas(&self) -> Result<Vec<Area>>;

    /// States per work item type. Types whose states cannot be fetched are
    /// simply absent from the map.
    async fn fetch_type_states(&self) -> Result<HashMap<String, Vec<StateInfo>>>;

    async fn fetch_team_members(&self) -> Result<Vec<TeamMember>>;

    /// Runs the composed filter query. "all" disables a dimension; area
    /// filtering matches the whole subtree under the given path.
    async fn query_work_items(&self, query: &WorkItemQuery) -> Result<Vec<WorkItem>>;

    async fn update_state(&self, id: i32, new_state: &str) -> Result<()>;

    /// Assigns by unique identifier; an empty identifier unassigns.
    async fn assign(&self, id: i32, user: &str) -> Result<()>;
}
