use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::api::Service;
use crate::browser;
use crate::config::{self, AppConfig, Defaults, FilterPrefs};
use crate::event::KeyAction;
use crate::git;
use crate::modals::{AssignModal, BranchModal, ModalOutcome, StateModal};
use crate::model::area::Area;
use crate::model::filter::FilterState;
use crate::model::item_list::{ItemList, SortField};
use crate::model::iteration::Iteration;
use crate::model::team::TeamMember;
use crate::model::work_item::{StateInfo, WorkItem};

/// How long transient status messages stay on screen.
const STATUS_TTL_SECS: u64 = 3;

#[derive(Debug)]
pub enum Action {
    Key(KeyAction),
    Tick,
    DataLoaded {
        iterations: Vec<Iteration>,
        areas: Vec<Area>,
        states_by_type: HashMap<String, Vec<StateInfo>>,
        team_members: Vec<TeamMember>,
    },
    DataLoadFailed(String),
    WorkItemsLoaded {
        generation: u64,
        items: Vec<WorkItem>,
    },
    QueryFailed {
        generation: u64,
        message: String,
    },
    StateChanged(String),
    Assigned(String),
    MutationFailed(String),
    BranchCreated(String),
    BranchFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Filter,
    WorkItems,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Main,
    Detail,
}

pub enum Modal {
    State(StateModal),
    Assign(AssignModal),
    Branch(BranchModal),
}

pub struct App {
    service: Arc<dyn Service>,
    pub action_tx: mpsc::UnboundedSender<Action>,

    pub organization: String,
    pub project: String,
    defaults: Defaults,
    prefs_dir: PathBuf,

    pub filter: FilterState,
    pub list: ItemList,
    pub team_members: Vec<TeamMember>,
    pub states_by_type: HashMap<String, Vec<StateInfo>>,

    pub active_panel: Panel,
    pub view: View,
    pub modal: Option<Modal>,
    pub help_visible: bool,
    pub detail_scroll: usize,

    /// False until iterations/areas have loaded; their failure is fatal to
    /// reaching the ready state and retried via refresh.
    pub initialized: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub status: Option<(String, Instant)>,
    pub should_quit: bool,

    /// Rows the work-item table can show; updated from the terminal size
    /// before each frame.
    pub list_visible_rows: usize,

    /// Generation token of the most recently issued work-item query.
    /// Results carrying an older token are dropped.
    query_generation: u64,
}

impl App {
    pub fn new(
        config: &AppConfig,
        service: Arc<dyn Service>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            service,
            action_tx,
            organization: config.organization.clone(),
            project: config.project.clone(),
            defaults: config.defaults.clone(),
            prefs_dir: config::config_dir(),
            filter: FilterState::build(&[], &[], &HashMap::new()),
            list: ItemList::default(),
            team_members: Vec::new(),
            states_by_type: HashMap::new(),
            active_panel: Panel::WorkItems,
            view: View::Main,
            modal: None,
            help_visible: false,
            detail_scroll: 0,
            initialized: false,
            loading: true,
            error: None,
            status: None,
            should_quit: false,
            list_visible_rows: 1,
            query_generation: 0,
        }
    }

    #[cfg(test)]
    pub fn with_prefs_dir(mut self, dir: PathBuf) -> Self {
        self.prefs_dir = dir;
        self
    }

    /// Kicks off the initial domain-data load. Iterations and areas are
    /// required; type states and team members degrade to empty.
    pub fn load_data(&self) {
        let service = self.service.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let iterations = match service.fetch_iterations().await {
                Ok(iterations) => iterations,
                Err(e) => {
                    let _ = tx.send(Action::DataLoadFailed(format!("loading iterations: {e}")));
                    return;
                }
            };
            let areas = match service.fetch_areas().await {
                Ok(areas) => areas,
                Err(e) => {
                    let _ = tx.send(Action::DataLoadFailed(format!("loading areas: {e}")));
                    return;
                }
            };
            let states_by_type = service.fetch_type_states().await.unwrap_or_default();
            let team_members = service.fetch_team_members().await.unwrap_or_default();
            let _ = tx.send(Action::DataLoaded {
                iterations,
                areas,
                states_by_type,
                team_members,
            });
        });
    }

    /// Issues the work-item query for the current filter selections,
    /// tagging it with a fresh generation token.
    fn issue_query(&mut self) {
        self.loading = true;
        self.query_generation += 1;
        let generation = self.query_generation;
        let query = self.filter.query();
        let service = self.service.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match service.query_work_items(&query).await {
                Ok(items) => {
                    let _ = tx.send(Action::WorkItemsLoaded { generation, items });
                }
                Err(e) => {
                    let _ = tx.send(Action::QueryFailed {
                        generation,
                        message: format!("loading work items: {e}"),
                    });
                }
            }
        });
    }

    pub fn update(&mut self, action: Action) {
        if let Some((_, since)) = &self.status {
            if since.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status = None;
            }
        }

        match action {
            Action::Key(key) => self.handle_key(key),
            Action::Tick => {}
            Action::DataLoaded {
                iterations,
                areas,
                states_by_type,
                team_members,
            } => {
                self.states_by_type = states_by_type;
                self.team_members = team_members;

                let mut filter = FilterState::build(&iterations, &areas, &self.states_by_type);
                let prefs = config::load_filter_prefs(&self.prefs_dir, &self.defaults);
                filter.apply_saved_selections(
                    &prefs.sprint,
                    &prefs.state,
                    &prefs.assigned,
                    &prefs.area,
                );
                self.filter = filter;
                self.initialized = true;
                self.error = None;
                self.issue_query();
            }
            Action::DataLoadFailed(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            Action::WorkItemsLoaded { generation, items } => {
                if generation != self.query_generation {
                    return; // a newer query superseded this one
                }
                self.loading = false;
                self.error = None;
                self.list.replace(items);
            }
            Action::QueryFailed {
                generation,
                message,
            } => {
                if generation != self.query_generation {
                    return;
                }
                self.loading = false;
                self.error = Some(message);
            }
            Action::StateChanged(new_state) => {
                self.set_status(format!("State changed to {new_state}"));
                self.issue_query();
            }
            Action::Assigned(display_name) => {
                self.set_status(format!("Assigned to {display_name}"));
                self.issue_query();
            }
            Action::MutationFailed(message) => {
                self.loading = false;
                self.error = Some(message);
            }
            Action::BranchCreated(name) => {
                self.set_status(format!("Branch created: {name}"));
            }
            Action::BranchFailed(message) => {
                self.error = Some(message);
            }
        }
    }

    fn set_status(&mut self, message: String) {
        self.status = Some((message, Instant::now()));
    }

    fn handle_key(&mut self, key: KeyAction) {
        if key == KeyAction::ForceQuit {
            self.should_quit = true;
            return;
        }

        // A visible modal captures all input.
        if self.modal.is_some() {
            self.handle_modal_key(&key);
            return;
        }

        if self.help_visible {
            if matches!(key, KeyAction::Back | KeyAction::Char('?') | KeyAction::Char('q')) {
                self.help_visible = false;
            }
            return;
        }
        if key == KeyAction::Char('?') {
            self.help_visible = true;
            return;
        }

        if self.view == View::Detail {
            self.handle_detail_key(&key);
            return;
        }

        match key {
            KeyAction::Char('q') => self.should_quit = true,
            KeyAction::NextPanel | KeyAction::PrevPanel => {
                self.active_panel = match self.active_panel {
                    Panel::Filter => Panel::WorkItems,
                    Panel::WorkItems => Panel::Filter,
                };
            }
            KeyAction::Refresh => {
                self.error = None;
                if self.initialized {
                    self.issue_query();
                } else {
                    self.loading = true;
                    self.load_data();
                }
            }
            key => match self.active_panel {
                Panel::Filter => self.handle_filter_key(&key),
                Panel::WorkItems => self.handle_list_key(&key),
            },
        }
    }

    fn handle_modal_key(&mut self, key: &KeyAction) {
        let outcome = match self.modal.as_mut() {
            Some(Modal::State(modal)) => modal.handle_key(key),
            Some(Modal::Assign(modal)) => modal.handle_key(key),
            Some(Modal::Branch(modal)) => modal.handle_key(key),
            None => return,
        };

        match outcome {
            ModalOutcome::Open => {}
            ModalOutcome::Cancelled => self.modal = None,
            ModalOutcome::ChangeState { id, new_state } => {
                self.modal = None;
                self.loading = true;
                let service = self.service.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match service.update_state(id, &new_state).await {
                        Ok(()) => {
                            let _ = tx.send(Action::StateChanged(new_state));
                        }
                        Err(e) => {
                            let _ =
                                tx.send(Action::MutationFailed(format!("changing state: {e}")));
                        }
                    }
                });
            }
            ModalOutcome::Assign {
                id,
                unique_name,
                display_name,
            } => {
                self.modal = None;
                self.loading = true;
                let service = self.service.clone();
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    match service.assign(id, &unique_name).await {
                        Ok(()) => {
                            let _ = tx.send(Action::Assigned(display_name));
                        }
                        Err(e) => {
                            let _ = tx.send(Action::MutationFailed(format!("assigning: {e}")));
                        }
                    }
                });
            }
            ModalOutcome::CreateBranch { id: _, name } => {
                self.modal = None;
                let tx = self.action_tx.clone();
                tokio::spawn(async move {
                    if !git::is_repository().await {
                        let _ = tx.send(Action::BranchFailed("not a git repository".into()));
                        return;
                    }
                    if git::has_uncommitted_changes().await {
                        let _ =
                            tx.send(Action::BranchFailed("uncommitted changes exist".into()));
                        return;
                    }
                    match git::create_branch(&name).await {
                        Ok(()) => {
                            let _ = tx.send(Action::BranchCreated(name));
                        }
                        Err(e) => {
                            let _ = tx.send(Action::BranchFailed(e.to_string()));
                        }
                    }
                });
            }
        }
    }

    fn handle_detail_key(&mut self, key: &KeyAction) {
        match key {
            KeyAction::Back | KeyAction::Char('q') => {
                self.view = View::Main;
            }
            KeyAction::Select => {
                if let Some(item) = self.list.selected() {
                    if let Err(e) = browser::open(&item.web_url) {
                        self.error = Some(e.to_string());
                    }
                }
            }
            KeyAction::Up | KeyAction::Char('k') => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
            KeyAction::Down | KeyAction::Char('j') => {
                self.detail_scroll += 1;
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: &KeyAction) {
        let visible = crate::ui::filter_panel::MAX_VISIBLE_OPTIONS;
        match key {
            KeyAction::Up | KeyAction::Char('k') => {
                let group = self.filter.active();
                group.move_up();
                group.scroll_to_cursor(visible);
            }
            KeyAction::Down | KeyAction::Char('j') => {
                let group = self.filter.active();
                group.move_down();
                group.scroll_to_cursor(visible);
            }
            KeyAction::Char('g') => self.filter.active().move_to_top(),
            KeyAction::Char('G') => {
                let group = self.filter.active();
                group.move_to_bottom();
                group.scroll_to_cursor(visible);
            }
            KeyAction::Left | KeyAction::Char('h') => self.filter.prev_group(),
            KeyAction::Right | KeyAction::Char('l') => self.filter.next_group(),
            KeyAction::Select | KeyAction::Char(' ') => {
                self.filter.active().select_current();
                self.save_filter_prefs();
                self.issue_query();
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: &KeyAction) {
        match key {
            KeyAction::Up | KeyAction::Char('k') => {
                self.list.move_up();
                self.list.scroll_to_cursor(self.list_visible_rows);
            }
            KeyAction::Down | KeyAction::Char('j') => {
                self.list.move_down();
                self.list.scroll_to_cursor(self.list_visible_rows);
            }
            KeyAction::Char('g') => self.list.move_to_top(),
            KeyAction::Char('G') => {
                self.list.move_to_bottom();
                self.list.scroll_to_cursor(self.list_visible_rows);
            }
            KeyAction::Char('1') => self.list.toggle_sort(SortField::Id),
            KeyAction::Char('2') => self.list.toggle_sort(SortField::Type),
            KeyAction::Char('3') => self.list.toggle_sort(SortField::State),
            KeyAction::Select => {
                if let Some(item) = self.list.selected() {
                    if let Err(e) = browser::open(&item.web_url) {
                        self.error = Some(e.to_string());
                    }
                }
            }
            KeyAction::Char('v') => {
                if self.list.selected().is_some() {
                    self.view = View::Detail;
                    self.detail_scroll = 0;
                }
            }
            KeyAction::Char('s') => {
                if let Some(item) = self.list.selected() {
                    self.modal = Some(Modal::State(StateModal::new(
                        item.clone(),
                        &self.states_by_type,
                    )));
                }
            }
            KeyAction::Char('a') => {
                if let Some(item) = self.list.selected() {
                    self.modal = Some(Modal::Assign(AssignModal::new(
                        item.clone(),
                        self.team_members.clone(),
                    )));
                }
            }
            KeyAction::Char('b') => {
                if let Some(item) = self.list.selected() {
                    self.modal = Some(Modal::Branch(BranchModal::new(item.clone())));
                }
            }
            _ => {}
        }
    }

    fn save_filter_prefs(&self) {
        let query = self.filter.query();
        let prefs = FilterPrefs {
            sprint: query.sprint_path,
            state: query.state,
            assigned: query.assigned,
            area: query.area_path,
        };
        // Preference persistence is best-effort; filtering still works
        // without it.
        let _ = config::save_filter_prefs(&self.prefs_dir, &prefs);
    }

    /// Updates scroll windows from the frame size before rendering.
    pub fn set_list_visible_rows(&mut self, rows: usize) {
        self.list_visible_rows = rows.max(1);
        self.list.scroll_to_cursor(self.list_visible_rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{make_item, MockService};

    fn test_app(
        service: Arc<dyn Service>,
    ) -> (App, mpsc::UnboundedReceiver<Action>, tempfile::TempDir) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = AppConfig {
            organization: "org".into(),
            project: "proj".into(),
            team: "team".into(),
            pat: "secret".into(),
            defaults: Default::default(),
        };
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(&config, service, tx).with_prefs_dir(dir.path().to_path_buf());
        (app, rx, dir)
    }

    fn loaded(app: &mut App) {
        app.update(Action::DataLoaded {
            iterations: vec![],
            areas: vec![],
            states_by_type: HashMap::new(),
            team_members: vec![],
        });
    }

    #[tokio::test]
    async fn data_load_marks_initialized_and_issues_query() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        assert!(!app.initialized);
        loaded(&mut app);
        assert!(app.initialized);
        assert!(app.loading);
    }

    #[tokio::test]
    async fn stale_query_results_are_dropped() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        loaded(&mut app); // generation 1
        app.update(Action::Key(KeyAction::Refresh)); // generation 2

        app.update(Action::WorkItemsLoaded {
            generation: 2,
            items: vec![make_item(2, "Fresh")],
        });
        assert_eq!(app.list.selected().unwrap().id, 2);

        // The older response resolves afterward and must not clobber.
        app.update(Action::WorkItemsLoaded {
            generation: 1,
            items: vec![make_item(1, "Stale")],
        });
        assert_eq!(app.list.selected().unwrap().id, 2);
    }

    #[tokio::test]
    async fn stale_query_failure_is_dropped() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        loaded(&mut app); // generation 1
        app.update(Action::Key(KeyAction::Refresh)); // generation 2
        app.update(Action::QueryFailed {
            generation: 1,
            message: "old failure".into(),
        });
        assert!(app.error.is_none());
        assert!(app.loading);
    }

    #[tokio::test]
    async fn query_failure_keeps_prior_items() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        loaded(&mut app);
        app.update(Action::WorkItemsLoaded {
            generation: 1,
            items: vec![make_item(1, "Kept")],
        });
        app.update(Action::Key(KeyAction::Refresh)); // generation 2
        app.update(Action::QueryFailed {
            generation: 2,
            message: "boom".into(),
        });
        assert!(!app.loading);
        assert_eq!(app.error.as_deref(), Some("boom"));
        assert_eq!(app.list.selected().unwrap().id, 1);
    }

    #[tokio::test]
    async fn fatal_data_load_failure_blocks_ready() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        app.update(Action::DataLoadFailed("no areas".into()));
        assert!(!app.initialized);
        assert!(!app.loading);
        assert_eq!(app.error.as_deref(), Some("no areas"));
    }

    #[tokio::test]
    async fn modal_requires_a_selection() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        loaded(&mut app);
        app.update(Action::Key(KeyAction::Char('s')));
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn modal_captures_input_while_open() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        loaded(&mut app);
        app.update(Action::WorkItemsLoaded {
            generation: 1,
            items: vec![make_item(1, "One")],
        });
        app.update(Action::Key(KeyAction::Char('s')));
        assert!(matches!(app.modal, Some(Modal::State(_))));

        // 'q' quits from the list but is inert inside the modal.
        app.update(Action::Key(KeyAction::Char('q')));
        assert!(!app.should_quit);

        app.update(Action::Key(KeyAction::Back));
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn state_change_round_trip_reissues_query() {
        let service = Arc::new(MockService::new(vec![make_item(1, "One")]));
        let (mut app, mut rx, _dir) = test_app(service.clone());
        loaded(&mut app);
        app.update(Action::WorkItemsLoaded {
            generation: 1,
            items: vec![make_item(1, "One")],
        });

        app.update(Action::Key(KeyAction::Char('s')));
        app.update(Action::Key(KeyAction::Select));
        assert!(app.modal.is_none());
        assert!(app.loading);

        // The spawned task reports completion through the channel. Query
        // results from the earlier loads may arrive first; skip past them.
        let action = loop {
            match rx.recv().await.unwrap() {
                action @ Action::StateChanged(_) => break action,
                _ => {}
            }
        };
        assert_eq!(service.state_updates.lock().unwrap().len(), 1);

        let generation_before = app.query_generation;
        app.update(action);
        assert_eq!(app.query_generation, generation_before + 1);
        assert!(app.status.is_some());
    }

    #[tokio::test]
    async fn filter_selection_persists_prefs() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        loaded(&mut app);
        app.active_panel = Panel::Filter;
        app.filter.next_group(); // State group
        app.filter.active().move_down(); // first real state
        app.update(Action::Key(KeyAction::Select));

        let prefs = config::load_filter_prefs(&app.prefs_dir, &app.defaults);
        assert_eq!(prefs.state, "New");
    }

    #[tokio::test]
    async fn detail_view_opens_and_closes() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        loaded(&mut app);
        app.update(Action::WorkItemsLoaded {
            generation: 1,
            items: vec![make_item(1, "One")],
        });
        app.update(Action::Key(KeyAction::Char('v')));
        assert_eq!(app.view, View::Detail);
        app.update(Action::Key(KeyAction::Back));
        assert_eq!(app.view, View::Main);
    }

    #[tokio::test]
    async fn help_overlay_swallows_other_keys() {
        let (mut app, _rx, _dir) = test_app(Arc::new(MockService::new(vec![])));
        loaded(&mut app);
        app.update(Action::Key(KeyAction::Char('?')));
        assert!(app.help_visible);
        app.update(Action::Key(KeyAction::Char('s')));
        assert!(app.modal.is_none());
        app.update(Action::Key(KeyAction::Char('?')));
        assert!(!app.help_visible);
    }
}
