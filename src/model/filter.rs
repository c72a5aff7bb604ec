use std::collections::HashMap;

use crate::model::area::Area;
use crate::model::iteration::Iteration;
use crate::model::work_item::StateInfo;

/// Sentinel value meaning "no filter on this dimension".
pub const FILTER_ALL: &str = "all";
/// Persisted sprint sentinel meaning "whatever sprint is current".
pub const SPRINT_CURRENT: &str = "current";

/// Category precedence for merging per-type states into one list.
const STATE_CATEGORY_ORDER: [&str; 5] =
    ["Proposed", "InProgress", "Resolved", "Completed", "Removed"];

/// States offered when the service exposes no per-type metadata.
pub const DEFAULT_STATES: [&str; 4] = ["New", "Active", "Resolved", "Closed"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Sprint,
    State,
    Assigned,
    Area,
}

#[derive(Debug, Clone)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

impl FilterOption {
    fn new(label: impl Into<String>, value: impl Into<String>, selected: bool) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            selected,
        }
    }
}

/// One independently navigable single-select list of options.
///
/// Invariant: at most one option has `selected == true`. `select` is the
/// only way selection changes, and it enforces this by clearing the rest.
#[derive(Debug, Clone)]
pub struct FilterGroup {
    pub kind: FilterKind,
    pub title: &'static str,
    pub options: Vec<FilterOption>,
    pub cursor: usize,
    pub offset: usize,
}

impl FilterGroup {
    fn new(kind: FilterKind, title: &'static str, options: Vec<FilterOption>) -> Self {
        Self {
            kind,
            title,
            options,
            cursor: 0,
            offset: 0,
        }
    }

    pub fn selected_option(&self) -> Option<&FilterOption> {
        self.options.iter().find(|o| o.selected)
    }

    /// Effective value: the selected option's value, or "all" if nothing is
    /// selected.
    pub fn effective_value(&self) -> &str {
        self.selected_option()
            .map(|o| o.value.as_str())
            .unwrap_or(FILTER_ALL)
    }

    /// Marks exactly the option at `index` as selected. Out of range is a
    /// no-op; the previous selection stays.
    pub fn select(&mut self, index: usize) {
        if index >= self.options.len() {
            return;
        }
        for (i, opt) in self.options.iter_mut().enumerate() {
            opt.selected = i == index;
        }
    }

    pub fn select_current(&mut self) {
        self.select(self.cursor);
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.options.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_top(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn move_to_bottom(&mut self) {
        if !self.options.is_empty() {
            self.cursor = self.options.len() - 1;
        }
    }

    /// Keeps the cursor inside the `visible`-row scroll window.
    pub fn scroll_to_cursor(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        if self.cursor >= self.offset + visible {
            self.offset = self.cursor - visible + 1;
        }
    }
}

/// The query descriptor composed from the four group selections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemQuery {
    pub sprint_path: String,
    pub state: String,
    pub assigned: String,
    pub area_path: String,
}

/// The fixed set of four filter groups plus the active-group index.
///
/// Rebuilt from fresh domain data rather than mutated; saved selections are
/// re-applied by value so they survive option reordering.
#[derive(Debug, Clone)]
pub struct FilterState {
    pub groups: Vec<FilterGroup>,
    pub active_group: usize,
}

impl FilterState {
    pub fn build(
        iterations: &[Iteration],
        areas: &[Area],
        states_by_type: &HashMap<String, Vec<StateInfo>>,
    ) -> Self {
        Self {
            groups: vec![
                FilterGroup::new(FilterKind::Sprint, "Sprint", sprint_options(iterations)),
                FilterGroup::new(FilterKind::State, "State", state_options(states_by_type)),
                FilterGroup::new(
                    FilterKind::Assigned,
                    "Assigned",
                    vec![
                        FilterOption::new("All", FILTER_ALL, false),
                        FilterOption::new("Me", "me", true),
                    ],
                ),
                FilterGroup::new(FilterKind::Area, "Area", area_options(areas)),
            ],
            active_group: 0,
        }
    }

    /// Re-applies persisted selections by value. Values with no matching
    /// option are ignored, and the sprint sentinel "current" defers to the
    /// current-sprint pre-selection done by `build`.
    pub fn apply_saved_selections(&mut self, sprint: &str, state: &str, assigned: &str, area: &str) {
        for group in &mut self.groups {
            let saved = match group.kind {
                FilterKind::Sprint => sprint,
                FilterKind::State => state,
                FilterKind::Assigned => assigned,
                FilterKind::Area => area,
            };
            if saved.is_empty() {
                continue;
            }
            if group.kind == FilterKind::Sprint && saved == SPRINT_CURRENT {
                continue;
            }
            if let Some(index) = group.options.iter().position(|o| o.value == saved) {
                group.select(index);
            }
        }
    }

    pub fn active(&mut self) -> &mut FilterGroup {
        &mut self.groups[self.active_group]
    }

    pub fn next_group(&mut self) {
        if self.active_group + 1 < self.groups.len() {
            self.active_group += 1;
        }
    }

    pub fn prev_group(&mut self) {
        self.active_group = self.active_group.saturating_sub(1);
    }

    fn value_of(&self, kind: FilterKind) -> String {
        self.groups
            .iter()
            .find(|g| g.kind == kind)
            .map(|g| g.effective_value().to_string())
            .unwrap_or_else(|| FILTER_ALL.to_string())
    }

    pub fn query(&self) -> WorkItemQuery {
        WorkItemQuery {
            sprint_path: self.value_of(FilterKind::Sprint),
            state: self.value_of(FilterKind::State),
            assigned: self.value_of(FilterKind::Assigned),
            area_path: self.value_of(FilterKind::Area),
        }
    }
}

fn sprint_options(iterations: &[Iteration]) -> Vec<FilterOption> {
    let mut options = vec![FilterOption::new("All", FILTER_ALL, false)];
    let mut current_seen = false;
    for iter in iterations {
        // First current iteration wins; the service should only report one.
        let selected = iter.is_current() && !current_seen;
        current_seen |= selected;
        options.push(FilterOption::new(iter.display_name(), &iter.path, selected));
    }
    if !current_seen {
        options[0].selected = true;
    }
    options
}

fn area_options(areas: &[Area]) -> Vec<FilterOption> {
    let mut options = vec![FilterOption::new("All", FILTER_ALL, true)];
    for area in areas {
        options.push(FilterOption::new(area.display_name(), &area.path, false));
    }
    options
}

/// Merges the per-type state lists into one deduplicated option list,
/// ordered by category precedence then first-seen within a category.
fn state_options(states_by_type: &HashMap<String, Vec<StateInfo>>) -> Vec<FilterOption> {
    let mut options = vec![FilterOption::new("All", FILTER_ALL, true)];

    // Iterate types in a fixed order so "first seen" is deterministic.
    let mut types: Vec<&String> = states_by_type.keys().collect();
    types.sort();

    let mut seen: Vec<String> = Vec::new();
    for category in STATE_CATEGORY_ORDER {
        for ty in &types {
            for state in &states_by_type[*ty] {
                if state.category == category && !seen.iter().any(|s| s == &state.name) {
                    seen.push(state.name.clone());
                    options.push(FilterOption::new(&state.name, &state.name, false));
                }
            }
        }
    }
    // Unrecognized categories go after all known ones, still deduplicated.
    for ty in &types {
        for state in &states_by_type[*ty] {
            if !seen.iter().any(|s| s == &state.name) {
                seen.push(state.name.clone());
                options.push(FilterOption::new(&state.name, &state.name, false));
            }
        }
    }

    if options.len() <= 1 {
        for state in DEFAULT_STATES {
            options.push(FilterOption::new(state, state, false));
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::iteration::TimeFrame;

    fn iteration(name: &str, time_frame: TimeFrame) -> Iteration {
        Iteration {
            id: name.into(),
            name: name.into(),
            path: format!("Proj\\{name}"),
            start_date: None,
            finish_date: None,
            time_frame,
            url: String::new(),
        }
    }

    fn state(name: &str, category: &str) -> StateInfo {
        StateInfo {
            name: name.into(),
            color: "ffffff".into(),
            category: category.into(),
        }
    }

    fn selected_values(fs: &FilterState) -> Vec<&str> {
        fs.groups.iter().map(|g| g.effective_value()).collect()
    }

    #[test]
    fn build_with_no_data_selects_all_everywhere_but_assigned() {
        let fs = FilterState::build(&[], &[], &HashMap::new());
        assert_eq!(selected_values(&fs), vec!["all", "all", "me", "all"]);
        assert_eq!(fs.groups[0].options.len(), 1); // Sprint: only "All"
        assert_eq!(fs.groups[3].options.len(), 1); // Area: only "All"
        assert_eq!(fs.query().sprint_path, "all");
        assert_eq!(fs.query().area_path, "all");
    }

    #[test]
    fn current_iteration_is_preselected() {
        let iterations = vec![
            iteration("Sprint 4", TimeFrame::Past),
            iteration("Sprint 5", TimeFrame::Current),
            iteration("Sprint 6", TimeFrame::Future),
        ];
        let fs = FilterState::build(&iterations, &[], &HashMap::new());
        let sprint = &fs.groups[0];
        assert_eq!(sprint.effective_value(), "Proj\\Sprint 5");
        assert_eq!(sprint.selected_option().unwrap().label, "Sprint 5 (current)");
    }

    #[test]
    fn first_current_iteration_wins() {
        let iterations = vec![
            iteration("Sprint 5", TimeFrame::Current),
            iteration("Sprint 6", TimeFrame::Current),
        ];
        let fs = FilterState::build(&iterations, &[], &HashMap::new());
        assert_eq!(fs.groups[0].effective_value(), "Proj\\Sprint 5");
    }

    #[test]
    fn no_current_iteration_falls_back_to_all() {
        let iterations = vec![iteration("Sprint 4", TimeFrame::Past)];
        let fs = FilterState::build(&iterations, &[], &HashMap::new());
        assert_eq!(fs.groups[0].effective_value(), "all");
    }

    #[test]
    fn state_merge_orders_by_category_and_dedups() {
        let mut by_type = HashMap::new();
        by_type.insert(
            "A".to_string(),
            vec![state("New", "Proposed"), state("Active", "InProgress")],
        );
        by_type.insert(
            "B".to_string(),
            vec![state("Active", "InProgress"), state("Done", "Completed")],
        );
        let fs = FilterState::build(&[], &[], &by_type);
        let labels: Vec<&str> = fs.groups[1].options[1..]
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, vec!["New", "Active", "Done"]);
    }

    #[test]
    fn unknown_categories_sort_after_known_ones() {
        let mut by_type = HashMap::new();
        by_type.insert(
            "A".to_string(),
            vec![state("Weird", "Custom"), state("New", "Proposed")],
        );
        let fs = FilterState::build(&[], &[], &by_type);
        let labels: Vec<&str> = fs.groups[1].options[1..]
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, vec!["New", "Weird"]);
    }

    #[test]
    fn empty_state_metadata_falls_back_to_defaults() {
        let fs = FilterState::build(&[], &[], &HashMap::new());
        let labels: Vec<&str> = fs.groups[1].options[1..]
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(labels, vec!["New", "Active", "Resolved", "Closed"]);
    }

    #[test]
    fn select_is_single_select_and_out_of_range_is_noop() {
        let mut fs = FilterState::build(&[], &[], &HashMap::new());
        let group = &mut fs.groups[1];
        group.select(2);
        assert_eq!(
            group.options.iter().filter(|o| o.selected).count(),
            1,
            "exactly one selected"
        );
        assert!(group.options[2].selected);

        group.select(99);
        assert!(group.options[2].selected, "previous selection unchanged");
        assert_eq!(group.options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn cursor_movement_never_changes_selection() {
        let mut fs = FilterState::build(&[], &[], &HashMap::new());
        let before = fs.groups[1].effective_value().to_string();
        fs.groups[1].move_down();
        fs.groups[1].move_down();
        fs.groups[1].move_to_bottom();
        fs.groups[1].move_up();
        assert_eq!(fs.groups[1].effective_value(), before);
    }

    #[test]
    fn saved_selections_restore_by_value() {
        let iterations = vec![
            iteration("Sprint 4", TimeFrame::Past),
            iteration("Sprint 5", TimeFrame::Current),
        ];
        let mut fs = FilterState::build(&iterations, &[], &HashMap::new());
        fs.apply_saved_selections("Proj\\Sprint 4", "Active", "all", "all");
        assert_eq!(
            selected_values(&fs),
            vec!["Proj\\Sprint 4", "Active", "all", "all"]
        );
        let sprint = &fs.groups[0];
        assert_eq!(sprint.options.iter().filter(|o| o.selected).count(), 1);
    }

    #[test]
    fn saved_current_sentinel_keeps_computed_sprint() {
        let iterations = vec![iteration("Sprint 5", TimeFrame::Current)];
        let mut fs = FilterState::build(&iterations, &[], &HashMap::new());
        fs.apply_saved_selections("current", "all", "me", "all");
        assert_eq!(fs.groups[0].effective_value(), "Proj\\Sprint 5");
    }

    #[test]
    fn saved_value_with_no_match_is_ignored() {
        let mut fs = FilterState::build(&[], &[], &HashMap::new());
        fs.apply_saved_selections("Proj\\Gone", "Mystery", "me", "Proj\\Nowhere");
        assert_eq!(selected_values(&fs), vec!["all", "all", "me", "all"]);
    }

    #[test]
    fn group_navigation_clamps_at_both_ends() {
        let mut fs = FilterState::build(&[], &[], &HashMap::new());
        fs.prev_group();
        assert_eq!(fs.active_group, 0);
        for _ in 0..10 {
            fs.next_group();
        }
        assert_eq!(fs.active_group, fs.groups.len() - 1);
    }

    #[test]
    fn scroll_follows_cursor() {
        let iterations: Vec<Iteration> = (0..20)
            .map(|i| iteration(&format!("Sprint {i}"), TimeFrame::Past))
            .collect();
        let mut fs = FilterState::build(&iterations, &[], &HashMap::new());
        let group = &mut fs.groups[0];
        group.move_to_bottom();
        group.scroll_to_cursor(6);
        assert_eq!(group.offset, group.cursor - 5);
        group.move_to_top();
        assert_eq!(group.offset, 0);
    }
}
