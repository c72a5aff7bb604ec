use std::collections::HashMap;

use crate::event::KeyAction;
use crate::git;
use crate::model::filter::DEFAULT_STATES;
use crate::model::team::TeamMember;
use crate::model::work_item::{StateInfo, WorkItem};

/// What a modal wants the controller to do after handling a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    /// Key consumed, modal stays open.
    Open,
    Cancelled,
    ChangeState { id: i32, new_state: String },
    Assign {
        id: i32,
        unique_name: String,
        display_name: String,
    },
    CreateBranch { id: i32, name: String },
}

/// State-change picker. Options come from the item's type when the per-type
/// metadata is available, otherwise the default four.
#[derive(Debug, Clone)]
pub struct StateModal {
    pub item: WorkItem,
    pub states: Vec<String>,
    pub cursor: usize,
}

impl StateModal {
    pub fn new(item: WorkItem, states_by_type: &HashMap<String, Vec<StateInfo>>) -> Self {
        let states: Vec<String> = states_by_type
            .get(item.work_item_type.as_str())
            .filter(|states| !states.is_empty())
            .map(|states| states.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_else(|| DEFAULT_STATES.iter().map(|s| s.to_string()).collect());
        let cursor = states
            .iter()
            .position(|s| s == item.state.as_str())
            .unwrap_or(0);
        Self { item, states, cursor }
    }

    pub fn handle_key(&mut self, key: &KeyAction) -> ModalOutcome {
        match key {
            KeyAction::Up | KeyAction::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyAction::Down | KeyAction::Char('j') => {
                if self.cursor + 1 < self.states.len() {
                    self.cursor += 1;
                }
            }
            KeyAction::Select => {
                return ModalOutcome::ChangeState {
                    id: self.item.id,
                    new_state: self.states[self.cursor].clone(),
                };
            }
            KeyAction::Back => return ModalOutcome::Cancelled,
            _ => {}
        }
        ModalOutcome::Open
    }
}

/// Assignee picker with an inline substring filter.
#[derive(Debug, Clone)]
pub struct AssignModal {
    pub item: WorkItem,
    members: Vec<TeamMember>,
    pub filtered: Vec<TeamMember>,
    pub cursor: usize,
    pub filter: String,
    pub filtering: bool,
}

impl AssignModal {
    pub fn new(item: WorkItem, members: Vec<TeamMember>) -> Self {
        let filtered = members.clone();
        // Start on the current assignee when there is one.
        let cursor = item
            .assigned_to
            .as_deref()
            .and_then(|name| filtered.iter().position(|m| m.display_name == name))
            .unwrap_or(0);
        Self {
            item,
            members,
            filtered,
            cursor,
            filter: String::new(),
            filtering: false,
        }
    }

    fn apply_filter(&mut self) {
        if self.filter.is_empty() {
            self.filtered = self.members.clone();
        } else {
            self.filtered = self
                .members
                .iter()
                .filter(|m| m.matches(&self.filter))
                .cloned()
                .collect();
        }
        // Keep the cursor unless the narrowed set no longer covers it.
        if self.cursor >= self.filtered.len() {
            self.cursor = 0;
        }
    }

    fn confirm(&self) -> ModalOutcome {
        match self.filtered.get(self.cursor) {
            Some(member) => ModalOutcome::Assign {
                id: self.item.id,
                unique_name: member.unique_name.clone(),
                display_name: member.display_name.clone(),
            },
            None => ModalOutcome::Open,
        }
    }

    pub fn handle_key(&mut self, key: &KeyAction) -> ModalOutcome {
        if self.filtering {
            match key {
                KeyAction::Back => {
                    // Esc clears a non-empty filter before it cancels.
                    if !self.filter.is_empty() {
                        self.filter.clear();
                        self.apply_filter();
                        return ModalOutcome::Open;
                    }
                    return ModalOutcome::Cancelled;
                }
                KeyAction::Select => return self.confirm(),
                KeyAction::Up => self.cursor = self.cursor.saturating_sub(1),
                KeyAction::Down => {
                    if self.cursor + 1 < self.filtered.len() {
                        self.cursor += 1;
                    }
                }
                KeyAction::Backspace => {
                    self.filter.pop();
                    self.apply_filter();
                }
                KeyAction::Char(c) => {
                    self.filter.push(*c);
                    self.apply_filter();
                }
                _ => {}
            }
            return ModalOutcome::Open;
        }

        match key {
            KeyAction::Up | KeyAction::Char('k') => self.cursor = self.cursor.saturating_sub(1),
            KeyAction::Down | KeyAction::Char('j') => {
                if self.cursor + 1 < self.filtered.len() {
                    self.cursor += 1;
                }
            }
            KeyAction::Select => return self.confirm(),
            KeyAction::Back => return ModalOutcome::Cancelled,
            KeyAction::Char('/') => self.filtering = true,
            _ => {}
        }
        ModalOutcome::Open
    }
}

/// Branch-name input, pre-filled with a suggestion from the item. Invalid
/// names are rejected locally and the input is kept for correction.
#[derive(Debug, Clone)]
pub struct BranchModal {
    pub item: WorkItem,
    pub input: String,
    pub error: Option<String>,
}

impl BranchModal {
    pub fn new(item: WorkItem) -> Self {
        let input = git::suggest_branch_name(&item);
        Self {
            item,
            input,
            error: None,
        }
    }

    pub fn handle_key(&mut self, key: &KeyAction) -> ModalOutcome {
        match key {
            KeyAction::Back => return ModalOutcome::Cancelled,
            KeyAction::Select => {
                let name = self.input.trim().to_string();
                if name.is_empty() {
                    self.error = Some("branch name cannot be empty".into());
                    return ModalOutcome::Open;
                }
                if let Err(reason) = git::validate_branch_name(&name) {
                    self.error = Some(reason);
                    return ModalOutcome::Open;
                }
                self.error = None;
                return ModalOutcome::CreateBranch {
                    id: self.item.id,
                    name,
                };
            }
            KeyAction::Backspace => {
                self.input.pop();
            }
            KeyAction::Char(c) => self.input.push(*c),
            _ => {}
        }
        ModalOutcome::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::work_item::{WorkItemState, WorkItemType};
    use chrono::Utc;

    fn item(id: i32, ty: &str, state: &str, assigned: Option<&str>) -> WorkItem {
        WorkItem {
            id,
            rev: 1,
            title: "Fix the frobnicator".into(),
            state: WorkItemState(state.into()),
            work_item_type: WorkItemType(ty.into()),
            assigned_to: assigned.map(str::to_string),
            iteration_path: String::new(),
            area_path: String::new(),
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

    fn member(name: &str, email: &str) -> TeamMember {
        TeamMember {
            id: email.into(),
            display_name: name.into(),
            unique_name: email.into(),
        }
    }

    fn state_info(name: &str) -> StateInfo {
        StateInfo {
            name: name.into(),
            color: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn state_modal_uses_per_type_states_and_starts_on_current() {
        let mut by_type = HashMap::new();
        by_type.insert(
            "Bug".to_string(),
            vec![state_info("New"), state_info("Fixing"), state_info("Fixed")],
        );
        let modal = StateModal::new(item(1, "Bug", "Fixing", None), &by_type);
        assert_eq!(modal.states, vec!["New", "Fixing", "Fixed"]);
        assert_eq!(modal.cursor, 1);
    }

    #[test]
    fn state_modal_falls_back_to_default_states() {
        let modal = StateModal::new(item(1, "Bug", "Active", None), &HashMap::new());
        assert_eq!(modal.states, vec!["New", "Active", "Resolved", "Closed"]);
        assert_eq!(modal.cursor, 1);
    }

    #[test]
    fn state_modal_confirm_emits_the_highlighted_state() {
        let mut modal = StateModal::new(item(9, "Bug", "New", None), &HashMap::new());
        modal.handle_key(&KeyAction::Down);
        let outcome = modal.handle_key(&KeyAction::Select);
        assert_eq!(
            outcome,
            ModalOutcome::ChangeState {
                id: 9,
                new_state: "Active".into()
            }
        );
    }

    #[test]
    fn state_modal_escape_cancels() {
        let mut modal = StateModal::new(item(9, "Bug", "New", None), &HashMap::new());
        assert_eq!(modal.handle_key(&KeyAction::Back), ModalOutcome::Cancelled);
    }

    fn members() -> Vec<TeamMember> {
        vec![
            member("Ada Lovelace", "ada@example.com"),
            member("Charles Babbage", "charles@example.com"),
            member("Grace Hopper", "grace@example.com"),
        ]
    }

    #[test]
    fn assign_modal_starts_on_current_assignee() {
        let modal = AssignModal::new(item(1, "Task", "New", Some("Grace Hopper")), members());
        assert_eq!(modal.cursor, 2);
    }

    #[test]
    fn assign_modal_filters_by_substring_case_insensitive() {
        let mut modal = AssignModal::new(item(1, "Task", "New", None), members());
        modal.handle_key(&KeyAction::Char('/'));
        for c in "GRACE".chars() {
            modal.handle_key(&KeyAction::Char(c.to_ascii_lowercase()));
        }
        assert_eq!(modal.filtered.len(), 1);
        assert_eq!(modal.filtered[0].display_name, "Grace Hopper");
    }

    #[test]
    fn assign_modal_cursor_resets_only_when_uncovered() {
        let mut modal = AssignModal::new(item(1, "Task", "New", None), members());
        modal.handle_key(&KeyAction::Down); // cursor 1
        modal.handle_key(&KeyAction::Char('/'));
        modal.handle_key(&KeyAction::Char('a')); // all three match "a"
        assert_eq!(modal.cursor, 1, "cursor kept while still covered");
        modal.handle_key(&KeyAction::Char('d')); // only Ada matches "ad"
        assert_eq!(modal.cursor, 0, "cursor reset when set shrank below it");
    }

    #[test]
    fn assign_modal_escape_clears_filter_then_cancels() {
        let mut modal = AssignModal::new(item(1, "Task", "New", None), members());
        modal.handle_key(&KeyAction::Char('/'));
        modal.handle_key(&KeyAction::Char('x'));
        assert_eq!(modal.handle_key(&KeyAction::Back), ModalOutcome::Open);
        assert!(modal.filter.is_empty());
        assert_eq!(modal.filtered.len(), 3);
        assert_eq!(modal.handle_key(&KeyAction::Back), ModalOutcome::Cancelled);
    }

    #[test]
    fn assign_modal_confirm_carries_unique_and_display_names() {
        let mut modal = AssignModal::new(item(3, "Task", "New", None), members());
        modal.handle_key(&KeyAction::Down);
        let outcome = modal.handle_key(&KeyAction::Select);
        assert_eq!(
            outcome,
            ModalOutcome::Assign {
                id: 3,
                unique_name: "charles@example.com".into(),
                display_name: "Charles Babbage".into(),
            }
        );
    }

    #[test]
    fn assign_modal_confirm_on_empty_set_is_inert() {
        let mut modal = AssignModal::new(item(3, "Task", "New", None), vec![]);
        assert_eq!(modal.handle_key(&KeyAction::Select), ModalOutcome::Open);
    }

    #[test]
    fn branch_modal_prefills_suggestion() {
        let modal = BranchModal::new(item(123, "Bug", "New", None));
        assert_eq!(modal.input, "bugfix/123-fix-the-frobnicator");
    }

    #[test]
    fn branch_modal_rejects_invalid_names_and_keeps_input() {
        let mut modal = BranchModal::new(item(1, "Task", "New", None));
        modal.input = "has space".into();
        assert_eq!(modal.handle_key(&KeyAction::Select), ModalOutcome::Open);
        assert!(modal.error.is_some());
        assert_eq!(modal.input, "has space");
    }

    #[test]
    fn branch_modal_rejects_empty_input() {
        let mut modal = BranchModal::new(item(1, "Task", "New", None));
        modal.input.clear();
        assert_eq!(modal.handle_key(&KeyAction::Select), ModalOutcome::Open);
        assert!(modal.error.is_some());
    }

    #[test]
    fn branch_modal_confirms_valid_name() {
        let mut modal = BranchModal::new(item(7, "Task", "New", None));
        let outcome = modal.handle_key(&KeyAction::Select);
        assert_eq!(
            outcome,
            ModalOutcome::CreateBranch {
                id: 7,
                name: "task/7-fix-the-frobnicator".into()
            }
        );
    }
}
