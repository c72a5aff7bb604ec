use crate::model::work_item::WorkItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Type,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Cursor, scroll, and sort bookkeeping over the fetched work items.
///
/// `replace` is the only way the collection changes; it re-applies the
/// active sort and relocates the cursor to the previously selected item
/// when that item is still present.
#[derive(Debug, Clone)]
pub struct ItemList {
    items: Vec<WorkItem>,
    pub cursor: usize,
    pub offset: usize,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

impl Default for ItemList {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            offset: 0,
            sort_field: SortField::Id,
            sort_direction: SortDirection::Asc,
        }
    }
}

impl ItemList {
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> Option<&WorkItem> {
        self.items.get(self.cursor)
    }

    /// Installs a new collection, re-sorts, and repairs the cursor: if the
    /// previously selected id survived the refresh the cursor follows it,
    /// otherwise it clamps to the nearest valid index.
    pub fn replace(&mut self, items: Vec<WorkItem>) {
        let previous_id = self.selected().map(|item| item.id);
        let was_empty = self.items.is_empty();

        self.items = items;
        self.sort();

        if was_empty {
            self.cursor = 0;
            self.offset = 0;
        } else if let Some(id) = previous_id {
            if let Some(index) = self.items.iter().position(|item| item.id == id) {
                self.cursor = index;
            }
        }
        self.clamp_cursor();
    }

    /// Same field flips direction; a new field starts ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.sort_direction = match self.sort_direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
        } else {
            self.sort_field = field;
            self.sort_direction = SortDirection::Asc;
        }
        let previous_id = self.selected().map(|item| item.id);
        self.sort();
        if let Some(id) = previous_id {
            if let Some(index) = self.items.iter().position(|item| item.id == id) {
                self.cursor = index;
            }
        }
    }

    fn sort(&mut self) {
        let field = self.sort_field;
        let direction = self.sort_direction;
        // Stable, and reversed via the comparator so equal keys keep their
        // prior relative order in both directions.
        self.items.sort_by(|a, b| {
            let ordering = match field {
                SortField::Id => a.id.cmp(&b.id),
                SortField::Type => a.work_item_type.as_str().cmp(b.work_item_type.as_str()),
                SortField::State => a.state.as_str().cmp(b.state.as_str()),
            };
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
    }

    pub fn move_to_top(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn move_to_bottom(&mut self) {
        if !self.items.is_empty() {
            self.cursor = self.items.len() - 1;
        }
    }

    /// Clamps the scroll window so offset <= cursor <= offset+visible-1.
    pub fn scroll_to_cursor(&mut self, visible_rows: usize) {
        if visible_rows == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        }
        if self.cursor >= self.offset + visible_rows {
            self.offset = self.cursor - visible_rows + 1;
        }
    }

    fn clamp_cursor(&mut self) {
        if self.items.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.items.len() {
            self.cursor = self.items.len() - 1;
        }
        if self.offset > self.cursor {
            self.offset = self.cursor;
        }
    }
}
