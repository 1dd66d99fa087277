use crate::view::TableView;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A tracked habit. `history` is sparse: a missing date means not completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub history: BTreeMap<String, bool>,
}

impl Habit {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            history: BTreeMap::new(),
        }
    }

    pub fn is_completed(&self, date_key: &str) -> bool {
        self.history.get(date_key).copied().unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
pub struct NewHabitRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub date: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub view: TableView,
    pub table_html: String,
}
