//! Pure view model for the habit table.
//!
//! `build_view` is recomputed from scratch for every response; nothing here
//! holds state between renders.

use crate::dates::display_label;
use crate::models::Habit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<HabitRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitRow {
    pub id: i64,
    pub name: String,
    pub days: Vec<DayCell>,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: String,
    pub label: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

impl Progress {
    pub fn fraction(&self) -> String {
        format!("{}/{}", self.completed, self.total)
    }
}

pub fn build_view(habits: &[Habit], window: &[String]) -> TableView {
    let labels: Vec<String> = window.iter().map(|key| display_label(key)).collect();

    let mut headers = Vec::with_capacity(window.len() + 3);
    headers.push("Habit".to_string());
    headers.extend(labels.iter().cloned());
    headers.push("Progress".to_string());
    headers.push("Actions".to_string());

    let rows = habits
        .iter()
        .map(|habit| HabitRow {
            id: habit.id,
            name: habit.name.clone(),
            days: window
                .iter()
                .zip(&labels)
                .map(|(date, label)| DayCell {
                    date: date.clone(),
                    label: label.clone(),
                    completed: habit.is_completed(date),
                })
                .collect(),
            progress: progress_for(habit, window),
        })
        .collect();

    TableView { headers, rows }
}

pub fn progress_for(habit: &Habit, window: &[String]) -> Progress {
    let completed = window.iter().filter(|date| habit.is_completed(date)).count();
    let total = window.len();
    Progress {
        completed,
        total,
        percent: percent(completed, total),
    }
}

/// `round(100 * completed / total)` with halves rounded up.
fn percent(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * completed + total) / (2 * total)) as u32
}
