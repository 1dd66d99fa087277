use crate::errors::StoreError;
use crate::models::Habit;
use crate::storage::{load_habits, save_habits, KeyValueStore};
use crate::view::{build_view, TableView};
use chrono::Utc;
use std::collections::HashSet;
use tracing::{info, warn};

/// Owns the habit list and the store it is mirrored to.
///
/// Every mutation writes the full list through to the store before returning.
/// If the write fails the list is restored to its previous value, so the
/// in-memory list and the stored copy never diverge.
pub struct HabitTracker {
    store: Box<dyn KeyValueStore>,
    habits: Vec<Habit>,
}

impl HabitTracker {
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let habits = load_habits(store.as_ref());
        info!(count = habits.len(), "loaded habits");
        Self { store, habits }
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn view(&self, window: &[String]) -> TableView {
        build_view(&self.habits, window)
    }

    /// Appends a habit named `name` (trimmed). Blank names are ignored.
    pub fn add(&mut self, name: &str) -> Result<Option<Habit>, StoreError> {
        self.add_at(name, Utc::now().timestamp_millis())
    }

    pub fn add_at(&mut self, name: &str, now_millis: i64) -> Result<Option<Habit>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let habit = Habit::new(self.next_id(now_millis), name);
        self.commit(|habits| habits.push(habit.clone()))?;
        info!(id = habit.id, name = %habit.name, "added habit");
        Ok(Some(habit))
    }

    /// Returns `false` when no habit has `id`.
    pub fn toggle(&mut self, id: i64, date_key: &str, completed: bool) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            warn!(id, "toggle for unknown habit");
            return Ok(false);
        };

        self.commit(|habits| {
            habits[index].history.insert(date_key.to_string(), completed);
        })?;
        info!(id, date = date_key, completed, "toggled habit");
        Ok(true)
    }

    /// Returns `false` when no habit has `id`.
    pub fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        self.commit(|habits| {
            habits.remove(index);
        })?;
        info!(id, "deleted habit");
        Ok(true)
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.habits.iter().position(|habit| habit.id == id)
    }

    // Clock-derived, but never reused within the list.
    fn next_id(&self, now_millis: i64) -> i64 {
        let candidate = match self.habits.iter().map(|habit| habit.id).max() {
            Some(max) if max >= now_millis => max.checked_add(1),
            _ => Some(now_millis),
        };
        candidate.unwrap_or_else(|| self.lowest_unused_id())
    }

    fn lowest_unused_id(&self) -> i64 {
        let used: HashSet<i64> = self.habits.iter().map(|habit| habit.id).collect();
        (0..).find(|id| !used.contains(id)).unwrap_or_default()
    }

    fn commit(&mut self, mutate: impl FnOnce(&mut Vec<Habit>)) -> Result<(), StoreError> {
        let previous = self.habits.clone();
        mutate(&mut self.habits);
        if let Err(err) = save_habits(self.store.as_mut(), &self.habits) {
            self.habits = previous;
            return Err(err);
        }
        Ok(())
    }
}
