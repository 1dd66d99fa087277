use crate::dates::{date_key, last_n_days, parse_date_key, WINDOW_DAYS};
use crate::errors::AppError;
use crate::models::{Habit, NewHabitRequest, ToggleRequest, ViewResponse};
use crate::state::AppState;
use crate::tracker::HabitTracker;
use crate::ui::{render_index, render_table};
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Datelike, Local};
use std::sync::Arc;
use tokio::task;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let tracker = state.tracker.lock().await;
    let view = tracker.view(&last_n_days(WINDOW_DAYS));
    Html(render_index(&view, Local::now().year()))
}

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<Habit>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.habits().to_vec())
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let tracker = state.tracker.lock().await;
    Json(to_response(&tracker))
}

pub async fn add_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabitRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    let response = mutate(&state, move |tracker| {
        tracker.add(&payload.name)?;
        Ok(to_response(tracker))
    })
    .await?;
    Ok(Json(response))
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    let Some(date) = parse_date_key(&payload.date) else {
        return Err(AppError::bad_request("date must be formatted as YYYY-MM-DD"));
    };
    // "2024-7-1" parses too; history keys are always the zero-padded form
    let key = date_key(date);

    let response = mutate(&state, move |tracker| {
        tracker.toggle(id, &key, payload.completed)?;
        Ok(to_response(tracker))
    })
    .await?;
    Ok(Json(response))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ViewResponse>, AppError> {
    let response = mutate(&state, move |tracker| {
        tracker.delete(id)?;
        Ok(to_response(tracker))
    })
    .await?;
    Ok(Json(response))
}

pub async fn add_form(
    State(state): State<AppState>,
    Form(payload): Form<NewHabitRequest>,
) -> Result<Redirect, AppError> {
    mutate(&state, move |tracker| {
        tracker.add(&payload.name)?;
        Ok(())
    })
    .await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    mutate(&state, move |tracker| {
        tracker.delete(id)?;
        Ok(())
    })
    .await?;
    Ok(Redirect::to("/"))
}

/// Runs a mutation on the blocking pool, since saving writes to the store
/// synchronously. The lock is held until the mutation and its render finish.
async fn mutate<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&mut HabitTracker) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    let mut tracker = Arc::clone(&state.tracker).lock_owned().await;
    task::spawn_blocking(move || f(&mut tracker))
        .await
        .map_err(AppError::internal)?
}

// The window is recomputed per response so a midnight rollover shows up on the next request.
fn to_response(tracker: &HabitTracker) -> ViewResponse {
    let view = tracker.view(&last_n_days(WINDOW_DAYS));
    ViewResponse {
        table_html: render_table(&view),
        view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use axum::http::StatusCode;
    use chrono::Duration;

    fn state_with(store: MemoryStore) -> AppState {
        AppState::new(HabitTracker::open(Box::new(store)))
    }

    async fn add(state: &AppState, name: &str) -> i64 {
        let Json(response) = add_habit(
            State(state.clone()),
            Json(NewHabitRequest {
                name: name.to_string(),
            }),
        )
        .await
        .unwrap();
        response.view.rows.last().unwrap().id
    }

    async fn toggle(state: &AppState, id: i64, date: &str) -> Result<Json<ViewResponse>, AppError> {
        toggle_habit(
            State(state.clone()),
            Path(id),
            Json(ToggleRequest {
                date: date.to_string(),
                completed: true,
            }),
        )
        .await
    }

    #[tokio::test]
    async fn toggle_stores_zero_padded_key() {
        let state = state_with(MemoryStore::new());
        let id = add(&state, "Read").await;

        toggle(&state, id, "2024-7-1").await.unwrap();

        let tracker = state.tracker.lock().await;
        let history = &tracker.habits()[0].history;
        assert_eq!(history.get("2024-07-01"), Some(&true));
        assert!(!history.contains_key("2024-7-1"));
    }

    #[tokio::test]
    async fn toggle_unpadded_today_is_rendered_checked() {
        let state = state_with(MemoryStore::new());
        let id = add(&state, "Read").await;
        let today = Local::now().date_naive();
        let unpadded = format!("{}-{}-{}", today.year(), today.month(), today.day());

        let Json(response) = toggle(&state, id, &unpadded).await.unwrap();
        let row = &response.view.rows[0];
        // a midnight rollover between the two clock reads leaves today at index 5
        let checked = row.days.iter().filter(|day| day.completed).count();
        assert_eq!(checked, 1);
        assert_eq!(row.progress.completed, 1);
        let rendered_today = parse_date_key(&row.days[6].date).unwrap();
        assert!(rendered_today == today || rendered_today - Duration::days(1) == today);
    }

    #[tokio::test]
    async fn toggle_malformed_date_is_bad_request() {
        let state = state_with(MemoryStore::new());
        let id = add(&state, "Read").await;

        let err = toggle(&state, id, "yesterday").await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(state.tracker.lock().await.habits()[0].history.is_empty());
    }

    #[tokio::test]
    async fn failed_save_is_internal_error_and_list_unchanged() {
        let state = state_with(MemoryStore::with_quota(100));
        let id = add(&state, "Read").await;
        let before = state.tracker.lock().await.habits().to_vec();

        let err = add_habit(
            State(state.clone()),
            Json(NewHabitRequest {
                name: "x".repeat(200),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message.contains("quota"));
        assert_eq!(state.tracker.lock().await.habits(), before);

        let mut failures = 0;
        for day in 1..=9 {
            if let Err(err) = toggle(&state, id, &format!("2024-07-0{day}")).await {
                assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
                failures += 1;
            }
        }
        assert!(failures > 0);
        let tracker = state.tracker.lock().await;
        assert!(tracker.habits()[0].history.len() < 9);
    }
}
