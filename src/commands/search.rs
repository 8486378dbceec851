use crate::db::AppState;
use crate::models::Exercise;
use crate::search::{InputOutcome, SearchView};
use std::sync::Arc;
use tauri::State;

/// Feed the search input's current text. Results arrive as
/// `search://updated` events once the quiet period has passed.
#[tauri::command]
pub async fn search_input(state: State<'_, Arc<AppState>>, text: String) -> Result<InputOutcome, String> {
  Ok(state.search.input(&text))
}

#[tauri::command]
pub fn search_view(state: State<'_, Arc<AppState>>) -> SearchView {
  state.search.view()
}

#[tauri::command]
pub fn search_load_more(state: State<'_, Arc<AppState>>) -> SearchView {
  state.search.load_more()
}

/// Pick a visible row; also emitted as `search://selected`
#[tauri::command]
pub fn search_select(state: State<'_, Arc<AppState>>, index: usize) -> Option<Exercise> {
  state.search.select(index)
}

#[tauri::command]
pub fn search_clear(state: State<'_, Arc<AppState>>) {
  state.search.clear()
}
