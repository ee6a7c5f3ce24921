//! Editor state for the slide document model: documented operations over a
//! single live presentation, snapshot history, and debounced re-synthesis.

pub mod history;
pub mod resynth;
pub mod state;

pub use history::History;
pub use resynth::ResynthDebounce;
pub use state::EditorState;
