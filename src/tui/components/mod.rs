//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: app name, request status, copy confirmation
//! - `Bubble`: one message; also the source of its height and click targets
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `Transcript`: virtualized, scrollable conversation with a layout cache
//! - `Suggestions`: chip row shown on an empty chat
//! - `InputBar`: draft editor with the Ok / Stop button
//!
//! Stateful components are split in two: a persistent `*State` kept in
//! `TuiState` that handles events, and a transient wrapper built each frame
//! that borrows it together with its props.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── bubble.rs
//! ├── transcript.rs
//! ├── suggestions.rs
//! └── input_bar/      (editor + editing helpers)
//! ```

pub mod bubble;
pub mod input_bar;
pub mod suggestions;
mod title_bar;
pub mod transcript;

pub use bubble::Target;
pub use input_bar::{InputBar, InputEvent};
pub use suggestions::{SuggestionEvent, Suggestions, SuggestionsState};
pub use title_bar::TitleBar;
pub use transcript::{Transcript, TranscriptState};
