//! # Core Application Logic
//!
//! Business logic of the weather chat. It knows nothing about any specific
//! UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Vec<Effect>
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │ Transport  │      │  Platform  │
//!     │  Adapter   │      │ (session)  │      │ clipboard, │
//!     │ (ratatui)  │      │            │      │  haptics   │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`units`]: Fahrenheit / Celsius conversion
//! - [`temperature`]: the per-message unit toggle
//! - [`feedback`]: copy / like / dislike acknowledgement state
//! - [`view_state`]: per-message view state keyed by message id
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`config`]: settings with defaults → file → env → CLI overrides

pub mod action;
pub mod config;
pub mod feedback;
pub mod state;
pub mod temperature;
pub mod units;
pub mod view_state;
