//! Weather Today: a terminal chat client for weather questions.

pub mod core;
pub mod platform;
pub mod transport;
pub mod tui;

#[cfg(test)]
pub mod test_support;
