//! Haptic feedback, the terminal way: a success notification rings the bell,
//! a soft impact has no terminal counterpart and is only logged.

use std::io::Write;

use log::{debug, warn};

use crate::core::action::HapticKind;

/// Best-effort feedback sink. Failures are logged, never returned.
pub trait Haptics: Send + Sync {
    fn notify(&self, kind: HapticKind);
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalBell {
    enabled: bool,
}

impl TerminalBell {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Bytes written to the terminal for `kind`.
    pub fn sequence(&self, kind: HapticKind) -> &'static [u8] {
        match (self.enabled, kind) {
            (true, HapticKind::Success) => b"\x07",
            _ => b"",
        }
    }
}

impl Haptics for TerminalBell {
    fn notify(&self, kind: HapticKind) {
        debug!("Haptic {:?}", kind);
        let bytes = self.sequence(kind);
        if bytes.is_empty() {
            return;
        }
        let mut stdout = std::io::stdout();
        if let Err(e) = stdout.write_all(bytes).and_then(|()| stdout.flush()) {
            warn!("Failed to ring terminal bell: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rings_bell() {
        assert_eq!(TerminalBell::new(true).sequence(HapticKind::Success), b"\x07");
    }

    #[test]
    fn test_soft_impact_is_silent() {
        assert!(TerminalBell::new(true).sequence(HapticKind::SoftImpact).is_empty());
    }

    #[test]
    fn test_disabled_bell_is_silent() {
        assert!(TerminalBell::new(false).sequence(HapticKind::Success).is_empty());
    }
}
