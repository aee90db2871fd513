/// Mutable per-device state owned by the hosting entity.
///
/// The enabled flag is the only state the conversion depends on, and the only
/// state that must survive moving an entity between loaded and unloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RuntimeState {
    is_enabled: bool,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RuntimeState {
    pub fn new(is_enabled: bool) -> Self {
        Self { is_enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn enable(&mut self) {
        self.is_enabled = true;
    }

    pub fn disable(&mut self) {
        self.is_enabled = false;
    }

    /// Flip the flag and return the new value.
    pub fn toggle(&mut self) -> bool {
        self.is_enabled = !self.is_enabled;
        self.is_enabled
    }

    /// Status shown while editing a design, before any simulation.
    pub fn editor_status(&self) -> &'static str {
        if self.is_enabled { "Active" } else { "Disabled" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_enabled() {
        assert!(RuntimeState::default().is_enabled());
    }

    #[test]
    fn enable_disable_are_idempotent() {
        let mut state = RuntimeState::new(false);
        state.enable();
        state.enable();
        assert!(state.is_enabled());
        state.disable();
        state.disable();
        assert!(!state.is_enabled());
    }

    #[test]
    fn toggle_flips_and_reports() {
        let mut state = RuntimeState::new(true);
        assert!(!state.toggle());
        assert_eq!(state.editor_status(), "Disabled");
        assert!(state.toggle());
        assert_eq!(state.editor_status(), "Active");
    }
}
