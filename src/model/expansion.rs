use std::collections::HashMap;

/// Which phases are open and which items show their details. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
    phases: HashMap<String, bool>,
    items: HashMap<String, bool>,
}

impl ExpansionState {
    /// Starts with only `designated` open.
    pub fn new(designated: Option<&str>) -> Self {
        let mut phases = HashMap::new();
        if let Some(id) = designated {
            phases.insert(id.to_string(), true);
        }
        Self {
            phases,
            items: HashMap::new(),
        }
    }

    /// Flips a phase and returns `true` when it went from closed to open.
    pub fn toggle_phase(&mut self, phase_id: &str) -> bool {
        let open = self.phases.entry(phase_id.to_string()).or_insert(false);
        *open = !*open;
        *open
    }

    pub fn toggle_item(&mut self, item_id: &str) {
        let open = self.items.entry(item_id.to_string()).or_insert(false);
        *open = !*open;
    }

    pub fn phase_open(&self, phase_id: &str) -> bool {
        self.phases.get(phase_id).copied().unwrap_or(false)
    }

    pub fn item_open(&self, item_id: &str) -> bool {
        self.items.get(item_id).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_designated_phase_starts_open() {
        let state = ExpansionState::new(Some("phase-1"));
        assert!(state.phase_open("phase-1"));
        assert!(!state.phase_open("phase-2"));
        assert!(!state.item_open("wo-1"));
    }

    #[test]
    fn toggle_phase_reports_opening_transition() {
        let mut state = ExpansionState::new(Some("phase-1"));
        assert!(!state.toggle_phase("phase-1"));
        assert!(state.toggle_phase("phase-1"));
        assert!(state.toggle_phase("phase-2"));
        assert!(state.phase_open("phase-2"));
    }

    #[test]
    fn item_details_toggle_independently() {
        let mut state = ExpansionState::new(None);
        state.toggle_item("wo-1");
        assert!(state.item_open("wo-1"));
        assert!(!state.item_open("wo-2"));
        state.toggle_item("wo-1");
        assert!(!state.item_open("wo-1"));
    }
}
