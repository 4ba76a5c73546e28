//! Collaborator surfaces the controller writes to.

/// Single shared sink; every call replaces what was shown before.
pub trait OutputSurface {
    fn show_output(&mut self, text: &str, is_error: bool);
}

/// Enable/disable for the run and debug triggers.
pub trait BusySurface {
    fn set_controls_enabled(&mut self, enabled: bool);
}

#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Output { text: String, is_error: bool },
        Controls(bool),
    }

    /// Records every surface call in order.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: Vec<Call>,
    }

    impl RecordingSurface {
        pub fn last_output(&self) -> Option<(&str, bool)> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Output { text, is_error } => Some((text.as_str(), *is_error)),
                Call::Controls(_) => None,
            })
        }

        pub fn controls_enabled(&self) -> Option<bool> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Controls(enabled) => Some(*enabled),
                Call::Output { .. } => None,
            })
        }

        pub fn control_toggles(&self) -> Vec<bool> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Controls(enabled) => Some(*enabled),
                    Call::Output { .. } => None,
                })
                .collect()
        }
    }

    impl OutputSurface for RecordingSurface {
        fn show_output(&mut self, text: &str, is_error: bool) {
            self.calls.push(Call::Output { text: text.to_string(), is_error });
        }
    }

    impl BusySurface for RecordingSurface {
        fn set_controls_enabled(&mut self, enabled: bool) {
            self.calls.push(Call::Controls(enabled));
        }
    }
}
