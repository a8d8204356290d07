//! Duplicator configuration

use std::time::Duration;

/// Default interval between name-to-filter reconciliation checks
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(3);

/// Configuration shared by all duplicator sources of one registration
#[derive(Debug, Clone)]
pub struct DuplicatorConfig {
    /// How often a duplicator re-resolves its target name
    pub reconcile_interval: Duration,

    /// Display name of the relay filter type, also the base name of
    /// filters added from the property sheet
    pub filter_display_name: String,

    /// Display name of the duplicator source type
    pub source_display_name: String,
}

impl Default for DuplicatorConfig {
    fn default() -> Self {
        Self {
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            filter_display_name: "Asynchronous Source Duplication Filter".to_string(),
            source_display_name: "Asynchronous Source Duplicator".to_string(),
        }
    }
}

impl DuplicatorConfig {
    /// Set the reconciliation interval
    pub fn reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = interval;
        self
    }

    /// Set the relay filter display name
    pub fn filter_display_name(mut self, name: impl Into<String>) -> Self {
        self.filter_display_name = name.into();
        self
    }

    /// Set the duplicator source display name
    pub fn source_display_name(mut self, name: impl Into<String>) -> Self {
        self.source_display_name = name.into();
        self
    }

    /// Reconciliation interval in seconds, as counted down by `video_tick`
    pub(crate) fn reconcile_seconds(&self) -> f32 {
        self.reconcile_interval.as_secs_f32()
    }
}
