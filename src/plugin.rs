//! Plugin registration
//!
//! Registers both source types with a host. Call once per host, before any
//! source of these types is created.

use crate::constants::{FILTER_ID, SOURCE_ID};
use crate::duplicator::{DuplicatorConfig, DuplicatorSource};
use crate::host::{Host, OutputFlags, SourceInfo, SourceKind};
use crate::relay::RelayFilter;

/// Output capabilities shared by the filter and the duplicator
pub const OUTPUT_FLAGS: OutputFlags = OutputFlags::ASYNC_VIDEO.union(OutputFlags::AUDIO);

/// Register the relay filter and duplicator source types
pub fn register(host: &Host, config: DuplicatorConfig) {
    host.register_source_type(
        SourceInfo::new(FILTER_ID, SourceKind::Filter, OUTPUT_FLAGS, |settings, ctx| {
            RelayFilter::create(settings, ctx)
        })
        .display_name(config.filter_display_name.clone()),
    );

    let display_name = config.source_display_name.clone();
    host.register_source_type(
        SourceInfo::new(SOURCE_ID, SourceKind::Input, OUTPUT_FLAGS, move |settings, ctx| {
            DuplicatorSource::create(settings, ctx, config.clone())
        })
        .display_name(display_name)
        .defaults(DuplicatorSource::defaults),
    );

    tracing::info!(filter = FILTER_ID, source = SOURCE_ID, "Duplication plugin registered");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::host::Settings;

    #[test]
    fn test_register() {
        let host = Host::new();
        register(&host, DuplicatorConfig::default().filter_display_name("Relay"));

        let filter = host.source_type(FILTER_ID).unwrap();
        assert_eq!(filter.kind, SourceKind::Filter);
        assert_eq!(filter.display_name, "Relay");
        assert!(filter.output_flags.contains(OutputFlags::ASYNC_VIDEO));
        assert!(filter.output_flags.contains(OutputFlags::AUDIO));

        let source = host.source_type(SOURCE_ID).unwrap();
        assert_eq!(source.kind, SourceKind::Input);
        assert_eq!(source.display_name, "Asynchronous Source Duplicator");
        assert!(source.get_defaults.is_some());
    }

    #[test]
    fn test_registered_defaults() {
        let host = Host::new();
        register(&host, DuplicatorConfig::default());

        let source = host
            .create_source(SOURCE_ID, "Mirror", &Settings::new())
            .unwrap();
        let settings = source.settings();
        assert_eq!(settings.get_string(SETTING_TARGET_SOURCE_NAME), "");
        assert!(settings.get_bool(SETTING_BUFFERED));
        assert!(!source.async_unbuffered());

        // Filter type cannot be created as an input and vice versa
        assert!(host
            .create_source(FILTER_ID, "Relay", &Settings::new())
            .is_err());
        assert!(host
            .create_filter(SOURCE_ID, "Mirror 2", &Settings::new())
            .is_err());
    }
}
