//! Name-to-filter resolution
//!
//! Duplicators are configured with the human-readable name of a source, not
//! a stable identity. Resolution looks the name up in the host graph and
//! returns the first relay filter attached to that source. A source carrying
//! more than one relay filter is not disambiguated: the first in chain order
//! wins.

use crate::constants::FILTER_ID;
use crate::host::{Host, Source, SourceRef};

/// First relay filter attached to `source`
pub fn find_relay_filter(source: &Source) -> Option<SourceRef> {
    source
        .filters()
        .into_iter()
        .find(|filter| filter.type_id() == FILTER_ID)
}

/// Resolve a source name to its relay filter
///
/// Returns `None` if the name is empty, no source has that name, or the
/// source carries no relay filter.
pub fn resolve_relay_filter(host: &Host, name: &str) -> Option<SourceRef> {
    if name.is_empty() {
        return None;
    }

    let source = host.get_source_by_name(name)?;
    let filter = find_relay_filter(&source);

    match &filter {
        Some(filter) => tracing::info!(
            source = %name,
            filter = %filter.name(),
            "Found relay filter"
        ),
        None => tracing::info!(source = %name, "No relay filter on source"),
    }

    filter
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::Arc;

    use super::*;
    use crate::host::{OutputFlags, Settings, SourceImpl, SourceInfo, SourceKind};
    use crate::relay::RelayFilter;

    struct Plain;

    impl SourceImpl for Plain {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn host() -> Host {
        let host = Host::new();
        host.register_source_type(SourceInfo::new(
            "plain",
            SourceKind::Input,
            OutputFlags::ASYNC_VIDEO,
            |_, _| Arc::new(Plain),
        ));
        host.register_source_type(SourceInfo::new(
            "plain_filter",
            SourceKind::Filter,
            OutputFlags::ASYNC_VIDEO,
            |_, _| Arc::new(Plain),
        ));
        host.register_source_type(SourceInfo::new(
            FILTER_ID,
            SourceKind::Filter,
            OutputFlags::ASYNC_VIDEO | OutputFlags::AUDIO,
            |settings, ctx| RelayFilter::create(settings, ctx),
        ));
        host
    }

    #[test]
    fn test_unresolvable_names() {
        let host = host();
        host.create_source("plain", "Camera", &Settings::new())
            .unwrap();

        assert!(resolve_relay_filter(&host, "").is_none());
        assert!(resolve_relay_filter(&host, "Missing").is_none());
        // Source exists but has no relay filter
        assert!(resolve_relay_filter(&host, "Camera").is_none());
    }

    #[test]
    fn test_skips_other_filters() {
        let host = host();
        let camera = host
            .create_source("plain", "Camera", &Settings::new())
            .unwrap();
        let other = host
            .create_filter("plain_filter", "Color", &Settings::new())
            .unwrap();
        let relay = host
            .create_filter(FILTER_ID, "Relay", &Settings::new())
            .unwrap();
        camera.add_filter(other).unwrap();
        camera.add_filter(Arc::clone(&relay)).unwrap();

        let found = resolve_relay_filter(&host, "Camera").unwrap();
        assert_eq!(found.id(), relay.id());
    }

    #[test]
    fn test_first_match_wins() {
        let host = host();
        let camera = host
            .create_source("plain", "Camera", &Settings::new())
            .unwrap();
        let first = host
            .create_filter(FILTER_ID, "Relay", &Settings::new())
            .unwrap();
        let second = host
            .create_filter(FILTER_ID, "Relay 2", &Settings::new())
            .unwrap();
        camera.add_filter(Arc::clone(&first)).unwrap();
        camera.add_filter(second).unwrap();

        let found = find_relay_filter(&camera).unwrap();
        assert_eq!(found.id(), first.id());
    }
}
