//! Duplicator property sheet
//!
//! - `target_source_name`: sources that produce async video or audio,
//!   excluding the duplicator itself
//! - `add_filter`: shown only when the selected source exists but carries no
//!   relay filter yet; attaches one and binds to it
//! - `buffered`: whether the host buffers this source's async output

use crate::constants::*;
use crate::host::{ListItem, OutputFlags, Properties, Source, SourceKind};

use super::resolve::find_relay_filter;
use super::source::DuplicatorSource;

/// Whether a source can feed a relay filter
fn is_eligible(source: &Source) -> bool {
    let flags = source.output_flags();
    source.kind() == SourceKind::Input
        && (flags.contains(OutputFlags::ASYNC_VIDEO) || flags.contains(OutputFlags::AUDIO))
}

pub(crate) fn build(dup: &DuplicatorSource) -> Properties {
    let mut props = Properties::new();

    let host = dup.host().upgrade();
    let own_id = dup.context().upgrade().map(|ctx| ctx.id());
    let selected = dup.target_name().unwrap_or_default();

    let mut items: Vec<ListItem> = host
        .as_ref()
        .map(|host| host.sources())
        .unwrap_or_default()
        .into_iter()
        .filter(|source| Some(source.id()) != own_id && is_eligible(source))
        .map(|source| {
            let name = source.name();
            ListItem {
                label: name.clone(),
                value: name,
            }
        })
        .collect();
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items.insert(
        0,
        ListItem {
            label: String::new(),
            value: String::new(),
        },
    );

    props.add_list(SETTING_TARGET_SOURCE_NAME, "Source", items);

    // Visible only when the selection resolves to a source without a relay
    let needs_filter = host
        .as_ref()
        .and_then(|host| host.get_source_by_name(&selected))
        .is_some_and(|source| find_relay_filter(&source).is_none());

    let weak = dup.self_ref();
    let target = selected.clone();
    props
        .add_button(
            PROPERTY_ADD_FILTER,
            &format!("Add {}", dup.config().filter_display_name),
            move || match weak.upgrade() {
                Some(dup) => match dup.add_relay_filter(&target) {
                    Ok(_) => true,
                    Err(err) => {
                        tracing::warn!(source = %target, error = %err, "Cannot add relay filter");
                        false
                    }
                },
                None => false,
            },
        )
        .visible = needs_filter;

    props.add_bool(SETTING_BUFFERED, "Buffered output");

    props
}
