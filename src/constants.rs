//! Identifiers shared between the relay filter and duplicator sources

/// Prefix of both registered type ids
pub const ID_PREFIX: &str = "srcdup_";

/// Type id of the relay filter
pub const FILTER_ID: &str = "srcdup_filter";

/// Type id of the duplicator source
pub const SOURCE_ID: &str = "srcdup_source";

/// Signal carrying a `CallData::Frame`
pub const SIGNAL_OUTPUT_VIDEO: &str = "output_video";

/// Signal carrying a `CallData::Audio`
pub const SIGNAL_OUTPUT_AUDIO: &str = "output_audio";

/// Lifecycle procedures exposed by the relay filter
pub const PROC_INC_SHOWING: &str = "inc_showing";
pub const PROC_DEC_SHOWING: &str = "dec_showing";
pub const PROC_INC_ACTIVE: &str = "inc_active";
pub const PROC_DEC_ACTIVE: &str = "dec_active";

/// Settings key of the target source name
pub const SETTING_TARGET_SOURCE_NAME: &str = "target_source_name";

/// Settings key of the buffering toggle
pub const SETTING_BUFFERED: &str = "buffered";

/// Property key of the "add relay filter" button
pub const PROPERTY_ADD_FILTER: &str = "add_filter";
