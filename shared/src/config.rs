use std::default::Default;

/// Contains Config properties which govern how an Entity replicates its
/// property changes
#[derive(Clone, Debug)]
pub struct ReplicationConfig {
    /// Largest encoded client update, in bytes, that will be sent for a
    /// single property change. Larger updates are dropped with a warning.
    pub max_client_message_bytes: usize,
    /// Client indices below this value have a dedicated message kind, so a
    /// whole-property change to them is sent as a bare value with no path.
    pub direct_property_message_count: usize,
    /// Deepest change path an Entity will replicate. Cannot usefully exceed
    /// 255, the most the uncompressed format can carry.
    pub max_change_path_depth: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            max_client_message_bytes: 4096,
            direct_property_message_count: 61,
            max_change_path_depth: u8::MAX as usize,
        }
    }
}
