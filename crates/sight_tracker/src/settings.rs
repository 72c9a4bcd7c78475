use serde::{Deserialize, Serialize};

/// Tracker configuration, persisted by the surrounding module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Capacity multiplier applied when a packed buffer grows.
    pub growth_factor: usize,
    /// Compact the shared buffers after every removal instead of leaving
    /// holes for slot reuse.
    pub compact_on_remove: bool,
    /// Track placeables the host marks hidden.
    pub track_hidden: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            growth_factor: 2,
            compact_on_remove: false,
            track_hidden: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let settings = TrackerSettings::default();
        assert_eq!(settings.growth_factor, 2);
        assert!(!settings.compact_on_remove);
        assert!(!settings.track_hidden);
    }
}
