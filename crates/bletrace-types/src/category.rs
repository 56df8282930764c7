//! Keyword-based device classification.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::record::UNKNOWN_NAME;

/// Coarse device category derived from the advertised name.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new categories
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum Category {
    /// Phones and other mobile handsets.
    Phone,
    /// Watches and fitness trackers.
    Wearable,
    /// Environmental and telemetry sensors.
    Sensor,
    /// Proximity beacons.
    Beacon,
    /// Headsets, earbuds, and speakers.
    Audio,
    /// Device advertised no name at all.
    Unknown,
    /// Named device matching none of the keyword sets.
    Other,
}

/// Keyword sets tested in priority order; the first match wins.
const RULES: &[(Category, &[&str])] = &[
    (Category::Phone, &["phone", "mobile", "iphone", "samsung"]),
    (Category::Wearable, &["watch", "fitbit", "garmin", "wear"]),
    (Category::Sensor, &["sensor", "temp", "humidity"]),
    (Category::Beacon, &["beacon", "ibeacon"]),
    (Category::Audio, &["headset", "earbud", "airpod"]),
];

impl Category {
    /// Classify a display name.
    ///
    /// The `"Unknown"` sentinel maps straight to [`Category::Unknown`];
    /// otherwise the name is lowercased and tested for substring membership
    /// against each keyword set in fixed priority order (Phone, Wearable,
    /// Sensor, Beacon, Audio). Names matching no set are [`Category::Other`].
    ///
    /// # Examples
    ///
    /// ```
    /// use bletrace_types::Category;
    ///
    /// assert_eq!(Category::from_name("iPhone 12"), Category::Phone);
    /// assert_eq!(Category::from_name("Fitbit Versa"), Category::Wearable);
    /// assert_eq!(Category::from_name("Unknown"), Category::Unknown);
    /// assert_eq!(Category::from_name("Laser Printer"), Category::Other);
    /// // Phone is checked before Wearable.
    /// assert_eq!(Category::from_name("iphone watch"), Category::Phone);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name == UNKNOWN_NAME {
            return Category::Unknown;
        }

        let name_lower = name.to_lowercase();
        for (category, keywords) in RULES {
            if keywords.iter().any(|k| name_lower.contains(k)) {
                return *category;
            }
        }

        Category::Other
    }

    /// All categories, in summary display order.
    #[must_use]
    pub fn all() -> &'static [Category] {
        &[
            Category::Phone,
            Category::Wearable,
            Category::Sensor,
            Category::Beacon,
            Category::Audio,
            Category::Unknown,
            Category::Other,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Phone => "Phone",
            Category::Wearable => "Wearable",
            Category::Sensor => "Sensor",
            Category::Beacon => "Beacon",
            Category::Audio => "Audio",
            Category::Unknown => "Unknown",
            Category::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sentinel() {
        assert_eq!(Category::from_name("Unknown"), Category::Unknown);
        // Only the exact sentinel maps to Unknown; anything else is matched
        // by keywords or falls through to Other.
        assert_eq!(Category::from_name("unknown"), Category::Other);
    }

    #[test]
    fn test_each_keyword_set() {
        assert_eq!(Category::from_name("Samsung Galaxy S21"), Category::Phone);
        assert_eq!(Category::from_name("Garmin Forerunner"), Category::Wearable);
        assert_eq!(Category::from_name("Temp Probe 3"), Category::Sensor);
        assert_eq!(Category::from_name("iBeacon 42"), Category::Beacon);
        assert_eq!(Category::from_name("AirPods Pro"), Category::Audio);
        assert_eq!(Category::from_name("Smart Bulb"), Category::Other);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(Category::from_name("IPHONE"), Category::Phone);
        assert_eq!(Category::from_name("FiTbIt"), Category::Wearable);
    }

    #[test]
    fn test_priority_order() {
        // Matches both Phone and Wearable sets; Phone is tested first.
        assert_eq!(Category::from_name("iphone watch"), Category::Phone);
        // Matches both Sensor and Beacon; Sensor wins.
        assert_eq!(Category::from_name("temp beacon"), Category::Sensor);
    }

    #[test]
    fn test_deterministic() {
        for _ in 0..3 {
            assert_eq!(Category::from_name("Fitbit Charge"), Category::Wearable);
        }
    }
}
