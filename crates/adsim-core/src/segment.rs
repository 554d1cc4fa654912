//! Market segments: the `(intent, device, time-bucket, geo)` partition of demand.

use serde::{Deserialize, Serialize};

/// Coarse label for a segment's purchase readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentLevel {
    High,
    Medium,
    Low,
}

impl IntentLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLevel::High => "high",
            IntentLevel::Medium => "medium",
            IntentLevel::Low => "low",
        }
    }

    pub const ALL: [IntentLevel; 3] = [IntentLevel::High, IntentLevel::Medium, IntentLevel::Low];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Desktop,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Desktop => "desktop",
        }
    }

    pub const ALL: [DeviceType; 2] = [DeviceType::Mobile, DeviceType::Desktop];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    /// 06:00-12:00
    Morning,
    /// 12:00-18:00
    Afternoon,
    /// 18:00-24:00
    Evening,
    /// 00:00-06:00
    Night,
}

impl TimeBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBucket::Morning => "morning",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Evening => "evening",
            TimeBucket::Night => "night",
        }
    }

    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
        TimeBucket::Night,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geo {
    Primary,
    Secondary,
}

impl Geo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Geo::Primary => "primary",
            Geo::Secondary => "secondary",
        }
    }

    pub const ALL: [Geo; 2] = [Geo::Primary, Geo::Secondary];
}

/// A market segment: one cell of the `3 x 2 x 4 x 2 = 48` demand partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub intent: IntentLevel,
    pub device: DeviceType,
    pub time_bucket: TimeBucket,
    pub geo: Geo,
}

impl Segment {
    pub fn new(intent: IntentLevel, device: DeviceType, time_bucket: TimeBucket, geo: Geo) -> Self {
        Self {
            intent,
            device,
            time_bucket,
            geo,
        }
    }

    /// Stable string key for fatigue-map lookups, e.g. `"high/mobile/morning/primary"`.
    pub fn to_key(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.intent.as_str(),
            self.device.as_str(),
            self.time_bucket.as_str(),
            self.geo.as_str()
        )
    }
}

/// Enumerate all 48 segments in canonical (Cartesian-product) order.
///
/// Iteration order is intent, then device, then time bucket, then geo — this
/// order must stay fixed since it feeds the engine's reproducibility
/// guarantee (§5: segments are visited in Cartesian-product enumeration
/// order within a day).
pub fn all_segments() -> Vec<Segment> {
    let mut segments = Vec::with_capacity(48);
    for intent in IntentLevel::ALL {
        for device in DeviceType::ALL {
            for time_bucket in TimeBucket::ALL {
                for geo in Geo::ALL {
                    segments.push(Segment::new(intent, device, time_bucket, geo));
                }
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_segments_has_48_unique_entries() {
        let segments = all_segments();
        assert_eq!(segments.len(), 48);
        let keys: std::collections::HashSet<String> = segments.iter().map(Segment::to_key).collect();
        assert_eq!(keys.len(), 48);
    }

    #[test]
    fn segment_key_is_stable() {
        let s = Segment::new(IntentLevel::High, DeviceType::Mobile, TimeBucket::Morning, Geo::Primary);
        assert_eq!(s.to_key(), "high/mobile/morning/primary");
    }
}
