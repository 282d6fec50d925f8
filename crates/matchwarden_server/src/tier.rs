//! Skill tiers used to pair compatible players.

use serde::{Deserialize, Serialize};

/// Upper bound (inclusive) of the low tier.
pub const LOW_TIER_MAX: u8 = 30;
/// Upper bound (inclusive) of the mid tier.
pub const MID_TIER_MAX: u8 = 60;

/// Coarse skill bucket. Two players are compatible iff they share a tier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    /// Rating `0..=30`.
    Low,
    /// Rating `31..=60`.
    Mid,
    /// Rating above 60.
    High,
}

impl Tier {
    /// Buckets a 0-100 rating. Anything above 100 is still `High`.
    pub fn of(rating: u8) -> Self {
        if rating <= LOW_TIER_MAX {
            Tier::Low
        } else if rating <= MID_TIER_MAX {
            Tier::Mid
        } else {
            Tier::High
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(Tier::of(0), Tier::Low);
        assert_eq!(Tier::of(30), Tier::Low);
        assert_eq!(Tier::of(31), Tier::Mid);
        assert_eq!(Tier::of(60), Tier::Mid);
        assert_eq!(Tier::of(61), Tier::High);
        assert_eq!(Tier::of(100), Tier::High);
        assert_eq!(Tier::of(u8::MAX), Tier::High);
    }

    #[test]
    fn test_display_is_lowercase() {
        assert_eq!(Tier::Mid.to_string(), "mid");
    }

    #[test]
    fn test_every_tier_is_reachable() {
        let reached: Vec<Tier> = [0, LOW_TIER_MAX + 1, MID_TIER_MAX + 1].map(Tier::of).to_vec();
        assert_eq!(reached, Tier::iter().collect::<Vec<_>>());
    }
}
