//! Plant growth stages and their environmental profiles.
//!
//! Each stage carries the band of conditions the room should hold: VPD
//! range, temperature range, humidity range, and the light voltage window,
//! plus baseline speeds for exhaust and light intensity that the target
//! calculator starts from.  The tables are horticultural constants, not
//! tunables; runtime adjustment happens downstream in the predictive
//! controller.

use serde::{Deserialize, Serialize};

/// Growth stage of the plants in the controlled room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlantStage {
    Germination = 0,
    Clones = 1,
    EarlyVeg = 2,
    MidVeg = 3,
    #[default]
    LateVeg = 4,
    EarlyFlower = 5,
    MidFlower = 6,
    LateFlower = 7,
}

/// Static environmental band for one growth stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageProfile {
    /// Acceptable vapour-pressure-deficit window (kPa).
    pub vpd_range: (f32, f32),
    /// Acceptable tent temperature window (degrees C).
    pub temp_range: (f32, f32),
    /// Acceptable tent relative humidity window (percent).
    pub humidity_range: (f32, f32),
    /// Light voltage window (0-100).
    pub light_range: (u8, u8),
}

impl StageProfile {
    /// Midpoint of the temperature window.
    pub fn temp_midpoint(&self) -> f32 {
        (self.temp_range.0 + self.temp_range.1) / 2.0
    }

    /// Midpoint of the humidity window.
    pub fn humidity_midpoint(&self) -> f32 {
        (self.humidity_range.0 + self.humidity_range.1) / 2.0
    }

    /// Midpoint of the VPD window — the per-stage VPD target.
    pub fn vpd_target(&self) -> f32 {
        (self.vpd_range.0 + self.vpd_range.1) / 2.0
    }
}

impl PlantStage {
    /// Total number of stages.
    pub const COUNT: usize = 8;

    /// All stages in chronological order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Germination,
        Self::Clones,
        Self::EarlyVeg,
        Self::MidVeg,
        Self::LateVeg,
        Self::EarlyFlower,
        Self::MidFlower,
        Self::LateFlower,
    ];

    /// Environmental band for this stage.
    pub const fn profile(self) -> StageProfile {
        match self {
            Self::Germination => StageProfile {
                vpd_range: (0.35, 0.70),
                temp_range: (20.0, 24.0),
                humidity_range: (78.0, 85.0),
                light_range: (20, 25),
            },
            Self::Clones => StageProfile {
                vpd_range: (0.40, 0.85),
                temp_range: (20.0, 24.0),
                humidity_range: (72.0, 80.0),
                light_range: (20, 25),
            },
            Self::EarlyVeg => StageProfile {
                vpd_range: (0.60, 1.20),
                temp_range: (22.0, 26.0),
                humidity_range: (65.0, 75.0),
                light_range: (25, 35),
            },
            Self::MidVeg => StageProfile {
                vpd_range: (0.75, 1.45),
                temp_range: (23.0, 27.0),
                humidity_range: (60.0, 72.0),
                light_range: (35, 45),
            },
            Self::LateVeg => StageProfile {
                vpd_range: (0.90, 1.65),
                temp_range: (24.0, 27.0),
                humidity_range: (55.0, 68.0),
                light_range: (45, 55),
            },
            Self::EarlyFlower => StageProfile {
                vpd_range: (0.80, 1.55),
                temp_range: (22.0, 26.0),
                humidity_range: (55.0, 68.0),
                light_range: (70, 100),
            },
            Self::MidFlower => StageProfile {
                vpd_range: (0.90, 1.70),
                temp_range: (21.0, 25.0),
                humidity_range: (48.0, 62.0),
                light_range: (70, 100),
            },
            Self::LateFlower => StageProfile {
                vpd_range: (0.90, 1.85),
                temp_range: (19.0, 24.0),
                humidity_range: (42.0, 58.0),
                light_range: (70, 100),
            },
        }
    }

    /// Baseline exhaust speed for this stage (percent).
    pub const fn exhaust_baseline(self) -> f32 {
        match self {
            Self::Germination => 15.0,
            Self::Clones => 20.0,
            Self::EarlyVeg => 30.0,
            Self::MidVeg => 45.0,
            Self::LateVeg => 55.0,
            Self::EarlyFlower => 60.0,
            Self::MidFlower => 70.0,
            Self::LateFlower => 75.0,
        }
    }

    /// Baseline light intensity for this stage (percent).
    pub const fn light_baseline(self) -> f32 {
        match self {
            Self::Germination => 25.0,
            Self::Clones => 35.0,
            Self::EarlyVeg => 50.0,
            Self::MidVeg => 65.0,
            Self::LateVeg => 80.0,
            Self::EarlyFlower => 85.0,
            Self::MidFlower | Self::LateFlower => 95.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_profiles_are_well_formed() {
        for stage in PlantStage::ALL {
            let p = stage.profile();
            assert!(p.vpd_range.0 < p.vpd_range.1, "{stage:?} vpd");
            assert!(p.temp_range.0 < p.temp_range.1, "{stage:?} temp");
            assert!(p.humidity_range.0 < p.humidity_range.1, "{stage:?} hum");
            assert!(p.light_range.0 < p.light_range.1, "{stage:?} light");
            assert!(p.light_range.1 <= 100, "{stage:?} light max");
        }
    }

    #[test]
    fn baselines_inside_operating_ranges() {
        for stage in PlantStage::ALL {
            let ex = stage.exhaust_baseline();
            assert!((10.0..=100.0).contains(&ex), "{stage:?} exhaust");
            let li = stage.light_baseline();
            assert!((0.0..=100.0).contains(&li), "{stage:?} light");
        }
    }

    #[test]
    fn humidity_decreases_towards_flower() {
        let germ = PlantStage::Germination.profile().humidity_midpoint();
        let late = PlantStage::LateFlower.profile().humidity_midpoint();
        assert!(germ > late);
    }

    #[test]
    fn exhaust_baseline_monotonic_over_lifecycle() {
        let mut prev = 0.0;
        for stage in PlantStage::ALL {
            let ex = stage.exhaust_baseline();
            assert!(ex >= prev, "{stage:?} regressed");
            prev = ex;
        }
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&PlantStage::MidFlower).unwrap();
        let back: PlantStage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PlantStage::MidFlower);
    }
}
