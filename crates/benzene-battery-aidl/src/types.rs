//! Enums and parcelables of the `vendor.benzeneos.battery` package
//!
//! Every enum is backed by an `i32` and is open: a value without a named
//! constant is carried unchanged instead of being rejected, so a client built
//! against an older schema can still relay values added later.

use crate::parcel::{Parcel, ParcelReader, Parcelable};
use crate::status::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! backed_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$cmeta:meta])* $constant:ident = $value:expr, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            $( $(#[$cmeta])* pub const $constant: Self = Self($value); )+

            /// Named constants in declaration order
            pub const CONSTANTS: &'static [(&'static str, Self)] =
                &[ $( (stringify!($constant), Self::$constant), )+ ];

            /// Get the constant name for this value, if it has one
            pub fn name(self) -> Option<&'static str> {
                Self::CONSTANTS
                    .iter()
                    .find(|(_, c)| *c == self)
                    .map(|(n, _)| *n)
            }

            /// Look up a constant by name
            pub fn from_name(name: &str) -> Option<Self> {
                Self::CONSTANTS
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, c)| *c)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.name() {
                    Some(n) => write!(f, "{}::{}", stringify!($name), n),
                    None => write!(f, "{}({})", stringify!($name), self.0),
                }
            }
        }

        impl From<i32> for $name {
            fn from(v: i32) -> Self {
                Self(v)
            }
        }

        impl From<$name> for i32 {
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl Parcelable for $name {
            fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
                parcel.write_i32(self.0);
                Ok(())
            }

            fn read_from_parcel(reader: &mut ParcelReader<'_>) -> Result<Self> {
                reader.read_i32().map(Self)
            }
        }
    };
}

backed_enum! {
    /// Charging behavior mode
    ChargingPolicy {
        DEFAULT = 1,
        /// Hold the battery between the configured charge limits
        LONGLIFE = 2,
        /// Defer full charge to the configured deadline
        ADAPTIVE = 3,
        /// Long-life with user-chosen limits
        CUSTOM = 4,
    }
}

backed_enum! {
    /// Independently toggleable battery subsystem
    Feature {
        TEMP_DEFEND = 0,
        TRICKLE_DEFEND = 1,
        DWELL_DEFEND = 2,
        DOCK_DEFEND = 3,
        CHARGE_DEADLINE = 4,
        WIRELESS = 5,
        CPM = 6,
        AACR = 7,
        HEALTH = 8,
        CSI_STATS = 9,
        FW_UPDATE = 11,
        CHARGE_LIMIT = 12,
        FG_CYCLE = 13,
        AAFV = 14,
        AACT = 15,
        AACP = 16,
        WLC_FW = 17,
        QI22 = 18,
        AACC = 19,
    }
}

backed_enum! {
    /// Battery defender mechanism to clear
    DefenderType {
        ALL = 0,
        TEMP = 1,
        TRICKLE = 2,
        DWELL = 3,
        DOCK = 4,
    }
}

backed_enum! {
    ChargingStatus {
        UNKNOWN = -1,
    }
}

backed_enum! {
    ChargingType {
        UNKNOWN = -1,
    }
}

backed_enum! {
    /// Algorithm that produced a [`HealthStats`] record
    HealthAlgo {
        UNKNOWN = 0,
        GOOGLE = 1,
        MAXIM = 2,
    }
}

backed_enum! {
    HealthStatus {
        UNKNOWN = 0,
    }
}

backed_enum! {
    /// Scheduled calibration cycle control
    CalibrationMode {
        DISABLED = 0,
        ENABLED = 1,
        FORCED = 2,
    }
}

backed_enum! {
    CalibrationState {
        UNKNOWN = 0,
    }
}

backed_enum! {
    /// Dock defend status
    ///
    /// Negative values mean the feature is unavailable or failed; the numeric
    /// order is meaningful and comparisons follow it.
    DockDefendStatus {
        DISABLED = -2,
        ERROR = -1,
        INACTIVE = 0,
        ACTIVE = 1,
    }
}

impl DockDefendStatus {
    /// Whether dock defend is available on this device
    pub fn is_operational(self) -> bool {
        self.0 >= 0
    }
}

/// Current adaptive charging stage and its deadline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargingStage {
    pub stage: String,
    pub deadline: i32,
}

impl ChargingStage {
    /// Field names and wire types in order
    pub const FIELDS: &'static [(&'static str, &'static str)] =
        &[("stage", "String"), ("deadline", "int")];
}

impl Parcelable for ChargingStage {
    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_sized(|p| {
            p.write(&self.stage)?;
            p.write(&self.deadline)
        })
    }

    fn read_from_parcel(reader: &mut ParcelReader<'_>) -> Result<Self> {
        reader.read_sized(|r| {
            Ok(Self {
                stage: r.read_field()?,
                deadline: r.read_field()?,
            })
        })
    }
}

/// Battery health snapshot tagged with the algorithm that computed it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStats {
    /// [`HealthAlgo`] value
    pub algo: i32,
    pub health_index: i32,
    pub capacity_fcc: i32,
    pub capacity_raw: i32,
    pub capacity_design: i32,
    pub impedance_raw: i32,
    pub impedance_avg: i32,
    pub impedance_design: i32,
    pub cycle_count: i32,
    pub cycle_count_design: i32,
    pub temp_bucket: i32,
}

impl HealthStats {
    /// Field names and wire types in order
    pub const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("algo", "int"),
        ("healthIndex", "int"),
        ("capacityFcc", "int"),
        ("capacityRaw", "int"),
        ("capacityDesign", "int"),
        ("impedanceRaw", "int"),
        ("impedanceAvg", "int"),
        ("impedanceDesign", "int"),
        ("cycleCount", "int"),
        ("cycleCountDesign", "int"),
        ("tempBucket", "int"),
    ];

    fn fields(&self) -> [i32; 11] {
        [
            self.algo,
            self.health_index,
            self.capacity_fcc,
            self.capacity_raw,
            self.capacity_design,
            self.impedance_raw,
            self.impedance_avg,
            self.impedance_design,
            self.cycle_count,
            self.cycle_count_design,
            self.temp_bucket,
        ]
    }
}

impl Parcelable for HealthStats {
    fn write_to_parcel(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_sized(|p| {
            for v in self.fields() {
                p.write_i32(v);
            }
            Ok(())
        })
    }

    fn read_from_parcel(reader: &mut ParcelReader<'_>) -> Result<Self> {
        reader.read_sized(|r| {
            Ok(Self {
                algo: r.read_field()?,
                health_index: r.read_field()?,
                capacity_fcc: r.read_field()?,
                capacity_raw: r.read_field()?,
                capacity_design: r.read_field()?,
                impedance_raw: r.read_field()?,
                impedance_avg: r.read_field()?,
                impedance_design: r.read_field()?,
                cycle_count: r.read_field()?,
                cycle_count_design: r.read_field()?,
                temp_bucket: r.read_field()?,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_has_gap_at_ten() {
        assert_eq!(Feature::CONSTANTS.len(), 19);
        assert!(Feature::CONSTANTS.iter().all(|(_, f)| f.0 != 10));
        assert_eq!(Feature::CSI_STATS.0, 9);
        assert_eq!(Feature::FW_UPDATE.0, 11);
    }

    #[test]
    fn test_dock_defend_ordering() {
        let mut statuses = vec![
            DockDefendStatus::ACTIVE,
            DockDefendStatus::DISABLED,
            DockDefendStatus::INACTIVE,
            DockDefendStatus::ERROR,
        ];
        statuses.sort();
        assert_eq!(
            statuses,
            vec![
                DockDefendStatus::DISABLED,
                DockDefendStatus::ERROR,
                DockDefendStatus::INACTIVE,
                DockDefendStatus::ACTIVE,
            ]
        );
        assert!(!DockDefendStatus::ERROR.is_operational());
        assert!(DockDefendStatus::INACTIVE.is_operational());
    }

    #[test]
    fn test_unknown_value_preserved() {
        let status = ChargingStatus(3);
        assert_eq!(status.name(), None);
        assert_eq!(format!("{status:?}"), "ChargingStatus(3)");

        let mut p = Parcel::new();
        p.write(&status).unwrap();
        let back: ChargingStatus = ParcelReader::new(p.as_bytes()).read().unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn test_debug_uses_constant_name() {
        assert_eq!(format!("{:?}", ChargingPolicy::LONGLIFE), "ChargingPolicy::LONGLIFE");
        assert_eq!(HealthAlgo::from_name("MAXIM"), Some(HealthAlgo::MAXIM));
        assert_eq!(HealthAlgo::from_name("maxim"), None);
    }

    #[test]
    fn test_charging_stage_round_trip() {
        let cases = [
            ("", 0),
            ("Active", 3600),
            // Already 4-byte aligned, no padding
            ("Done", -1),
            ("Ça charge ⚡", i32::MAX),
            ("Adaptive", i32::MIN),
        ];
        for (stage, deadline) in cases {
            let stage = ChargingStage {
                stage: stage.into(),
                deadline,
            };
            let mut p = Parcel::new();
            p.write(&stage).unwrap();
            // size + string length + padded bytes + deadline
            let padded = stage.stage.len().div_ceil(4) * 4;
            assert_eq!(p.len(), 4 + 4 + padded + 4, "{stage:?}");
            let back: ChargingStage = ParcelReader::new(p.as_bytes()).read().unwrap();
            assert_eq!(back, stage);
        }
    }

    #[test]
    fn test_health_stats_round_trip() {
        let typical = HealthStats {
            algo: HealthAlgo::MAXIM.0,
            health_index: 92,
            capacity_fcc: 4410,
            capacity_raw: 4388,
            capacity_design: 4614,
            impedance_raw: 140,
            impedance_avg: 138,
            impedance_design: 120,
            cycle_count: 311,
            cycle_count_design: 800,
            temp_bucket: -3,
        };
        let extremes = HealthStats {
            algo: i32::MIN,
            health_index: i32::MAX,
            capacity_fcc: i32::MIN,
            capacity_raw: -1,
            capacity_design: 0,
            impedance_raw: i32::MAX,
            impedance_avg: i32::MIN,
            impedance_design: 1,
            cycle_count: i32::MAX,
            cycle_count_design: i32::MIN,
            temp_bucket: i32::MAX,
        };
        for stats in [typical, extremes, HealthStats::default()] {
            let mut p = Parcel::new();
            p.write(&stats).unwrap();
            assert_eq!(p.len(), 4 + 11 * 4);
            let back: HealthStats = ParcelReader::new(p.as_bytes()).read().unwrap();
            assert_eq!(back, stats);
        }
    }

    #[test]
    fn test_health_stats_from_older_writer() {
        // A writer that only knew the first two fields
        let mut p = Parcel::new();
        p.write_sized(|p| {
            p.write_i32(1);
            p.write_i32(88);
            Ok(())
        })
        .unwrap();
        let stats: HealthStats = ParcelReader::new(p.as_bytes()).read().unwrap();
        assert_eq!(stats.algo, 1);
        assert_eq!(stats.health_index, 88);
        assert_eq!(stats.temp_bucket, 0);
    }

    #[test]
    fn test_enum_serializes_as_integer() {
        let json = serde_json::to_string(&DockDefendStatus::DISABLED).unwrap();
        assert_eq!(json, "-2");
        let stats: HealthStats = serde_json::from_str(
            r#"{"algo":1,"health_index":90,"capacity_fcc":0,"capacity_raw":0,
                "capacity_design":0,"impedance_raw":0,"impedance_avg":0,
                "impedance_design":0,"cycle_count":5,"cycle_count_design":0,
                "temp_bucket":0}"#,
        )
        .unwrap();
        assert_eq!(stats.cycle_count, 5);
    }
}
