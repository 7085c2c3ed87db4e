//! Frozen schema snapshots
//!
//! A published version of the interface is immutable. [`v1`] records what
//! version 1 froze; [`current`] describes the schema as the Rust types define
//! it today. [`check_compatible`] lists everything in the current schema that
//! would break a client of a frozen one. Growth is allowed only by adding:
//! new enums, new constants with unused values, fields appended to the end of
//! a parcelable, and new methods with new codes.

use crate::interface::transaction;
use crate::types::{
    CalibrationMode, CalibrationState, ChargingPolicy, ChargingStage, ChargingStatus,
    ChargingType, DefenderType, DockDefendStatus, Feature, HealthAlgo, HealthStats, HealthStatus,
};
use thiserror::Error;

/// Enum with its named constants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    pub name: String,
    pub constants: Vec<(String, i32)>,
}

/// Parcelable with its `(name, type)` fields in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParcelableSchema {
    pub name: String,
    pub fields: Vec<(String, String)>,
}

/// Complete description of one interface version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub version: i32,
    pub enums: Vec<EnumSchema>,
    pub parcelables: Vec<ParcelableSchema>,
    /// `(name, transaction code)`
    pub methods: Vec<(String, u32)>,
}

impl Schema {
    pub fn enum_schema(&self, name: &str) -> Option<&EnumSchema> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn enum_schema_mut(&mut self, name: &str) -> Option<&mut EnumSchema> {
        self.enums.iter_mut().find(|e| e.name == name)
    }

    pub fn parcelable(&self, name: &str) -> Option<&ParcelableSchema> {
        self.parcelables.iter().find(|p| p.name == name)
    }

    pub fn parcelable_mut(&mut self, name: &str) -> Option<&mut ParcelableSchema> {
        self.parcelables.iter_mut().find(|p| p.name == name)
    }

    pub fn method_code(&self, name: &str) -> Option<u32> {
        self.methods.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }
}

impl EnumSchema {
    pub fn value(&self, constant: &str) -> Option<i32> {
        self.constants
            .iter()
            .find(|(n, _)| n == constant)
            .map(|(_, v)| *v)
    }
}

/// Change that breaks clients of a frozen version
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("enum {0} was removed")]
    EnumRemoved(String),

    #[error("{enum_name}.{constant} was removed")]
    ConstantRemoved { enum_name: String, constant: String },

    #[error("{enum_name}.{constant} changed from {frozen} to {current}")]
    ConstantRenumbered {
        enum_name: String,
        constant: String,
        frozen: i32,
        current: i32,
    },

    #[error("parcelable {0} was removed")]
    ParcelableRemoved(String),

    #[error("{parcelable} field {index} changed from {frozen} to {}", .current.as_deref().unwrap_or("<missing>"))]
    FieldChanged {
        parcelable: String,
        index: usize,
        frozen: String,
        current: Option<String>,
    },

    #[error("method {0} was removed")]
    MethodRemoved(String),

    #[error("method {name} changed code from {frozen} to {current}")]
    MethodRenumbered { name: String, frozen: u32, current: u32 },
}

/// Check that `current` keeps every binding published in `frozen`
pub fn check_compatible(frozen: &Schema, current: &Schema) -> Result<(), Vec<Incompatibility>> {
    let mut problems = Vec::new();

    for e in &frozen.enums {
        let Some(cur) = current.enum_schema(&e.name) else {
            problems.push(Incompatibility::EnumRemoved(e.name.clone()));
            continue;
        };
        for (constant, value) in &e.constants {
            match cur.value(constant) {
                None => problems.push(Incompatibility::ConstantRemoved {
                    enum_name: e.name.clone(),
                    constant: constant.clone(),
                }),
                Some(v) if v != *value => problems.push(Incompatibility::ConstantRenumbered {
                    enum_name: e.name.clone(),
                    constant: constant.clone(),
                    frozen: *value,
                    current: v,
                }),
                Some(_) => {}
            }
        }
    }

    for p in &frozen.parcelables {
        let Some(cur) = current.parcelable(&p.name) else {
            problems.push(Incompatibility::ParcelableRemoved(p.name.clone()));
            continue;
        };
        for (index, field) in p.fields.iter().enumerate() {
            let found = cur.fields.get(index);
            if found != Some(field) {
                problems.push(Incompatibility::FieldChanged {
                    parcelable: p.name.clone(),
                    index,
                    frozen: format_field(field),
                    current: found.map(format_field),
                });
            }
        }
    }

    for (name, code) in &frozen.methods {
        match current.method_code(name) {
            None => problems.push(Incompatibility::MethodRemoved(name.clone())),
            Some(c) if c != *code => problems.push(Incompatibility::MethodRenumbered {
                name: name.clone(),
                frozen: *code,
                current: c,
            }),
            Some(_) => {}
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn format_field((name, ty): &(String, String)) -> String {
    format!("{ty} {name}")
}

type EnumTable = &'static [(&'static str, &'static [(&'static str, i32)])];
type ParcelableTable = &'static [(&'static str, &'static [(&'static str, &'static str)])];

const V1_ENUMS: EnumTable = &[
    (
        "ChargingPolicy",
        &[("DEFAULT", 1), ("LONGLIFE", 2), ("ADAPTIVE", 3), ("CUSTOM", 4)],
    ),
    (
        "Feature",
        &[
            ("TEMP_DEFEND", 0),
            ("TRICKLE_DEFEND", 1),
            ("DWELL_DEFEND", 2),
            ("DOCK_DEFEND", 3),
            ("CHARGE_DEADLINE", 4),
            ("WIRELESS", 5),
            ("CPM", 6),
            ("AACR", 7),
            ("HEALTH", 8),
            ("CSI_STATS", 9),
            ("FW_UPDATE", 11),
            ("CHARGE_LIMIT", 12),
            ("FG_CYCLE", 13),
            ("AAFV", 14),
            ("AACT", 15),
            ("AACP", 16),
            ("WLC_FW", 17),
            ("QI22", 18),
            ("AACC", 19),
        ],
    ),
    (
        "DefenderType",
        &[("ALL", 0), ("TEMP", 1), ("TRICKLE", 2), ("DWELL", 3), ("DOCK", 4)],
    ),
    ("ChargingStatus", &[("UNKNOWN", -1)]),
    ("ChargingType", &[("UNKNOWN", -1)]),
    ("HealthAlgo", &[("UNKNOWN", 0), ("GOOGLE", 1), ("MAXIM", 2)]),
    ("HealthStatus", &[("UNKNOWN", 0)]),
    (
        "CalibrationMode",
        &[("DISABLED", 0), ("ENABLED", 1), ("FORCED", 2)],
    ),
    ("CalibrationState", &[("UNKNOWN", 0)]),
    (
        "DockDefendStatus",
        &[("DISABLED", -2), ("ERROR", -1), ("INACTIVE", 0), ("ACTIVE", 1)],
    ),
];

const V1_PARCELABLES: ParcelableTable = &[
    ("ChargingStage", &[("stage", "String"), ("deadline", "int")]),
    (
        "HealthStats",
        &[
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
        ],
    ),
];

const V1_METHODS: &[(&str, u32)] = &[
    ("setChargingPolicy", 1),
    ("getChargingPolicy", 2),
    ("setChargeLimit", 3),
    ("getChargeLimit", 4),
    ("setEnable", 5),
    ("clearBatteryDefenders", 6),
    ("getStringProperty", 7),
    ("setStringProperty", 8),
    ("getChargingStatus", 9),
    ("getChargingType", 10),
    ("getChargingSpeed", 11),
    ("setChargingDeadline", 12),
    ("getChargingStageAndDeadline", 13),
    ("getHealthIndex", 14),
    ("getHealthStatus", 15),
    ("getHealthCapacityIndex", 16),
    ("getHealthImpedanceIndex", 17),
    ("getHealthStats", 18),
    ("setHealthAlwaysOn", 19),
    ("scheduleCalibration", 20),
    ("getCalibrationState", 21),
    ("getDockDefendStatus", 22),
    ("getAdapterId", 23),
];

/// Version 1 as frozen
pub fn v1() -> Schema {
    Schema {
        version: 1,
        enums: V1_ENUMS
            .iter()
            .map(|(name, constants)| EnumSchema {
                name: (*name).to_owned(),
                constants: constants.iter().map(|(n, v)| ((*n).to_owned(), *v)).collect(),
            })
            .collect(),
        parcelables: V1_PARCELABLES
            .iter()
            .map(|(name, fields)| parcelable_schema(name, fields))
            .collect(),
        methods: V1_METHODS
            .iter()
            .map(|(n, c)| ((*n).to_owned(), *c))
            .collect(),
    }
}

fn enum_schema<T: Copy + Into<i32>>(name: &str, constants: &[(&str, T)]) -> EnumSchema {
    EnumSchema {
        name: name.to_owned(),
        constants: constants
            .iter()
            .map(|(n, v)| ((*n).to_owned(), (*v).into()))
            .collect(),
    }
}

fn parcelable_schema(name: &str, fields: &[(&str, &str)]) -> ParcelableSchema {
    ParcelableSchema {
        name: name.to_owned(),
        fields: fields
            .iter()
            .map(|(n, t)| ((*n).to_owned(), (*t).to_owned()))
            .collect(),
    }
}

/// The schema defined by this crate's types
pub fn current() -> Schema {
    Schema {
        version: crate::interface::VERSION,
        enums: vec![
            enum_schema("ChargingPolicy", ChargingPolicy::CONSTANTS),
            enum_schema("Feature", Feature::CONSTANTS),
            enum_schema("DefenderType", DefenderType::CONSTANTS),
            enum_schema("ChargingStatus", ChargingStatus::CONSTANTS),
            enum_schema("ChargingType", ChargingType::CONSTANTS),
            enum_schema("HealthAlgo", HealthAlgo::CONSTANTS),
            enum_schema("HealthStatus", HealthStatus::CONSTANTS),
            enum_schema("CalibrationMode", CalibrationMode::CONSTANTS),
            enum_schema("CalibrationState", CalibrationState::CONSTANTS),
            enum_schema("DockDefendStatus", DockDefendStatus::CONSTANTS),
        ],
        parcelables: vec![
            parcelable_schema("ChargingStage", ChargingStage::FIELDS),
            parcelable_schema("HealthStats", HealthStats::FIELDS),
        ],
        methods: transaction::METHODS
            .iter()
            .map(|(n, c)| ((*n).to_owned(), *c))
            .collect(),
    }
}
