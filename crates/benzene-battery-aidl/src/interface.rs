//! The `IBattery` interface
//!
//! Every method is a blocking request/response call. Implementations choose
//! their own locking; the trait only requires that a service can be shared
//! between the threads serving different callers.

use crate::status::Result;
use crate::types::{
    CalibrationMode, CalibrationState, ChargingPolicy, ChargingStage, ChargingStatus,
    ChargingType, DefenderType, DockDefendStatus, Feature, HealthAlgo, HealthStats, HealthStatus,
};

/// Interface descriptor, sent as the token at the start of every request
pub const DESCRIPTOR: &str = "vendor.benzeneos.battery.IBattery";

/// Default service instance name
pub const DEFAULT_INSTANCE: &str = "vendor.benzeneos.battery.IBattery/default";

/// Version of the frozen schema this crate implements
pub const VERSION: i32 = 1;

/// Transaction codes
///
/// Method codes follow declaration order starting at
/// [`transaction::FIRST_CALL`]. They are part of the wire contract and never
/// change once frozen.
pub mod transaction {
    pub const FIRST_CALL: u32 = 1;

    pub const SET_CHARGING_POLICY: u32 = FIRST_CALL;
    pub const GET_CHARGING_POLICY: u32 = FIRST_CALL + 1;
    pub const SET_CHARGE_LIMIT: u32 = FIRST_CALL + 2;
    pub const GET_CHARGE_LIMIT: u32 = FIRST_CALL + 3;
    pub const SET_ENABLE: u32 = FIRST_CALL + 4;
    pub const CLEAR_BATTERY_DEFENDERS: u32 = FIRST_CALL + 5;
    pub const GET_STRING_PROPERTY: u32 = FIRST_CALL + 6;
    pub const SET_STRING_PROPERTY: u32 = FIRST_CALL + 7;
    pub const GET_CHARGING_STATUS: u32 = FIRST_CALL + 8;
    pub const GET_CHARGING_TYPE: u32 = FIRST_CALL + 9;
    pub const GET_CHARGING_SPEED: u32 = FIRST_CALL + 10;
    pub const SET_CHARGING_DEADLINE: u32 = FIRST_CALL + 11;
    pub const GET_CHARGING_STAGE_AND_DEADLINE: u32 = FIRST_CALL + 12;
    pub const GET_HEALTH_INDEX: u32 = FIRST_CALL + 13;
    pub const GET_HEALTH_STATUS: u32 = FIRST_CALL + 14;
    pub const GET_HEALTH_CAPACITY_INDEX: u32 = FIRST_CALL + 15;
    pub const GET_HEALTH_IMPEDANCE_INDEX: u32 = FIRST_CALL + 16;
    pub const GET_HEALTH_STATS: u32 = FIRST_CALL + 17;
    pub const SET_HEALTH_ALWAYS_ON: u32 = FIRST_CALL + 18;
    pub const SCHEDULE_CALIBRATION: u32 = FIRST_CALL + 19;
    pub const GET_CALIBRATION_STATE: u32 = FIRST_CALL + 20;
    pub const GET_DOCK_DEFEND_STATUS: u32 = FIRST_CALL + 21;
    pub const GET_ADAPTER_ID: u32 = FIRST_CALL + 22;

    /// Meta transaction returning [`super::VERSION`]
    pub const GET_INTERFACE_VERSION: u32 = 0x00ff_fffe;

    /// Method names and codes in declaration order
    pub const METHODS: &[(&str, u32)] = &[
        ("setChargingPolicy", SET_CHARGING_POLICY),
        ("getChargingPolicy", GET_CHARGING_POLICY),
        ("setChargeLimit", SET_CHARGE_LIMIT),
        ("getChargeLimit", GET_CHARGE_LIMIT),
        ("setEnable", SET_ENABLE),
        ("clearBatteryDefenders", CLEAR_BATTERY_DEFENDERS),
        ("getStringProperty", GET_STRING_PROPERTY),
        ("setStringProperty", SET_STRING_PROPERTY),
        ("getChargingStatus", GET_CHARGING_STATUS),
        ("getChargingType", GET_CHARGING_TYPE),
        ("getChargingSpeed", GET_CHARGING_SPEED),
        ("setChargingDeadline", SET_CHARGING_DEADLINE),
        ("getChargingStageAndDeadline", GET_CHARGING_STAGE_AND_DEADLINE),
        ("getHealthIndex", GET_HEALTH_INDEX),
        ("getHealthStatus", GET_HEALTH_STATUS),
        ("getHealthCapacityIndex", GET_HEALTH_CAPACITY_INDEX),
        ("getHealthImpedanceIndex", GET_HEALTH_IMPEDANCE_INDEX),
        ("getHealthStats", GET_HEALTH_STATS),
        ("setHealthAlwaysOn", SET_HEALTH_ALWAYS_ON),
        ("scheduleCalibration", SCHEDULE_CALIBRATION),
        ("getCalibrationState", GET_CALIBRATION_STATE),
        ("getDockDefendStatus", GET_DOCK_DEFEND_STATUS),
        ("getAdapterId", GET_ADAPTER_ID),
    ];
}

/// Battery management service
pub trait IBattery: Send + Sync {
    fn set_charging_policy(&self, policy: ChargingPolicy) -> Result<()>;

    fn get_charging_policy(&self) -> Result<ChargingPolicy>;

    /// Set the level at which charging stops and the level at which it resumes
    fn set_charge_limit(&self, stop_level: i32, start_level: i32) -> Result<()>;

    /// Returns `[stop_level, start_level]`
    fn get_charge_limit(&self) -> Result<Vec<i32>>;

    fn set_enable(&self, feature: Feature, enabled: bool) -> Result<()>;

    fn clear_battery_defenders(&self, defender: DefenderType) -> Result<()>;

    /// Vendor extension: read a feature-specific property by numeric id
    fn get_string_property(&self, feature: Feature, prop: i32) -> Result<String>;

    /// Vendor extension: write a feature-specific property by numeric id
    fn set_string_property(&self, feature: Feature, prop: i32, value: &str) -> Result<()>;

    fn get_charging_status(&self) -> Result<ChargingStatus>;

    fn get_charging_type(&self) -> Result<ChargingType>;

    /// Unit is defined by the implementation
    fn get_charging_speed(&self) -> Result<i32>;

    fn set_charging_deadline(&self, deadline: i32) -> Result<()>;

    fn get_charging_stage_and_deadline(&self) -> Result<ChargingStage>;

    fn get_health_index(&self) -> Result<i32>;

    fn get_health_status(&self) -> Result<HealthStatus>;

    fn get_health_capacity_index(&self) -> Result<i32>;

    fn get_health_impedance_index(&self) -> Result<i32>;

    fn get_health_stats(&self, algo: HealthAlgo) -> Result<HealthStats>;

    /// Multi-level flag, not a boolean
    fn set_health_always_on(&self, value: i32) -> Result<()>;

    fn schedule_calibration(&self, mode: CalibrationMode) -> Result<()>;

    fn get_calibration_state(&self) -> Result<CalibrationState>;

    fn get_dock_defend_status(&self) -> Result<DockDefendStatus>;

    fn get_adapter_id(&self) -> Result<i32>;

    /// Version of the interface the implementation was built against
    fn get_interface_version(&self) -> Result<i32> {
        Ok(VERSION)
    }
}

impl<T: IBattery + ?Sized> IBattery for std::sync::Arc<T> {
    fn set_charging_policy(&self, policy: ChargingPolicy) -> Result<()> {
        (**self).set_charging_policy(policy)
    }

    fn get_charging_policy(&self) -> Result<ChargingPolicy> {
        (**self).get_charging_policy()
    }

    fn set_charge_limit(&self, stop_level: i32, start_level: i32) -> Result<()> {
        (**self).set_charge_limit(stop_level, start_level)
    }

    fn get_charge_limit(&self) -> Result<Vec<i32>> {
        (**self).get_charge_limit()
    }

    fn set_enable(&self, feature: Feature, enabled: bool) -> Result<()> {
        (**self).set_enable(feature, enabled)
    }

    fn clear_battery_defenders(&self, defender: DefenderType) -> Result<()> {
        (**self).clear_battery_defenders(defender)
    }

    fn get_string_property(&self, feature: Feature, prop: i32) -> Result<String> {
        (**self).get_string_property(feature, prop)
    }

    fn set_string_property(&self, feature: Feature, prop: i32, value: &str) -> Result<()> {
        (**self).set_string_property(feature, prop, value)
    }

    fn get_charging_status(&self) -> Result<ChargingStatus> {
        (**self).get_charging_status()
    }

    fn get_charging_type(&self) -> Result<ChargingType> {
        (**self).get_charging_type()
    }

    fn get_charging_speed(&self) -> Result<i32> {
        (**self).get_charging_speed()
    }

    fn set_charging_deadline(&self, deadline: i32) -> Result<()> {
        (**self).set_charging_deadline(deadline)
    }

    fn get_charging_stage_and_deadline(&self) -> Result<ChargingStage> {
        (**self).get_charging_stage_and_deadline()
    }

    fn get_health_index(&self) -> Result<i32> {
        (**self).get_health_index()
    }

    fn get_health_status(&self) -> Result<HealthStatus> {
        (**self).get_health_status()
    }

    fn get_health_capacity_index(&self) -> Result<i32> {
        (**self).get_health_capacity_index()
    }

    fn get_health_impedance_index(&self) -> Result<i32> {
        (**self).get_health_impedance_index()
    }

    fn get_health_stats(&self, algo: HealthAlgo) -> Result<HealthStats> {
        (**self).get_health_stats(algo)
    }

    fn set_health_always_on(&self, value: i32) -> Result<()> {
        (**self).set_health_always_on(value)
    }

    fn schedule_calibration(&self, mode: CalibrationMode) -> Result<()> {
        (**self).schedule_calibration(mode)
    }

    fn get_calibration_state(&self) -> Result<CalibrationState> {
        (**self).get_calibration_state()
    }

    fn get_dock_defend_status(&self) -> Result<DockDefendStatus> {
        (**self).get_dock_defend_status()
    }

    fn get_adapter_id(&self) -> Result<i32> {
        (**self).get_adapter_id()
    }

    fn get_interface_version(&self) -> Result<i32> {
        (**self).get_interface_version()
    }
}

#[cfg(test)]
mod tests {
    use super::transaction::*;

    #[test]
    fn test_method_codes_are_sequential() {
        assert_eq!(METHODS.len(), 23);
        for (i, (_, code)) in METHODS.iter().enumerate() {
            assert_eq!(*code, FIRST_CALL + i as u32);
        }
        assert_eq!(GET_ADAPTER_ID, 23);
    }
}
