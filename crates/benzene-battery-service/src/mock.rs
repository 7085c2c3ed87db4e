//! In-memory battery for testing without charger hardware
//!
//! [`MockBattery`] validates arguments the way the sysfs service does and keeps
//! everything else in a shared [`MockState`] that tests can inspect and drive.
//!
//! # Usage
//!
//! ```
//! use benzene_battery_aidl::{ChargingPolicy, IBattery};
//! use benzene_battery_service::mock::MockBattery;
//!
//! let battery = MockBattery::new();
//! battery.set_charging_policy(ChargingPolicy::CUSTOM).unwrap();
//! battery.set_charge_limit(80, 40).unwrap();
//! assert_eq!(battery.get_charge_limit().unwrap(), vec![80, 40]);
//! ```

use crate::property::PROPERTY_LIMIT;
use crate::service::check_charge_limit;
use benzene_battery_aidl::{
    CalibrationMode, CalibrationState, ChargingPolicy, ChargingStage, ChargingStatus,
    ChargingType, DefenderType, DockDefendStatus, ExceptionCode, Feature, HealthAlgo, HealthStats,
    HealthStatus, IBattery, Result, Status,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared mock state
#[derive(Debug, Clone)]
pub struct MockState {
    pub policy: ChargingPolicy,
    /// (stop, start)
    pub charge_limit: (i32, i32),
    pub dock_defend_enabled: bool,
    pub dock_defend_status: DockDefendStatus,
    /// Defenders cleared so far, in call order
    pub cleared: Vec<DefenderType>,
    pub properties: HashMap<(Feature, i32), String>,
    pub charging_status: ChargingStatus,
    pub charging_type: ChargingType,
    pub charging_speed: i32,
    pub stage: ChargingStage,
    pub health_index: i32,
    pub health_status: HealthStatus,
    pub health_capacity_index: i32,
    pub health_impedance_index: i32,
    /// Stats per algorithm value
    pub health_stats: HashMap<i32, HealthStats>,
    pub health_always_on: i32,
    pub calibration_mode: CalibrationMode,
    pub calibration_state: CalibrationState,
    /// Features that accept `setEnable`
    pub controllable: BTreeSet<Feature>,
}

impl MockState {
    pub fn new() -> Self {
        Self {
            policy: ChargingPolicy::DEFAULT,
            charge_limit: (80, 70),
            dock_defend_enabled: false,
            dock_defend_status: DockDefendStatus::DISABLED,
            cleared: Vec::new(),
            properties: HashMap::new(),
            charging_status: ChargingStatus::UNKNOWN,
            charging_type: ChargingType::UNKNOWN,
            charging_speed: 0,
            stage: ChargingStage::default(),
            health_index: 100,
            health_status: HealthStatus::UNKNOWN,
            health_capacity_index: 100,
            health_impedance_index: 100,
            health_stats: HashMap::new(),
            health_always_on: 0,
            calibration_mode: CalibrationMode::DISABLED,
            calibration_state: CalibrationState::UNKNOWN,
            controllable: BTreeSet::from([Feature::DOCK_DEFEND]),
        }
    }
}

impl Default for MockState {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock battery service
#[derive(Debug, Clone, Default)]
pub struct MockBattery {
    state: Arc<RwLock<MockState>>,
}

impl MockBattery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get shared state for manipulation in tests
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        Arc::clone(&self.state)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MockState>> {
        self.state.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MockState>> {
        self.state.write().map_err(|_| poisoned())
    }

    /// Simulate a health stats record for an algorithm
    pub fn set_health_stats(&self, stats: HealthStats) {
        if let Ok(mut state) = self.state.write() {
            state.health_stats.insert(stats.algo, stats);
        }
    }

    /// Simulate dock defend state
    pub fn set_dock_defend_status(&self, status: DockDefendStatus) {
        if let Ok(mut state) = self.state.write() {
            state.dock_defend_status = status;
        }
    }

    /// Simulate charging telemetry
    pub fn set_charging(&self, status: ChargingStatus, kind: ChargingType, speed: i32) {
        if let Ok(mut state) = self.state.write() {
            state.charging_status = status;
            state.charging_type = kind;
            state.charging_speed = speed;
        }
    }
}

fn poisoned() -> Status {
    Status::new_exception(ExceptionCode::ILLEGAL_STATE, Some("mock state poisoned"))
}

impl IBattery for MockBattery {
    fn set_charging_policy(&self, policy: ChargingPolicy) -> Result<()> {
        if policy.name().is_none() {
            return Err(Status::illegal_argument("invalid policy"));
        }
        self.write()?.policy = policy;
        tracing::debug!("[MOCK] Charging policy set to {:?}", policy);
        Ok(())
    }

    fn get_charging_policy(&self) -> Result<ChargingPolicy> {
        Ok(self.read()?.policy)
    }

    fn set_charge_limit(&self, stop_level: i32, start_level: i32) -> Result<()> {
        check_charge_limit(stop_level, start_level).map_err(Status::illegal_argument)?;
        self.write()?.charge_limit = (stop_level, start_level);
        tracing::debug!("[MOCK] Charge limit set to {}/{}", stop_level, start_level);
        Ok(())
    }

    fn get_charge_limit(&self) -> Result<Vec<i32>> {
        let (stop, start) = self.read()?.charge_limit;
        Ok(vec![stop, start])
    }

    fn set_enable(&self, feature: Feature, enabled: bool) -> Result<()> {
        let mut state = self.write()?;
        if !state.controllable.contains(&feature) {
            return Err(Status::unsupported("feature not controllable"));
        }
        if feature == Feature::DOCK_DEFEND {
            state.dock_defend_enabled = enabled;
        }
        tracing::debug!("[MOCK] {:?} enabled: {}", feature, enabled);
        Ok(())
    }

    fn clear_battery_defenders(&self, defender: DefenderType) -> Result<()> {
        if defender.name().is_some() {
            self.write()?.cleared.push(defender);
            tracing::debug!("[MOCK] Cleared {:?}", defender);
        }
        Ok(())
    }

    fn get_string_property(&self, feature: Feature, prop: i32) -> Result<String> {
        if prop >= PROPERTY_LIMIT {
            return Err(Status::illegal_argument("property out of range"));
        }
        Ok(self
            .read()?
            .properties
            .get(&(feature, prop))
            .cloned()
            .unwrap_or_default())
    }

    fn set_string_property(&self, feature: Feature, prop: i32, value: &str) -> Result<()> {
        if prop >= PROPERTY_LIMIT {
            return Err(Status::illegal_argument("property out of range"));
        }
        self.write()?
            .properties
            .insert((feature, prop), value.to_string());
        Ok(())
    }

    fn get_charging_status(&self) -> Result<ChargingStatus> {
        Ok(self.read()?.charging_status)
    }

    fn get_charging_type(&self) -> Result<ChargingType> {
        Ok(self.read()?.charging_type)
    }

    fn get_charging_speed(&self) -> Result<i32> {
        Ok(self.read()?.charging_speed)
    }

    fn set_charging_deadline(&self, deadline: i32) -> Result<()> {
        self.write()?.stage.deadline = deadline;
        tracing::debug!("[MOCK] Charging deadline set to {}", deadline);
        Ok(())
    }

    fn get_charging_stage_and_deadline(&self) -> Result<ChargingStage> {
        Ok(self.read()?.stage.clone())
    }

    fn get_health_index(&self) -> Result<i32> {
        Ok(self.read()?.health_index)
    }

    fn get_health_status(&self) -> Result<HealthStatus> {
        Ok(self.read()?.health_status)
    }

    fn get_health_capacity_index(&self) -> Result<i32> {
        Ok(self.read()?.health_capacity_index)
    }

    fn get_health_impedance_index(&self) -> Result<i32> {
        Ok(self.read()?.health_impedance_index)
    }

    fn get_health_stats(&self, algo: HealthAlgo) -> Result<HealthStats> {
        Ok(self
            .read()?
            .health_stats
            .get(&algo.0)
            .cloned()
            .unwrap_or(HealthStats {
                algo: algo.0,
                ..Default::default()
            }))
    }

    fn set_health_always_on(&self, value: i32) -> Result<()> {
        self.write()?.health_always_on = value;
        Ok(())
    }

    fn schedule_calibration(&self, mode: CalibrationMode) -> Result<()> {
        if mode.name().is_none() {
            return Err(Status::illegal_argument("invalid mode"));
        }
        self.write()?.calibration_mode = mode;
        tracing::debug!("[MOCK] Calibration mode set to {:?}", mode);
        Ok(())
    }

    fn get_calibration_state(&self) -> Result<CalibrationState> {
        Ok(self.read()?.calibration_state)
    }

    fn get_dock_defend_status(&self) -> Result<DockDefendStatus> {
        Ok(self.read()?.dock_defend_status)
    }

    fn get_adapter_id(&self) -> Result<i32> {
        Err(Status::unsupported("getAdapterId not supported"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_matches_service() {
        let battery = MockBattery::new();
        let err = battery.set_charge_limit(45, 10).unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::ILLEGAL_ARGUMENT);
        battery.set_charge_limit(80, i32::MIN).unwrap();
        assert_eq!(battery.get_charge_limit().unwrap(), vec![80, i32::MIN]);
        let err = battery.set_charging_policy(ChargingPolicy(0)).unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::ILLEGAL_ARGUMENT);
        let err = battery.get_string_property(Feature::AACR, 51).unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::ILLEGAL_ARGUMENT);
        let err = battery.set_enable(Feature::WIRELESS, true).unwrap_err();
        assert_eq!(err.exception_code(), ExceptionCode::UNSUPPORTED_OPERATION);
    }

    #[test]
    fn test_state_is_shared() {
        let battery = MockBattery::new();
        let state = battery.state();

        battery.set_enable(Feature::DOCK_DEFEND, true).unwrap();
        battery.clear_battery_defenders(DefenderType::TRICKLE).unwrap();
        battery.clear_battery_defenders(DefenderType(40)).unwrap();
        battery.set_string_property(Feature::AACR, 21, "800").unwrap();

        assert_eq!(battery.get_string_property(Feature::AACR, 21).unwrap(), "800");
        assert_eq!(battery.get_string_property(Feature::AAFV, 21).unwrap(), "");

        let state = state.read().unwrap();
        assert!(state.dock_defend_enabled);
        assert_eq!(state.cleared, vec![DefenderType::TRICKLE]);
    }

    #[test]
    fn test_hooks() {
        let battery = MockBattery::new();
        battery.set_health_stats(HealthStats {
            algo: HealthAlgo::MAXIM.0,
            health_index: 88,
            ..Default::default()
        });
        battery.set_dock_defend_status(DockDefendStatus::ACTIVE);
        battery.set_charging(ChargingStatus(1), ChargingType(3), 60);

        assert_eq!(
            battery.get_health_stats(HealthAlgo::MAXIM).unwrap().health_index,
            88
        );
        assert_eq!(
            battery.get_health_stats(HealthAlgo::GOOGLE).unwrap(),
            HealthStats {
                algo: HealthAlgo::GOOGLE.0,
                ..Default::default()
            }
        );
        assert_eq!(
            battery.get_dock_defend_status().unwrap(),
            DockDefendStatus::ACTIVE
        );
        assert_eq!(battery.get_charging_type().unwrap(), ChargingType(3));
        assert_eq!(battery.get_charging_speed().unwrap(), 60);
    }

    #[test]
    fn test_deadline_reported_with_stage() {
        let battery = MockBattery::new();
        battery.set_charging_deadline(3600).unwrap();
        assert_eq!(
            battery.get_charging_stage_and_deadline().unwrap().deadline,
            3600
        );
    }
}
