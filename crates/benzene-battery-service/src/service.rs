//! sysfs-backed battery service
//!
//! Implements `IBattery` on top of the nodes exported by the charger and fuel
//! gauge drivers. Optional nodes are probed on every call; a missing node
//! turns a setter into a no-op and makes a getter report its default.

use crate::config::ChargeLimitConfig;
use crate::property::{self, PROPERTY_LIMIT};
use crate::sysfs::{Sysfs, SysfsError, nodes};
use benzene_battery_aidl::{
    CalibrationMode, CalibrationState, ChargingPolicy, ChargingStage, ChargingStatus,
    ChargingType, DefenderType, DockDefendStatus, Feature, HealthAlgo, HealthStats, HealthStatus,
    IBattery, Result, Status,
};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Service-specific error code for sysfs failures
pub const ERROR_SYSFS: i32 = 1;

/// Node value of `charging_policy` while charge limiting is active
const POLICY_NODE_LIMITING: i32 = 2;

const STOP_RANGE: std::ops::RangeInclusive<i32> = 50..=100;
const MIN_LIMIT_GAP: i32 = 5;

/// Check a `(stop, start)` charge limit pair
pub fn check_charge_limit(stop: i32, start: i32) -> std::result::Result<(), &'static str> {
    if !STOP_RANGE.contains(&stop) {
        return Err("stop must be 50-100");
    }
    // Any i32 can arrive off the wire
    if i64::from(stop) - i64::from(start) < i64::from(MIN_LIMIT_GAP) {
        return Err("gap must be >= 5");
    }
    Ok(())
}

fn sysfs_err(e: SysfsError, ctx: &str) -> Status {
    let msg = format!("{ctx}: {e}");
    error!("{}", msg);
    Status::new_service_specific(ERROR_SYSFS, Some(&msg))
}

/// Parse `health_index_stats` for one algorithm
///
/// Each line reads `algo: v0, v1, ...` with the record fields after `algo` in
/// order. Lines that do not parse or carry fewer than ten values are skipped.
pub fn parse_health_stats(content: &str, algo: i32) -> Option<HealthStats> {
    content.lines().find_map(|line| {
        let (a, rest) = line.split_once(':')?;
        if a.trim().parse::<i32>().ok()? != algo {
            return None;
        }
        let v: Vec<i32> = rest
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|s| s.parse().ok())
            .collect();
        if v.len() < 10 {
            return None;
        }
        Some(HealthStats {
            algo,
            health_index: v[0],
            capacity_fcc: v[1],
            capacity_raw: v[2],
            capacity_design: v[3],
            impedance_raw: v[4],
            impedance_avg: v[5],
            impedance_design: v[6],
            cycle_count: v[7],
            cycle_count_design: v[8],
            temp_bucket: v[9],
        })
    })
}

#[derive(Debug)]
struct State {
    stop: i32,
    start: i32,
    // CUSTOM and LONGLIFE share a node value
    custom: bool,
}

/// Battery service backed by sysfs
pub struct BatteryService {
    sysfs: Sysfs,
    state: Mutex<State>,
}

impl BatteryService {
    pub fn new(sysfs: Sysfs, limits: ChargeLimitConfig) -> Self {
        info!(
            "Creating battery service on {} (limits {}/{})",
            sysfs.root().display(),
            limits.stop,
            limits.start
        );
        Self {
            sysfs,
            state: Mutex::new(State {
                stop: limits.stop,
                start: limits.start,
                custom: false,
            }),
        }
    }

    pub fn sysfs(&self) -> &Sysfs {
        &self.sysfs
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // State is two integers and a flag; a panic mid-update cannot leave
        // it unusable
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn limiting(&self) -> bool {
        self.sysfs.read_int_or(nodes::CHARGING_POLICY, 1) == POLICY_NODE_LIMITING
    }

    /// Write charge levels in an order the kernel accepts
    ///
    /// The charger rejects a stop level at or below the current start level, a
    /// start level at or above the current stop level, and writes that do not
    /// change the value.
    fn apply_levels(&self, stop: i32, start: i32) -> Result<()> {
        let s = &self.sysfs;
        let current_start = s.read_int_or(nodes::CHARGE_START_LEVEL, 0);
        let current_stop = s.read_int_or(nodes::CHARGE_STOP_LEVEL, 100);

        // Lower start first when the new stop would not clear it
        let prep_start = if stop <= current_start && start != current_start {
            let prep = start.min(stop - 1);
            if prep != current_start && s.exists(nodes::CHARGE_START_LEVEL) {
                s.write_int(nodes::CHARGE_START_LEVEL, prep)
                    .map_err(|e| sysfs_err(e, "write start (prep)"))?;
            }
            Some(prep)
        } else {
            None
        };

        if stop != current_stop && s.exists(nodes::CHARGE_STOP_LEVEL) {
            s.write_int(nodes::CHARGE_STOP_LEVEL, stop)
                .map_err(|e| sysfs_err(e, "write stop"))?;
        }

        let already_set = prep_start == Some(start);
        if !already_set && start != current_start && s.exists(nodes::CHARGE_START_LEVEL) {
            s.write_int(nodes::CHARGE_START_LEVEL, start)
                .map_err(|e| sysfs_err(e, "write start"))?;
        }

        info!("Set charge levels: {}/{}", stop, start);
        Ok(())
    }

    fn clear_temp(&self) -> Result<()> {
        self.sysfs
            .write_string(nodes::BD_CLEAR, "B2")
            .map_err(|e| sysfs_err(e, "clear temp"))
    }

    fn clear_trickle(&self) -> Result<()> {
        self.sysfs
            .write_int(nodes::BD_TRICKLE_RESET_SEC, 0)
            .map_err(|e| sysfs_err(e, "clear trickle"))
    }

    fn clear_dwell(&self) -> Result<()> {
        self.sysfs
            .write_int(nodes::BD_TRICKLE_RATE, 0)
            .map_err(|e| sysfs_err(e, "clear dwell"))
    }

    fn clear_dock(&self) -> Result<()> {
        if self.sysfs.read_int_or(nodes::DD_STATE, 0) == 1 && self.sysfs.exists(nodes::DD_SETTINGS)
        {
            self.sysfs
                .write_string(nodes::DD_SETTINGS, "02")
                .map_err(|e| sysfs_err(e, "clear dock"))?;
        }
        Ok(())
    }

    fn check_property(prop: i32) -> Result<()> {
        if prop >= PROPERTY_LIMIT {
            return Err(Status::illegal_argument("property out of range"));
        }
        Ok(())
    }
}

impl IBattery for BatteryService {
    fn set_charging_policy(&self, policy: ChargingPolicy) -> Result<()> {
        let val = match policy {
            ChargingPolicy::DEFAULT => 1,
            ChargingPolicy::LONGLIFE | ChargingPolicy::CUSTOM => POLICY_NODE_LIMITING,
            ChargingPolicy::ADAPTIVE => 3,
            _ => return Err(Status::illegal_argument("invalid policy")),
        };
        if !self.sysfs.exists(nodes::CHARGING_POLICY) {
            debug!("No charging policy node, ignoring {:?}", policy);
            return Ok(());
        }
        self.sysfs
            .write_int(nodes::CHARGING_POLICY, val)
            .map_err(|e| sysfs_err(e, "write policy"))?;
        info!("Charging policy set to {:?}", policy);

        let (stop, start) = {
            let mut state = self.state();
            state.custom = policy == ChargingPolicy::CUSTOM;
            (state.stop, state.start)
        };
        if policy == ChargingPolicy::CUSTOM {
            self.apply_levels(stop, start)?;
        }
        Ok(())
    }

    fn get_charging_policy(&self) -> Result<ChargingPolicy> {
        let val = self.sysfs.read_int_or(nodes::CHARGING_POLICY, 1);
        if val == POLICY_NODE_LIMITING && self.state().custom {
            return Ok(ChargingPolicy::CUSTOM);
        }
        Ok(ChargingPolicy(val))
    }

    fn set_charge_limit(&self, stop_level: i32, start_level: i32) -> Result<()> {
        check_charge_limit(stop_level, start_level).map_err(Status::illegal_argument)?;
        {
            let mut state = self.state();
            state.stop = stop_level;
            state.start = start_level;
        }
        if self.limiting() {
            self.apply_levels(stop_level, start_level)?;
        } else {
            debug!(
                "Stored charge limit {}/{} until limiting is enabled",
                stop_level, start_level
            );
        }
        Ok(())
    }

    fn get_charge_limit(&self) -> Result<Vec<i32>> {
        let (stop, start) = {
            let state = self.state();
            (state.stop, state.start)
        };
        if !self.limiting() {
            return Ok(vec![stop, start]);
        }
        Ok(vec![
            self.sysfs.read_int_or(nodes::CHARGE_STOP_LEVEL, stop),
            self.sysfs.read_int_or(nodes::CHARGE_START_LEVEL, start),
        ])
    }

    fn set_enable(&self, feature: Feature, enabled: bool) -> Result<()> {
        match feature {
            Feature::DOCK_DEFEND if self.sysfs.exists(nodes::DD_SETTINGS) => {
                self.sysfs
                    .write_string(nodes::DD_SETTINGS, if enabled { "B2" } else { "1M" })
                    .map_err(|e| sysfs_err(e, "dock defend"))?;
                info!("Dock defend {}", if enabled { "enabled" } else { "disabled" });
                Ok(())
            }
            _ => Err(Status::unsupported("feature not controllable")),
        }
    }

    fn clear_battery_defenders(&self, defender: DefenderType) -> Result<()> {
        match defender {
            DefenderType::ALL => {
                self.clear_temp()?;
                self.clear_trickle()?;
                self.clear_dwell()?;
                self.clear_dock()?;
            }
            DefenderType::TEMP => self.clear_temp()?,
            DefenderType::TRICKLE => self.clear_trickle()?,
            DefenderType::DWELL => self.clear_dwell()?,
            DefenderType::DOCK => self.clear_dock()?,
            _ => {
                debug!("Ignoring clear of unknown defender {:?}", defender);
                return Ok(());
            }
        }
        info!("Cleared battery defender {:?}", defender);
        Ok(())
    }

    fn get_string_property(&self, feature: Feature, prop: i32) -> Result<String> {
        Self::check_property(prop)?;
        match property::node_for(feature, prop).map(|n| self.sysfs.path(n)) {
            Some(path) if path.exists() => crate::sysfs::read_string(&path)
                .map_err(|e| sysfs_err(e, "getStringProperty")),
            _ => Ok(String::new()),
        }
    }

    fn set_string_property(&self, feature: Feature, prop: i32, value: &str) -> Result<()> {
        Self::check_property(prop)?;
        match property::node_for(feature, prop).map(|n| self.sysfs.path(n)) {
            Some(path) if path.exists() => {
                crate::sysfs::write_string(&path, value)
                    .map_err(|e| sysfs_err(e, "setStringProperty"))?;
                debug!("Set {:?} property {} to {:?}", feature, prop, value);
                Ok(())
            }
            // Unmapped properties are accepted and dropped
            _ => Ok(()),
        }
    }

    fn get_charging_status(&self) -> Result<ChargingStatus> {
        Ok(ChargingStatus(
            self.sysfs.read_int_or(nodes::CHARGING_STATUS, -1),
        ))
    }

    fn get_charging_type(&self) -> Result<ChargingType> {
        Ok(ChargingType(self.sysfs.read_int_or(nodes::CHARGING_TYPE, -1)))
    }

    fn get_charging_speed(&self) -> Result<i32> {
        Ok(self.sysfs.read_int_or(nodes::CHARGING_SPEED, 0))
    }

    fn set_charging_deadline(&self, deadline: i32) -> Result<()> {
        self.sysfs
            .write_int(nodes::CHARGE_DEADLINE, deadline)
            .map_err(|e| sysfs_err(e, "write deadline"))?;
        info!("Charging deadline set to {}", deadline);
        Ok(())
    }

    fn get_charging_stage_and_deadline(&self) -> Result<ChargingStage> {
        Ok(ChargingStage {
            stage: self
                .sysfs
                .read_string(nodes::CHARGE_STAGE)
                .unwrap_or_default(),
            deadline: self.sysfs.read_int_or(nodes::CHARGE_DEADLINE, 0),
        })
    }

    fn get_health_index(&self) -> Result<i32> {
        Ok(self.sysfs.read_int_or(nodes::HEALTH_INDEX, 100))
    }

    fn get_health_status(&self) -> Result<HealthStatus> {
        Ok(HealthStatus(self.sysfs.read_int_or(nodes::HEALTH_STATUS, 0)))
    }

    fn get_health_capacity_index(&self) -> Result<i32> {
        self.sysfs
            .read_int(nodes::HEALTH_CAPACITY_INDEX)
            .map_err(|e| sysfs_err(e, "capacity index"))
    }

    fn get_health_impedance_index(&self) -> Result<i32> {
        self.sysfs
            .read_int(nodes::HEALTH_IMPEDANCE_INDEX)
            .map_err(|e| sysfs_err(e, "impedance index"))
    }

    fn get_health_stats(&self, algo: HealthAlgo) -> Result<HealthStats> {
        let algo = match algo {
            HealthAlgo::GOOGLE | HealthAlgo::MAXIM => algo.0,
            _ => HealthAlgo::UNKNOWN.0,
        };
        let stats = self
            .sysfs
            .read_string(nodes::HEALTH_INDEX_STATS)
            .ok()
            .and_then(|content| parse_health_stats(&content, algo));
        Ok(stats.unwrap_or_else(|| {
            debug!("No health stats for algo {}", algo);
            HealthStats {
                algo,
                ..Default::default()
            }
        }))
    }

    fn set_health_always_on(&self, value: i32) -> Result<()> {
        self.sysfs
            .write_int(nodes::CHARGE_LIMIT, value)
            .map_err(|e| sysfs_err(e, "write charge_limit"))
    }

    fn schedule_calibration(&self, mode: CalibrationMode) -> Result<()> {
        if !self.sysfs.exists(nodes::HEALTH_SET_CAL_MODE) {
            return Ok(());
        }
        let v = match mode {
            CalibrationMode::DISABLED => 0,
            CalibrationMode::ENABLED => 1,
            CalibrationMode::FORCED => 2,
            _ => return Err(Status::illegal_argument("invalid mode")),
        };
        self.sysfs
            .write_int(nodes::HEALTH_SET_CAL_MODE, v)
            .map_err(|e| sysfs_err(e, "calibration"))?;
        info!("Calibration mode set to {:?}", mode);
        Ok(())
    }

    fn get_calibration_state(&self) -> Result<CalibrationState> {
        Ok(CalibrationState(
            self.sysfs.read_int_or(nodes::HEALTH_GET_CAL_STATE, 0),
        ))
    }

    fn get_dock_defend_status(&self) -> Result<DockDefendStatus> {
        if !self.sysfs.exists(nodes::DD_STATE) {
            return Ok(DockDefendStatus::DISABLED);
        }
        let state = self.sysfs.read_int_or(nodes::DD_STATE, -1);
        let settings = self.sysfs.read_int_or(nodes::DD_SETTINGS, -1);
        Ok(match (state, settings) {
            (-1, _) => DockDefendStatus::DISABLED,
            (_, -1) => DockDefendStatus::ERROR,
            (1, 1) => DockDefendStatus::ACTIVE,
            _ => DockDefendStatus::INACTIVE,
        })
    }

    fn get_adapter_id(&self) -> Result<i32> {
        Err(Status::unsupported("getAdapterId not supported"))
    }
}
