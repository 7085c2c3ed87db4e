//! Client-side proxy

use crate::interface::{DESCRIPTOR, IBattery, transaction as tx};
use crate::parcel::{Parcel, ParcelReader, Parcelable};
use crate::status::Result;
use crate::transport::Transport;
use crate::types::{
    CalibrationMode, CalibrationState, ChargingPolicy, ChargingStage, ChargingStatus,
    ChargingType, DefenderType, DockDefendStatus, Feature, HealthAlgo, HealthStats, HealthStatus,
};

/// [`IBattery`] implementation that forwards every call over a [`Transport`]
pub struct BatteryProxy<T> {
    transport: T,
}

impl<T: Transport> BatteryProxy<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call<R: Parcelable>(
        &self,
        code: u32,
        args: impl FnOnce(&mut Parcel) -> Result<()>,
    ) -> Result<R> {
        let reply = self.send(code, args)?;
        let mut reader = ParcelReader::new(&reply);
        reader.read_status()?;
        reader.read()
    }

    fn call_void(&self, code: u32, args: impl FnOnce(&mut Parcel) -> Result<()>) -> Result<()> {
        let reply = self.send(code, args)?;
        ParcelReader::new(&reply).read_status()
    }

    fn send(&self, code: u32, args: impl FnOnce(&mut Parcel) -> Result<()>) -> Result<Vec<u8>> {
        let mut data = Parcel::new();
        data.write_str(DESCRIPTOR)?;
        args(&mut data)?;
        self.transport.transact(code, data.as_bytes())
    }
}

fn no_args(_: &mut Parcel) -> Result<()> {
    Ok(())
}

impl<T: Transport> IBattery for BatteryProxy<T> {
    fn set_charging_policy(&self, policy: ChargingPolicy) -> Result<()> {
        self.call_void(tx::SET_CHARGING_POLICY, |p| p.write(&policy))
    }

    fn get_charging_policy(&self) -> Result<ChargingPolicy> {
        self.call(tx::GET_CHARGING_POLICY, no_args)
    }

    fn set_charge_limit(&self, stop_level: i32, start_level: i32) -> Result<()> {
        self.call_void(tx::SET_CHARGE_LIMIT, |p| {
            p.write_i32(stop_level);
            p.write_i32(start_level);
            Ok(())
        })
    }

    fn get_charge_limit(&self) -> Result<Vec<i32>> {
        self.call(tx::GET_CHARGE_LIMIT, no_args)
    }

    fn set_enable(&self, feature: Feature, enabled: bool) -> Result<()> {
        self.call_void(tx::SET_ENABLE, |p| {
            p.write(&feature)?;
            p.write_bool(enabled);
            Ok(())
        })
    }

    fn clear_battery_defenders(&self, defender: DefenderType) -> Result<()> {
        self.call_void(tx::CLEAR_BATTERY_DEFENDERS, |p| p.write(&defender))
    }

    fn get_string_property(&self, feature: Feature, prop: i32) -> Result<String> {
        self.call(tx::GET_STRING_PROPERTY, |p| {
            p.write(&feature)?;
            p.write_i32(prop);
            Ok(())
        })
    }

    fn set_string_property(&self, feature: Feature, prop: i32, value: &str) -> Result<()> {
        self.call_void(tx::SET_STRING_PROPERTY, |p| {
            p.write(&feature)?;
            p.write_i32(prop);
            p.write_str(value)
        })
    }

    fn get_charging_status(&self) -> Result<ChargingStatus> {
        self.call(tx::GET_CHARGING_STATUS, no_args)
    }

    fn get_charging_type(&self) -> Result<ChargingType> {
        self.call(tx::GET_CHARGING_TYPE, no_args)
    }

    fn get_charging_speed(&self) -> Result<i32> {
        self.call(tx::GET_CHARGING_SPEED, no_args)
    }

    fn set_charging_deadline(&self, deadline: i32) -> Result<()> {
        self.call_void(tx::SET_CHARGING_DEADLINE, |p| p.write(&deadline))
    }

    fn get_charging_stage_and_deadline(&self) -> Result<ChargingStage> {
        self.call(tx::GET_CHARGING_STAGE_AND_DEADLINE, no_args)
    }

    fn get_health_index(&self) -> Result<i32> {
        self.call(tx::GET_HEALTH_INDEX, no_args)
    }

    fn get_health_status(&self) -> Result<HealthStatus> {
        self.call(tx::GET_HEALTH_STATUS, no_args)
    }

    fn get_health_capacity_index(&self) -> Result<i32> {
        self.call(tx::GET_HEALTH_CAPACITY_INDEX, no_args)
    }

    fn get_health_impedance_index(&self) -> Result<i32> {
        self.call(tx::GET_HEALTH_IMPEDANCE_INDEX, no_args)
    }

    fn get_health_stats(&self, algo: HealthAlgo) -> Result<HealthStats> {
        self.call(tx::GET_HEALTH_STATS, |p| p.write(&algo))
    }

    fn set_health_always_on(&self, value: i32) -> Result<()> {
        self.call_void(tx::SET_HEALTH_ALWAYS_ON, |p| p.write(&value))
    }

    fn schedule_calibration(&self, mode: CalibrationMode) -> Result<()> {
        self.call_void(tx::SCHEDULE_CALIBRATION, |p| p.write(&mode))
    }

    fn get_calibration_state(&self) -> Result<CalibrationState> {
        self.call(tx::GET_CALIBRATION_STATE, no_args)
    }

    fn get_dock_defend_status(&self) -> Result<DockDefendStatus> {
        self.call(tx::GET_DOCK_DEFEND_STATUS, no_args)
    }

    fn get_adapter_id(&self) -> Result<i32> {
        self.call(tx::GET_ADAPTER_ID, no_args)
    }

    fn get_interface_version(&self) -> Result<i32> {
        self.call(tx::GET_INTERFACE_VERSION, no_args)
    }
}
