//! Server-side dispatch
//!
//! [`BatteryStub`] turns a raw request into a call on an [`IBattery`]
//! implementation and encodes the outcome as a reply. Failures of any kind,
//! from the service or from decoding, end up in the reply's status header.

use crate::interface::{DESCRIPTOR, IBattery, transaction as tx};
use crate::parcel::{Parcel, ParcelReader, Parcelable};
use crate::status::{ExceptionCode, Result, Status};
use crate::transport::Transport;

/// Dispatcher wrapping a service implementation
pub struct BatteryStub<S> {
    service: S,
}

impl<S: IBattery> BatteryStub<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Handle one request and produce the reply bytes
    pub fn on_transact(&self, code: u32, data: &[u8]) -> Vec<u8> {
        let mut reply = Parcel::new();
        if let Err(status) = self.dispatch(code, &mut ParcelReader::new(data), &mut reply) {
            tracing::debug!("Transaction {} failed: {}", code, status);
            reply = Parcel::new();
            if let Err(e) = reply.write_status(&status) {
                // Only an oversized message can fail here
                tracing::warn!("Dropping status message: {}", e);
                let bare = match status.service_specific_error() {
                    Some(code) => Status::new_service_specific(code, None),
                    None => Status::new_exception(status.exception_code(), None),
                };
                reply = Parcel::new();
                let _ = reply.write_status(&bare);
            }
        }
        reply.into_bytes()
    }

    fn dispatch(&self, code: u32, data: &mut ParcelReader<'_>, reply: &mut Parcel) -> Result<()> {
        let token = data.read_string()?;
        if token != DESCRIPTOR {
            return Err(Status::new_exception(
                ExceptionCode::SECURITY,
                Some("interface token mismatch"),
            ));
        }

        let s = &self.service;
        match code {
            tx::SET_CHARGING_POLICY => done(reply, s.set_charging_policy(data.read()?)),
            tx::GET_CHARGING_POLICY => ret(reply, s.get_charging_policy()),
            tx::SET_CHARGE_LIMIT => {
                let stop = data.read_i32()?;
                let start = data.read_i32()?;
                done(reply, s.set_charge_limit(stop, start))
            }
            tx::GET_CHARGE_LIMIT => ret(reply, s.get_charge_limit()),
            tx::SET_ENABLE => {
                let feature = data.read()?;
                let enabled = data.read_bool()?;
                done(reply, s.set_enable(feature, enabled))
            }
            tx::CLEAR_BATTERY_DEFENDERS => done(reply, s.clear_battery_defenders(data.read()?)),
            tx::GET_STRING_PROPERTY => {
                let feature = data.read()?;
                let prop = data.read_i32()?;
                ret(reply, s.get_string_property(feature, prop))
            }
            tx::SET_STRING_PROPERTY => {
                let feature = data.read()?;
                let prop = data.read_i32()?;
                let value = data.read_string()?;
                done(reply, s.set_string_property(feature, prop, &value))
            }
            tx::GET_CHARGING_STATUS => ret(reply, s.get_charging_status()),
            tx::GET_CHARGING_TYPE => ret(reply, s.get_charging_type()),
            tx::GET_CHARGING_SPEED => ret(reply, s.get_charging_speed()),
            tx::SET_CHARGING_DEADLINE => done(reply, s.set_charging_deadline(data.read_i32()?)),
            tx::GET_CHARGING_STAGE_AND_DEADLINE => {
                ret(reply, s.get_charging_stage_and_deadline())
            }
            tx::GET_HEALTH_INDEX => ret(reply, s.get_health_index()),
            tx::GET_HEALTH_STATUS => ret(reply, s.get_health_status()),
            tx::GET_HEALTH_CAPACITY_INDEX => ret(reply, s.get_health_capacity_index()),
            tx::GET_HEALTH_IMPEDANCE_INDEX => ret(reply, s.get_health_impedance_index()),
            tx::GET_HEALTH_STATS => ret(reply, s.get_health_stats(data.read()?)),
            tx::SET_HEALTH_ALWAYS_ON => done(reply, s.set_health_always_on(data.read_i32()?)),
            tx::SCHEDULE_CALIBRATION => done(reply, s.schedule_calibration(data.read()?)),
            tx::GET_CALIBRATION_STATE => ret(reply, s.get_calibration_state()),
            tx::GET_DOCK_DEFEND_STATUS => ret(reply, s.get_dock_defend_status()),
            tx::GET_ADAPTER_ID => ret(reply, s.get_adapter_id()),
            tx::GET_INTERFACE_VERSION => ret(reply, s.get_interface_version()),
            _ => Err(Status::unsupported(&format!("unknown transaction {code}"))),
        }
    }
}

fn done(reply: &mut Parcel, result: Result<()>) -> Result<()> {
    result?;
    reply.write_no_exception();
    Ok(())
}

fn ret<T: Parcelable>(reply: &mut Parcel, result: Result<T>) -> Result<()> {
    let value = result?;
    reply.write_no_exception();
    reply.write(&value)
}

impl<S: IBattery> Transport for BatteryStub<S> {
    fn transact(&self, code: u32, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.on_transact(code, data))
    }
}
