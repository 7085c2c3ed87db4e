//! Battery management HAL interface
//!
//! This crate defines the `vendor.benzeneos.battery.IBattery` contract: the
//! integer-backed enums and parcelables it exchanges, the [`IBattery`] trait,
//! and the machinery to carry calls across a process boundary.
//!
//! A service implements [`IBattery`] and is wrapped in a [`BatteryStub`],
//! which decodes requests and encodes replies. A client holds a
//! [`BatteryProxy`] over some [`Transport`]; the proxy implements the same
//! trait, so callers cannot tell a local service from a remote one.
//!
//! # Example
//!
//! ```no_run
//! use benzene_battery_aidl::{BatteryProxy, IBattery, SocketTransport};
//! use std::path::Path;
//!
//! fn main() -> benzene_battery_aidl::Result<()> {
//!     let transport = SocketTransport::connect(Path::new("/dev/socket/vendor.benzeneos.battery"))?;
//!     let battery = BatteryProxy::new(transport);
//!     battery.set_charge_limit(80, 40)?;
//!     println!("Limits: {:?}", battery.get_charge_limit()?);
//!     Ok(())
//! }
//! ```

pub mod frozen;
pub mod interface;
pub mod parcel;
pub mod proxy;
pub mod status;
pub mod stub;
pub mod transport;
pub mod types;

pub use interface::{DEFAULT_INSTANCE, DESCRIPTOR, IBattery, VERSION, transaction};
pub use parcel::{Parcel, ParcelReader, Parcelable};
pub use proxy::BatteryProxy;
pub use status::{ExceptionCode, Result, Status};
pub use stub::BatteryStub;
pub use transport::{SocketTransport, Transport};
pub use types::{
    CalibrationMode, CalibrationState, ChargingPolicy, ChargingStage, ChargingStatus,
    ChargingType, DefenderType, DockDefendStatus, Feature, HealthAlgo, HealthStats, HealthStatus,
};
