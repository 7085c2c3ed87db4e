//! sysfs-backed battery service
//!
//! [`BatteryService`] implements the `IBattery` contract on top of the
//! charger and fuel gauge sysfs nodes. [`Server`] exposes any `IBattery`
//! implementation on a Unix socket, and [`MockBattery`] stands in for the
//! hardware in tests.

pub mod config;
pub mod mock;
pub mod property;
pub mod server;
pub mod service;
pub mod sysfs;

pub use config::{ChargeLimitConfig, ConfigError, ServiceConfig};
pub use mock::MockBattery;
pub use server::Server;
pub use service::BatteryService;
pub use sysfs::{Sysfs, SysfsError};
