//! Integration tests for the battery service over a Unix socket

use benzene_battery_aidl::{
    BatteryProxy, ChargingPolicy, DefenderType, DockDefendStatus, ExceptionCode, Feature,
    HealthAlgo, IBattery, SocketTransport,
};
use benzene_battery_service::sysfs::nodes;
use benzene_battery_service::{
    BatteryService, ChargeLimitConfig, MockBattery, Server, ServiceConfig, Sysfs,
};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tempfile::TempDir;

/// Fake sysfs tree and socket directory for one server
struct SocketTestEnv {
    temp_dir: TempDir,
    sysfs_root: PathBuf,
    socket_path: PathBuf,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl SocketTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let sysfs_root = temp_dir.path().join("sys");
        let socket_path = temp_dir.path().join("socket/battery");
        fs::create_dir_all(&sysfs_root).expect("Failed to create sysfs root");

        Self {
            temp_dir,
            sysfs_root,
            socket_path,
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    fn node(&self, relative: &str, content: &str) {
        let path = self.sysfs_root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.sysfs_root.join(relative)).unwrap()
    }

    fn start<S: IBattery + 'static>(&mut self, service: S, workers: usize) {
        let server = Server::bind(&self.socket_path, service, workers).expect("Failed to bind");
        let shutdown = Arc::clone(&self.shutdown);
        self.handle = Some(thread::spawn(move || server.serve(&shutdown)));
    }

    fn start_sysfs(&mut self) {
        let service = BatteryService::new(
            Sysfs::new(&self.sysfs_root),
            ChargeLimitConfig { stop: 80, start: 70 },
        );
        self.start(service, 2);
    }

    fn connect(&self) -> BatteryProxy<SocketTransport> {
        BatteryProxy::new(SocketTransport::connect(&self.socket_path).expect("Failed to connect"))
    }

    fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap().unwrap();
        }
    }
}

impl Drop for SocketTestEnv {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

#[test]
fn test_charge_limit_through_socket() {
    let mut env = SocketTestEnv::new();
    env.node(nodes::CHARGING_POLICY.primary, "1");
    env.node(nodes::CHARGE_STOP_LEVEL.primary, "100");
    env.node(nodes::CHARGE_START_LEVEL.primary, "0");
    env.start_sysfs();

    let battery = env.connect();
    assert_eq!(battery.get_charge_limit().unwrap(), vec![80, 70]);

    battery.set_charge_limit(80, 40).unwrap();
    battery.set_charging_policy(ChargingPolicy::CUSTOM).unwrap();

    assert_eq!(battery.get_charge_limit().unwrap(), vec![80, 40]);
    assert_eq!(battery.get_charging_policy().unwrap(), ChargingPolicy::CUSTOM);
    assert_eq!(env.read(nodes::CHARGE_STOP_LEVEL.primary), "80");
    assert_eq!(env.read(nodes::CHARGE_START_LEVEL.primary), "40");

    env.stop();
    assert!(!env.socket_path.exists());
}

#[test]
fn test_health_stats_through_socket() {
    let mut env = SocketTestEnv::new();
    env.node(
        nodes::HEALTH_INDEX_STATS.primary,
        "0: 1, 2, 3, 4, 5, 6, 7, 8, 9, 10\n1: 92, 4410, 4388, 4614, 140, 138, 120, 311, 800, 2\n",
    );
    env.start_sysfs();

    let battery = env.connect();
    let stats = battery.get_health_stats(HealthAlgo::GOOGLE).unwrap();
    assert_eq!(stats.algo, 1);
    assert_eq!(stats.health_index, 92);
    assert_eq!(stats.cycle_count, 311);

    // Unknown algorithms read the algo 0 line
    let stats = battery.get_health_stats(HealthAlgo(9)).unwrap();
    assert_eq!(stats.algo, 0);
    assert_eq!(stats.health_index, 1);
}

#[test]
fn test_errors_through_socket() {
    let mut env = SocketTestEnv::new();
    env.start_sysfs();
    let battery = env.connect();

    let err = battery.set_charge_limit(80, 78).unwrap_err();
    assert_eq!(err.exception_code(), ExceptionCode::ILLEGAL_ARGUMENT);

    let err = battery.get_adapter_id().unwrap_err();
    assert_eq!(err.exception_code(), ExceptionCode::UNSUPPORTED_OPERATION);

    let err = battery.clear_battery_defenders(DefenderType::TEMP).unwrap_err();
    assert_eq!(err.exception_code(), ExceptionCode::SERVICE_SPECIFIC);
    assert_eq!(err.service_specific_error(), Some(1));

    let err = battery.get_string_property(Feature::AACR, 51).unwrap_err();
    assert_eq!(err.exception_code(), ExceptionCode::ILLEGAL_ARGUMENT);

    // The connection survives failed calls
    assert_eq!(
        battery.get_dock_defend_status().unwrap(),
        DockDefendStatus::DISABLED
    );
    assert_eq!(battery.get_interface_version().unwrap(), 1);
}

#[test]
fn test_concurrent_clients() {
    let mut env = SocketTestEnv::new();
    // One worker still serves both clients
    env.start(MockBattery::new(), 1);

    let first = env.connect();
    let second = env.connect();
    first.set_charge_limit(90, 60).unwrap();
    assert_eq!(second.get_charge_limit().unwrap(), vec![90, 60]);
    second.set_enable(Feature::DOCK_DEFEND, true).unwrap();
    assert_eq!(first.get_charge_limit().unwrap(), vec![90, 60]);

    drop(first);
    drop(second);
    env.stop();
}

#[test]
fn test_config_drives_service() {
    let mut env = SocketTestEnv::new();
    let config_path = env.temp_dir.path().join("etc/config.toml");
    let config = ServiceConfig {
        sysfs_root: env.sysfs_root.clone(),
        socket_path: env.socket_path.clone(),
        charge_limit: ChargeLimitConfig { stop: 85, start: 50 },
        ..Default::default()
    };
    config.save(&config_path).unwrap();

    let loaded = ServiceConfig::load(&config_path).unwrap();
    let service = BatteryService::new(Sysfs::new(&loaded.sysfs_root), loaded.charge_limit);
    env.start(service, loaded.workers);

    assert_eq!(env.connect().get_charge_limit().unwrap(), vec![85, 50]);
}
