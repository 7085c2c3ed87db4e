//! sysfs access
//!
//! Charger and fuel gauge drivers expose their controls as small text files.
//! Node locations differ between kernels, so a node may name an alternate
//! location that is tried when the primary one is missing. All paths are
//! relative to a root (normally `/sys`) so the service can run against a fake
//! tree.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SysfsError {
    #[error("sysfs node not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("parse error: '{content}' from {}", .path.display())]
    Parse { path: PathBuf, content: String },
}

pub type Result<T> = std::result::Result<T, SysfsError>;

/// A sysfs node relative to the sysfs root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub primary: &'static str,
    pub alternate: Option<&'static str>,
}

impl Node {
    pub const fn new(primary: &'static str) -> Self {
        Self {
            primary,
            alternate: None,
        }
    }

    pub const fn with_alt(primary: &'static str, alternate: &'static str) -> Self {
        Self {
            primary,
            alternate: Some(alternate),
        }
    }
}

/// sysfs tree rooted at a directory
#[derive(Debug, Clone)]
pub struct Sysfs {
    root: PathBuf,
}

impl Default for Sysfs {
    fn default() -> Self {
        Self::new("/sys")
    }
}

impl Sysfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the first location of `node` that exists
    pub fn resolve(&self, node: Node) -> Option<PathBuf> {
        let primary = self.root.join(node.primary);
        if primary.exists() {
            return Some(primary);
        }
        node.alternate
            .map(|alt| self.root.join(alt))
            .filter(|p| p.exists())
    }

    pub fn exists(&self, node: Node) -> bool {
        self.resolve(node).is_some()
    }

    fn resolve_or_err(&self, node: Node) -> Result<PathBuf> {
        self.resolve(node)
            .ok_or_else(|| SysfsError::NotFound(self.root.join(node.primary)))
    }

    pub fn read_string(&self, node: Node) -> Result<String> {
        read_string(&self.resolve_or_err(node)?)
    }

    pub fn read_int(&self, node: Node) -> Result<i32> {
        read_int(&self.resolve_or_err(node)?)
    }

    /// Read an integer, falling back to `default` if the node is missing or
    /// unreadable
    pub fn read_int_or(&self, node: Node, default: i32) -> i32 {
        self.read_int(node).unwrap_or(default)
    }

    pub fn write_string(&self, node: Node, value: &str) -> Result<()> {
        write_string(&self.resolve_or_err(node)?, value)
    }

    pub fn write_int(&self, node: Node, value: i32) -> Result<()> {
        self.write_string(node, &value.to_string())
    }

    /// Absolute path of a node given relative to the root, without requiring
    /// that it exists
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn map_io(path: &Path, e: io::Error) -> SysfsError {
    match e.kind() {
        ErrorKind::NotFound => SysfsError::NotFound(path.to_path_buf()),
        _ => SysfsError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

/// Read a node and trim surrounding whitespace
pub fn read_string(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| map_io(path, e))
}

pub fn read_int(path: &Path) -> Result<i32> {
    let content = read_string(path)?;
    content.parse().map_err(|_| SysfsError::Parse {
        path: path.to_path_buf(),
        content,
    })
}

pub fn write_string(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|e| map_io(path, e))
}

/// Nodes used by the service
pub mod nodes {
    use super::Node;

    pub const CHARGING_POLICY: Node = Node::new("class/power_supply/battery/charging_policy");

    pub const CHARGE_STOP_LEVEL: Node =
        Node::new("devices/platform/google,charger/charge_stop_level");
    pub const CHARGE_START_LEVEL: Node =
        Node::new("devices/platform/google,charger/charge_start_level");

    pub const BD_CLEAR: Node = Node::with_alt(
        "devices/platform/google,charger/bd_clear",
        "devices/platform/soc/soc:google,charger/bd_clear",
    );
    pub const BD_TRICKLE_RESET_SEC: Node =
        Node::new("class/power_supply/battery/bd_trickle_reset_sec");
    pub const BD_TRICKLE_RATE: Node = Node::new("class/power_supply/battery/bd_trickle_rate");

    pub const DD_STATE: Node = Node::new("devices/platform/google,charger/dd_state");
    pub const DD_SETTINGS: Node = Node::new("devices/platform/google,charger/dd_settings");

    pub const CHARGING_STATUS: Node = Node::with_alt(
        "devices/platform/google,charger/charging_status",
        "devices/platform/soc/soc:google,charger/charging_status",
    );
    pub const CHARGING_TYPE: Node = Node::with_alt(
        "devices/platform/google,charger/charging_type",
        "devices/platform/soc/soc:google,charger/charging_type",
    );
    pub const CHARGING_SPEED: Node = Node::new("class/power_supply/battery/charging_speed");

    pub const CHARGE_DEADLINE: Node = Node::new("class/power_supply/battery/charge_deadline");
    pub const CHARGE_STAGE: Node = Node::new("class/power_supply/battery/charge_stage");
    pub const CHARGE_LIMIT: Node = Node::new("class/power_supply/battery/charge_limit");

    pub const HEALTH_INDEX: Node = Node::new("class/power_supply/battery/health_index");
    pub const HEALTH_STATUS: Node = Node::new("class/power_supply/battery/health_status");
    pub const HEALTH_CAPACITY_INDEX: Node =
        Node::new("class/power_supply/battery/health_capacity_index");
    pub const HEALTH_IMPEDANCE_INDEX: Node =
        Node::new("class/power_supply/battery/health_impedance_index");
    pub const HEALTH_INDEX_STATS: Node =
        Node::new("class/power_supply/battery/health_index_stats");
    pub const HEALTH_SET_CAL_MODE: Node =
        Node::new("class/power_supply/battery/health_set_cal_mode");
    pub const HEALTH_GET_CAL_STATE: Node =
        Node::new("class/power_supply/battery/health_get_cal_state");
}
