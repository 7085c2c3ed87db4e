//! Vendor string properties
//!
//! `getStringProperty`/`setStringProperty` address feature-specific tunables
//! by an untyped integer id. The ids below are the ones whose backing node is
//! known; the same id can mean different things under different features.
//! Anything not listed here stays reachable only through the untyped calls.

use benzene_battery_aidl::Feature;

/// Property ids at or above this value are rejected
pub const PROPERTY_LIMIT: i32 = 51;

// Shared across features
pub const ENABLE: i32 = 0;
pub const DRY_RUN: i32 = 1;
pub const STATE: i32 = 18;
pub const PROFILE: i32 = 32;

// CHARGE_DEADLINE
pub const DEADLINE_DRY_RUN: i32 = 1;
pub const HEALTH_SAFETY_MARGIN: i32 = 12;

// TRICKLE_DEFEND
pub const TRICKLE_RATE: i32 = 3;
pub const TRICKLE_CNT: i32 = 8;
pub const TRICKLE_RESET_SEC: i32 = 12;
pub const TRICKLE_RECHARGE_SOC: i32 = 15;
pub const TRICKLE_VERSION: i32 = 33;
pub const TRICKLE_CNT_THR: i32 = 50;

// WIRELESS
pub const MITIGATE_THRESHOLD: i32 = 5;

// CPM
pub const DC_CTL: i32 = 2;
pub const THERMAL_DC_FAN_ALARM: i32 = 19;
pub const THERMAL_MDIS_FAN_ALARM: i32 = 20;

// AACR
pub const CYCLE_GRACE: i32 = 8;
pub const CYCLE_MAX: i32 = 21;
pub const MIN_CAPACITY_RATE: i32 = 24;
pub const CLIFF_CAPACITY_RATE: i32 = 27;

// HEALTH
pub const ALGO: i32 = 2;
pub const TREND_POINTS: i32 = 23;
pub const LOW_BOUNDARY: i32 = 24;

// CSI_STATS
pub const CSI_STATS: i32 = 25;

// FW_UPDATE, WLC_FW
pub const UPDATE_FIRMWARE: i32 = 26;

// CHARGE_LIMIT
pub const CHARGE_TO_LIMIT: i32 = 5;
pub const FORCE_FCR_UPDATE: i32 = 39;
pub const BYPASS_FCN_DELTA: i32 = 41;
pub const BYPASS_CYCLE_DELTA: i32 = 42;
pub const BYPASS_MODE: i32 = 43;

// AAFV
pub const APPLY_MAX: i32 = 28;
pub const MAX_OFFSET: i32 = 29;
pub const CLIFF_CYCLE: i32 = 30;
pub const CLIFF_OFFSET: i32 = 31;
pub const AAFV_CONFIG: i32 = 38;

// AACT
pub const CV_LIMITS: i32 = 34;
pub const TEMP_LIMITS: i32 = 35;
pub const CHG_ECC: i32 = 36;

// AACP
pub const VERSION: i32 = 33;
pub const OPT_OUT: i32 = 37;
pub const OPT_OUT_CUTOFF: i32 = 44;

/// sysfs node (relative to the sysfs root) backing a feature property
pub fn node_for(feature: Feature, prop: i32) -> Option<&'static str> {
    let node = match feature {
        Feature::CHARGE_DEADLINE => match prop {
            DEADLINE_DRY_RUN => "class/power_supply/battery/charge_deadline_dryrun",
            HEALTH_SAFETY_MARGIN => "class/power_supply/battery/health_safety_margin",
            _ => return None,
        },
        Feature::TRICKLE_DEFEND => match prop {
            ENABLE => "class/power_supply/battery/bd_trickle_enable",
            DRY_RUN => "class/power_supply/battery/bd_trickle_dry_run",
            TRICKLE_RATE => "class/power_supply/battery/bd_trickle_rate",
            TRICKLE_CNT => "class/power_supply/battery/bd_trickle_cnt",
            TRICKLE_RESET_SEC => "class/power_supply/battery/bd_trickle_reset_sec",
            TRICKLE_RECHARGE_SOC => "class/power_supply/battery/bd_trickle_recharge_soc",
            TRICKLE_VERSION => "class/power_supply/battery/bd_trickle_version",
            TRICKLE_CNT_THR => "class/power_supply/battery/bd_trickle_cnt_thr",
            _ => return None,
        },
        Feature::WIRELESS => match prop {
            MITIGATE_THRESHOLD => "class/power_supply/wireless/device/mitigate_threshold",
            _ => return None,
        },
        Feature::CPM => match prop {
            DC_CTL => "devices/platform/google,cpm/dc_ctl",
            THERMAL_DC_FAN_ALARM => "devices/platform/google,charger/thermal_dc_fan_alarm",
            THERMAL_MDIS_FAN_ALARM => "devices/platform/google,cpm/thermal_mdis_fan_alarm",
            _ => return None,
        },
        Feature::AACR => match prop {
            CYCLE_GRACE => "class/power_supply/battery/aacr_cycle_grace",
            STATE => "class/power_supply/battery/aacr_state",
            CYCLE_MAX => "class/power_supply/battery/aacr_cycle_max",
            MIN_CAPACITY_RATE => "class/power_supply/battery/aacr_min_capacity_rate",
            CLIFF_CAPACITY_RATE => "class/power_supply/battery/aacr_cliff_capacity_rate",
            PROFILE => "class/power_supply/battery/aacr_profile",
            _ => return None,
        },
        Feature::HEALTH => match prop {
            ALGO => "class/power_supply/battery/health_algo",
            TREND_POINTS => "class/power_supply/battery/health_set_trend_points",
            LOW_BOUNDARY => "class/power_supply/battery/health_set_low_boundary",
            _ => return None,
        },
        Feature::CSI_STATS => match prop {
            CSI_STATS => "class/power_supply/battery/csi_stats",
            _ => return None,
        },
        Feature::FW_UPDATE => match prop {
            ENABLE => "devices/platform/maxim,max77779fwu/enable_update",
            UPDATE_FIRMWARE => "devices/platform/maxim,max77779fwu/update_firmware",
            _ => return None,
        },
        Feature::CHARGE_LIMIT => match prop {
            CHARGE_TO_LIMIT => "class/power_supply/battery/charge_to_limit",
            FORCE_FCR_UPDATE => "class/power_supply/battery/force_fcr_update_ops",
            BYPASS_FCN_DELTA => "class/power_supply/maxfg/bypass_chargelimit_fcn_delta",
            BYPASS_CYCLE_DELTA => "class/power_supply/maxfg/bypass_chargelimit_cycle_delta",
            BYPASS_MODE => "class/power_supply/maxfg/bypass_chargelimit_mode",
            _ => return None,
        },
        Feature::FG_CYCLE => match prop {
            ENABLE => "class/power_supply/maxfg/fix_cycle_count",
            _ => return None,
        },
        Feature::AAFV => match prop {
            STATE => "class/power_supply/battery/aafv_state",
            APPLY_MAX => "class/power_supply/battery/aafv_apply_max",
            MAX_OFFSET => "class/power_supply/battery/aafv_max_offset",
            CLIFF_CYCLE => "class/power_supply/battery/aafv_cliff_cycle",
            CLIFF_OFFSET => "class/power_supply/battery/aafv_cliff_offset",
            PROFILE => "class/power_supply/battery/aafv_profile",
            AAFV_CONFIG => "class/power_supply/maxfg/aafv_config",
            _ => return None,
        },
        Feature::AACT => match prop {
            STATE => "class/power_supply/battery/aact_state",
            PROFILE => "class/power_supply/battery/aact_profile",
            CV_LIMITS => "class/power_supply/battery/aact_cv_limits",
            TEMP_LIMITS => "class/power_supply/battery/aact_temp_limits",
            CHG_ECC => "class/power_supply/battery/aact_chg_ecc",
            _ => return None,
        },
        Feature::AACP => match prop {
            VERSION => "class/power_supply/battery/aacp_version",
            OPT_OUT => "class/power_supply/battery/aacp_opt_out",
            OPT_OUT_CUTOFF => "class/power_supply/battery/aacp_opt_out_cutoff_cycles",
            _ => return None,
        },
        Feature::WLC_FW => match prop {
            ENABLE => "class/power_supply/wireless/device/rx_fwupdate",
            UPDATE_FIRMWARE => "class/power_supply/wireless/device/rx_vertag",
            _ => return None,
        },
        Feature::QI22 => match prop {
            ENABLE => "class/power_supply/wireless/device/qi22_en_gpio",
            _ => return None,
        },
        Feature::AACC => match prop {
            PROFILE => "class/power_supply/battery/aacc_chg_profile",
            _ => return None,
        },
        _ => return None,
    };
    Some(node)
}
