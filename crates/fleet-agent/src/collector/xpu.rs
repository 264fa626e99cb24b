//! Accelerator utilisation sampling (§4.10), one implementation per
//! `DeviceType`.
//!
//! `RK3588` parses the real `/sys/kernel/debug/rknpu/load` debugfs node,
//! grounded directly on the original's `rk3588/MachineInfoCollector.cpp`.
//! `ATLAS_H`/`ATLAS_L`/`Orin` query vendor management libraries (DCMI,
//! DSMI, NVML) in the original; none of those ship a Rust binding in this
//! workspace's dependency set, so they report `0.0` here — see
//! `DESIGN.md`.

use fleet_model::DeviceType;

pub fn sample(kind: DeviceType) -> f64 {
    match kind {
        DeviceType::Rk3588 => rknpu_load().unwrap_or(0.0),
        DeviceType::AtlasH | DeviceType::AtlasL | DeviceType::Orin => 0.0,
    }
}

fn rknpu_load() -> std::io::Result<f64> {
    let contents = std::fs::read_to_string("/sys/kernel/debug/rknpu/load")?;
    parse_rknpu_load(&contents)
        .ok_or_else(|| std::io::Error::other("no Core<i>: <pct>% entries found"))
}

fn parse_rknpu_load(contents: &str) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0u32;
    for token in contents.split_whitespace() {
        if let Some(rest) = token.strip_prefix("Core") {
            // token looks like "Core0:" followed separately by "45%"
            let _ = rest;
            continue;
        }
        if let Some(pct) = token.strip_suffix('%') {
            if let Ok(v) = pct.parse::<f64>() {
                sum += v;
                count += 1;
            }
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64 / 100.0)
    }
}
