use std::collections::{HashMap, HashSet};
use std::path::Path;

use fleet_model::{DeviceType, Profile, TaskType};
use serde_json::Value;

use crate::error::RegistryError;

/// The immutable `(TaskType, DeviceType) -> Profile` table loaded once at
/// startup from `static_info.json`.
///
/// Unknown `TaskType`/`DeviceType` strings in the file are skipped rather
/// than rejected, matching the original loader's tolerance for profiles
/// describing hardware this build doesn't know about yet.
#[derive(Debug)]
pub struct StaticProfileStore {
    table: HashMap<TaskType, HashMap<DeviceType, Profile>>,
}

impl StaticProfileStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RegistryError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&raw, path)
    }

    fn from_str(raw: &str, path: &Path) -> Result<Self, RegistryError> {
        let root: HashMap<String, HashMap<String, Profile>> =
            serde_json::from_str(raw).map_err(|source| RegistryError::ParseFile {
                path: path.display().to_string(),
                source,
            })?;

        let mut table: HashMap<TaskType, HashMap<DeviceType, Profile>> = HashMap::new();
        for (tt_raw, by_device) in root {
            let Ok(tt) = tt_raw.parse::<TaskType>() else {
                tracing::warn!(task_type = %tt_raw, "skipping unknown task type in static profile file");
                continue;
            };
            let mut devices = HashMap::new();
            for (dt_raw, profile) in by_device {
                let Ok(dt) = dt_raw.parse::<DeviceType>() else {
                    tracing::warn!(device_type = %dt_raw, task_type = %tt_raw, "skipping unknown device type in static profile file");
                    continue;
                };
                devices.insert(dt, profile);
            }
            table.insert(tt, devices);
        }

        Ok(Self { table })
    }

    /// All task types this store has at least one profile for on `dt`.
    ///
    /// Used by the registry on node registration to pre-populate the
    /// `ServiceSlot` table for that device type.
    pub fn task_types_for_device(&self, dt: DeviceType) -> HashSet<TaskType> {
        self.table
            .iter()
            .filter(|(_, by_device)| by_device.contains_key(&dt))
            .map(|(tt, _)| *tt)
            .collect()
    }

    pub fn profile(&self, tt: TaskType, dt: DeviceType) -> Result<&Profile, RegistryError> {
        self.table
            .get(&tt)
            .and_then(|by_device| by_device.get(&dt))
            .ok_or(RegistryError::UnknownProfile {
                task_type: tt,
                device_type: dt,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "YoloV5": {
                "RK3588": {
                    "spec": {
                        "container_name": "yolov5-rk3588",
                        "image": "fleet/yolov5:rk3588",
                        "cmds": [],
                        "args": [],
                        "env": [],
                        "binds": [],
                        "devices": ["/dev/dri"],
                        "host_port": 18080,
                        "container_port": 8080
                    },
                    "overhead": {"cpu_usage": 0.2, "mem_usage": 0.3, "xpu_usage": 0.5}
                },
                "UNKNOWN_DEVICE": {
                    "spec": {
                        "container_name": "x",
                        "image": "x",
                        "cmds": [], "args": [], "env": [], "binds": [], "devices": [],
                        "host_port": 1, "container_port": 1
                    },
                    "overhead": {"cpu_usage": 0.0, "mem_usage": 0.0, "xpu_usage": 0.0}
                }
            },
            "Frobnicate": {
                "RK3588": {
                    "spec": {
                        "container_name": "x",
                        "image": "x",
                        "cmds": [], "args": [], "env": [], "binds": [], "devices": [],
                        "host_port": 1, "container_port": 1
                    },
                    "overhead": {"cpu_usage": 0.0, "mem_usage": 0.0, "xpu_usage": 0.0}
                }
            }
        }"#
    }

    #[test]
    fn loads_known_leaf_and_skips_unknown_strings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_json().as_bytes()).unwrap();

        let store = StaticProfileStore::load(file.path()).unwrap();

        let profile = store.profile(TaskType::YoloV5, DeviceType::Rk3588).unwrap();
        assert_eq!(profile.spec.container_name, "yolov5-rk3588");

        assert!(store.task_types_for_device(DeviceType::Rk3588).contains(&TaskType::YoloV5));
        // the "Frobnicate" task type is unknown and must have been skipped
        assert_eq!(store.task_types_for_device(DeviceType::Rk3588).len(), 1);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_json().as_bytes()).unwrap();
        let store = StaticProfileStore::load(file.path()).unwrap();

        let err = store.profile(TaskType::YoloV5, DeviceType::AtlasH).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownProfile { .. }));
    }
}
