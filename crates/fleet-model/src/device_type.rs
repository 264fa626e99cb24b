use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The closed set of hardware families a node can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeviceType {
    Rk3588,
    AtlasL,
    AtlasH,
    Orin,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Rk3588 => "RK3588",
            DeviceType::AtlasL => "ATLAS_L",
            DeviceType::AtlasH => "ATLAS_H",
            DeviceType::Orin => "ORIN",
        }
    }

    pub fn all() -> &'static [DeviceType] {
        &[
            DeviceType::Rk3588,
            DeviceType::AtlasL,
            DeviceType::AtlasH,
            DeviceType::Orin,
        ]
    }
}

impl FromStr for DeviceType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RK3588" => Ok(DeviceType::Rk3588),
            "ATLAS_L" => Ok(DeviceType::AtlasL),
            "ATLAS_H" => Ok(DeviceType::AtlasH),
            "ORIN" => Ok(DeviceType::Orin),
            other => Err(ModelError::UnknownDeviceType(other.to_string())),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DeviceType> for String {
    fn from(d: DeviceType) -> Self {
        d.as_str().to_string()
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
