use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The closed set of inference/transcode workloads the fleet can run.
///
/// The string form is the canonical service name used both as the JSON
/// wire value and as the key into the static profile file — it is
/// case-sensitive by design, matching the upstream container/service
/// naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaskType {
    YoloV5,
    MobileNet,
    Bert,
    ResNet50,
    Deeplabv3,
    Transcoding,
    Decoding,
    Encoding,
    Unknown,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::YoloV5 => "YoloV5",
            TaskType::MobileNet => "MobileNet",
            TaskType::Bert => "Bert",
            TaskType::ResNet50 => "ResNet50",
            TaskType::Deeplabv3 => "deeplabv3",
            TaskType::Transcoding => "transcoding",
            TaskType::Decoding => "decoding",
            TaskType::Encoding => "encoding",
            TaskType::Unknown => "Unknown",
        }
    }

    /// All known (non-`Unknown`) variants, in a stable order.
    pub fn known() -> &'static [TaskType] {
        &[
            TaskType::YoloV5,
            TaskType::MobileNet,
            TaskType::Bert,
            TaskType::ResNet50,
            TaskType::Deeplabv3,
            TaskType::Transcoding,
            TaskType::Decoding,
            TaskType::Encoding,
        ]
    }
}

impl FromStr for TaskType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "YoloV5" => Ok(TaskType::YoloV5),
            "MobileNet" => Ok(TaskType::MobileNet),
            "Bert" => Ok(TaskType::Bert),
            "ResNet50" => Ok(TaskType::ResNet50),
            "deeplabv3" => Ok(TaskType::Deeplabv3),
            "transcoding" => Ok(TaskType::Transcoding),
            "decoding" => Ok(TaskType::Decoding),
            "encoding" => Ok(TaskType::Encoding),
            "Unknown" => Ok(TaskType::Unknown),
            other => Err(ModelError::UnknownTaskType(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskType {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TaskType> for String {
    fn from(t: TaskType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        for tt in TaskType::known().iter().copied().chain([TaskType::Unknown]) {
            let s = tt.as_str();
            let parsed: TaskType = s.parse().unwrap();
            assert_eq!(parsed, tt);
        }
    }

    #[test]
    fn case_sensitive() {
        assert!("yolov5".parse::<TaskType>().is_err());
        assert!("bert".parse::<TaskType>().is_err());
    }

    #[test]
    fn unknown_string_is_an_error_not_unknown_variant() {
        let err = "Frobnicate".parse::<TaskType>().unwrap_err();
        assert!(matches!(err, ModelError::UnknownTaskType(s) if s == "Frobnicate"));
    }

    #[test]
    fn serde_matches_canonical_string() {
        let json = serde_json::to_string(&TaskType::Deeplabv3).unwrap();
        assert_eq!(json, "\"deeplabv3\"");
        let back: TaskType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskType::Deeplabv3);
    }
}
