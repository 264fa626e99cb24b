use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The two scheduling policies exposed via `/schedule?stargety=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleStrategy {
    Load,
    RoundRobin,
}

impl Default for ScheduleStrategy {
    fn default() -> Self {
        ScheduleStrategy::Load
    }
}

impl FromStr for ScheduleStrategy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "load" => Ok(ScheduleStrategy::Load),
            "roundrobin" => Ok(ScheduleStrategy::RoundRobin),
            other => Err(ModelError::UnknownScheduleStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for ScheduleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScheduleStrategy::Load => "load",
            ScheduleStrategy::RoundRobin => "roundrobin",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_values() {
        assert_eq!("load".parse::<ScheduleStrategy>().unwrap(), ScheduleStrategy::Load);
        assert_eq!(
            "roundrobin".parse::<ScheduleStrategy>().unwrap(),
            ScheduleStrategy::RoundRobin
        );
    }

    #[test]
    fn rejects_unknown() {
        assert!("round_robin".parse::<ScheduleStrategy>().is_err());
    }
}
