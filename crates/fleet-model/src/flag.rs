use serde::{Deserialize, Serialize};

/// A boolean that defaults to `true` when absent from JSON.
///
/// `host_config_privileged`/`fail_on_non_zero`-style flags in the original
/// profile format are opt-out, not opt-in: leaving them out of a profile
/// leaf should not silently disable the safer behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flag(bool);

impl Flag {
    pub fn enabled() -> Self {
        Self(true)
    }

    pub fn disabled() -> Self {
        Self(false)
    }

    pub fn get(self) -> bool {
        self.0
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::enabled()
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl From<Flag> for bool {
    fn from(f: Flag) -> Self {
        f.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_enabled() {
        assert!(Flag::default().get());
    }

    #[test]
    fn json_default_missing_field() {
        #[derive(serde::Deserialize)]
        struct S {
            #[serde(default)]
            f: Flag,
        }
        let s: S = serde_json::from_str("{}").unwrap();
        assert!(s.f.get());
    }
}
