//! Environment access used during console resolution and `TERM` negotiation

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};

/// Read/write view of an environment block
pub trait Environment {
    /// Look up `key`; an empty value is still a value
    fn var(&self, key: &str) -> Option<OsString>;

    /// Set `key`, replacing any previous value
    fn set_var(&mut self, key: &str, value: &OsStr);
}

/// The process environment, inherited by the program we exec
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }

    fn set_var(&mut self, key: &str, value: &OsStr) {
        // Single-threaded until exec, so mutating environ is sound here.
        std::env::set_var(key, value);
    }
}

/// In-memory environment
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, OsString>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }
}

impl Environment for MapEnv {
    fn var(&self, key: &str) -> Option<OsString> {
        self.vars.get(key).cloned()
    }

    fn set_var(&mut self, key: &str, value: &OsStr) {
        self.vars.insert(key.to_string(), value.to_os_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_env_empty_is_set() {
        let env = MapEnv::new().with("TERM", "");
        assert_eq!(env.var("TERM"), Some(OsString::new()));
        assert_eq!(env.var("CONSOLE"), None);
    }

    #[test]
    fn test_map_env_set_overwrites() {
        let mut env = MapEnv::new().with("TERM", "linux");
        env.set_var("TERM", OsStr::new("vt102"));
        assert_eq!(env.var("TERM"), Some(OsString::from("vt102")));
    }
}
