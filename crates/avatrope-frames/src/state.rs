//! Per-generator persisted state.
//!
//! Each generator owns one TOML document named after it inside the state
//! directory. Loading never fails on a bad document: the failure is logged
//! and the generator's defaults are written back so later runs are stable.

use std::{
    fmt, fs,
    io::ErrorKind,
    path::PathBuf,
};

use avatrope_types::{AvatropeError, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

/// State that can round-trip through the store.
pub trait PersistentState: Serialize + DeserializeOwned {
    /// Rejects documents that parse but break the generator's invariants.
    fn check(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Why a stored document could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateLoadFailure {
    Missing,
    Unreadable(String),
    Malformed(String),
    Invalid(String),
}

impl fmt::Display for StateLoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateLoadFailure::Missing => write!(f, "no state file"),
            StateLoadFailure::Unreadable(err) => write!(f, "state file unreadable: {err}"),
            StateLoadFailure::Malformed(err) => write!(f, "state file malformed: {err}"),
            StateLoadFailure::Invalid(err) => write!(f, "state file invalid: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateOrigin {
    Loaded,
    Defaulted(StateLoadFailure),
    Reset,
}

#[derive(Debug, Clone)]
pub struct LoadedState<S> {
    pub state: S,
    pub origin: StateOrigin,
}

#[derive(Debug, Clone)]
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.toml"))
    }

    pub fn read<S: PersistentState>(&self, name: &str) -> std::result::Result<S, StateLoadFailure> {
        let path = self.path_for(name);
        let contents = fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StateLoadFailure::Missing,
            _ => StateLoadFailure::Unreadable(err.to_string()),
        })?;
        let state: S =
            toml::from_str(&contents).map_err(|err| StateLoadFailure::Malformed(err.to_string()))?;
        state.check().map_err(StateLoadFailure::Invalid)?;
        Ok(state)
    }

    /// Loads `name`, or applies and persists `defaults` when the stored
    /// document is missing or unusable.
    pub fn load_or_init<S, F>(&self, name: &str, defaults: F) -> Result<LoadedState<S>>
    where
        S: PersistentState,
        F: FnOnce() -> S,
    {
        match self.read(name) {
            Ok(state) => {
                debug!("Loaded {name} state from {:?}", self.path_for(name));
                Ok(LoadedState {
                    state,
                    origin: StateOrigin::Loaded,
                })
            }
            Err(failure) => {
                info!("Initializing {name} defaults ({failure})");
                let state = defaults();
                self.save(name, &state)?;
                Ok(LoadedState {
                    state,
                    origin: StateOrigin::Defaulted(failure),
                })
            }
        }
    }

    /// Overwrites whatever is stored for `name` with `state`.
    pub fn reset<S: PersistentState>(&self, name: &str, state: S) -> Result<LoadedState<S>> {
        info!("Resetting {name} state");
        self.save(name, &state)?;
        Ok(LoadedState {
            state,
            origin: StateOrigin::Reset,
        })
    }

    pub fn save<S: PersistentState>(&self, name: &str, state: &S) -> Result<()> {
        let doc = toml::to_string(state)
            .map_err(|err| state_error(format!("failed to serialize {name} state: {err}")))?;
        fs::create_dir_all(&self.dir).map_err(|err| {
            state_error(format!("failed to create state dir {:?}: {err}", self.dir))
        })?;

        // write a sibling file first so readers never observe a partial document
        let path = self.path_for(name);
        let staging = self.dir.join(format!(".{name}.toml.tmp"));
        fs::write(&staging, doc)
            .map_err(|err| state_error(format!("failed to write {:?}: {err}", staging)))?;
        fs::rename(&staging, &path)
            .map_err(|err| state_error(format!("failed to replace {:?}: {err}", path)))?;
        Ok(())
    }
}

pub fn state_error(message: impl Into<String>) -> AvatropeError {
    AvatropeError::State(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        start_time: i64,
        period: i64,
    }

    impl PersistentState for Sample {
        fn check(&self) -> std::result::Result<(), String> {
            if self.period > 0 {
                Ok(())
            } else {
                Err("period must be positive".into())
            }
        }
    }

    fn defaults() -> Sample {
        Sample {
            start_time: 1_000,
            period: 60,
        }
    }

    #[test]
    fn missing_file_applies_and_persists_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());

        let first = store.load_or_init("Sample", defaults).expect("load");
        assert_eq!(first.origin, StateOrigin::Defaulted(StateLoadFailure::Missing));
        assert_eq!(first.state, defaults());
        assert!(store.path_for("Sample").exists());

        let second = store
            .load_or_init::<Sample, _>("Sample", || panic!("defaults must not be re-applied"))
            .expect("reload");
        assert_eq!(second.origin, StateOrigin::Loaded);
        assert_eq!(second.state, first.state);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());
        fs::write(store.path_for("Sample"), "start_time = [not toml").unwrap();

        let loaded = store.load_or_init("Sample", defaults).expect("load");
        assert!(matches!(
            loaded.origin,
            StateOrigin::Defaulted(StateLoadFailure::Malformed(_))
        ));
        assert_eq!(store.read::<Sample>("Sample").unwrap(), defaults());
    }

    #[test]
    fn invariant_violations_are_reported_as_invalid() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());
        fs::write(store.path_for("Sample"), "start_time = 5\nperiod = 0\n").unwrap();

        let err = store.read::<Sample>("Sample").unwrap_err();
        assert!(matches!(err, StateLoadFailure::Invalid(_)));
    }

    #[test]
    fn reset_overwrites_existing_state() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = StateStore::new(dir.path());
        store.save("Sample", &defaults()).unwrap();

        let fresh = Sample {
            start_time: 9_999,
            period: 30,
        };
        let reset = store.reset("Sample", fresh.clone()).expect("reset");
        assert_eq!(reset.origin, StateOrigin::Reset);
        assert_eq!(store.read::<Sample>("Sample").unwrap(), fresh);
        assert!(!dir.path().join(".Sample.toml.tmp").exists());
    }
}
