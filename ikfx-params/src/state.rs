//! Preset persistence
//!
//! A state document is plain text:
//!
//! ```text
//! [ikfx-state]
//! engine=reverb
//! size=0.5
//! ...
//! ```

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::layout::EngineKind;
use crate::store::{ParamError, ParameterStore};

const HEADER: &str = "[ikfx-state]";

/// Errors from saving or restoring state
#[derive(Error, Debug)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("State is for engine '{found}', expected '{expected}'")]
    EngineMismatch { expected: String, found: String },
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Parameter error: {0}")]
    Param(#[from] ParamError),
}

impl ParameterStore {
    /// Serialize every parameter
    pub fn save_state(&self) -> String {
        let mut lines = Vec::with_capacity(self.layout().len() + 2);
        lines.push(HEADER.to_string());
        lines.push(format!("engine={}", self.engine().name()));
        for (spec, value) in self.iter() {
            lines.push(format!("{}={}", spec.id, value));
        }
        let mut content = lines.join("\n");
        content.push('\n');
        content
    }

    /// Apply a state document.
    ///
    /// Values go through `set`, so they are clamped like fresh edits.
    /// Unknown keys are skipped. Nothing is applied if the header or
    /// engine tag is wrong.
    pub fn restore_state(&self, content: &str) -> Result<(), StateError> {
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        match lines.next() {
            Some((_, HEADER)) => {}
            Some((line, _)) => {
                return Err(StateError::Parse {
                    line,
                    message: format!("expected {}", HEADER),
                })
            }
            None => {
                return Err(StateError::Parse {
                    line: 0,
                    message: "empty state".to_string(),
                })
            }
        }

        let mut values = Vec::new();
        let mut engine = None;
        for (line, text) in lines {
            let Some((key, value)) = text.split_once('=') else {
                return Err(StateError::Parse {
                    line,
                    message: format!("expected key=value, got '{}'", text),
                });
            };
            let key = key.trim();
            let value = value.trim();

            if key == "engine" {
                engine = Some(value.to_string());
                continue;
            }

            if self.index_of(key).is_none() {
                debug!(key, "Ignoring unknown state key");
                continue;
            }

            let parsed: f32 = value.parse().map_err(|_| StateError::Parse {
                line,
                message: format!("'{}' is not a number", value),
            })?;
            values.push((key, parsed));
        }

        let expected = self.engine().name();
        match engine {
            Some(found) if EngineKind::from_name(&found) == Some(self.engine()) => {}
            found => {
                return Err(StateError::EngineMismatch {
                    expected: expected.to_string(),
                    found: found.unwrap_or_default(),
                })
            }
        }

        for (key, value) in values {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// Write state to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.save_state())?;
        info!(path = %path.display(), engine = self.engine().name(), "Saved preset");
        Ok(())
    }

    /// Read and apply state from a file
    pub fn load_from(&self, path: &Path) -> Result<(), StateError> {
        let content = fs::read_to_string(path)?;
        if let Err(e) = self.restore_state(&content) {
            warn!(path = %path.display(), error = %e, "Rejected preset");
            return Err(e);
        }
        info!(path = %path.display(), engine = self.engine().name(), "Loaded preset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ikfx-state-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_save_format() {
        let store = ParameterStore::new(EngineKind::Distortion);
        let state = store.save_state();
        let mut lines = state.lines();
        assert_eq!(lines.next(), Some("[ikfx-state]"));
        assert_eq!(lines.next(), Some("engine=distortion"));
        assert_eq!(lines.next(), Some("ghostMode=0"));
        assert_eq!(lines.next(), Some("drive=1"));
    }

    #[test]
    fn test_restore_reproduces_values() {
        let source = ParameterStore::new(EngineKind::Reverb);
        source.set("size", 0.83).unwrap();
        source.set("type", 2.0).unwrap();
        source.set("highcut", 7300.0).unwrap();
        source.set("mix", 0.3).unwrap();

        let target = ParameterStore::new(EngineKind::Reverb);
        target.restore_state(&source.save_state()).unwrap();
        for ((_, a), (_, b)) in source.iter().zip(target.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_restore_clamps_and_ignores_unknown() {
        let store = ParameterStore::new(EngineKind::Distortion);
        let state = "[ikfx-state]\nengine=distortion\ndrive=99\nwobble=3\n# note\ntone=0.2\n";
        store.restore_state(state).unwrap();
        assert_eq!(store.get("drive").unwrap(), 25.0);
        assert_eq!(store.get("tone").unwrap(), 0.2);
    }

    #[test]
    fn test_restore_rejects_other_engine() {
        let reverb = ParameterStore::new(EngineKind::Reverb);
        let distortion = ParameterStore::new(EngineKind::Distortion);
        distortion.set("mix", 0.1).unwrap();

        let err = reverb.restore_state(&distortion.save_state()).unwrap_err();
        assert!(matches!(err, StateError::EngineMismatch { .. }));
        // Nothing applied
        assert_eq!(reverb.get("mix").unwrap(), 0.3);
    }

    #[test]
    fn test_restore_rejects_malformed() {
        let store = ParameterStore::new(EngineKind::Reverb);
        assert!(matches!(
            store.restore_state("size=0.5"),
            Err(StateError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            store.restore_state("[ikfx-state]\nengine=reverb\nsize=big"),
            Err(StateError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            store.restore_state("[ikfx-state]\nsize=0.5"),
            Err(StateError::EngineMismatch { .. })
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let path = temp_path("preset.txt");
        let store = ParameterStore::new(EngineKind::Distortion);
        store.set("destroy", 64.0).unwrap();
        store.save_to(&path).unwrap();

        let loaded = ParameterStore::new(EngineKind::Distortion);
        loaded.load_from(&path).unwrap();
        assert_eq!(loaded.get("destroy").unwrap(), 64.0);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let store = ParameterStore::new(EngineKind::Reverb);
        let err = store.load_from(&temp_path("does-not-exist.txt")).unwrap_err();
        assert!(matches!(err, StateError::Io(_)));
    }
}
