//! Lock-free parameter storage shared between control and audio threads

use std::sync::atomic::{AtomicU32, Ordering};

use thiserror::Error;

use crate::layout::{EngineKind, ParameterSpec};

/// Errors from parameter access
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("Value for {id} is not a finite number: {value}")]
    NotFinite { id: String, value: f32 },
}

/// Current value of every parameter of one engine.
///
/// Each value lives in an `AtomicU32` holding f32 bits, so the audio
/// thread reads without locking or allocating. Share via `Arc`.
pub struct ParameterStore {
    engine: EngineKind,
    layout: &'static [ParameterSpec],
    values: Vec<AtomicU32>,
}

impl ParameterStore {
    /// Create a store holding the engine's defaults
    pub fn new(engine: EngineKind) -> Self {
        let layout = engine.layout();
        Self {
            engine,
            layout,
            values: layout
                .iter()
                .map(|spec| AtomicU32::new(spec.default.to_bits()))
                .collect(),
        }
    }

    /// Engine this store belongs to
    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Parameter layout in storage order
    pub fn layout(&self) -> &'static [ParameterSpec] {
        self.layout
    }

    /// Index of a parameter id
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.layout.iter().position(|spec| spec.id == id)
    }

    fn lookup(&self, id: &str) -> Result<usize, ParamError> {
        self.index_of(id)
            .ok_or_else(|| ParamError::UnknownParameter(id.to_string()))
    }

    /// Set a value in plain units.
    ///
    /// The value is clamped to the parameter's range and snapped to its
    /// step; the stored value is returned.
    pub fn set(&self, id: &str, value: f32) -> Result<f32, ParamError> {
        let index = self.lookup(id)?;
        if !value.is_finite() {
            return Err(ParamError::NotFinite {
                id: id.to_string(),
                value,
            });
        }
        let stored = self.layout[index].range().snap(value);
        self.values[index].store(stored.to_bits(), Ordering::Relaxed);
        Ok(stored)
    }

    /// Set a value from a 0.0 - 1.0 control position
    pub fn set_normalised(&self, id: &str, normalised: f32) -> Result<f32, ParamError> {
        let index = self.lookup(id)?;
        if !normalised.is_finite() {
            return Err(ParamError::NotFinite {
                id: id.to_string(),
                value: normalised,
            });
        }
        let stored = self.layout[index].range().from_normalised(normalised);
        self.values[index].store(stored.to_bits(), Ordering::Relaxed);
        Ok(stored)
    }

    /// Current value in plain units
    pub fn get(&self, id: &str) -> Result<f32, ParamError> {
        let index = self.lookup(id)?;
        Ok(self.value_at(index))
    }

    /// Current value by storage index
    #[inline]
    pub fn value_at(&self, index: usize) -> f32 {
        f32::from_bits(self.values[index].load(Ordering::Relaxed))
    }

    /// Restore every parameter's default
    pub fn reset_to_defaults(&self) {
        for (spec, value) in self.layout.iter().zip(&self.values) {
            value.store(spec.default.to_bits(), Ordering::Relaxed);
        }
    }

    /// `(spec, value)` pairs in layout order
    pub fn iter(&self) -> impl Iterator<Item = (&'static ParameterSpec, f32)> + '_ {
        self.layout
            .iter()
            .enumerate()
            .map(move |(i, spec)| (spec, self.value_at(i)))
    }
}
