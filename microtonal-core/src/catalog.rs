//! # Scale Catalog
//!
//! Named scales the exercise generator can draw from. Catalogs are loaded
//! from JSON of the form
//!
//! ```json
//! { "scales": [ { "name": "12edo",
//!                 "notes": [ { "name": "C", "cents": 0 }, ... ],
//!                 "intervals": [ { "name": "unison", "cents": 0 }, ... ] } ] }
//! ```
//!
//! and every scale is validated while loading, so a malformed entry is
//! rejected here instead of failing later inside quantization.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::scale::{Interval, Scale, ScaleStep};

/// A list of validated scales, searchable by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleCatalog {
    pub scales: Vec<Scale>,
}

impl ScaleCatalog {
    pub fn new(scales: Vec<Scale>) -> Self {
        Self { scales }
    }

    /// Loads and validates a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: ScaleCatalog =
            serde_json::from_str(json).context("Failed to load scale catalog")?;
        log::info!("Loaded scale catalog with {} scales", catalog.scales.len());
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize scale catalog")
    }

    pub fn find(&self, name: &str) -> Option<&Scale> {
        self.scales.iter().find(|scale| scale.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scales.iter().map(Scale::name)
    }

    /// Adds a scale, replacing any scale with the same name.
    pub fn insert(&mut self, scale: Scale) {
        match self.scales.iter_mut().find(|s| s.name() == scale.name()) {
            Some(existing) => *existing = scale,
            None => self.scales.push(scale),
        }
    }
}

/// Equal divisions of the octave offered out of the box.
pub const BUILTIN_EDOS: [usize; 4] = [12, 19, 24, 31];

/// Statically built catalog of the bundled scales.
static BUILTIN: Lazy<ScaleCatalog> = Lazy::new(|| {
    let mut scales = Vec::with_capacity(BUILTIN_EDOS.len());
    scales.extend(twelve_tone_scale());
    for divisions in BUILTIN_EDOS.into_iter().filter(|&d| d != 12) {
        match Scale::equal_division(format!("{divisions}edo"), divisions, 1200.0) {
            Ok(scale) => scales.push(scale),
            Err(e) => log::warn!("Skipping bundled scale {divisions}edo: {e}"),
        }
    }
    ScaleCatalog::new(scales)
});

/// The bundled catalog: 12, 19, 24 and 31 equal divisions of the octave.
pub fn builtin() -> &'static ScaleCatalog {
    &BUILTIN
}

fn twelve_tone_scale() -> Option<Scale> {
    const NOTE_NAMES: [&str; 13] = [
        "C", "C♯", "D", "D♯", "E", "F", "F♯", "G", "G♯", "A", "A♯", "B", "C",
    ];
    const INTERVAL_NAMES: [&str; 13] = [
        "unison",
        "minor 2nd",
        "major 2nd",
        "minor 3rd",
        "major 3rd",
        "perfect 4th",
        "tritone",
        "perfect 5th",
        "minor 6th",
        "major 6th",
        "minor 7th",
        "major 7th",
        "octave",
    ];

    let notes = NOTE_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| ScaleStep::new(*name, i as f64 * 100.0))
        .collect();
    let intervals = INTERVAL_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| Interval::new(*name, i as f64 * 100.0))
        .collect();

    Scale::new("12edo", notes, intervals)
        .map_err(|e| log::warn!("Skipping bundled scale 12edo: {e}"))
        .ok()
}
