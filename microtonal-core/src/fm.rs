//! # FM Sideband Prediction
//!
//! Predicts the spectrum of a simple two-operator FM pair. Sideband `n` sits
//! at `carrier + n · modulator` with amplitude `|Jn(index)|`, where `Jn` is the
//! Bessel function of the first kind.
//!
//! Sidebands below 0 Hz reflect back into the audible range with inverted
//! phase, so a reflected sideband that lands on an existing one partially
//! cancels it.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::pitch::Pitch;

/// Upper bound on sidebands walked per branch.
pub const MAX_SIDEBANDS: usize = 4096;

/// Largest modulation index `predict_fm` accepts.
pub const MAX_MODULATION_INDEX: f64 = 1000.0;

/// Cap on quadrature samples for a single Bessel evaluation.
const MAX_BESSEL_SAMPLES: f64 = 4_194_304.0;

/// Relative distance under which a reflected sideband lands on an existing one.
const COLLISION_TOLERANCE: f64 = 1e-6;

/// FM prediction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmParams {
    /// Carrier frequency in Hz.
    pub carrier_freq: f64,
    /// Modulator frequency in Hz.
    pub modulator_freq: f64,
    /// Modulation index.
    pub modulation_index: f64,
    pub min_freq: f64,
    pub max_freq: f64,
    /// Sidebands weaker than this are left out.
    pub min_amp: f64,
}

impl Default for FmParams {
    fn default() -> Self {
        Self {
            carrier_freq: 220.0,
            modulator_freq: 440.0,
            modulation_index: 5.0,
            min_freq: 55.0,
            max_freq: 2000.0,
            min_amp: 0.1,
        }
    }
}

impl FmParams {
    fn is_valid(&self) -> bool {
        let finite = [
            self.carrier_freq,
            self.modulator_freq,
            self.modulation_index,
            self.min_freq,
            self.max_freq,
            self.min_amp,
        ]
        .iter()
        .all(|v| v.is_finite());

        finite
            && self.carrier_freq > 0.0
            && self.modulator_freq > 0.0
            && (0.0..=MAX_MODULATION_INDEX).contains(&self.modulation_index)
            && self.min_freq >= 0.0
            && self.min_freq < self.max_freq
            && self.min_amp >= 0.0
    }
}

/// Bessel function of the first kind of integer order.
///
/// Evaluates `Jn(x) = 1/2π ∫ cos(nθ - x sin θ) dθ` over one period with the
/// trapezoidal rule, which converges geometrically for this periodic
/// integrand once the sample count exceeds `|n| + |x|`. Orders beyond
/// `2|x| + 256` are below double precision and return 0. The sample count is
/// capped, so precision degrades for `|x|` in the millions. A non-finite `x`
/// returns NaN.
pub fn bessel_j(order: i32, x: f64) -> f64 {
    if !x.is_finite() {
        return f64::NAN;
    }
    let n = f64::from(order);
    let order_abs = f64::from(order.unsigned_abs());
    if order_abs > 2.0 * x.abs() + 256.0 {
        return 0.0;
    }
    let samples = (2.0 * (order_abs + x.abs().ceil()) + 64.0).min(MAX_BESSEL_SAMPLES) as usize;
    let step = 2.0 * PI / samples as f64;
    let sum: f64 = (0..samples)
        .map(|j| {
            let theta = j as f64 * step;
            (n * theta - x * theta.sin()).cos()
        })
        .sum();
    sum / samples as f64
}

/// Predicts the sidebands of an FM pair inside `[min_freq, max_freq]`.
///
/// # Returns
/// Sidebands ascending by frequency, each carrying its amplitude. Empty when
/// the parameters are degenerate: non-positive operator frequencies, an
/// index outside `0..=MAX_MODULATION_INDEX`, a negative minimum amplitude,
/// or an inverted or negative window.
pub fn predict_fm(params: &FmParams) -> Vec<Pitch> {
    if !params.is_valid() {
        log::debug!("predict_fm: degenerate parameters {params:?}");
        return Vec::new();
    }
    let FmParams {
        carrier_freq: carrier,
        modulator_freq: modulator,
        modulation_index: index,
        min_freq,
        max_freq,
        min_amp,
    } = *params;

    let mut sidebands: Vec<(f64, f64)> = Vec::new();

    // Positive branch, walking down from the highest sideband in range.
    let highest = ((max_freq - carrier) / modulator).floor() as i64;
    for n in (highest.saturating_sub(MAX_SIDEBANDS as i64 - 1)..=highest).rev() {
        let freq = carrier + n as f64 * modulator;
        if freq < min_freq || freq <= 0.0 {
            break;
        }
        sidebands.push((freq, sideband_amp(n, index)));
    }

    // Negative branch, folded back by absolute value.
    let highest = ((-min_freq - carrier) / modulator).floor() as i64;
    for n in (highest.saturating_sub(MAX_SIDEBANDS as i64 - 1)..=highest).rev() {
        let freq = carrier + n as f64 * modulator;
        if freq < -max_freq {
            break;
        }
        if freq >= 0.0 {
            continue;
        }
        let folded = -freq;
        let amp = sideband_amp(n, index);
        match sidebands
            .iter_mut()
            .find(|(f, _)| (*f - folded).abs() <= COLLISION_TOLERANCE * folded)
        {
            Some((_, existing)) => *existing = (*existing - amp).abs(),
            None => sidebands.push((folded, amp)),
        }
    }

    sidebands.retain(|&(freq, amp)| freq > 0.0 && amp >= min_amp);
    sidebands.sort_by(|a, b| a.0.total_cmp(&b.0));
    sidebands
        .into_iter()
        .filter_map(|(freq, amp)| Some(Pitch::from_freq(freq)?.with_amplitude(amp)))
        .collect()
}

/// `|Jn(index)|`. Orders past `i32` are far beyond any accepted index and
/// carry no energy.
fn sideband_amp(order: i64, index: f64) -> f64 {
    i32::try_from(order).map_or(0.0, |order| bessel_j(order, index).abs())
}
