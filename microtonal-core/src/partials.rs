//! # Partial Analysis Module
//!
//! Relates frequencies through the harmonic series:
//! - [`common_fundamentals`] looks for a frequency of which every input is
//!   (approximately) an integer partial
//! - [`common_partials`] looks for a frequency that is (approximately) an
//!   integer partial of every input
//!
//! Matching happens in pitch space, so the tolerance is given in cents.

use serde::{Deserialize, Serialize};

use crate::config::PartialSearchOptions;
use crate::pitch::Pitch;
use crate::tuning::calculate_cents_deviation;

/// Highest partial number considered for a single input.
pub const MAX_PARTIAL_NUMBER: u32 = 4096;

/// One partial of a harmonic series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partial {
    pub number: u32,    // n = 1, 2, 3...
    pub frequency: f64, // Hz
}

/// A fundamental shared by all inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonFundamental {
    /// Partial number of each input over the fundamental, in input order.
    pub partial_numbers: Vec<u32>,
    pub fundamental: Pitch,
}

/// A partial shared by all inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonPartial {
    /// Partial number of the shared partial over each input, in input order.
    pub partial_numbers: Vec<u32>,
    pub partial: Pitch,
}

fn is_valid_freq(freq: f64) -> bool {
    freq.is_finite() && freq > 0.0
}

fn is_valid_window(min_freq: f64, max_freq: f64, tolerance_cents: f64) -> bool {
    is_valid_freq(min_freq) && max_freq.is_finite() && min_freq < max_freq && tolerance_cents >= 0.0
}

/// Every `freq / p` that falls in `[min_freq, max_freq]`.
fn fundamental_candidates(freq: f64, min_freq: f64, max_freq: f64) -> Vec<Partial> {
    let first = (freq / max_freq).ceil().max(1.0) as u32;
    (first..=MAX_PARTIAL_NUMBER)
        .map(|number| Partial {
            number,
            frequency: freq / f64::from(number),
        })
        .take_while(|p| p.frequency >= min_freq)
        .collect()
}

/// Every `n · base` that falls in `[min_freq, max_freq]`.
fn partial_candidates(base: f64, min_freq: f64, max_freq: f64) -> Vec<Partial> {
    let first = (min_freq / base).ceil().max(1.0) as u32;
    (first..=MAX_PARTIAL_NUMBER)
        .map(|number| Partial {
            number,
            frequency: base * f64::from(number),
        })
        .take_while(|p| p.frequency <= max_freq)
        .collect()
}

/// Matches the first list's candidates against all other lists.
///
/// For each candidate of the first list, the nearest candidate of every other
/// list must lie within `tolerance_cents`. Each full match yields the partial
/// numbers in list order and the mean of the matched frequencies.
fn match_candidates(lists: &[Vec<Partial>], tolerance_cents: f64) -> Vec<(Vec<u32>, f64)> {
    let Some((driver, others)) = lists.split_first() else {
        return Vec::new();
    };

    driver
        .iter()
        .filter_map(|candidate| {
            let mut numbers = vec![candidate.number];
            let mut sum = candidate.frequency;
            for list in others {
                let nearest = list.iter().min_by(|a, b| {
                    let da = calculate_cents_deviation(a.frequency, candidate.frequency).abs();
                    let db = calculate_cents_deviation(b.frequency, candidate.frequency).abs();
                    da.total_cmp(&db)
                })?;
                if calculate_cents_deviation(nearest.frequency, candidate.frequency).abs()
                    > tolerance_cents
                {
                    return None;
                }
                numbers.push(nearest.number);
                sum += nearest.frequency;
            }
            Some((numbers, sum / lists.len() as f64))
        })
        .collect()
}

/// Finds fundamentals in `[min_freq, max_freq]` shared by all `freqs`.
///
/// The search never goes above the highest input. With a single input every
/// candidate fundamental is returned.
///
/// # Returns
/// An empty list for degenerate input: an empty or non-positive frequency
/// list, an input below `min_freq`, an inverted window or a negative tolerance.
pub fn common_fundamentals(
    freqs: &[f64],
    min_freq: f64,
    max_freq: f64,
    tolerance_cents: f64,
) -> Vec<CommonFundamental> {
    if freqs.is_empty()
        || !freqs.iter().all(|&f| is_valid_freq(f))
        || !is_valid_window(min_freq, max_freq, tolerance_cents)
    {
        log::debug!("common_fundamentals: degenerate input {freqs:?} in [{min_freq}, {max_freq}]");
        return Vec::new();
    }
    let lowest = freqs.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = freqs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lowest < min_freq {
        return Vec::new();
    }
    let upper = max_freq.min(highest);

    let lists: Vec<Vec<Partial>> = freqs
        .iter()
        .map(|&freq| fundamental_candidates(freq, min_freq, upper))
        .collect();

    match_candidates(&lists, tolerance_cents)
        .into_iter()
        .filter_map(|(partial_numbers, mean)| {
            Some(CommonFundamental {
                partial_numbers,
                fundamental: Pitch::from_freq(mean)?,
            })
        })
        .collect()
}

/// Finds partials in `[min_freq, max_freq]` shared by all `base_freqs`.
///
/// # Returns
/// An empty list for degenerate input: an empty or non-positive frequency
/// list, an inverted window or a negative tolerance.
pub fn common_partials(
    base_freqs: &[f64],
    min_freq: f64,
    max_freq: f64,
    tolerance_cents: f64,
) -> Vec<CommonPartial> {
    if base_freqs.is_empty()
        || !base_freqs.iter().all(|&f| is_valid_freq(f))
        || !is_valid_window(min_freq, max_freq, tolerance_cents)
    {
        log::debug!("common_partials: degenerate input {base_freqs:?} in [{min_freq}, {max_freq}]");
        return Vec::new();
    }

    let lists: Vec<Vec<Partial>> = base_freqs
        .iter()
        .map(|&base| partial_candidates(base, min_freq, max_freq))
        .collect();

    match_candidates(&lists, tolerance_cents)
        .into_iter()
        .filter_map(|(partial_numbers, mean)| {
            Some(CommonPartial {
                partial_numbers,
                partial: Pitch::from_freq(mean)?,
            })
        })
        .collect()
}

impl PartialSearchOptions {
    pub fn common_fundamentals(&self, freqs: &[f64]) -> Vec<CommonFundamental> {
        common_fundamentals(freqs, self.min_freq, self.max_freq, self.tolerance_cents)
    }

    pub fn common_partials(&self, base_freqs: &[f64]) -> Vec<CommonPartial> {
        common_partials(base_freqs, self.min_freq, self.max_freq, self.tolerance_cents)
    }
}

/// The first `count` partials of `base_freq`, starting with the fundamental.
pub fn first_partials(base_freq: f64, count: u32) -> Vec<Pitch> {
    (1..=count)
        .filter_map(|n| Pitch::from_freq(base_freq * f64::from(n)))
        .collect()
}

/// Parses a list of frequencies separated by whitespace or commas.
///
/// # Returns
/// * `None` - Some entry is not a positive number
pub fn parse_frequency_list(text: &str) -> Option<Vec<f64>> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok().filter(|&f| is_valid_freq(f)))
        .collect()
}
