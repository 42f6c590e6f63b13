// Tempo - BPM state and tap-tempo estimation
// Converts a stream of tap timestamps into a bpm using outlier-filtered statistics

use std::fmt;

/// Default tempo in BPM
pub const DEFAULT_BPM: f64 = 120.0;

/// Surviving tap deltas needed before the estimate replaces the tempo
pub const MIN_TEMPO_TAPS: usize = 4;

/// Slowest tempo a tap sequence may produce
pub const MIN_BPM: f64 = 30.0;

/// Fastest tempo a tap sequence may produce
pub const MAX_BPM: f64 = 420.0;

/// Taps needed before any estimate is attempted
const MIN_TAPS_FOR_ESTIMATE: usize = 3;

/// Relative floor for the outlier band, so steady taps survive float noise
const BAND_FLOOR_RATIO: f64 = 1e-9;

/// Seconds per grid step at the given tempo
///
/// A quarter note spans `DIVISIONS / 4` steps, so one step is
/// `60 / bpm * 4 / DIVISIONS` seconds.
pub fn step_interval_seconds(bpm: f64, divisions: usize) -> f64 {
    60.0 / bpm * 4.0 / divisions as f64
}

/// Tap tempo estimator
///
/// Holds the current bpm and the tap history. The bpm only changes when a tap
/// sequence yields at least `min_taps` deltas after outlier rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct TapTempo {
    bpm: f64,
    taps: Vec<f64>,
    min_taps: usize,
}

impl TapTempo {
    /// Create an estimator at the given tempo
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm: if is_valid_bpm(bpm) { bpm } else { DEFAULT_BPM },
            taps: Vec::new(),
            min_taps: MIN_TEMPO_TAPS,
        }
    }

    /// Override the surviving-delta threshold (never below 2)
    pub fn with_min_taps(mut self, min_taps: usize) -> Self {
        self.min_taps = min_taps.max(2);
        self
    }

    /// Current tempo
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Set the tempo directly (project load)
    ///
    /// Values outside [`MIN_BPM`, `MAX_BPM`] are ignored.
    pub fn set_bpm(&mut self, bpm: f64) {
        if is_valid_bpm(bpm) {
            self.bpm = bpm;
        }
    }

    /// Surviving-delta threshold
    pub fn min_taps(&self) -> usize {
        self.min_taps
    }

    /// Recorded tap timestamps, in seconds
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Clear the tap history; the tempo is kept
    pub fn reset(&mut self) {
        self.taps.clear();
    }

    /// Record a tap at `now` (seconds, any monotonic origin)
    ///
    /// Returns the new bpm when this tap updated the tempo.
    pub fn tap_at(&mut self, now: f64) -> Option<f64> {
        self.taps.push(now);

        if self.taps.len() < MIN_TAPS_FOR_ESTIMATE {
            return None;
        }

        let bpm = self.estimate()?;
        self.bpm = bpm;
        Some(bpm)
    }

    /// Estimate the bpm from the current tap history without applying it
    pub fn estimate(&self) -> Option<f64> {
        let deltas: Vec<f64> = self.taps.windows(2).map(|w| w[1] - w[0]).collect();
        let survivors = reject_outliers(&deltas);

        if survivors.len() < self.min_taps.max(2) {
            return None;
        }

        let target = (mean(&survivors) + median(&survivors)) / 2.0;
        if !target.is_finite() || target <= 0.0 {
            return None;
        }

        let bpm = (60.0 / target).round();
        if !(MIN_BPM..=MAX_BPM).contains(&bpm) {
            return None;
        }

        Some(bpm)
    }
}

impl Default for TapTempo {
    fn default() -> Self {
        Self::new(DEFAULT_BPM)
    }
}

impl fmt::Display for TapTempo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BPM", self.bpm)
    }
}

/// Whether `bpm` is a tempo the deck can run and persist
pub fn is_valid_bpm(bpm: f64) -> bool {
    bpm.is_finite() && (MIN_BPM..=MAX_BPM).contains(&bpm)
}

/// Keep the deltas within two standard deviations of the mean
fn reject_outliers(deltas: &[f64]) -> Vec<f64> {
    if deltas.is_empty() {
        return Vec::new();
    }

    let avg = mean(deltas);
    let variance = deltas.iter().map(|d| (d - avg).powi(2)).sum::<f64>() / deltas.len() as f64;
    let band = (2.0 * variance.sqrt()).max(avg.abs() * BAND_FLOOR_RATIO);

    deltas
        .iter()
        .copied()
        .filter(|d| d.is_finite() && (avg - band..=avg + band).contains(d))
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap_series(tempo: &mut TapTempo, deltas: &[f64]) -> Option<f64> {
        let mut now = 100.0;
        let mut last = tempo.tap_at(now);
        for delta in deltas {
            now += delta;
            last = tempo.tap_at(now);
        }
        last
    }

    #[test]
    fn test_step_interval() {
        // 120 BPM, 32 divisions: a beat is 0.5s, a step is 1/8 of a beat
        assert_eq!(step_interval_seconds(120.0, 32), 0.0625);
        assert_eq!(step_interval_seconds(60.0, 32), 0.125);
    }

    #[test]
    fn test_default_tempo() {
        let tempo = TapTempo::default();
        assert_eq!(tempo.bpm(), 120.0);
        assert_eq!(tempo.min_taps(), MIN_TEMPO_TAPS);
        assert!(tempo.taps().is_empty());
        assert_eq!(tempo.to_string(), "120 BPM");
    }

    #[test]
    fn test_too_few_taps_keeps_tempo() {
        let mut tempo = TapTempo::default();
        assert_eq!(tempo.tap_at(0.0), None);
        assert_eq!(tempo.tap_at(0.4), None);
        // 3 taps = 2 deltas: below the threshold of 4
        assert_eq!(tempo.tap_at(0.8), None);
        assert_eq!(tempo.bpm(), 120.0);
    }

    #[test]
    fn test_steady_taps_converge() {
        for interval in [0.5, 0.4, 0.3, 0.75, 1.0 / 3.0] {
            let mut tempo = TapTempo::default();
            // MIN_TEMPO_TAPS + 1 taps
            let result = tap_series(&mut tempo, &[interval; MIN_TEMPO_TAPS]);
            let expected = (60.0f64 / interval).round();
            assert_eq!(result, Some(expected), "interval {}", interval);
            assert_eq!(tempo.bpm(), expected);
        }
    }

    #[test]
    fn test_outlier_rejected() {
        let mut tempo = TapTempo::default();
        // 8 taps at 0.4s (150 BPM) with one 10x pause in the middle
        let deltas = [0.4, 0.4, 0.4, 4.0, 0.4, 0.4, 0.4];
        let result = tap_series(&mut tempo, &deltas);
        assert_eq!(result, Some(150.0));
    }

    #[test]
    fn test_double_tap_rejected() {
        let mut tempo = TapTempo::default();
        let deltas = [0.5, 0.5, 0.5, 0.5, 0.02, 0.5, 0.5];
        let result = tap_series(&mut tempo, &deltas);
        assert_eq!(result, Some(120.0));
    }

    #[test]
    fn test_jittery_taps_round() {
        let mut tempo = TapTempo::default();
        let deltas = [0.49, 0.51, 0.5, 0.52, 0.48, 0.5];
        let result = tap_series(&mut tempo, &deltas).unwrap();
        assert!((result - 120.0).abs() <= 1.0);
    }

    #[test]
    fn test_reset_keeps_bpm() {
        let mut tempo = TapTempo::default();
        tap_series(&mut tempo, &[0.4; 5]);
        assert_eq!(tempo.bpm(), 150.0);

        tempo.reset();
        assert!(tempo.taps().is_empty());
        assert_eq!(tempo.bpm(), 150.0);

        // A fresh sequence needs the full threshold again
        assert_eq!(tempo.tap_at(500.0), None);
        assert_eq!(tempo.tap_at(500.5), None);
        assert_eq!(tempo.bpm(), 150.0);
    }

    #[test]
    fn test_degenerate_taps_ignored() {
        let mut tempo = TapTempo::default();
        // Zero-length deltas would mean an infinite tempo
        for _ in 0..10 {
            tempo.tap_at(5.0);
        }
        assert_eq!(tempo.bpm(), 120.0);

        // Absurdly slow taps fall outside the accepted range
        let mut slow = TapTempo::default();
        tap_series(&mut slow, &[10.0; 6]);
        assert_eq!(slow.bpm(), 120.0);
    }

    #[test]
    fn test_custom_threshold() {
        let mut tempo = TapTempo::default().with_min_taps(8);
        tap_series(&mut tempo, &[0.5; 6]);
        assert_eq!(tempo.bpm(), 120.0);

        let mut tempo = TapTempo::new(90.0).with_min_taps(8);
        for i in 0..8 {
            assert_eq!(tempo.tap_at(i as f64 * 0.4), None);
        }
        assert_eq!(tempo.tap_at(8.0 * 0.4), Some(150.0));

        assert_eq!(TapTempo::default().with_min_taps(0).min_taps(), 2);
    }

    #[test]
    fn test_set_bpm_guards() {
        let mut tempo = TapTempo::default();
        tempo.set_bpm(f64::NAN);
        tempo.set_bpm(-5.0);
        tempo.set_bpm(0.0);
        assert_eq!(tempo.bpm(), 120.0);

        tempo.set_bpm(500.0);
        tempo.set_bpm(29.0);
        assert_eq!(tempo.bpm(), 120.0);

        tempo.set_bpm(98.0);
        assert_eq!(tempo.bpm(), 98.0);
        tempo.set_bpm(MAX_BPM);
        assert_eq!(tempo.bpm(), MAX_BPM);

        assert_eq!(TapTempo::new(f64::INFINITY).bpm(), DEFAULT_BPM);
        assert_eq!(TapTempo::new(500.0).bpm(), DEFAULT_BPM);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}
