// THEORY:
// The merge predicate decides whether two adjacent regions could plausibly come from
// the same underlying distribution. It is a Hoeffding-type concentration bound: a
// region of `n` pixels has its observed mean within
//
//     b(n) = g · sqrt( ln(1/δ) / (2·Q·n) )
//
// of its true mean with probability at least 1 − δ, where `g` is the number of sample
// levels (256 for bytes) and δ = 1/(6·P) for a plane of P pixels. Two regions are
// compatible when their means differ by no more than the sum of their tolerances. The
// boundary is inclusive.
//
// Q tightens the bound: a larger Q means a smaller tolerance and more, smaller regions.
//
// The `Relaxed` variant is the log-corrected form the classic native implementation
// shipped with. It grows the tolerance of large regions with ln(1 + n) and tends to
// produce coarser results on textured images.

use crate::core_modules::error::{SrmError, SrmResult};

/// Which compatibility test the sweep applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredicateKind {
    /// `|m1 − m2| ≤ b(n1) + b(n2)`.
    #[default]
    Hoeffding,
    /// `(m1 − m2)² ≤ 0.1 · g²/(2Q) · Σ (ln(1+n)·min(g, n) + 2·ln(6P)) / n`.
    Relaxed,
}

/// The compatibility test for one plane, with its constants folded in.
#[derive(Debug, Clone, Copy)]
pub struct MergePredicate {
    kind: PredicateKind,
    levels: f64,
    /// `g · sqrt(ln(6P) / 2Q)`, so that `b(n) = scale / sqrt(n)`.
    scale: f64,
    /// `g² / 2Q`, used by the relaxed form.
    factor: f64,
    /// `2 · ln(6P)`, used by the relaxed form.
    log_delta: f64,
}

impl MergePredicate {
    /// Prepares the predicate for a plane of `pixel_count` pixels.
    pub fn new(kind: PredicateKind, levels: f64, q: f64, pixel_count: usize) -> SrmResult<Self> {
        if !q.is_finite() || q <= 0.0 {
            return Err(SrmError::invalid(format!("Q must be a finite value > 0, got {q}")));
        }
        if !levels.is_finite() || levels <= 0.0 {
            return Err(SrmError::invalid(format!(
                "levels must be a finite value > 0, got {levels}"
            )));
        }
        if pixel_count == 0 {
            return Err(SrmError::invalid("plane must contain at least one pixel"));
        }

        // ln(1/δ) with δ = 1/(6P).
        let log_inv_delta = (6.0 * pixel_count as f64).ln();
        Ok(Self {
            kind,
            levels,
            scale: levels * (log_inv_delta / (2.0 * q)).sqrt(),
            factor: levels * levels / (2.0 * q),
            log_delta: 2.0 * log_inv_delta,
        })
    }

    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    /// Hoeffding tolerance `b(n)` for a region of `size` pixels.
    pub fn tolerance(&self, size: u32) -> f64 {
        self.scale / (size as f64).sqrt()
    }

    /// Whether regions `(size_a, mean_a)` and `(size_b, mean_b)` may merge.
    #[inline]
    pub fn compatible(&self, size_a: u32, mean_a: f64, size_b: u32, mean_b: f64) -> bool {
        let difference = (mean_a - mean_b).abs();
        match self.kind {
            PredicateKind::Hoeffding => {
                difference <= self.tolerance(size_a) + self.tolerance(size_b)
            }
            PredicateKind::Relaxed => {
                let bound = 0.1
                    * self.factor
                    * (self.relaxed_term(size_a) + self.relaxed_term(size_b));
                difference * difference <= bound
            }
        }
    }

    fn relaxed_term(&self, size: u32) -> f64 {
        let n = size as f64;
        let log_n = (1.0 + n).ln() * self.levels.min(n);
        (log_n + self.log_delta) / n
    }
}
