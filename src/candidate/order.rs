//! Ranking of matches.

use crate::search::Match;

/// Number of fractional digits that are significant in similarity and
/// tolerance values. Use with `{:.*}` when printing.
pub const SIMILARITY_DIGITS: usize = 6;

/// `10^-SIMILARITY_DIGITS`: the smallest similarity difference considered
/// significant.
pub const SIMILARITY_PRECISION: f64 = 0.000_001;

impl Match {
    /// Returns whether this match ranks before `other`.
    ///
    /// Higher similarity ranks first. Similarities closer than
    /// [`SIMILARITY_PRECISION`] count as equal, and equal matches rank by y,
    /// then x, ascending.
    pub fn before(&self, other: &Match) -> bool {
        if (self.similarity - other.similarity).abs() >= SIMILARITY_PRECISION {
            return self.similarity > other.similarity;
        }
        if self.rect.y != other.rect.y {
            return self.rect.y < other.rect.y;
        }
        self.rect.x < other.rect.x
    }
}

/// Index at which `m` can be inserted into `ranked` so that its neighbours
/// satisfy `ranked[i - 1].before(m)` and `!ranked[i].before(m)`.
fn insertion_point(ranked: &[Match], m: &Match) -> usize {
    let (mut lo, mut hi) = (0, ranked.len());
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if ranked[mid].before(m) {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Sorts matches best first with deterministic tie-breaking.
///
/// [`Match::before`] is not transitive once similarities fall within
/// [`SIMILARITY_PRECISION`] of each other, so no comparison sort applies.
/// Matches are inserted one by one at a binary-searched position instead,
/// which keeps `before` true for every adjacent pair of distinct matches.
pub fn sort_matches(matches: &mut [Match]) {
    let mut ranked: Vec<Match> = Vec::with_capacity(matches.len());
    for m in matches.iter() {
        let at = insertion_point(&ranked, m);
        ranked.insert(at, *m);
    }
    matches.copy_from_slice(&ranked);
}
