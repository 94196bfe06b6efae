//! Collectors that consume the scanner's match stream.
//!
//! A collector sees every match through [`Collector::visit`] and then gets the
//! scan's own outcome in [`Collector::finish`], where it decides what the
//! caller receives. Partial results are attached to `Cancelled` here, since the
//! scanner itself does not keep matches.

use crate::candidate::order::sort_matches;
use crate::search::{Match, Visit};
use crate::util::{LocateError, LocateResult};

/// Strategy that accumulates matches and interprets the scan outcome.
pub trait Collector {
    /// Value returned on success.
    type Output;

    /// Consumes one match; the return value steers the scan.
    fn visit(&mut self, m: Match) -> Visit;

    /// Produces the final result from the accumulated state and the scan outcome.
    fn finish(self, scanned: LocateResult<()>) -> LocateResult<Self::Output>;
}

/// Keeps every match and sorts them best first.
#[derive(Debug, Default)]
pub struct CollectAll {
    matches: Vec<Match>,
}

impl Collector for CollectAll {
    type Output = Vec<Match>;

    fn visit(&mut self, m: Match) -> Visit {
        self.matches.push(m);
        Visit::Continue
    }

    fn finish(mut self, scanned: LocateResult<()>) -> LocateResult<Vec<Match>> {
        sort_matches(&mut self.matches);
        match scanned {
            Ok(()) => Ok(self.matches),
            Err(LocateError::Cancelled { .. }) => Err(LocateError::Cancelled {
                partial: self.matches,
            }),
            Err(err) => Err(err),
        }
    }
}

/// Takes the first match in scan order and stops the scan.
#[derive(Debug, Default)]
pub struct FirstFound {
    found: Option<Match>,
}

impl Collector for FirstFound {
    type Output = Match;

    fn visit(&mut self, m: Match) -> Visit {
        self.found = Some(m);
        Visit::Stop
    }

    fn finish(self, scanned: LocateResult<()>) -> LocateResult<Match> {
        match scanned {
            Ok(()) => self.found.ok_or(LocateError::NotFound),
            Err(LocateError::Cancelled { .. }) => Err(LocateError::Cancelled {
                partial: self.found.into_iter().collect(),
            }),
            Err(err) => Err(err),
        }
    }
}

/// Keeps the highest-similarity match over a full scan.
///
/// Only a strictly higher similarity replaces the current best, so ties go
/// to the earliest match in scan order. With `unique` set, more than one
/// match turns the result into `MultipleFound` carrying the best one.
#[derive(Debug)]
pub struct BestFound {
    unique: bool,
    best: Option<Match>,
    count: usize,
}

impl BestFound {
    /// Creates a best-match collector; `unique` enables the multiple-match check.
    pub fn new(unique: bool) -> Self {
        Self {
            unique,
            best: None,
            count: 0,
        }
    }

    /// Number of matches seen so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Collector for BestFound {
    type Output = Match;

    fn visit(&mut self, m: Match) -> Visit {
        let replace = match &self.best {
            None => true,
            Some(best) => m.similarity > best.similarity,
        };
        if replace {
            self.best = Some(m);
        }
        self.count += 1;
        Visit::Continue
    }

    fn finish(self, scanned: LocateResult<()>) -> LocateResult<Match> {
        match scanned {
            Ok(()) => {}
            Err(LocateError::Cancelled { .. }) => {
                return Err(LocateError::Cancelled {
                    partial: self.best.into_iter().collect(),
                })
            }
            Err(err) => return Err(err),
        }
        let best = self.best.ok_or(LocateError::NotFound)?;
        if self.unique && self.count > 1 {
            return Err(LocateError::MultipleFound {
                best,
                count: self.count,
            });
        }
        Ok(best)
    }
}
