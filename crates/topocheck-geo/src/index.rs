//! Candidate pair enumeration for the pairwise rules.
//!
//! Every rule asks the same question: which unordered pairs `(i, j)`, `i < j`,
//! could be within `reach` of each other? The exhaustive strategy answers
//! "all of them"; the indexed strategy bulk-loads the bounding envelopes into
//! an R-tree and keeps only pairs whose envelopes come within `reach`. Rules
//! always re-check their exact predicate, so both strategies flag the same
//! features.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::{LineString, Point};
use rstar::{RTree, RTreeObject, AABB};
use topocheck_core::config::PairStrategy;

/// Relative and absolute slack added to the query reach
const REACH_SLACK_REL: f64 = 1e-9;
const REACH_SLACK_ABS: f64 = 1e-6;

/// Envelope tagged with the position of its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedEnvelope {
    pub index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Envelope of a point
pub fn point_envelope(point: &Point<f64>) -> Option<AABB<[f64; 2]>> {
    Some(AABB::from_point([point.x(), point.y()]))
}

/// Envelope of a line string; `None` when it has no coordinates
pub fn line_envelope(line: &LineString<f64>) -> Option<AABB<[f64; 2]>> {
    line.bounding_rect().map(|rect| {
        let min = rect.min();
        let max = rect.max();
        AABB::from_corners([min.x, min.y], [max.x, max.y])
    })
}

/// Unordered candidate pairs `(i, j)` with `i < j`, in ascending order.
///
/// Entries without an envelope never take part in a pair. Exhaustive pairs
/// are produced lazily, so memory stays linear in the number of entries.
pub fn candidate_pairs(
    envelopes: &[Option<AABB<[f64; 2]>>],
    reach: f64,
    strategy: PairStrategy,
) -> CandidatePairs {
    match strategy {
        PairStrategy::Exhaustive => {
            let pairs = ExhaustivePairs::new(envelopes);
            let n = pairs.present.len();
            tracing::debug!(
                "Exhaustive strategy enumerates {} candidate pairs from {} geometries",
                n * n.saturating_sub(1) / 2,
                envelopes.len()
            );
            CandidatePairs::Exhaustive(pairs)
        }
        PairStrategy::Indexed => {
            let pairs = indexed_pairs(envelopes, reach);
            tracing::debug!(
                "Indexed strategy produced {} candidate pairs from {} geometries",
                pairs.len(),
                envelopes.len()
            );
            CandidatePairs::Indexed(pairs.into_iter())
        }
    }
}

/// Iterator over candidate pairs
#[derive(Debug, Clone)]
pub enum CandidatePairs {
    Exhaustive(ExhaustivePairs),
    Indexed(std::vec::IntoIter<(usize, usize)>),
}

impl Iterator for CandidatePairs {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            CandidatePairs::Exhaustive(pairs) => pairs.next(),
            CandidatePairs::Indexed(pairs) => pairs.next(),
        }
    }
}

/// Every `i < j` pair over the entries that have an envelope, generated on demand
#[derive(Debug, Clone)]
pub struct ExhaustivePairs {
    present: Vec<usize>,
    a: usize,
    b: usize,
}

impl ExhaustivePairs {
    fn new(envelopes: &[Option<AABB<[f64; 2]>>]) -> Self {
        let present =
            envelopes.iter().enumerate().filter(|(_, e)| e.is_some()).map(|(i, _)| i).collect();
        Self { present, a: 0, b: 1 }
    }
}

impl Iterator for ExhaustivePairs {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while self.a < self.present.len() {
            if self.b < self.present.len() {
                let pair = (self.present[self.a], self.present[self.b]);
                self.b += 1;
                return Some(pair);
            }
            self.a += 1;
            self.b = self.a + 1;
        }
        None
    }
}

fn indexed_pairs(envelopes: &[Option<AABB<[f64; 2]>>], reach: f64) -> Vec<(usize, usize)> {
    let indexed: Vec<IndexedEnvelope> = envelopes
        .iter()
        .enumerate()
        .filter_map(|(index, e)| e.as_ref().map(|&envelope| IndexedEnvelope { index, envelope }))
        .collect();
    let tree = RTree::bulk_load(indexed.clone());

    let mut pairs = Vec::new();
    for item in &indexed {
        let query = inflate(&item.envelope, reach);
        pairs.extend(
            tree.locate_in_envelope_intersecting(&query)
                .filter(|other| other.index > item.index)
                .map(|other| (item.index, other.index)),
        );
    }
    pairs.sort_unstable();
    pairs
}

/// Grow an envelope by `reach` on every side, plus slack for rounding
fn inflate(envelope: &AABB<[f64; 2]>, reach: f64) -> AABB<[f64; 2]> {
    let lower = envelope.lower();
    let upper = envelope.upper();
    let magnitude = lower
        .iter()
        .chain(upper.iter())
        .fold(reach.abs(), |acc, v| acc.max(v.abs()));
    let grow = reach + magnitude * REACH_SLACK_REL + REACH_SLACK_ABS;

    AABB::from_corners(
        [lower[0] - grow, lower[1] - grow],
        [upper[0] + grow, upper[1] + grow],
    )
}
