/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! The keeper protocol: caller-defined retention for bounded searches.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::point::Point;

/// A candidate collector driving [`Tree::nearest_set`](crate::Tree::nearest_set).
///
/// The tree offers every point whose distance is within [`Keeper::bound`]
/// and prunes subtrees beyond it; the keeper decides what to retain and
/// may shrink the bound as it fills. This one protocol expresses
/// within-radius search ([`DistKeeper`]), nearest-n ([`NKeeper`]),
/// tie-inclusive variants, and anything else distance-bounded.
pub trait Keeper<P: Point> {
    /// Offers a candidate at the given (squared) distance.
    fn keep(&mut self, point: &P, distance: f64);

    /// The current pruning threshold: the largest (squared) distance the
    /// keeper still cares about.
    fn bound(&self) -> f64;
}

/// An entry ordered by distance; ties compare equal.
#[derive(Debug, Clone)]
pub(crate) struct Candidate<T> {
    pub(crate) dist: f64,
    pub(crate) item: T,
}

impl<T> PartialEq for Candidate<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dist == other.dist
    }
}

impl<T> Eq for Candidate<T> {}

impl<T> PartialOrd for Candidate<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Candidate<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.partial_cmp(&other.dist).unwrap_or(Ordering::Equal)
    }
}

/// Keeps every offered point within a fixed (squared) radius.
#[derive(Debug, Clone)]
pub struct DistKeeper<P> {
    radius: f64,
    hits: Vec<(P, f64)>,
}

impl<P: Point> DistKeeper<P> {
    /// A keeper retaining everything within squared distance `radius`.
    #[must_use]
    pub fn new(radius: f64) -> Self {
        DistKeeper {
            radius,
            hits: Vec::new(),
        }
    }

    /// The retained points and distances, in visit order.
    #[must_use]
    pub fn hits(&self) -> &[(P, f64)] {
        &self.hits
    }

    /// Consumes the keeper, returning hits sorted by ascending distance.
    #[must_use]
    pub fn into_sorted(mut self) -> Vec<(P, f64)> {
        self.hits
            .sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        self.hits
    }
}

impl<P: Point> Keeper<P> for DistKeeper<P> {
    fn keep(&mut self, point: &P, distance: f64) {
        if distance <= self.radius {
            self.hits.push((point.clone(), distance));
        }
    }

    fn bound(&self) -> f64 {
        self.radius
    }
}

/// Keeps the `n` closest offered points, shrinking its bound as it fills.
#[derive(Debug, Clone)]
pub struct NKeeper<P> {
    cap: usize,
    heap: BinaryHeap<Candidate<P>>,
}

impl<P: Point> NKeeper<P> {
    /// A keeper retaining the `n` nearest points.
    #[must_use]
    pub fn new(n: usize) -> Self {
        NKeeper {
            cap: n,
            heap: BinaryHeap::with_capacity(n + 1),
        }
    }

    /// Consumes the keeper, returning the kept points in ascending
    /// distance order.
    #[must_use]
    pub fn into_sorted(self) -> Vec<(P, f64)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| (c.item, c.dist))
            .collect()
    }
}

impl<P: Point> Keeper<P> for NKeeper<P> {
    fn keep(&mut self, point: &P, distance: f64) {
        if self.cap == 0 {
            return;
        }
        if self.heap.len() < self.cap {
            self.heap.push(Candidate {
                dist: distance,
                item: point.clone(),
            });
        } else if distance < self.heap.peek().expect("heap is full").dist {
            self.heap.pop();
            self.heap.push(Candidate {
                dist: distance,
                item: point.clone(),
            });
        }
    }

    fn bound(&self) -> f64 {
        if self.heap.len() < self.cap {
            f64::INFINITY
        } else {
            self.heap.peek().map_or(f64::INFINITY, |c| c.dist)
        }
    }
}
