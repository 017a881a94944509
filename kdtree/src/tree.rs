/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use std::collections::BinaryHeap;

use rand::Rng;

use crate::keeper::{Candidate, Keeper};
use crate::medians::{median_of_randoms, partition};
use crate::point::{Bounding, Extender, Point, bounds_of};

/// The default sample bound for median-of-randoms pivoting during bulk
/// build.
pub const DEFAULT_PIVOT_SAMPLES: usize = 100;

struct Node<P: Point> {
    point: P,
    plane: usize,
    left: Option<Box<Node<P>>>,
    right: Option<Box<Node<P>>>,
    bounding: Option<Bounding<P>>,
}

/// A k-d tree over [`Point`]s.
///
/// Bulk construction picks an approximate median on the cycling split axis
/// at every level. The bounded constructors additionally record each
/// subtree's tight bounding box, which [`Tree::walk_bounded`] uses to
/// prune; [`Tree::insert_extend`] keeps the boxes covering (no longer
/// tight), while a plain [`Tree::insert`] disables bounded pruning
/// entirely rather than leave incorrect boxes in play.
pub struct Tree<P: Point> {
    root: Option<Box<Node<P>>>,
    count: usize,
    bounded: bool,
}

impl<P: Point> Tree<P> {
    /// Builds a tree from `points` without bounding boxes.
    #[must_use]
    pub fn new(points: Vec<P>) -> Self {
        Self::with_pivot_samples(points, DEFAULT_PIVOT_SAMPLES)
    }

    /// [`Tree::new`] with an explicit median-of-randoms sample bound.
    #[must_use]
    pub fn with_pivot_samples(mut points: Vec<P>, samples: usize) -> Self {
        let mut rng = rand::rng();
        let count = points.len();
        Tree {
            root: build(&mut points, 0, samples, &mut rng),
            count,
            bounded: false,
        }
    }

    /// The number of stored points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the tree holds no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether bounding boxes are present and trusted for pruning.
    #[must_use]
    pub const fn is_bounded(&self) -> bool {
        self.bounded
    }

    /// Whether `p` lies within the tree's root bounding box. Always true
    /// for an unbounded tree.
    #[must_use]
    pub fn contains(&self, p: &P) -> bool {
        if !self.bounded {
            return true;
        }
        match self.root.as_deref().and_then(|n| n.bounding.as_ref()) {
            Some(b) => b.contains(p),
            None => true,
        }
    }

    /// The root bounding box, when present.
    #[must_use]
    pub fn bounds(&self) -> Option<&Bounding<P>> {
        self.root.as_deref()?.bounding.as_ref()
    }

    /// Inserts `p` by plain k-d descent. No rebalancing happens; a
    /// bounded tree loses bounded pruning (see [`Tree::insert_extend`]).
    pub fn insert(&mut self, p: P) {
        self.bounded = false;
        let root = self.root.take();
        self.root = Some(insert(root, p, 0));
        self.count += 1;
    }

    /// The closest stored point to `q` and its (squared) distance.
    pub fn nearest(&self, q: &P) -> Option<(&P, f64)> {
        let root = self.root.as_deref()?;
        search(root, q, None)
    }

    /// The `n` closest stored points to `q`, in ascending distance order.
    pub fn nearest_n(&self, q: &P, n: usize) -> Vec<(&P, f64)> {
        if n == 0 {
            return Vec::new();
        }
        let mut heap: BinaryHeap<Candidate<&P>> = BinaryHeap::with_capacity(n + 1);
        if let Some(root) = self.root.as_deref() {
            search_n(root, q, n, &mut heap);
        }
        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.item, c.dist))
            .collect()
    }

    /// Offers every stored point within `keeper.bound()` of `q` to the
    /// keeper, pruning the descent with the keeper's current bound.
    pub fn nearest_set<K>(&self, q: &P, keeper: &mut K)
    where
        K: Keeper<P>,
    {
        if let Some(root) = self.root.as_deref() {
            search_set(root, q, keeper);
        }
    }

    /// Calls `f` on every point in in-order traversal order until `f`
    /// returns `true`. Returns whether the traversal was short-circuited.
    pub fn walk<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&P) -> bool,
    {
        self.root.as_deref().is_some_and(|n| walk(n, &mut f))
    }

    /// Calls `f` on every point lying within `bounds`, in in-order
    /// traversal order, skipping subtrees whose bounding box misses
    /// `bounds` when boxes are trusted. Returns whether the traversal was
    /// short-circuited.
    pub fn walk_bounded<F>(&self, mut f: F, bounds: &Bounding<P>) -> bool
    where
        F: FnMut(&P) -> bool,
    {
        self.root
            .as_deref()
            .is_some_and(|n| walk_bounded(n, &mut f, bounds, self.bounded))
    }
}

impl<P: Extender> Tree<P> {
    /// Builds a tree from `points` with tight per-subtree bounding boxes.
    #[must_use]
    pub fn new_bounded(points: Vec<P>) -> Self {
        Self::bounded_with_pivot_samples(points, DEFAULT_PIVOT_SAMPLES)
    }

    /// [`Tree::new_bounded`] with an explicit median-of-randoms sample
    /// bound.
    #[must_use]
    pub fn bounded_with_pivot_samples(mut points: Vec<P>, samples: usize) -> Self {
        let mut rng = rand::rng();
        let count = points.len();
        Tree {
            root: build_bounded(&mut points, 0, samples, &mut rng),
            count,
            bounded: true,
        }
    }

    /// Inserts `p`, growing every bounding box along the descent to cover
    /// it. Boxes stay covering (pruning remains sound) but are no longer
    /// tight. On an unbounded tree this is a plain insert.
    pub fn insert_extend(&mut self, p: P) {
        if !self.bounded {
            self.insert(p);
            return;
        }
        let root = self.root.take();
        self.root = Some(insert_extend(root, p, 0));
        self.count += 1;
    }
}

fn build<P, R>(points: &mut [P], plane: usize, samples: usize, rng: &mut R) -> Option<Box<Node<P>>>
where
    P: Point,
    R: Rng + ?Sized,
{
    if points.is_empty() {
        return None;
    }
    let pivot = median_of_randoms(points, plane, samples, rng);
    let pivot = partition(points, plane, pivot);
    let point = points[pivot].clone();
    let next = (plane + 1) % point.dims();
    let (left_points, rest) = points.split_at_mut(pivot);
    let right_points = &mut rest[1..];
    Some(Box::new(Node {
        point,
        plane,
        left: build(left_points, next, samples, rng),
        right: build(right_points, next, samples, rng),
        bounding: None,
    }))
}

fn build_bounded<P, R>(
    points: &mut [P],
    plane: usize,
    samples: usize,
    rng: &mut R,
) -> Option<Box<Node<P>>>
where
    P: Extender,
    R: Rng + ?Sized,
{
    if points.is_empty() {
        return None;
    }
    let bounding = bounds_of(points);
    let pivot = median_of_randoms(points, plane, samples, rng);
    let pivot = partition(points, plane, pivot);
    let point = points[pivot].clone();
    let next = (plane + 1) % point.dims();
    let (left_points, rest) = points.split_at_mut(pivot);
    let right_points = &mut rest[1..];
    Some(Box::new(Node {
        point,
        plane,
        left: build_bounded(left_points, next, samples, rng),
        right: build_bounded(right_points, next, samples, rng),
        bounding,
    }))
}

fn insert<P: Point>(node: Option<Box<Node<P>>>, p: P, plane: usize) -> Box<Node<P>> {
    let Some(mut node) = node else {
        return Box::new(Node {
            plane,
            left: None,
            right: None,
            bounding: None,
            point: p,
        });
    };
    let next = (node.plane + 1) % p.dims();
    if p.compare(&node.point, node.plane) <= 0.0 {
        node.left = Some(insert(node.left.take(), p, next));
    } else {
        node.right = Some(insert(node.right.take(), p, next));
    }
    node
}

fn insert_extend<P: Extender>(node: Option<Box<Node<P>>>, p: P, plane: usize) -> Box<Node<P>> {
    let Some(mut node) = node else {
        return Box::new(Node {
            plane,
            left: None,
            right: None,
            bounding: Some(Bounding {
                min: p.clone(),
                max: p.clone(),
            }),
            point: p,
        });
    };
    if let Some(b) = node.bounding.as_mut() {
        p.extend(b);
    }
    let next = (node.plane + 1) % p.dims();
    if p.compare(&node.point, node.plane) <= 0.0 {
        node.left = Some(insert_extend(node.left.take(), p, next));
    } else {
        node.right = Some(insert_extend(node.right.take(), p, next));
    }
    node
}

fn search<'a, P: Point>(
    node: &'a Node<P>,
    q: &P,
    mut best: Option<(&'a P, f64)>,
) -> Option<(&'a P, f64)> {
    let d = q.distance(&node.point);
    if best.is_none_or(|(_, bd)| d < bd) {
        best = Some((&node.point, d));
    }

    let c = q.compare(&node.point, node.plane);
    let (near, far) = if c <= 0.0 {
        (node.left.as_deref(), node.right.as_deref())
    } else {
        (node.right.as_deref(), node.left.as_deref())
    };

    if let Some(n) = near {
        best = search(n, q, best);
    }
    let bound = best.map_or(f64::INFINITY, |(_, bd)| bd);
    if c * c <= bound
        && let Some(n) = far
    {
        best = search(n, q, best);
    }
    best
}

fn search_n<'a, P: Point>(
    node: &'a Node<P>,
    q: &P,
    cap: usize,
    heap: &mut BinaryHeap<Candidate<&'a P>>,
) {
    let d = q.distance(&node.point);
    if heap.len() < cap {
        heap.push(Candidate {
            dist: d,
            item: &node.point,
        });
    } else if d < heap.peek().expect("heap is full").dist {
        heap.pop();
        heap.push(Candidate {
            dist: d,
            item: &node.point,
        });
    }

    let c = q.compare(&node.point, node.plane);
    let (near, far) = if c <= 0.0 {
        (node.left.as_deref(), node.right.as_deref())
    } else {
        (node.right.as_deref(), node.left.as_deref())
    };

    if let Some(n) = near {
        search_n(n, q, cap, heap);
    }
    let bound = if heap.len() < cap {
        f64::INFINITY
    } else {
        heap.peek().expect("heap is full").dist
    };
    if c * c <= bound
        && let Some(n) = far
    {
        search_n(n, q, cap, heap);
    }
}

fn search_set<P: Point, K: Keeper<P>>(node: &Node<P>, q: &P, keeper: &mut K) {
    let d = q.distance(&node.point);
    if d <= keeper.bound() {
        keeper.keep(&node.point, d);
    }

    let c = q.compare(&node.point, node.plane);
    let (near, far) = if c <= 0.0 {
        (node.left.as_deref(), node.right.as_deref())
    } else {
        (node.right.as_deref(), node.left.as_deref())
    };

    if let Some(n) = near {
        search_set(n, q, keeper);
    }
    if c * c <= keeper.bound()
        && let Some(n) = far
    {
        search_set(n, q, keeper);
    }
}

fn walk<P: Point, F>(node: &Node<P>, f: &mut F) -> bool
where
    F: FnMut(&P) -> bool,
{
    if let Some(l) = node.left.as_deref()
        && walk(l, f)
    {
        return true;
    }
    if f(&node.point) {
        return true;
    }
    node.right.as_deref().is_some_and(|r| walk(r, f))
}

fn walk_bounded<P: Point, F>(node: &Node<P>, f: &mut F, bounds: &Bounding<P>, pruned: bool) -> bool
where
    F: FnMut(&P) -> bool,
{
    if pruned
        && let Some(b) = node.bounding.as_ref()
        && !b.intersects(bounds)
    {
        return false;
    }
    if let Some(l) = node.left.as_deref()
        && walk_bounded(l, f, bounds, pruned)
    {
        return true;
    }
    if bounds.contains(&node.point) && f(&node.point) {
        return true;
    }
    node.right
        .as_deref()
        .is_some_and(|r| walk_bounded(r, f, bounds, pruned))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp_data() -> Vec<Vec<f64>> {
        [(2., 3.), (5., 4.), (9., 6.), (4., 7.), (8., 1.), (7., 2.)]
            .iter()
            .map(|&(x, y)| vec![x, y])
            .collect()
    }

    /// Every left descendant compares `<= 0` at the node's plane, every
    /// right descendant `> 0`.
    fn is_kd_tree<P: Point>(node: Option<&Node<P>>) -> bool {
        let Some(n) = node else { return true };
        partitioned(n.left.as_deref(), &n.point, n.plane, true)
            && partitioned(n.right.as_deref(), &n.point, n.plane, false)
            && is_kd_tree(n.left.as_deref())
            && is_kd_tree(n.right.as_deref())
    }

    fn partitioned<P: Point>(node: Option<&Node<P>>, pivot: &P, plane: usize, left: bool) -> bool {
        let Some(n) = node else { return true };
        let c = n.point.compare(pivot, plane);
        let ok = if left { c <= 0.0 } else { c > 0.0 };
        ok && partitioned(n.left.as_deref(), pivot, plane, left)
            && partitioned(n.right.as_deref(), pivot, plane, left)
    }

    #[test]
    fn bulk_build_partitions_correctly() {
        let t = Tree::new(wp_data());
        assert_eq!(t.len(), 6);
        assert!(is_kd_tree(t.root.as_deref()));
    }

    #[test]
    fn bounded_build_is_tight() {
        let t = Tree::new_bounded(wp_data());
        let b = t.bounds().unwrap();
        assert_eq!(b.min, vec![2.0, 1.0]);
        assert_eq!(b.max, vec![9.0, 7.0]);
        for p in wp_data() {
            assert!(t.contains(&p));
        }
    }

    #[test]
    fn extending_insert_grows_the_boxes() {
        let mut t = Tree::new_bounded(wp_data());
        t.insert_extend(vec![0.0, 0.0]);
        t.insert_extend(vec![10.0, 10.0]);
        assert!(is_kd_tree(t.root.as_deref()));
        assert!(t.is_bounded());
        let b = t.bounds().unwrap();
        assert_eq!(b.min, vec![0.0, 0.0]);
        assert_eq!(b.max, vec![10.0, 10.0]);
    }

    #[test]
    fn plain_insert_disables_bounded_pruning() {
        let mut t = Tree::new_bounded(wp_data());
        assert!(t.is_bounded());
        t.insert(vec![0.0, 0.0]);
        assert!(!t.is_bounded());
        assert_eq!(t.len(), 7);
        assert!(is_kd_tree(t.root.as_deref()));

        // The walk still reports exactly the in-box points.
        let bounds = Bounding { min: vec![-1.0, -1.0], max: vec![4.0, 4.0] };
        let mut seen = Vec::new();
        t.walk_bounded(
            |p| {
                seen.push(p.clone());
                false
            },
            &bounds,
        );
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, vec![vec![0.0, 0.0], vec![2.0, 3.0]]);
    }
}
