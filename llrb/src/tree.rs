/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use std::cmp::Ordering;
use std::mem;

use crate::compare::Compare;
use crate::iter::Iter;
use crate::node::{Color, Mode, Node, is_red, left_left_red};

/// A left-leaning red-black tree.
///
/// The tree owns its nodes; children are uniquely owned by their parents
/// and recursion tracks ancestry, so there are no parent pointers. All
/// operations are `O(log n)`.
///
/// Callbacks handed to the `walk_*` methods receive shared references to
/// stored elements and must not alter their sort order; doing so leaves the
/// tree in an unspecified (but memory-safe) state.
#[derive(Debug)]
pub struct Tree<E> {
    root: Option<Box<Node<E>>>,
    count: usize,
    mode: Mode,
}

impl<E> Default for Tree<E> {
    fn default() -> Self {
        Self::with_mode(Mode::default())
    }
}

impl<E> Tree<E> {
    /// Creates an empty tree with 2-3 balancing semantics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty tree with the given balancing [`Mode`].
    ///
    /// Deletion is only implemented for [`Mode::Bu23`]; the delete methods
    /// panic on a [`Mode::Td234`] tree.
    #[must_use]
    pub fn with_mode(mode: Mode) -> Self {
        Tree {
            root: None,
            count: 0,
            mode,
        }
    }

    /// The balancing mode this tree was created with.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The number of elements stored.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether the tree holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the first element that compares equal to `q`.
    ///
    /// Under non-replacing insertion several stored elements may compare
    /// equal to `q`; use [`Tree::walk_matching`] to see all of them.
    pub fn get<Q>(&self, q: &Q) -> Option<&E>
    where
        Q: Compare<E> + ?Sized,
    {
        let mut node = self.root.as_deref();
        while let Some(n) = node {
            match q.compare(&n.elem) {
                Ordering::Equal => return Some(&n.elem),
                Ordering::Less => node = n.left.as_deref(),
                Ordering::Greater => node = n.right.as_deref(),
            }
        }
        None
    }

    /// The smallest stored element.
    pub fn min(&self) -> Option<&E> {
        let mut n = self.root.as_deref()?;
        while let Some(l) = n.left.as_deref() {
            n = l;
        }
        Some(&n.elem)
    }

    /// The largest stored element.
    pub fn max(&self) -> Option<&E> {
        let mut n = self.root.as_deref()?;
        while let Some(r) = n.right.as_deref() {
            n = r;
        }
        Some(&n.elem)
    }

    /// The largest stored element that is less than or equal to `q`.
    pub fn floor<Q>(&self, q: &Q) -> Option<&E>
    where
        Q: Compare<E> + ?Sized,
    {
        floor(self.root.as_deref(), q).map(|n| &n.elem)
    }

    /// The smallest stored element that is greater than or equal to `q`.
    pub fn ceil<Q>(&self, q: &Q) -> Option<&E>
    where
        Q: Compare<E> + ?Sized,
    {
        ceil(self.root.as_deref(), q).map(|n| &n.elem)
    }

    /// Calls `f` on every element in sort order until `f` returns `true`.
    ///
    /// Returns whether the traversal was short-circuited.
    pub fn walk<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        self.root.as_deref().is_some_and(|n| walk(n, &mut f))
    }

    /// Calls `f` on every element in reverse sort order until `f` returns
    /// `true`. Returns whether the traversal was short-circuited.
    pub fn walk_reverse<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&E) -> bool,
    {
        self.root.as_deref().is_some_and(|n| walk_reverse(n, &mut f))
    }

    /// Calls `f` on the elements of `[from, to)` in sort order when
    /// `from < to`, and on the elements of `[to, from)` in reverse sort
    /// order when `from > to`. When `from == to`, visits exactly the
    /// elements that compare equal to `from`.
    ///
    /// Returns whether the traversal was short-circuited.
    pub fn walk_range<Q, F>(&self, mut f: F, from: &Q, to: &Q) -> bool
    where
        Q: Compare<E> + Compare<Q>,
        F: FnMut(&E) -> bool,
    {
        let Some(root) = self.root.as_deref() else {
            return false;
        };
        match from.compare(to) {
            Ordering::Less => walk_range(root, &mut f, from, to),
            Ordering::Greater => walk_range_reverse(root, &mut f, from, to),
            Ordering::Equal => walk_matching(root, &mut f, from),
        }
    }

    /// [`Tree::walk_range`] for callers that consider an inverted range a
    /// bug rather than a direction.
    ///
    /// # Panics
    ///
    /// Panics when `from > to`.
    pub fn walk_range_strict<Q, F>(&self, f: F, from: &Q, to: &Q) -> bool
    where
        Q: Compare<E> + Compare<Q>,
        F: FnMut(&E) -> bool,
    {
        assert!(
            from.compare(to) != Ordering::Greater,
            "llrb: inverted range"
        );
        self.walk_range(f, from, to)
    }

    /// Calls `f` on every element that compares equal to `q`, in sort
    /// order, using the comparator to prune the descent.
    ///
    /// Returns whether the traversal was short-circuited.
    pub fn walk_matching<Q, F>(&self, mut f: F, q: &Q) -> bool
    where
        Q: Compare<E> + ?Sized,
        F: FnMut(&E) -> bool,
    {
        self.root
            .as_deref()
            .is_some_and(|n| walk_matching(n, &mut f, q))
    }

    /// An in-order iterator over the stored elements.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter::new(self.root.as_deref())
    }

    /// Removes the smallest element and returns it.
    ///
    /// # Panics
    ///
    /// Panics on a [`Mode::Td234`] tree.
    pub fn delete_min(&mut self) -> Option<E> {
        self.require_deletable();
        let root = self.root.take()?;
        let (root, removed) = delete_min(root, self.mode);
        self.root = root;
        self.count -= 1;
        if let Some(r) = self.root.as_deref_mut() {
            r.color = Color::Black;
        }
        Some(removed)
    }

    /// Removes the largest element and returns it.
    ///
    /// # Panics
    ///
    /// Panics on a [`Mode::Td234`] tree.
    pub fn delete_max(&mut self) -> Option<E> {
        self.require_deletable();
        let root = self.root.take()?;
        let (root, removed) = delete_max(root, self.mode);
        self.root = root;
        self.count -= 1;
        if let Some(r) = self.root.as_deref_mut() {
            r.color = Color::Black;
        }
        Some(removed)
    }

    /// Removes and returns the first element that compares equal to `q`,
    /// or `None` when no element matches.
    ///
    /// # Panics
    ///
    /// Panics on a [`Mode::Td234`] tree.
    pub fn delete<Q>(&mut self, q: &Q) -> Option<E>
    where
        Q: Compare<E> + ?Sized,
    {
        self.require_deletable();
        let root = self.root.take()?;
        let (root, removed) = delete(root, q, self.mode);
        self.root = root;
        if removed.is_some() {
            self.count -= 1;
        }
        if let Some(r) = self.root.as_deref_mut() {
            r.color = Color::Black;
        }
        removed
    }

    fn require_deletable(&self) {
        assert!(
            self.mode == Mode::Bu23,
            "llrb: deletion is only implemented for 2-3 (Bu23) trees"
        );
    }
}

impl<E: Compare> Tree<E> {
    /// Inserts `e`, replacing and returning the first stored element that
    /// compares equal to it. Returns `None` when a new node was created.
    ///
    /// With a comparator that never reports equality this never replaces,
    /// giving multiset semantics; lookups then need a distinct query type
    /// that does report equality.
    pub fn insert(&mut self, e: E) -> Option<E> {
        let (mut root, displaced) = insert(self.root.take(), e, self.mode);
        root.color = Color::Black;
        self.root = Some(root);
        if displaced.is_none() {
            self.count += 1;
        }
        displaced
    }
}

fn insert<E: Compare>(node: Option<Box<Node<E>>>, e: E, mode: Mode) -> (Box<Node<E>>, Option<E>) {
    let Some(mut node) = node else {
        return (Box::new(Node::new(e)), None);
    };

    if mode == Mode::Td234 && is_red(&node.left) && is_red(&node.right) {
        node.flip_colors();
    }

    let displaced = match e.compare(&node.elem) {
        Ordering::Equal => Some(mem::replace(&mut node.elem, e)),
        Ordering::Less => {
            let (left, displaced) = insert(node.left.take(), e, mode);
            node.left = Some(left);
            displaced
        }
        Ordering::Greater => {
            let (right, displaced) = insert(node.right.take(), e, mode);
            node.right = Some(right);
            displaced
        }
    };

    if is_red(&node.right) && !is_red(&node.left) {
        node = node.rotate_left();
    }
    if is_red(&node.left) && left_left_red(&node.left) {
        node = node.rotate_right();
    }
    if mode == Mode::Bu23 && is_red(&node.left) && is_red(&node.right) {
        node.flip_colors();
    }

    (node, displaced)
}

fn delete_min<E>(mut node: Box<Node<E>>, mode: Mode) -> (Option<Box<Node<E>>>, E) {
    if node.left.is_none() {
        return (None, node.elem);
    }
    if !is_red(&node.left) && !left_left_red(&node.left) {
        node = node.move_red_left(mode);
    }
    let left = node.left.take().expect("move_red_left preserves the left child");
    let (left, removed) = delete_min(left, mode);
    node.left = left;
    (Some(node.fix_up(mode)), removed)
}

fn delete_max<E>(mut node: Box<Node<E>>, mode: Mode) -> (Option<Box<Node<E>>>, E) {
    if is_red(&node.left) {
        node = node.rotate_right();
    }
    if node.right.is_none() {
        return (None, node.elem);
    }
    if !is_red(&node.right) && !left_left_red(&node.right) {
        node = node.move_red_right();
    }
    let right = node.right.take().expect("move_red_right preserves the right child");
    let (right, removed) = delete_max(right, mode);
    node.right = right;
    (Some(node.fix_up(mode)), removed)
}

fn delete<E, Q>(mut node: Box<Node<E>>, q: &Q, mode: Mode) -> (Option<Box<Node<E>>>, Option<E>)
where
    Q: Compare<E> + ?Sized,
{
    let mut removed = None;

    if q.compare(&node.elem) == Ordering::Less {
        if node.left.is_some() {
            if !is_red(&node.left) && !left_left_red(&node.left) {
                node = node.move_red_left(mode);
            }
            let left = node.left.take().expect("move_red_left preserves the left child");
            let (left, r) = delete(left, q, mode);
            node.left = left;
            removed = r;
        }
    } else {
        if is_red(&node.left) {
            node = node.rotate_right();
        }
        if q.compare(&node.elem) == Ordering::Equal && node.right.is_none() {
            return (None, Some(node.elem));
        }
        if node.right.is_some() {
            if !is_red(&node.right) && !left_left_red(&node.right) {
                node = node.move_red_right();
            }
            if q.compare(&node.elem) == Ordering::Equal {
                // Splice in the successor and delete it from the right
                // subtree instead of repairing a black-height violation.
                let right = node.right.take().expect("right presence checked above");
                let (right, successor) = delete_min(right, mode);
                node.right = right;
                removed = Some(mem::replace(&mut node.elem, successor));
            } else {
                let right = node.right.take().expect("right presence checked above");
                let (right, r) = delete(right, q, mode);
                node.right = right;
                removed = r;
            }
        }
    }

    (Some(node.fix_up(mode)), removed)
}

fn floor<'a, E, Q>(node: Option<&'a Node<E>>, q: &Q) -> Option<&'a Node<E>>
where
    Q: Compare<E> + ?Sized,
{
    let n = node?;
    match q.compare(&n.elem) {
        Ordering::Equal => Some(n),
        Ordering::Less => floor(n.left.as_deref(), q),
        Ordering::Greater => floor(n.right.as_deref(), q).or(Some(n)),
    }
}

fn ceil<'a, E, Q>(node: Option<&'a Node<E>>, q: &Q) -> Option<&'a Node<E>>
where
    Q: Compare<E> + ?Sized,
{
    let n = node?;
    match q.compare(&n.elem) {
        Ordering::Equal => Some(n),
        Ordering::Greater => ceil(n.right.as_deref(), q),
        Ordering::Less => ceil(n.left.as_deref(), q).or(Some(n)),
    }
}

fn walk<E, F>(node: &Node<E>, f: &mut F) -> bool
where
    F: FnMut(&E) -> bool,
{
    if let Some(l) = node.left.as_deref()
        && walk(l, f)
    {
        return true;
    }
    if f(&node.elem) {
        return true;
    }
    node.right.as_deref().is_some_and(|r| walk(r, f))
}

fn walk_reverse<E, F>(node: &Node<E>, f: &mut F) -> bool
where
    F: FnMut(&E) -> bool,
{
    if let Some(r) = node.right.as_deref()
        && walk_reverse(r, f)
    {
        return true;
    }
    if f(&node.elem) {
        return true;
    }
    node.left.as_deref().is_some_and(|l| walk_reverse(l, f))
}

fn walk_range<E, Q, F>(node: &Node<E>, f: &mut F, lo: &Q, hi: &Q) -> bool
where
    Q: Compare<E>,
    F: FnMut(&E) -> bool,
{
    let lc = lo.compare(&node.elem);
    let hc = hi.compare(&node.elem);
    if lc != Ordering::Greater
        && let Some(l) = node.left.as_deref()
        && walk_range(l, f, lo, hi)
    {
        return true;
    }
    if lc != Ordering::Greater && hc == Ordering::Greater && f(&node.elem) {
        return true;
    }
    if hc == Ordering::Greater
        && let Some(r) = node.right.as_deref()
    {
        return walk_range(r, f, lo, hi);
    }
    false
}

fn walk_range_reverse<E, Q, F>(node: &Node<E>, f: &mut F, hi: &Q, lo: &Q) -> bool
where
    Q: Compare<E>,
    F: FnMut(&E) -> bool,
{
    let lc = lo.compare(&node.elem);
    let hc = hi.compare(&node.elem);
    if hc == Ordering::Greater
        && let Some(r) = node.right.as_deref()
        && walk_range_reverse(r, f, hi, lo)
    {
        return true;
    }
    if lc != Ordering::Greater && hc == Ordering::Greater && f(&node.elem) {
        return true;
    }
    if lc != Ordering::Greater
        && let Some(l) = node.left.as_deref()
    {
        return walk_range_reverse(l, f, hi, lo);
    }
    false
}

fn walk_matching<E, Q, F>(node: &Node<E>, f: &mut F, q: &Q) -> bool
where
    Q: Compare<E> + ?Sized,
    F: FnMut(&E) -> bool,
{
    let c = q.compare(&node.elem);
    if c != Ordering::Greater
        && let Some(l) = node.left.as_deref()
        && walk_matching(l, f, q)
    {
        return true;
    }
    if c == Ordering::Equal && f(&node.elem) {
        return true;
    }
    if c != Ordering::Less
        && let Some(r) = node.right.as_deref()
    {
        return walk_matching(r, f, q);
    }
    false
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use rand::Rng;

    use super::*;

    // Structural integrity checks, after the RedBlackBST reference suite.

    fn is_bst<E: Compare>(node: Option<&Node<E>>, min: &E, max: &E) -> bool {
        let Some(n) = node else { return true };
        if n.elem.compare(min) == Ordering::Less || n.elem.compare(max) == Ordering::Greater {
            return false;
        }
        is_bst(n.left.as_deref(), min, &n.elem) && is_bst(n.right.as_deref(), &n.elem, max)
    }

    fn is_23_234<E>(node: Option<&Node<E>>, mode: Mode) -> bool {
        let Some(n) = node else { return true };
        match mode {
            Mode::Bu23 => {
                // A node may have at most one red child, and it must be
                // the left one.
                if is_red(&n.left) && is_red(&n.right) {
                    return false;
                }
                if is_red(&n.right) {
                    return false;
                }
            }
            Mode::Td234 => {
                if is_red(&n.right) && !is_red(&n.left) && n.left.is_some() {
                    return false;
                }
            }
        }
        if n.color == Color::Red && is_red(&n.left) && left_left_red(&n.left) {
            return false;
        }
        is_23_234(n.left.as_deref(), mode) && is_23_234(n.right.as_deref(), mode)
    }

    fn black_path_count<E>(node: Option<&Node<E>>, mut black: i32) -> bool {
        let Some(n) = node else { return black == 0 };
        if n.color == Color::Black {
            black -= 1;
        }
        black_path_count(n.left.as_deref(), black) && black_path_count(n.right.as_deref(), black)
    }

    fn is_balanced<E>(tree: &Tree<E>) -> bool {
        let mut black = 0;
        let mut node = tree.root.as_deref();
        while let Some(n) = node {
            if n.color == Color::Black {
                black += 1;
            }
            node = n.left.as_deref();
        }
        black_path_count(tree.root.as_deref(), black)
    }

    fn check_invariants<E: Compare>(t: &Tree<E>) {
        if t.is_empty() {
            return;
        }
        let (min, max) = (t.min().unwrap(), t.max().unwrap());
        assert!(is_bst(t.root.as_deref(), min, max), "BST order violated");
        assert!(is_23_234(t.root.as_deref(), t.mode), "2-3 shape violated");
        assert!(is_balanced(t), "black-link balance violated");
    }

    #[test]
    fn ascending_insertion_stays_balanced() {
        for mode in [Mode::Bu23, Mode::Td234] {
            let mut t = Tree::with_mode(mode);
            for i in 0..=1000i64 {
                assert_eq!(t.insert(i), None);
                check_invariants(&t);
            }
            assert_eq!(t.min(), Some(&0));
            assert_eq!(t.max(), Some(&1000));
            assert_eq!(t.len(), 1001);
        }
    }

    #[test]
    fn reinsertion_replaces() {
        let mut t = Tree::new();
        for i in 0..100i64 {
            t.insert(i);
        }
        for i in 0..100i64 {
            assert_eq!(t.insert(i), Some(i));
        }
        assert_eq!(t.len(), 100);
    }

    #[test]
    fn ascending_deletion_stays_balanced() {
        let mut t = Tree::new();
        for i in 0..=1000i64 {
            t.insert(i);
        }
        for i in 0..=1000i64 {
            assert_eq!(t.delete(&i), Some(i));
            check_invariants(&t);
        }
        assert!(t.is_empty());
    }

    #[test]
    fn delete_absent_is_none() {
        let mut t = Tree::new();
        for i in (0..100i64).step_by(2) {
            t.insert(i);
        }
        assert_eq!(t.delete(&1i64), None);
        assert_eq!(t.delete(&99), None);
        assert_eq!(t.delete(&-1), None);
        assert_eq!(t.len(), 50);
    }

    #[test]
    fn delete_min_max_converge() {
        let mut t = Tree::new();
        for i in 0..=10i64 {
            t.insert(i);
        }
        let (mut min, mut max) = (0i64, 10i64);
        for _ in 0..5 {
            assert_eq!(t.delete_min(), Some(min));
            min += 1;
            assert_eq!(t.min(), Some(&min));
            assert_eq!(t.delete_max(), Some(max));
            max -= 1;
            assert_eq!(t.max(), Some(&max));
            check_invariants(&t);
        }
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn empty_tree_operations() {
        let mut t = Tree::<i64>::new();
        assert_eq!(t.min(), None);
        assert_eq!(t.max(), None);
        assert_eq!(t.get(&1i64), None);
        assert_eq!(t.delete_min(), None);
        assert_eq!(t.delete_max(), None);
        assert_eq!(t.delete(&1i64), None);
        assert!(!t.walk(|_| true));
    }

    #[test]
    fn random_insertion_deletion_invariants() {
        let mut rng = rand::rng();
        let mut t = Tree::new();
        let mut model = std::collections::BTreeSet::new();
        for _ in 0..10_000 {
            if rng.random::<bool>() {
                let v = rng.random_range(0..1000i64);
                assert_eq!(t.insert(v).is_some(), !model.insert(v));
            } else {
                let v = rng.random_range(0..1000i64);
                assert_eq!(t.delete(&v).is_some(), model.remove(&v));
            }
            check_invariants(&t);
            assert_eq!(t.len(), model.len());
        }
    }

    #[test]
    fn deletion_near_the_right_edge() {
        // Shapes that exercise the rotate-right path ahead of a right
        // descent.
        for (max, target) in [(14, 14), (15, 15), (16, 15), (16, 16), (17, 16), (17, 17)] {
            let mut t = Tree::new();
            for i in 0..=max {
                t.insert(i);
            }
            assert_eq!(t.delete(&target), Some(target));
            check_invariants(&t);
        }
    }

    #[test]
    #[should_panic(expected = "deletion is only implemented")]
    fn td234_deletion_panics() {
        let mut t = Tree::with_mode(Mode::Td234);
        t.insert(1i64);
        t.delete(&1i64);
    }
}
