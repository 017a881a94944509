/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use std::cmp::Ordering;
use std::fmt;

use llrb::{Compare, Tree};

use crate::{StepError, StepValue};

/// A run boundary: the value of the vector from `pos` up to the next
/// stored boundary. The end sentinel is the largest key and holds `None`.
#[derive(Debug, Clone)]
struct StepPos<T> {
    pos: i64,
    val: Option<T>,
}

impl<T> Compare for StepPos<T> {
    fn compare(&self, other: &Self) -> Ordering {
        self.pos.cmp(&other.pos)
    }
}

/// Probe that matches the boundary at an exact position, and floors or
/// ceils to a neighbor otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PosQuery(i64);

impl<T> Compare<StepPos<T>> for PosQuery {
    fn compare(&self, other: &StepPos<T>) -> Ordering {
        self.0.cmp(&other.pos)
    }
}

impl Compare for PosQuery {
    fn compare(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Probe that sorts itself after a boundary at the same position, so a
/// ceiling search finds the first boundary strictly greater.
struct UpperQuery(i64);

impl<T> Compare<StepPos<T>> for UpperQuery {
    fn compare(&self, other: &StepPos<T>) -> Ordering {
        match self.0.cmp(&other.pos) {
            Ordering::Equal => Ordering::Greater,
            c => c,
        }
    }
}

/// A run-length-encoded vector over `[start, end)` on the integer line.
///
/// Out-of-extent reads fail with [`StepError::OutOfRange`]. Out-of-extent
/// writes fail the same way unless the vector is *relaxed*
/// ([`Vector::set_relaxed`]), in which case the extent grows to cover the
/// write and any gap is filled with the zero value the vector was created
/// with.
pub struct Vector<T: StepValue> {
    zero: T,
    relaxed: bool,
    t: Tree<StepPos<T>>,
    min_pos: i64,
    max_pos: i64,
}

impl<T: StepValue> Vector<T> {
    /// Creates a vector spanning `[start, end)` holding `zero` everywhere.
    ///
    /// Returns [`StepError::ZeroLength`] when `start >= end`.
    pub fn new(start: i64, end: i64, zero: T) -> Result<Self, StepError> {
        if start >= end {
            return Err(StepError::ZeroLength);
        }
        let mut t = Tree::new();
        t.insert(StepPos {
            pos: start,
            val: Some(zero.clone()),
        });
        t.insert(StepPos {
            pos: end,
            val: None,
        });
        Ok(Vector {
            zero,
            relaxed: false,
            t,
            min_pos: start,
            max_pos: end,
        })
    }

    /// The index of the vector's first position.
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.min_pos
    }

    /// The index one past the vector's last position.
    #[must_use]
    pub const fn end(&self) -> i64 {
        self.max_pos
    }

    /// The number of represented positions, `end - start`.
    #[must_use]
    pub const fn len(&self) -> i64 {
        self.max_pos - self.min_pos
    }

    /// A step vector is never empty; construction rejects zero length.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The number of stored runs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.t.len() - 1
    }

    /// The ground value gaps are filled with.
    #[must_use]
    pub const fn zero(&self) -> &T {
        &self.zero
    }

    /// Whether out-of-extent writes grow the vector.
    #[must_use]
    pub const fn relaxed(&self) -> bool {
        self.relaxed
    }

    /// Allows or forbids out-of-extent writes.
    pub fn set_relaxed(&mut self, relaxed: bool) {
        self.relaxed = relaxed;
    }

    /// The value at position `i`.
    pub fn at(&self, i: i64) -> Result<&T, StepError> {
        if i < self.min_pos || i >= self.max_pos {
            return Err(StepError::OutOfRange);
        }
        let step = self.t.floor(&PosQuery(i)).expect("extent is covered by runs");
        Ok(step.val.as_ref().expect("interior boundaries carry values"))
    }

    /// The run containing `i`, as `(run_start, run_end, value)` with
    /// `run_start <= i < run_end`.
    pub fn step_at(&self, i: i64) -> Result<(i64, i64, &T), StepError> {
        if i < self.min_pos || i >= self.max_pos {
            return Err(StepError::OutOfRange);
        }
        let lo = self.t.floor(&PosQuery(i)).expect("extent is covered by runs");
        let hi = self.t.ceil(&UpperQuery(i)).expect("the end sentinel bounds every run");
        let val = lo.val.as_ref().expect("interior boundaries carry values");
        Ok((lo.pos, hi.pos, val))
    }

    /// Sets position `i` to `e`.
    pub fn set(&mut self, i: i64, e: T) -> Result<(), StepError> {
        self.set_range(i, i + 1, e)
    }

    /// Sets every position in `[start, end)` to `e`, merging the write
    /// into neighboring runs of equal value.
    ///
    /// An empty range is a no-op. Returns [`StepError::InvertedRange`]
    /// when `end < start`, and [`StepError::OutOfRange`] when any part of
    /// the range lies outside the extent of a non-relaxed vector.
    pub fn set_range(&mut self, start: i64, end: i64, e: T) -> Result<(), StepError> {
        if end < start {
            return Err(StepError::InvertedRange);
        }
        if end == start {
            return Ok(());
        }

        if end <= self.min_pos || start >= self.max_pos {
            if !self.relaxed {
                return Err(StepError::OutOfRange);
            }
            if end <= self.min_pos {
                self.extend_left(start, end, e);
            } else {
                self.extend_right(start, end, e);
            }
            return Ok(());
        }

        if start < self.min_pos || end > self.max_pos {
            if !self.relaxed {
                return Err(StepError::OutOfRange);
            }
            if end > self.max_pos {
                // The write covers the gap, so only the sentinel moves.
                self.move_boundary(self.max_pos, end);
                self.max_pos = end;
            }
            if start < self.min_pos {
                self.min_pos = start;
            }
        }

        self.set_range_inside(start, end, e);
        Ok(())
    }

    /// Calls `f(run_start, run_end, value)` for every run in ascending
    /// order of start position.
    pub fn walk<F>(&self, mut f: F)
    where
        F: FnMut(i64, i64, &T),
    {
        let mut last: Option<&StepPos<T>> = None;
        for p in self.t.iter() {
            if let Some(lp) = last {
                let val = lp.val.as_ref().expect("interior boundaries carry values");
                f(lp.pos, p.pos, val);
            }
            last = Some(p);
        }
    }

    /// Calls `f(run_start, run_end, value)` for every run intersecting
    /// `[from, to)`, clipping the first and last runs to the window.
    pub fn walk_range<F>(&self, from: i64, to: i64, mut f: F) -> Result<(), StepError>
    where
        F: FnMut(i64, i64, &T),
    {
        if to < from {
            return Err(StepError::InvertedRange);
        }
        if to <= self.min_pos || from >= self.max_pos {
            return Err(StepError::OutOfRange);
        }
        let from = from.max(self.min_pos);
        let to = to.min(self.max_pos);

        let (_, first_end, first_val) = self.step_at(from)?;
        f(from, first_end.min(to), first_val);
        if first_end >= to {
            return Ok(());
        }

        let mut last: Option<(i64, T)> = None;
        self.t.walk_range(
            |p: &StepPos<T>| {
                if let Some((lp, lv)) = &last {
                    f(*lp, p.pos, lv);
                }
                last = Some((p.pos, p.val.clone().expect("interior boundaries carry values")));
                false
            },
            &PosQuery(first_end),
            &PosQuery(to),
        );
        if let Some((lp, lv)) = &last
            && to > *lp
        {
            f(*lp, to, lv);
        }
        Ok(())
    }

    /// Applies `m` to the value of every run, merging runs the mutation
    /// makes redundant.
    pub fn apply<M>(&mut self, m: M)
    where
        M: FnMut(&T) -> T,
    {
        let (start, end) = (self.min_pos, self.max_pos);
        self.apply_range(start, end, m)
            .expect("the full extent is always a valid window");
    }

    /// Applies `m` to every position in `[from, to)`, merging runs the
    /// mutation makes redundant. A run straddling `to` keeps its original
    /// value from `to` onwards.
    pub fn apply_range<M>(&mut self, from: i64, to: i64, mut m: M) -> Result<(), StepError>
    where
        M: FnMut(&T) -> T,
    {
        if to < from {
            return Err(StepError::InvertedRange);
        }
        if to <= self.min_pos || from >= self.max_pos {
            return Err(StepError::OutOfRange);
        }
        let from = from.max(self.min_pos);
        let to = to.min(self.max_pos);
        if from == to {
            return Ok(());
        }

        let mut runs: Vec<(i64, i64, T)> = Vec::new();
        self.walk_range(from, to, |s, e, v| runs.push((s, e, v.clone())))?;
        for (s, e, v) in runs {
            let mutated = m(&v);
            self.set_range(s, e, mutated)
                .expect("snapshotted runs lie inside the extent");
        }
        Ok(())
    }

    /// Moves the boundary stored at `from` to `to`, keeping its value.
    fn move_boundary(&mut self, from: i64, to: i64) {
        let node = self
            .t
            .delete(&PosQuery(from))
            .expect("caller names a stored boundary");
        self.t.insert(StepPos { pos: to, val: node.val });
    }

    fn insert_value(&mut self, pos: i64, val: T) {
        self.t.insert(StepPos { pos, val: Some(val) });
    }

    /// Writes `[start, end)` entirely left of the extent; the gap up to
    /// the old start fills with zero.
    fn extend_left(&mut self, start: i64, end: i64, e: T) {
        let min_is_zero = {
            let min = self.t.floor(&PosQuery(self.min_pos)).expect("min boundary exists");
            let val = min.val.as_ref().expect("interior boundaries carry values");
            val.equal(&self.zero)
        };
        if end == self.min_pos {
            let merges = {
                let min = self.t.floor(&PosQuery(self.min_pos)).expect("min boundary exists");
                e.equal(min.val.as_ref().expect("interior boundaries carry values"))
            };
            if merges {
                self.move_boundary(self.min_pos, start);
            } else {
                self.insert_value(start, e);
            }
        } else {
            if min_is_zero {
                self.move_boundary(self.min_pos, end);
            } else {
                let zero = self.zero.clone();
                self.insert_value(end, zero);
            }
            if e.equal(&self.zero) {
                self.move_boundary(end, start);
            } else {
                self.insert_value(start, e);
            }
        }
        self.min_pos = start;
    }

    /// Writes `[start, end)` at or past the extent's end; the gap from the
    /// old end fills with zero.
    fn extend_right(&mut self, start: i64, end: i64, e: T) {
        let old_max = self.max_pos;
        self.move_boundary(old_max, end);
        self.max_pos = end;

        let last_val_matches = |v: &T, vec: &Self| {
            let last = vec.t.floor(&PosQuery(start)).expect("runs exist left of the old end");
            v.equal(last.val.as_ref().expect("interior boundaries carry values"))
        };
        if start == old_max {
            if !last_val_matches(&e, self) {
                self.insert_value(start, e);
            }
        } else {
            let zero = self.zero.clone();
            if !last_val_matches(&zero, self) {
                self.insert_value(old_max, zero);
            }
            if !e.equal(&self.zero) {
                self.insert_value(start, e);
            }
        }
    }

    /// The write overlaps the extent. Removes every boundary inside the
    /// window and reknits the edges, merging equal-valued neighbors.
    fn set_range_inside(&mut self, start: i64, end: i64, e: T) {
        let mut positions: Vec<i64> = Vec::new();
        self.t.walk_range(
            |p: &StepPos<T>| {
                positions.push(p.pos);
                false
            },
            &PosQuery(start),
            &PosQuery(end),
        );
        let mut deleted: Vec<StepPos<T>> = positions
            .iter()
            .map(|&p| self.t.delete(&PosQuery(p)).expect("collected above"))
            .collect();

        // lo: where the run covering `start` begins; la: the value of the
        // run that reaches `end`, needed to re-materialize the tail.
        let (lo_pos, la_val): (i64, Option<T>) = if deleted.is_empty() {
            let f = self.t.floor(&PosQuery(start)).expect("window overlaps the extent");
            (f.pos, f.val.clone())
        } else {
            let lo_pos = deleted[0].pos;
            let last = deleted.pop().expect("non-empty");
            (lo_pos, last.val)
        };

        let (hi_pos, hi_val) = {
            let hi = self.t.ceil(&PosQuery(end)).expect("the end sentinel bounds every window");
            (hi.pos, hi.val.clone())
        };
        let prev_val: Option<T> = self
            .t
            .floor(&PosQuery(start - 1))
            .map(|p| p.val.clone().expect("interior boundaries carry values"));

        let prev_same = prev_val.as_ref().is_some_and(|v| e.equal(v));
        let hi_same = hi_val.as_ref().is_some_and(|v| e.equal(v));
        let tail_same = la_val.as_ref().is_some_and(|v| e.equal(v));

        if start == lo_pos {
            if hi_pos == end {
                match (hi_same, prev_same) {
                    (true, true) => {
                        self.t.delete(&PosQuery(hi_pos));
                    }
                    (false, true) => {}
                    (true, false) => self.move_boundary(hi_pos, start),
                    (false, false) => {
                        self.insert_value(start, e);
                        if prev_val.is_none() {
                            self.min_pos = start;
                        }
                    }
                }
            } else {
                if !tail_same {
                    self.t.insert(StepPos { pos: end, val: la_val });
                }
                if prev_val.is_none() {
                    self.insert_value(start, e);
                    self.min_pos = start;
                } else if !prev_same {
                    self.insert_value(start, e);
                }
            }
        } else if hi_pos == end {
            if hi_same {
                self.move_boundary(hi_pos, start);
            } else {
                self.insert_value(start, e);
            }
        } else {
            self.insert_value(start, e);
            if !tail_same {
                self.t.insert(StepPos { pos: end, val: la_val });
            }
        }
    }
}

impl<T: StepValue + fmt::Display> fmt::Display for Vector<T> {
    /// Renders boundary positions and values as
    /// `[pos:val pos:val ... end:<nil>]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        let mut sep = "";
        for p in self.t.iter() {
            match &p.val {
                Some(v) => write!(f, "{sep}{}:{v}", p.pos)?,
                None => write!(f, "{sep}{}:<nil>", p.pos)?,
            }
            sep = " ";
        }
        write!(f, "]")
    }
}

impl<T: StepValue + fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut steps = f.debug_map();
        for p in self.t.iter() {
            steps.entry(&p.pos, &p.val);
        }
        steps.finish()
    }
}
