/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The structured representation of index expressions.
//!
//! An [`IndexExpr`] is either a single [`Index`] or a tuple of them,
//! one per dimension. Components are plain integers, ellipses,
//! generalized ranges whose bounds may be any [`Bound`], or
//! standalone scalars (floats, text, instants) used for
//! coordinate-based lookups.
//!
//! Expressions are immutable values. Build them with the [`dsl`]
//! constructors or the `From` conversions:
//!
//! ```
//! use ndindex::IndexExpr;
//! use ndindex::dsl::*;
//!
//! let expr = tuple([range(1..), int(0), ellipsis()]);
//! assert_eq!(expr.to_string(), "[1:, 0, ...]");
//! ```

use serde::Deserialize;
use serde::Serialize;

use crate::instant::Instant;

/// A scalar allowed as a range bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    Integer(i64),
    Float(f64),
    Text(String),
    Instant(Instant),
}

impl Bound {
    /// The integer value of this bound, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Bound::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<i64> for Bound {
    fn from(n: i64) -> Self {
        Bound::Integer(n)
    }
}

impl From<f64> for Bound {
    fn from(x: f64) -> Self {
        Bound::Float(x)
    }
}

impl From<&str> for Bound {
    fn from(s: &str) -> Self {
        Bound::Text(s.to_string())
    }
}

impl From<String> for Bound {
    fn from(s: String) -> Self {
        Bound::Text(s)
    }
}

impl From<Instant> for Bound {
    fn from(instant: Instant) -> Self {
        Bound::Instant(instant)
    }
}

/// A generalized slice. Each bound is independently optional and
/// may be of any [`Bound`] kind, so numeric, text and datetime
/// ranges (and mixtures of them) are all representable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: Option<Bound>,
    pub stop: Option<Bound>,
    pub step: Option<Bound>,
}

impl Range {
    pub fn new(start: Option<Bound>, stop: Option<Bound>, step: Option<Bound>) -> Self {
        Self { start, stop, step }
    }

    /// The range `:`, selecting everything.
    pub fn full() -> Self {
        Self::default()
    }

    /// This range with its step replaced.
    pub fn with_step(self, step: impl Into<Bound>) -> Self {
        Self {
            step: Some(step.into()),
            ..self
        }
    }

    /// Whether all three bounds are absent.
    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.stop.is_none() && self.step.is_none()
    }
}

impl From<std::ops::Range<i64>> for Range {
    fn from(r: std::ops::Range<i64>) -> Self {
        Self::new(Some(r.start.into()), Some(r.end.into()), None)
    }
}

impl From<std::ops::RangeFrom<i64>> for Range {
    fn from(r: std::ops::RangeFrom<i64>) -> Self {
        Self::new(Some(r.start.into()), None, None)
    }
}

impl From<std::ops::RangeTo<i64>> for Range {
    fn from(r: std::ops::RangeTo<i64>) -> Self {
        Self::new(None, Some(r.end.into()), None)
    }
}

impl From<std::ops::RangeFull> for Range {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::full()
    }
}

/// One component of an index expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Index {
    /// No constraint along this dimension. Rendered as `:`.
    Wildcard,

    /// All remaining dimensions.
    Ellipsis,

    /// The explicit empty selection `()`.
    EmptyTuple,

    /// A single position; removes the dimension when applied.
    Integer(i64),

    /// A standalone float, e.g. a coordinate value.
    Float(f64),

    /// A standalone label.
    Text(String),

    /// A standalone timestamp.
    Instant(Instant),

    Range(Range),
}

impl From<i64> for Index {
    fn from(n: i64) -> Self {
        Index::Integer(n)
    }
}

impl From<f64> for Index {
    fn from(x: f64) -> Self {
        Index::Float(x)
    }
}

impl From<&str> for Index {
    fn from(s: &str) -> Self {
        Index::Text(s.to_string())
    }
}

impl From<String> for Index {
    fn from(s: String) -> Self {
        Index::Text(s)
    }
}

impl From<Instant> for Index {
    fn from(instant: Instant) -> Self {
        Index::Instant(instant)
    }
}

impl From<Range> for Index {
    fn from(range: Range) -> Self {
        Index::Range(range)
    }
}

impl From<Bound> for Index {
    fn from(bound: Bound) -> Self {
        match bound {
            Bound::Integer(n) => Index::Integer(n),
            Bound::Float(x) => Index::Float(x),
            Bound::Text(s) => Index::Text(s),
            Bound::Instant(t) => Index::Instant(t),
        }
    }
}

/// A complete index expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexExpr {
    Single(Index),
    Tuple(Vec<Index>),
}

impl IndexExpr {
    /// The components of this expression, in order.
    pub fn components(&self) -> &[Index] {
        match self {
            IndexExpr::Single(index) => std::slice::from_ref(index),
            IndexExpr::Tuple(indices) => indices,
        }
    }

    /// The number of `Ellipsis` components.
    pub fn ellipsis_count(&self) -> usize {
        self.components()
            .iter()
            .filter(|index| matches!(index, Index::Ellipsis))
            .count()
    }

    /// Whether this is the reserved empty selection: `()` alone or a
    /// tuple with no components.
    pub fn is_empty_tuple(&self) -> bool {
        match self {
            IndexExpr::Single(Index::EmptyTuple) => true,
            IndexExpr::Tuple(indices) => indices.is_empty(),
            _ => false,
        }
    }
}

impl From<Index> for IndexExpr {
    fn from(index: Index) -> Self {
        IndexExpr::Single(index)
    }
}

impl From<i64> for IndexExpr {
    fn from(n: i64) -> Self {
        IndexExpr::Single(Index::Integer(n))
    }
}

impl From<Range> for IndexExpr {
    fn from(range: Range) -> Self {
        IndexExpr::Single(Index::Range(range))
    }
}

impl From<Vec<Index>> for IndexExpr {
    fn from(indices: Vec<Index>) -> Self {
        IndexExpr::Tuple(indices)
    }
}

impl FromIterator<Index> for IndexExpr {
    fn from_iter<I: IntoIterator<Item = Index>>(iter: I) -> Self {
        IndexExpr::Tuple(iter.into_iter().collect())
    }
}

// Compile-time check: expressions are shareable across threads.
fn _assert_index_traits()
where
    IndexExpr: Send + Sync + 'static,
{
}

/// Free constructors for index expressions.
pub mod dsl {
    use super::Bound;
    use super::Index;
    use super::IndexExpr;
    use super::Range;
    use crate::instant::Instant;

    pub fn wildcard() -> Index {
        Index::Wildcard
    }
    pub fn ellipsis() -> Index {
        Index::Ellipsis
    }
    pub fn empty() -> Index {
        Index::EmptyTuple
    }
    pub fn int(n: i64) -> Index {
        Index::Integer(n)
    }
    pub fn float(x: f64) -> Index {
        Index::Float(x)
    }
    pub fn text(s: impl Into<String>) -> Index {
        Index::Text(s.into())
    }
    pub fn instant(t: Instant) -> Index {
        Index::Instant(t)
    }
    pub fn range<R: Into<Range>>(r: R) -> Index {
        Index::Range(r.into())
    }
    /// A range from explicit, possibly absent, bounds.
    pub fn slice(start: Option<Bound>, stop: Option<Bound>, step: Option<Bound>) -> Index {
        Index::Range(Range::new(start, stop, step))
    }
    pub fn tuple<I: IntoIterator<Item = Index>>(indices: I) -> IndexExpr {
        indices.into_iter().collect()
    }
}
