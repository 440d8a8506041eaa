/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Shape derivation: the shape of the view that results from applying
//! an [`IndexExpr`] to an array, computed without touching any data.
//!
//! ```
//! use ndindex::dsl::*;
//! use ndindex::shape_from_index;
//!
//! let shape = [361, 720, 4];
//! assert_eq!(shape_from_index(&shape, &0_i64.into()).unwrap(), vec![720, 4]);
//! assert_eq!(
//!     shape_from_index(&shape, &tuple([range(1..), ellipsis()])).unwrap(),
//!     vec![360, 720, 4]
//! );
//! ```

use crate::index::Bound;
use crate::index::Index;
use crate::index::IndexExpr;
use crate::index::Range;

/// Errors that occur while deriving a shape.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum IndexError {
    #[error("too many indices: array is {ndim}-dimensional, but {count} were indexed")]
    TooManyIndices { ndim: usize, count: usize },

    #[error("an index can only have a single ellipsis, got {count}")]
    MultipleEllipses { count: usize },

    #[error("step {step} along dimension {dim} is not supported: steps must be 1")]
    NonUnitStep { dim: usize, step: Bound },

    #[error("component {component} along dimension {dim} has no shape")]
    UnsupportedComponent { dim: usize, component: Index },

    #[error("range bound {bound} is not an integer")]
    UnsupportedBound { bound: Bound },
}

/// A range over integer positions: the only kind of [`Range`] that
/// takes part in shape derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct IntRange {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl IntRange {
    pub fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Resolve defaults and negative positions against a dimension
    /// of length `dim_len`. Results are not clamped, except at the
    /// limits of `i64`.
    pub fn resolve(&self, dim_len: i64) -> (i64, i64, i64) {
        let wrap = |pos: i64| if pos < 0 { dim_len.saturating_add(pos) } else { pos };
        (
            self.start.map_or(0, wrap),
            self.stop.map_or(dim_len, wrap),
            self.step.unwrap_or(1),
        )
    }
}

impl TryFrom<&Range> for IntRange {
    type Error = IndexError;

    fn try_from(range: &Range) -> Result<Self, Self::Error> {
        let integer = |bound: &Option<Bound>| match bound {
            None => Ok(None),
            Some(Bound::Integer(n)) => Ok(Some(*n)),
            Some(bound) => Err(IndexError::UnsupportedBound {
                bound: bound.clone(),
            }),
        };
        Ok(Self::new(
            integer(&range.start)?,
            integer(&range.stop)?,
            integer(&range.step)?,
        ))
    }
}

impl From<std::ops::Range<i64>> for IntRange {
    fn from(r: std::ops::Range<i64>) -> Self {
        Self::new(Some(r.start), Some(r.end), None)
    }
}

impl From<std::ops::RangeFrom<i64>> for IntRange {
    fn from(r: std::ops::RangeFrom<i64>) -> Self {
        Self::new(Some(r.start), None, None)
    }
}

impl From<std::ops::RangeTo<i64>> for IntRange {
    fn from(r: std::ops::RangeTo<i64>) -> Self {
        Self::new(None, Some(r.end), None)
    }
}

impl From<std::ops::RangeFull> for IntRange {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::default()
    }
}

/// Materialize `range` over a dimension of length `dim_len` as
/// concrete `(start, stop, step)`. No range selects the whole
/// dimension.
pub fn resolve_range(dim_len: i64, range: Option<&IntRange>) -> (i64, i64, i64) {
    match range {
        Some(range) => range.resolve(dim_len),
        None => (0, dim_len, 1),
    }
}

/// The number of elements in `start..stop` stepping by `step`, that
/// is `max(0, ceil((stop - start) / step))` for either sign of
/// `step`. A zero step selects nothing.
pub fn range_len(start: i64, stop: i64, step: i64) -> i64 {
    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let len = match step {
        0 => 0,
        step if step > 0 && stop > start => (stop - start + step - 1) / step,
        step if step < 0 && start > stop => (start - stop - step - 1) / -step,
        _ => 0,
    };
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// How one dimension of the source array is indexed.
#[derive(Debug, PartialEq)]
enum Axis {
    /// The dimension is removed from the result.
    Eliminated,
    /// The dimension is kept, restricted to the range if one is given.
    Kept(Option<IntRange>),
}

fn selects_everything(index: &IndexExpr) -> bool {
    match index {
        IndexExpr::Single(Index::Ellipsis | Index::Wildcard) => true,
        IndexExpr::Single(Index::Range(range)) => range.is_full(),
        _ => index.is_empty_tuple(),
    }
}

/// One [`Axis`] per dimension: components right-padded with full
/// ranges, the ellipsis taken as a full range.
fn normalize(ndim: usize, index: &IndexExpr) -> Result<Vec<Axis>, IndexError> {
    let count = index.ellipsis_count();
    if count > 1 {
        return Err(IndexError::MultipleEllipses { count });
    }
    let components = index.components();
    if components.len() > ndim {
        return Err(IndexError::TooManyIndices {
            ndim,
            count: components.len(),
        });
    }

    (0..ndim)
        .map(|dim| match components.get(dim) {
            None | Some(Index::Ellipsis | Index::Wildcard) => Ok(Axis::Kept(None)),
            Some(Index::Integer(_)) => Ok(Axis::Eliminated),
            Some(Index::Range(range)) => match &range.step {
                Some(step) if step.as_integer() != Some(1) => Err(IndexError::NonUnitStep {
                    dim,
                    step: step.clone(),
                }),
                _ => IntRange::try_from(range).map(|range| Axis::Kept(Some(range))),
            },
            Some(component) => Err(IndexError::UnsupportedComponent {
                dim,
                component: component.clone(),
            }),
        })
        .collect()
}

/// The shape of `shape` after applying `index`.
///
/// Integers remove their dimension; ranges keep it with the length
/// they select; missing trailing components (and the ellipsis) select
/// whole dimensions. Only unit steps are supported, and positions are
/// not checked against the dimension lengths.
pub fn shape_from_index(shape: &[i64], index: &IndexExpr) -> Result<Vec<i64>, IndexError> {
    if selects_everything(index) {
        return Ok(shape.to_vec());
    }

    let axes = normalize(shape.len(), index)?;
    let result: Vec<i64> = shape
        .iter()
        .zip(&axes)
        .filter_map(|(&len, axis)| match axis {
            Axis::Eliminated => None,
            Axis::Kept(range) => {
                let (start, stop, step) = resolve_range(len, range.as_ref());
                Some(range_len(start, stop, step))
            }
        })
        .collect();
    tracing::trace!(?shape, %index, ?result, "derived shape");
    Ok(result)
}
