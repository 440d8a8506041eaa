/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Property-based generators for [`IndexExpr`] and related types.
//!
//! These strategies are used in `proptest`-based tests to construct
//! randomized index expressions and array shapes for notation
//! round-trip and shape derivation tests.
//!
//! The main entry point is [`gen_index_expr`], which generates an
//! expression in the form its canonical notation reads back as:
//! never a bare wildcard, never a one-element tuple, never more than
//! one ellipsis, and text that cannot be mistaken for a timestamp.
//!
//! Example usage:
//!
//! ```
//! use proptest::prelude::*;
//!
//! use crate::strategy::gen_index_expr;
//!
//! proptest! {
//!     #[test]
//!     fn test_expr(expr in gen_index_expr()) {
//!         // Use `expr` as input to notation tests
//!     }
//! }
//! ```
//!
//! This module is only included in test builds (`#[cfg(test)]`).

use chrono::FixedOffset;
use chrono::NaiveDate;
use proptest::prelude::*;

use crate::index::Bound;
use crate::index::Index;
use crate::index::IndexExpr;
use crate::index::Range;
use crate::instant::Instant;

/// Generates a shape with between 1 and `max_dims` dimensions, each
/// of length between 1 and `max_len` (inclusive).
pub fn gen_shape(max_dims: usize, max_len: i64) -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(1..=max_len, 1..=max_dims)
}

/// Generates an [`Instant`] with four-digit years, microsecond
/// precision, and (optionally) an offset of whole minutes.
pub fn gen_instant() -> impl Strategy<Value = Instant> {
    (
        1000i32..=9999,
        1u32..=12,
        1u32..=28,
        0u32..24,
        0u32..60,
        0u32..60,
        0u32..1_000_000,
        prop::option::of(-(14 * 60)..=14 * 60i32),
    )
        .prop_map(|(year, month, day, hour, min, sec, micro, offset)| {
            let datetime = NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|date| date.and_hms_micro_opt(hour, min, sec, micro))
                .expect("valid date and time");
            match offset.and_then(|minutes| FixedOffset::east_opt(minutes * 60)) {
                Some(offset) => Instant::with_offset(
                    datetime
                        .and_local_timezone(offset)
                        .single()
                        .expect("fixed offsets are unambiguous"),
                ),
                None => Instant::naive(datetime),
            }
            .expect("representable instant")
        })
}

/// Generates text that reads back as itself: no escape markers, and
/// a leading letter so that it is never a timestamp.
pub fn gen_text() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_ ,:.\\-]{0,8}"
}

/// Generates any [`Bound`] except an instant.
pub fn gen_plain_bound() -> BoxedStrategy<Bound> {
    prop_oneof![
        any::<i64>().prop_map(Bound::Integer),
        (-1.0e6..1.0e6f64).prop_map(Bound::Float),
        gen_text().prop_map(Bound::Text),
    ]
    .boxed()
}

/// Generates any [`Bound`].
pub fn gen_bound() -> BoxedStrategy<Bound> {
    prop_oneof![
        3 => gen_plain_bound(),
        1 => gen_instant().prop_map(Bound::Instant),
    ]
    .boxed()
}

/// Generates a [`Range`] that reads back as itself. Ranges holding
/// instants take one of the datetime forms: instants filling the
/// bounds from the start, or a single instant as the stop bound.
pub fn gen_range() -> BoxedStrategy<Range> {
    let plain = (
        prop::option::of(gen_plain_bound()),
        prop::option::of(gen_plain_bound()),
        prop::option::of(gen_plain_bound()),
    )
        .prop_map(|(start, stop, step)| Range::new(start, stop, step));
    let leading = prop::collection::vec(gen_instant(), 1..=3).prop_map(|instants| {
        let mut bounds = instants.into_iter().map(Bound::Instant);
        Range::new(bounds.next(), bounds.next(), bounds.next())
    });
    let stop = (
        prop::option::of(gen_plain_bound()),
        gen_instant(),
        prop::option::of(gen_plain_bound()),
    )
        .prop_map(|(start, stop, step)| Range::new(start, Some(stop.into()), step));

    prop_oneof![2 => plain, 1 => leading, 1 => stop].boxed()
}

/// Generates any [`Index`] except `Wildcard` and `Ellipsis`.
pub fn gen_index() -> BoxedStrategy<Index> {
    prop_oneof![
        Just(Index::EmptyTuple),
        gen_bound().prop_map(Index::from),
        gen_range().prop_map(Index::Range),
    ]
    .boxed()
}

/// Generates an [`IndexExpr`]: a single component, or a tuple of 2
/// to 5 components with at most one ellipsis.
pub fn gen_index_expr() -> impl Strategy<Value = IndexExpr> {
    let single = prop_oneof![Just(Index::Ellipsis), gen_index()].prop_map(IndexExpr::Single);
    let tuple = (
        prop::collection::vec(gen_index(), 2..=5),
        any::<prop::sample::Index>(),
        any::<bool>(),
    )
        .prop_map(|(mut indices, at, ellipsis)| {
            if ellipsis {
                let pos = at.index(indices.len());
                indices[pos] = Index::Ellipsis;
            }
            IndexExpr::Tuple(indices)
        });
    prop_oneof![single, tuple]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instant::is_timestamp;

    proptest! {
        #[test]
        fn test_gen_index_expr(expr in gen_index_expr()) {
            prop_assert!(expr.ellipsis_count() <= 1);
            if let IndexExpr::Tuple(indices) = &expr {
                prop_assert!(indices.len() >= 2);
            }
            prop_assert!(!expr.components().contains(&Index::Wildcard));
        }

        #[test]
        fn test_gen_instant(instant in gen_instant()) {
            prop_assert!(is_timestamp(&instant.to_string()));
            prop_assert_eq!(instant.to_string().parse::<Instant>().unwrap(), instant);
        }

        #[test]
        fn test_gen_shape(shape in gen_shape(4, 8)) {
            prop_assert!(!shape.is_empty() && shape.len() <= 4);
            prop_assert!(shape.iter().all(|&len| (1..=8).contains(&len)));
        }
    }
}
