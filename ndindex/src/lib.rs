/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Index expressions for n-dimensional arrays.
//!
//! Provides [`IndexExpr`], a structured index expression (integers,
//! ranges, an ellipsis, and scalar labels, floats and instants used
//! for coordinate lookups), together with:
//!
//! - a compact, bracketed text notation for storing and transmitting
//!   expressions ([`to_text`], [`from_text`]); and
//! - shape derivation: the shape of the view an expression selects
//!   from an array of known shape ([`shape_from_index`]).
//!
//! All operations are pure functions over immutable values.

/// Structured index expressions.
pub mod index;

/// Dates and times carried by index expressions.
pub mod instant;

/// Conversion to and from the canonical text notation.
pub mod notation;

/// Shape derivation and range materialization.
pub mod shape;

/// A scalar allowed as a range bound.
pub use index::Bound;
/// One component of an index expression.
pub use index::Index;
/// A complete index expression.
pub use index::IndexExpr;
/// A range with independently optional bounds of any scalar kind.
pub use index::Range;
/// DSL-style constructors for building `IndexExpr` values.
pub use index::dsl;
pub use instant::Instant;
pub use instant::InstantError;
pub use notation::NotationError;
pub use notation::from_text;
pub use notation::to_text;
pub use shape::IndexError;
pub use shape::IntRange;
pub use shape::resolve_range;
pub use shape::shape_from_index;

/// Property-based generators for randomized test input.
#[cfg(test)]
pub mod strategy;
