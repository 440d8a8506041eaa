/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The canonical text form of index expressions.
//!
//! An expression is written inside a pair of brackets, with its
//! components separated by `, `:
//!
//! ```
//! use ndindex::dsl::*;
//! use ndindex::from_text;
//! use ndindex::to_text;
//!
//! let expr = tuple([int(-1), range(..3), ellipsis()]);
//! assert_eq!(to_text(&expr).unwrap(), "[-1, :3, ...]");
//! assert_eq!(from_text("[-1, :3, ...]").unwrap(), expr);
//! ```
//!
//! Text and timestamps are wrapped in [`ESCAPE`] markers so that
//! their contents are never mistaken for structure. A value that
//! itself contains the marker does not round-trip: a token is only
//! unwrapped when it carries exactly two markers.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::index::Bound;
use crate::index::Index;
use crate::index::IndexExpr;
use crate::index::Range;

mod lexer;
mod parse;

pub use parse::DecodeError;

/// Wraps text and timestamp values.
pub const ESCAPE: char = '`';

/// All remaining dimensions.
pub const ELLIPSIS: &str = "...";

/// The explicit empty selection.
pub const EMPTY_TUPLE: &str = "()";

/// An absent bound.
pub const NONE: &str = "None";

/// Errors that occur while reading or writing index notation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NotationError {
    #[error("invalid index notation `{input}`: shall be enclosed in brackets: `[{input}]`")]
    Unbracketed { input: String },

    #[error("invalid index notation `{input}`: no components")]
    Empty { input: String },

    #[error("invalid index notation `{input}`: brackets cannot be nested")]
    NestedBrackets { input: String },

    #[error("an index expression can only have a single ellipsis, got {count}")]
    MultipleEllipses { count: usize },

    #[error("invalid component `{component}`")]
    InvalidComponent {
        component: String,
        #[source]
        source: DecodeError,
    },
}

/// Render `expr` in canonical notation.
pub fn to_text(expr: &IndexExpr) -> Result<String, NotationError> {
    let count = expr.ellipsis_count();
    if count > 1 {
        return Err(NotationError::MultipleEllipses { count });
    }
    let text = expr.to_string();
    tracing::trace!(%text, "encoded index expression");
    Ok(text)
}

/// Parse an expression from canonical notation.
pub fn from_text(input: &str) -> Result<IndexExpr, NotationError> {
    match parse::expression(input) {
        Ok(expr) => {
            tracing::trace!(input, ?expr, "decoded index expression");
            Ok(expr)
        }
        Err(err) => {
            tracing::debug!(input, error = %err, "rejected index notation");
            Err(err)
        }
    }
}

impl FromStr for IndexExpr {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        from_text(s)
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    let s = x.to_string();
    if x.is_finite() && !s.contains('.') {
        write!(f, "{}.0", s)
    } else {
        f.write_str(&s)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Integer(n) => write!(f, "{}", n),
            Bound::Float(x) => write_float(f, *x),
            Bound::Text(s) => write!(f, "{ESCAPE}{s}{ESCAPE}"),
            Bound::Instant(t) => write!(f, "{ESCAPE}{t}{ESCAPE}"),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = [&self.start, &self.stop, &self.step]
            .into_iter()
            .map(|bound| match bound {
                Some(bound) => bound.to_string(),
                None => String::new(),
            })
            .join(":");
        f.write_str(text.strip_suffix(':').unwrap_or(&text))
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Wildcard => f.write_str(":"),
            Index::Ellipsis => f.write_str(ELLIPSIS),
            Index::EmptyTuple => f.write_str(EMPTY_TUPLE),
            Index::Integer(n) => write!(f, "{}", n),
            Index::Float(x) => write_float(f, *x),
            Index::Text(s) => write!(f, "{ESCAPE}{s}{ESCAPE}"),
            Index::Instant(t) => write!(f, "{ESCAPE}{t}{ESCAPE}"),
            Index::Range(range) => write!(f, "{}", range),
        }
    }
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty_tuple() {
            return write!(f, "[{EMPTY_TUPLE}]");
        }
        write!(f, "[{}]", self.components().iter().join(", "))
    }
}
