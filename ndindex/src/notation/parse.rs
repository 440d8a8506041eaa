/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Decoding of index notation.
//!
//! ```text
//! expr          ::= "[" body "]"
//! body          ::= component ( "," component )* | "()"
//! component     ::= scalar | range
//! range         ::= bound? ":" bound? ( ":" bound? )?
//! bound         ::= scalar
//! scalar        ::= integer | float | "..." | "()" | "None" | ""
//!                 | text | instant
//! integer       ::= "-"? [0-9]+
//! float         ::= "-"? ( [0-9]+ "." [0-9]* | "." [0-9]+ )
//! text          ::= "`" chars "`" | chars
//! instant       ::= "`" iso8601 "`" | iso8601
//! ```
//!
//! Notes:
//! - Components are trimmed; the separator is `,` with optional
//!   whitespace.
//! - `,` and `:` inside a pair of escape markers are content.
//! - A timestamp is anything matching the heuristic
//!   `\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,6})?([+-]\d{2}:\d{2})?`.
//!   A component containing timestamps is a datetime range: the
//!   timestamps are taken whole, and their colons never split bounds.
//!   When the component starts with a timestamp, the timestamps fill
//!   the bounds in order and any other text is ignored. Otherwise the
//!   text before the first timestamp is the start bound and the text
//!   after the last one is the step bound.
//! - A marker-wrapped token is unwrapped only when it carries exactly
//!   two markers.
//! - A bare token with a leading `-` that is neither an integer nor
//!   a float loses the sign: `-abc` decodes to the text `abc`.

use std::num::ParseFloatError;
use std::num::ParseIntError;
use std::ops::Range as Span;

use nom::IResult;
use nom::Parser as _;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::character::complete::digit0;
use nom::character::complete::digit1;
use nom::combinator::all_consuming;
use nom::combinator::recognize;
use nom::combinator::value;

use crate::index::Bound;
use crate::index::Index;
use crate::index::IndexExpr;
use crate::index::Range;
use crate::instant::ISO8601;
use crate::instant::Instant;
use crate::instant::InstantError;
use crate::instant::is_timestamp;
use crate::notation::ELLIPSIS;
use crate::notation::EMPTY_TUPLE;
use crate::notation::ESCAPE;
use crate::notation::NONE;
use crate::notation::NotationError;
use crate::notation::lexer::Lexer;

/// Why a single component failed to decode.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("expected integer but got '{token}'")]
    InvalidInteger {
        token: String,
        #[source]
        error: ParseIntError,
    },

    #[error("expected float but got '{token}'")]
    InvalidFloat {
        token: String,
        #[source]
        error: ParseFloatError,
    },

    #[error("invalid timestamp '{token}'")]
    InvalidInstant {
        token: String,
        #[source]
        error: InstantError,
    },

    #[error("'{token}' cannot be negated")]
    SignedKeyword { token: String },

    #[error("a range has at most 3 parts, got {parts}")]
    TooManyRangeParts { parts: usize },

    #[error("'{token}' cannot be a range bound")]
    InvalidBound { token: String },
}

fn keyword(input: &str) -> IResult<&str, Index> {
    alt((
        value(Index::Wildcard, tag(NONE)),
        value(Index::Ellipsis, tag(ELLIPSIS)),
        value(Index::EmptyTuple, tag(EMPTY_TUPLE)),
    ))
    .parse(input)
}

fn integer(input: &str) -> IResult<&str, &str> {
    digit1(input)
}

fn decimal(input: &str) -> IResult<&str, &str> {
    alt((
        recognize((digit1, char('.'), digit0)),
        recognize((char('.'), digit1)),
    ))
    .parse(input)
}

fn is(parser: fn(&str) -> IResult<&str, &str>, input: &str) -> bool {
    all_consuming(parser).parse(input).is_ok()
}

/// Decode a scalar token: a keyword, a number, or text.
pub(crate) fn scalar(token: &str) -> Result<Index, DecodeError> {
    let token = token.trim();
    let unsigned = token.strip_prefix('-');
    let negative = unsigned.is_some();
    let unsigned = unsigned.unwrap_or(token);

    if unsigned.is_empty() || all_consuming(keyword).parse(unsigned).is_ok() {
        if negative {
            return Err(DecodeError::SignedKeyword {
                token: token.to_string(),
            });
        }
        return Ok(match keyword(unsigned) {
            Ok((_, index)) => index,
            Err(_) => Index::Wildcard,
        });
    }

    if is(integer, unsigned) {
        return token
            .parse()
            .map(Index::Integer)
            .map_err(|error| DecodeError::InvalidInteger {
                token: token.to_string(),
                error,
            });
    }

    if is(decimal, unsigned) {
        return token
            .parse()
            .map(Index::Float)
            .map_err(|error| DecodeError::InvalidFloat {
                token: token.to_string(),
                error,
            });
    }

    label(unsigned)
}

fn label(token: &str) -> Result<Index, DecodeError> {
    let content = match token
        .strip_prefix(ESCAPE)
        .and_then(|rest| rest.strip_suffix(ESCAPE))
    {
        Some(inner) if token.matches(ESCAPE).count() == 2 => inner,
        _ => token,
    };

    if is_timestamp(content) {
        return content
            .parse::<Instant>()
            .map(Index::Instant)
            .map_err(|error| DecodeError::InvalidInstant {
                token: token.to_string(),
                error,
            });
    }
    Ok(Index::Text(content.to_string()))
}

fn bound(token: &str) -> Result<Option<Bound>, DecodeError> {
    Ok(match scalar(token)? {
        Index::Wildcard => None,
        Index::Integer(n) => Some(Bound::Integer(n)),
        Index::Float(x) => Some(Bound::Float(x)),
        Index::Text(s) => Some(Bound::Text(s)),
        Index::Instant(t) => Some(Bound::Instant(t)),
        _ => {
            return Err(DecodeError::InvalidBound {
                token: token.trim().to_string(),
            });
        }
    })
}

/// Decode one comma-separated component.
pub(crate) fn component(token: &str) -> Result<Index, DecodeError> {
    let token = token.trim();
    let stamps: Vec<_> = ISO8601
        .find_iter(token)
        .map(|m| escaped_span(token, m.range()))
        .collect();
    if !stamps.is_empty() {
        tracing::debug!(
            component = token,
            timestamps = stamps.len(),
            "resolving datetime component"
        );
        return datetime(token, &stamps);
    }

    let parts = Lexer::new(token).split(':');
    if let [single] = parts.as_slice() {
        return scalar(single);
    }
    if parts.len() > 3 {
        return Err(DecodeError::TooManyRangeParts { parts: parts.len() });
    }

    let mut bounds = parts.into_iter().map(bound);
    let mut next = || bounds.next().transpose().map(Option::flatten);
    let (start, stop, step) = (next()?, next()?, next()?);
    Ok(Index::Range(Range::new(start, stop, step)))
}

/// Widen `span` over the escape markers wrapping it, if any.
fn escaped_span(token: &str, span: Span<usize>) -> Span<usize> {
    if token[..span.start].ends_with(ESCAPE) && token[span.end..].starts_with(ESCAPE) {
        span.start - ESCAPE.len_utf8()..span.end + ESCAPE.len_utf8()
    } else {
        span
    }
}

/// Resolve a component containing the timestamps at `stamps`.
fn datetime(token: &str, stamps: &[Span<usize>]) -> Result<Index, DecodeError> {
    let (Some(first), Some(last)) = (stamps.first(), stamps.last()) else {
        return scalar(token);
    };
    let before = &token[..first.start];
    let after = &token[last.end..];

    let mut instants = stamps
        .iter()
        .map(|span| {
            let stamp = token[span.clone()].trim_matches(ESCAPE);
            stamp
                .parse::<Instant>()
                .map_err(|error| DecodeError::InvalidInstant {
                    token: stamp.to_string(),
                    error,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let leading = before.trim().is_empty();
    if leading && after.trim().is_empty() && instants.len() == 1 {
        return Ok(Index::Instant(instants.remove(0)));
    }

    let mut bounds: Vec<Option<Bound>> = Vec::new();
    let outer = !leading && instants.len() < 3;
    if outer {
        bounds.push(bound(strip_separators(before))?);
    }
    bounds.extend(instants.into_iter().map(|instant| Some(Bound::Instant(instant))));
    if outer && before != after {
        bounds.push(bound(strip_separators(after))?);
    }
    if bounds.len() > 3 {
        return Err(DecodeError::TooManyRangeParts {
            parts: bounds.len(),
        });
    }

    let mut bounds = bounds.into_iter();
    let mut next = || bounds.next().flatten();
    let (start, stop, step) = (next(), next(), next());
    Ok(Index::Range(Range::new(start, stop, step)))
}

fn strip_separators(text: &str) -> &str {
    text.trim_matches(|c: char| c == ':' || c.is_whitespace())
}

/// Decode a complete bracketed expression.
pub(crate) fn expression(input: &str) -> Result<IndexExpr, NotationError> {
    let body = input
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| NotationError::Unbracketed {
            input: input.to_string(),
        })?;
    if body.trim().is_empty() {
        return Err(NotationError::Empty {
            input: input.to_string(),
        });
    }

    let lexer = Lexer::new(body);
    if lexer.find(|c| c == '[' || c == ']').is_some() {
        return Err(NotationError::NestedBrackets {
            input: input.to_string(),
        });
    }

    let mut indices = lexer
        .split(',')
        .into_iter()
        .map(|token| {
            component(token).map_err(|source| NotationError::InvalidComponent {
                component: token.trim().to_string(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let count = indices
        .iter()
        .filter(|index| matches!(index, Index::Ellipsis))
        .count();
    if count > 1 {
        return Err(NotationError::MultipleEllipses { count });
    }

    Ok(match indices.len() {
        1 => IndexExpr::Single(indices.remove(0)),
        _ => IndexExpr::Tuple(indices),
    })
}
