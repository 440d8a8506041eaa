/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::ops::Range;

use crate::notation::ESCAPE;

/// A lexer that knows which positions of its input are structural.
///
/// Delimiters inside an escaped run (text between a pair of
/// [`ESCAPE`] markers) are content, not structure. Markers pair up
/// left to right; a trailing unpaired marker is ordinary content.
pub(crate) struct Lexer<'a> {
    str: &'a str,
    escaped: Vec<Range<usize>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(str: &'a str) -> Self {
        let markers: Vec<usize> = str.match_indices(ESCAPE).map(|(pos, _)| pos).collect();
        let escaped = markers
            .chunks_exact(2)
            .map(|pair| pair[0]..pair[1] + ESCAPE.len_utf8())
            .collect();
        Self { str, escaped }
    }

    fn is_structural(&self, pos: usize) -> bool {
        !self.escaped.iter().any(|span| span.contains(&pos))
    }

    /// The position of the first structural character matching
    /// `pred`.
    pub(crate) fn find(&self, pred: impl Fn(char) -> bool) -> Option<usize> {
        self.str
            .char_indices()
            .find(|&(pos, c)| pred(c) && self.is_structural(pos))
            .map(|(pos, _)| pos)
    }

    /// Split on every structural occurrence of `delim`. Pieces are
    /// returned untrimmed.
    pub(crate) fn split(&self, delim: char) -> Vec<&'a str> {
        let mut pieces = Vec::new();
        let mut begin = 0;
        for (pos, c) in self.str.char_indices() {
            if c == delim && self.is_structural(pos) {
                pieces.push(&self.str[begin..pos]);
                begin = pos + c.len_utf8();
            }
        }
        pieces.push(&self.str[begin..]);
        pieces
    }
}
