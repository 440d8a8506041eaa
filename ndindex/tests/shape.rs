/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use anyhow::Result;
use ndindex::IndexError;
use ndindex::IndexExpr;
use ndindex::IntRange;
use ndindex::Range;
use ndindex::dsl::*;
use ndindex::from_text;
use ndindex::resolve_range;
use ndindex::shape_from_index;

const SHAPE: [i64; 3] = [361, 720, 4];

#[test]
fn test_shape_from_index() -> Result<()> {
    let cases: [(IndexExpr, &[i64]); 5] = [
        (tuple([range(1..)]), &[360, 720, 4]),
        (tuple([range(1..), range(1..)]), &[360, 719, 4]),
        (tuple([range(..), range(..)]), &[361, 720, 4]),
        (tuple([range(..), range(..), int(0)]), &[361, 720]),
        (0_i64.into(), &[720, 4]),
    ];
    for (index, expected) in cases {
        assert_eq!(shape_from_index(&SHAPE, &index)?, expected, "{index}");
    }
    Ok(())
}

#[test]
fn test_shape_from_text() -> Result<()> {
    let index = from_text("[10:20, ..., -2:]")?;
    assert_eq!(shape_from_index(&SHAPE, &index)?, vec![10, 720, 2]);
    let index = from_text("[1]")?;
    assert_eq!(shape_from_index(&SHAPE, &index)?, vec![720, 4]);
    Ok(())
}

#[test]
fn test_shape_errors() {
    assert!(matches!(
        shape_from_index(&SHAPE, &Range::full().with_step(2_i64).into()),
        Err(IndexError::NonUnitStep { .. })
    ));
    assert!(matches!(
        shape_from_index(&[2, 2], &tuple([int(0), int(0), int(0)])),
        Err(IndexError::TooManyIndices { ndim: 2, count: 3 })
    ));
    assert!(matches!(
        shape_from_index(&SHAPE, &tuple([text("lat"), range(..)])),
        Err(IndexError::UnsupportedComponent { dim: 0, .. })
    ));
}

#[test]
fn test_resolve_range() {
    assert_eq!(resolve_range(10, None), (0, 10, 1));
    assert_eq!(resolve_range(10, Some(&(..10).into())), (0, 10, 1));
    let strided = IntRange::new(Some(1), Some(5), Some(3));
    assert_eq!(resolve_range(10, Some(&strided)), (1, 5, 3));
    assert_eq!(resolve_range(2, Some(&strided)), (1, 5, 3));
}
