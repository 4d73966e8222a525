// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Shaping pipeline errors.

use thiserror::Error;

/// Cumulative error type for the shaping pipeline.
///
/// Edit and registration failures are soft: the tokenizer is left
/// untouched and the caller may continue. [`MissingGlyphIndexModifier`]
/// and [`MissingFont`] signal misuse that cannot produce sensible output
/// and abort the pass.
///
/// [`MissingGlyphIndexModifier`]: ShapeError::MissingGlyphIndexModifier
/// [`MissingFont`]: ShapeError::MissingFont
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ShapeError {
    #[error("token index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("invalid token range {start}..{end} (len {len})")]
    InvalidRange { start: usize, end: usize, len: usize },
    #[error("insert requires at least one token")]
    EmptyInsert,
    #[error("context `{0}` is already registered")]
    DuplicateContext(String),
    #[error("unknown context `{0}`")]
    UnknownContext(String),
    #[error("subscription is stale or was already removed")]
    StaleSubscription,
    #[error("every operation in the batch failed")]
    BatchFailed(Vec<(usize, ShapeError)>),
    #[error("the `glyphIndex` modifier must be registered before shaping arabic text")]
    MissingGlyphIndexModifier,
    #[error("no font query loaded; call apply_features first")]
    MissingFont,
}

/// Result type for the shaping pipeline.
pub type Result<T> = std::result::Result<T, ShapeError>;
