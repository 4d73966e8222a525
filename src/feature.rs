// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Font feature oracle consumed by the shaping pipeline.
//!
//! The pipeline never touches font binaries. Everything it needs from a
//! parsed font flows through [`FeatureQuery`]: whether a script/feature
//! pair is declared in `GSUB`, which substitution applies to a glyph
//! window, and the primary glyph for a character.

use crate::GlyphId;
use std::sync::Arc;

/// Four byte tag value.
pub type Tag = u32;

/// Creates a tag from four bytes.
pub const fn tag_from_bytes(bytes: &[u8; 4]) -> Tag {
    (bytes[0] as u32) << 24
        | (bytes[1] as u32) << 16
        | (bytes[2] as u32) << 8
        | bytes[3] as u32
}

/// Creates a tag from the first four bytes of a string, inserting
/// spaces for any missing bytes.
pub fn tag_from_str_lossy(s: &str) -> Tag {
    let mut bytes = [b' '; 4];
    for (i, b) in s.as_bytes().iter().enumerate().take(4) {
        bytes[i] = *b;
    }
    tag_from_bytes(&bytes)
}

/// Formats a tag back into its four character form, replacing
/// non-printable bytes.
pub fn tag_to_string(tag: Tag) -> String {
    tag.to_be_bytes()
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            }
        })
        .collect()
}

/// Script a shaping feature applies to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Script {
    Arabic,
    Latin,
}

impl Script {
    /// Returns the OpenType script tag.
    pub const fn to_opentype(self) -> Tag {
        match self {
            Self::Arabic => tag_from_bytes(b"arab"),
            Self::Latin => tag_from_bytes(b"latn"),
        }
    }
}

/// A substitution returned by a feature lookup.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Substitution {
    /// Replaces the glyph at the lookup index.
    Single(GlyphId),
    /// Replaces `len` input glyphs, starting at the lookup index, with
    /// one ligature glyph.
    Ligature { glyph: GlyphId, len: usize },
}

/// Oracle over a parsed font's substitution tables.
///
/// `lookup` returns the substitution that applies to `glyphs` starting
/// at `index` under the given feature, or `None` when the feature has
/// no match there. The pipeline uses two substitution kinds: Single
/// (1→1) for positional forms and Ligature (n→1) for `rlig`/`liga`.
///
/// A query is read-only once constructed; the blanket impls below let
/// several [`Bidi`](crate::Bidi) instances share one font.
pub trait FeatureQuery {
    /// Whether the font's `GSUB` declares this script and, when given,
    /// this feature tag.
    fn supports(&self, script: Script, tag: Option<Tag>) -> bool;

    /// The substitution applying to `glyphs` at `index` under the
    /// feature, if any.
    fn lookup(
        &self,
        script: Script,
        tag: Tag,
        glyphs: &[GlyphId],
        index: usize,
    ) -> Option<Substitution>;

    /// Maps a character to its primary glyph identifier.
    fn glyph_index(&self, ch: char) -> GlyphId;
}

impl<T: FeatureQuery + ?Sized> FeatureQuery for &T {
    fn supports(&self, script: Script, tag: Option<Tag>) -> bool {
        (**self).supports(script, tag)
    }

    fn lookup(
        &self,
        script: Script,
        tag: Tag,
        glyphs: &[GlyphId],
        index: usize,
    ) -> Option<Substitution> {
        (**self).lookup(script, tag, glyphs, index)
    }

    fn glyph_index(&self, ch: char) -> GlyphId {
        (**self).glyph_index(ch)
    }
}

impl<T: FeatureQuery + ?Sized> FeatureQuery for Arc<T> {
    fn supports(&self, script: Script, tag: Option<Tag>) -> bool {
        (**self).supports(script, tag)
    }

    fn lookup(
        &self,
        script: Script,
        tag: Tag,
        glyphs: &[GlyphId],
        index: usize,
    ) -> Option<Substitution> {
        (**self).lookup(script, tag, glyphs, index)
    }

    fn glyph_index(&self, ch: char) -> GlyphId {
        (**self).glyph_index(ch)
    }
}
