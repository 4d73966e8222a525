// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-character state carried through the shaping pipeline.

use crate::text::JoiningForm;
use crate::GlyphId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// State slot holding a token's glyph id, seeded by the `glyphIndex`
/// modifier and overwritten by substitutions.
pub const GLYPH_INDEX: &str = "glyphIndex";

/// State slot flagging a token consumed by a ligature. Deleted tokens
/// keep their position in the vector so indices stay stable during a
/// shaping pass; extraction skips them.
pub const DELETED: &str = "deleted";

/// State slot holding the positional form assigned by the arabic shaper.
pub const FORM: &str = "form";

/// A value written into a token's state map.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum StateValue {
    /// A single glyph id.
    Glyph(GlyphId),
    /// A glyph sequence; extraction reads the first element.
    Glyphs(SmallVec<[GlyphId; 4]>),
    /// A positional form assigned by the arabic shaper.
    Form(JoiningForm),
    /// A boolean flag.
    Flag(bool),
}

impl StateValue {
    /// The glyph this value resolves to, if it is glyph-valued.
    pub fn glyph(&self) -> Option<GlyphId> {
        match self {
            Self::Glyph(id) => Some(*id),
            Self::Glyphs(ids) => ids.first().copied(),
            _ => None,
        }
    }
}

/// One input code point flowing through the shaping pipeline.
///
/// Tokens are created inside [`Tokenizer::tokenize`] and mutated only
/// through tokenizer operations and modifier writes.
///
/// [`Tokenizer::tokenize`]: crate::Tokenizer::tokenize
#[derive(Clone, Debug, Default)]
pub struct Token {
    /// The original scalar value.
    pub ch: char,
    state: FxHashMap<String, StateValue>,
    active_state: Option<(String, StateValue)>,
}

impl Token {
    /// Creates a token for a single scalar value.
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            state: FxHashMap::default(),
            active_state: None,
        }
    }

    /// Writes a state slot and records it as the most recent write.
    pub fn set_state(&mut self, key: impl Into<String>, value: StateValue) {
        let key = key.into();
        self.state.insert(key.clone(), value.clone());
        self.active_state = Some((key, value));
    }

    /// Reads a state slot.
    pub fn state(&self, key: &str) -> Option<&StateValue> {
        self.state.get(key)
    }

    /// The most recently written state entry.
    pub fn active_state(&self) -> Option<(&str, &StateValue)> {
        self.active_state.as_ref().map(|(k, v)| (k.as_str(), v))
    }

    /// True if a shaper flagged this token as consumed.
    pub fn is_deleted(&self) -> bool {
        matches!(self.state.get(DELETED), Some(StateValue::Flag(true)))
    }

    /// Flags the token as consumed while keeping its slot in the vector.
    pub fn set_deleted(&mut self, deleted: bool) {
        self.set_state(DELETED, StateValue::Flag(deleted));
    }

    /// The glyph this token contributes to extraction: the most recent
    /// write when it is glyph-valued, the `glyphIndex` slot otherwise.
    pub fn glyph_id(&self) -> Option<GlyphId> {
        if let Some((_, value)) = self.active_state.as_ref() {
            if let Some(id) = value.glyph() {
                return Some(id);
            }
        }
        self.state.get(GLYPH_INDEX).and_then(StateValue::glyph)
    }
}
