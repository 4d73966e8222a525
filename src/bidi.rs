// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

/*!
Bidirectional shaping driver.

Binds a tokenizer to a font query, registers the built-in script
contexts and drives the fixed pipeline: arabic presentation forms,
arabic required ligatures, latin standard ligatures, then right-to-left
reversal of every arabic sentence range. Each pass is gated on its
context being registered and its feature tags being requested for the
script; processing is idempotent per input text.
*/

use crate::context::ContextParams;
use crate::error::{Result, ShapeError};
use crate::feature::{FeatureQuery, Script, Tag};
use crate::shape::{arabic, latin};
use crate::text::contexts::{
    arabic_sentence_end, arabic_sentence_start, arabic_word_end, arabic_word_start,
    latin_word_end, latin_word_start, ARABIC_SENTENCE, ARABIC_WORD, LATIN_WORD,
};
use crate::text::JoiningForm;
use crate::token::{StateValue, Token, GLYPH_INDEX};
use crate::tokenizer::{ModifierCondition, ModifierFn, Tokenizer};
use crate::GlyphId;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// Base direction of a processed paragraph.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
}

/// Features requested for one script.
#[derive(Clone, Debug)]
pub struct FeatureSpec {
    pub script: Script,
    pub tags: Vec<Tag>,
}

/// Bidirectional shaping driver owning its tokenizer and font query.
pub struct Bidi<F> {
    base_dir: Direction,
    text: String,
    processed: bool,
    tokenizer: Tokenizer,
    features_tags: FxHashMap<Script, Vec<Tag>>,
    query: Option<Arc<F>>,
}

impl<F> Default for Bidi<F> {
    fn default() -> Self {
        Self::new(Direction::default())
    }
}

impl<F> Bidi<F> {
    pub fn new(base_dir: Direction) -> Self {
        Self {
            base_dir,
            text: String::new(),
            processed: false,
            tokenizer: Tokenizer::new(),
            features_tags: FxHashMap::default(),
            query: None,
        }
    }

    /// The paragraph base direction.
    pub fn base_dir(&self) -> Direction {
        self.base_dir
    }

    /// The owned tokenizer; observers and custom contexts go through it.
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn tokenizer_mut(&mut self) -> &mut Tokenizer {
        &mut self.tokenizer
    }

    /// Proxies a modifier registration to the tokenizer.
    pub fn register_modifier(
        &mut self,
        id: impl Into<String>,
        condition: Option<ModifierCondition>,
        modify: ModifierFn,
    ) {
        self.tokenizer.register_modifier(id, condition, modify);
        self.processed = false;
    }

    fn requested_tags(&self, script: Script) -> &[Tag] {
        self.features_tags
            .get(&script)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn register_script_contexts(&mut self) -> Result<()> {
        if self.tokenizer.context(LATIN_WORD).is_some() {
            return Ok(());
        }
        self.tokenizer.register_context_checker(
            LATIN_WORD,
            Box::new(latin_word_start),
            Box::new(latin_word_end),
        )?;
        self.tokenizer.register_context_checker(
            ARABIC_WORD,
            Box::new(arabic_word_start),
            Box::new(arabic_word_end),
        )?;
        self.tokenizer.register_context_checker(
            ARABIC_SENTENCE,
            Box::new(arabic_sentence_start),
            Box::new(arabic_sentence_end),
        )?;
        Ok(())
    }
}

impl<F: FeatureQuery + 'static> Bidi<F> {
    /// Stores the font query, records the requested feature tags the
    /// font supports per script, and registers the `glyphIndex` modifier
    /// seeded from the font's character map.
    pub fn apply_features(&mut self, font: F, features: &[FeatureSpec]) {
        let font = Arc::new(font);
        for spec in features {
            let supported: Vec<Tag> = spec
                .tags
                .iter()
                .copied()
                .filter(|&tag| font.supports(spec.script, Some(tag)))
                .collect();
            if supported.is_empty() {
                debug!("no requested feature supported for {:?}", spec.script);
                continue;
            }
            self.features_tags
                .entry(spec.script)
                .or_default()
                .extend(supported);
        }
        if !self.tokenizer.has_modifier(GLYPH_INDEX) {
            let charmap = Arc::clone(&font);
            self.tokenizer.register_modifier(
                GLYPH_INDEX,
                None,
                Box::new(move |token: &Token, _: &ContextParams| {
                    StateValue::Glyph(charmap.glyph_index(token.ch))
                }),
            );
        }
        self.query = Some(font);
        self.processed = false;
    }

    /// Runs the shaping pipeline once per input text.
    fn process_text(&mut self, text: &str) -> Result<()> {
        if self.processed && self.text == text {
            return Ok(());
        }
        self.text = text.to_string();
        self.register_script_contexts()?;
        self.tokenizer.tokenize(text);
        self.apply_arabic_presentation_forms()?;
        self.apply_arabic_required_ligatures()?;
        self.apply_latin_ligatures()?;
        self.reverse_arabic_sentences()?;
        self.processed = true;
        Ok(())
    }

    fn check_glyph_index_status(&self) -> Result<&Arc<F>> {
        if !self.tokenizer.has_modifier(GLYPH_INDEX) {
            return Err(ShapeError::MissingGlyphIndexModifier);
        }
        self.query.as_ref().ok_or(ShapeError::MissingFont)
    }

    fn apply_arabic_presentation_forms(&mut self) -> Result<()> {
        let form_tags = [
            JoiningForm::Isolated.tag(),
            JoiningForm::Initial.tag(),
            JoiningForm::Medial.tag(),
            JoiningForm::Final.tag(),
        ];
        let requested: Vec<Tag> = self
            .requested_tags(Script::Arabic)
            .iter()
            .copied()
            .filter(|tag| form_tags.contains(tag))
            .collect();
        if requested.is_empty() || self.tokenizer.context(ARABIC_WORD).is_none() {
            return Ok(());
        }
        let query = Arc::clone(self.check_glyph_index_status()?);
        let ranges = self.tokenizer.context_ranges(ARABIC_WORD)?.to_vec();
        for range in &ranges {
            arabic::apply_presentation_forms(
                self.tokenizer.range_tokens_mut(range),
                &query,
                &requested,
            );
        }
        Ok(())
    }

    fn apply_arabic_required_ligatures(&mut self) -> Result<()> {
        let rlig = crate::feature::tag_from_bytes(b"rlig");
        if !self.requested_tags(Script::Arabic).contains(&rlig)
            || self.tokenizer.context(ARABIC_WORD).is_none()
        {
            return Ok(());
        }
        let query = Arc::clone(self.check_glyph_index_status()?);
        let ranges = self.tokenizer.context_ranges(ARABIC_WORD)?.to_vec();
        for range in &ranges {
            arabic::apply_required_ligatures(self.tokenizer.range_tokens_mut(range), &query);
        }
        Ok(())
    }

    fn apply_latin_ligatures(&mut self) -> Result<()> {
        let liga = crate::feature::tag_from_bytes(b"liga");
        if !self.requested_tags(Script::Latin).contains(&liga)
            || self.tokenizer.context(LATIN_WORD).is_none()
        {
            return Ok(());
        }
        let query = Arc::clone(self.check_glyph_index_status()?);
        let ranges = self.tokenizer.context_ranges(LATIN_WORD)?.to_vec();
        for range in &ranges {
            latin::apply_standard_ligatures(self.tokenizer.range_tokens_mut(range), &query);
        }
        Ok(())
    }

    /// Replaces every arabic sentence range with its tokens reversed.
    fn reverse_arabic_sentences(&mut self) -> Result<()> {
        let Ok(ranges) = self.tokenizer.context_ranges(ARABIC_SENTENCE) else {
            return Ok(());
        };
        for range in ranges.to_vec() {
            let mut tokens = self.tokenizer.range_tokens(&range).to_vec();
            tokens.reverse();
            self.tokenizer
                .replace_range(range.start, Some(range.end_offset), tokens, false)?;
        }
        Ok(())
    }

    /// The characters of the processed text, arabic sentences reversed,
    /// deleted tokens included.
    pub fn get_bidi_text(&mut self, text: &str) -> Result<String> {
        self.process_text(text)?;
        Ok(self.tokenizer.text())
    }

    /// The glyph id of every live token of the processed text.
    pub fn get_text_glyphs(&mut self, text: &str) -> Result<Vec<GlyphId>> {
        if self.query.is_none() {
            return Err(ShapeError::MissingFont);
        }
        self.process_text(text)?;
        Ok(self
            .tokenizer
            .tokens()
            .iter()
            .filter(|token| !token.is_deleted())
            .filter_map(Token::glyph_id)
            .collect())
    }
}
