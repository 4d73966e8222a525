// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Arabic presentation forms and required ligatures.

use crate::feature::{tag_from_bytes, FeatureQuery, Script, Substitution, Tag};
use crate::text::{joining_type, JoiningForm, JoiningType};
use crate::token::{StateValue, Token, FORM, GLYPH_INDEX};
use crate::GlyphId;

/// Assigns a positional form to every dual- or right-joining token of a
/// closed arabic word range, then substitutes the glyph variants for the
/// requested form features.
///
/// Neighbours are the nearest non-transparent tokens inside the range,
/// so tashkeel between two letters never perturbs their forms. A token
/// joins leftward when the previous neighbour joins forward (D, L or C)
/// and rightward when it is dual-joining itself and the next neighbour
/// joins backward (D, R or C); right-joining letters only ever take the
/// isolated or final form.
pub(crate) fn apply_presentation_forms<F: FeatureQuery>(
    tokens: &mut [Token],
    query: &F,
    requested: &[Tag],
) {
    let types: Vec<JoiningType> = tokens.iter().map(|t| joining_type(t.ch)).collect();
    for index in 0..tokens.len() {
        let current = types[index];
        if !matches!(current, JoiningType::D | JoiningType::R) {
            continue;
        }
        let prev = types[..index]
            .iter()
            .rev()
            .copied()
            .find(|t| !t.is_transparent());
        let next = types[index + 1..]
            .iter()
            .copied()
            .find(|t| !t.is_transparent());
        let can_join_left = prev.is_some_and(JoiningType::joins_forward);
        let can_join_right =
            current == JoiningType::D && next.is_some_and(JoiningType::joins_backward);
        let form = match (can_join_left, can_join_right) {
            (false, false) => JoiningForm::Isolated,
            (false, true) => JoiningForm::Initial,
            (true, false) => JoiningForm::Final,
            (true, true) => JoiningForm::Medial,
        };
        tokens[index].set_state(FORM, StateValue::Form(form));
        if !requested.contains(&form.tag()) {
            continue;
        }
        let glyphs: Vec<GlyphId> = tokens
            .iter()
            .map(|t| t.glyph_id().unwrap_or_default())
            .collect();
        if let Some(Substitution::Single(glyph)) =
            query.lookup(Script::Arabic, form.tag(), &glyphs, index)
        {
            tokens[index].set_state(GLYPH_INDEX, StateValue::Glyph(glyph));
        }
    }
}

/// Applies `rlig` over a closed arabic word range. Transparent tokens
/// are carried unchanged and do not break a ligature match.
pub(crate) fn apply_required_ligatures<F: FeatureQuery>(tokens: &mut [Token], query: &F) {
    super::apply_ligatures(tokens, query, Script::Arabic, tag_from_bytes(b"rlig"), |token| {
        !joining_type(token.ch).is_transparent()
    });
}
