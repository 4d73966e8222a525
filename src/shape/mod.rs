// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

/*!
Script shapers applied over closed context ranges.

Both shapers work on the token slice of one word range. Substitutions
never change the slice length: a ligature writes its glyph on the head
token and flags the consumed tail tokens deleted, so every index into
the range stays valid for the rest of the pass.
*/

pub(crate) mod arabic;
pub(crate) mod latin;

use crate::feature::{FeatureQuery, Script, Substitution, Tag};
use crate::token::{StateValue, Token, GLYPH_INDEX};
use crate::GlyphId;

/// Left-to-right longest-match ligature walk over a range.
///
/// Only live tokens accepted by `participates` form the glyph window;
/// the rest (transparent marks for `rlig`, tokens consumed earlier) are
/// carried unchanged and never break a match. A match of length `len`
/// replaces the head token's glyph and deletes the `len - 1` following
/// participants in place.
pub(crate) fn apply_ligatures<F: FeatureQuery>(
    tokens: &mut [Token],
    query: &F,
    script: Script,
    tag: Tag,
    participates: fn(&Token) -> bool,
) {
    let mut cursor = 0;
    loop {
        let participants: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| !token.is_deleted() && participates(token))
            .map(|(i, _)| i)
            .collect();
        if cursor >= participants.len() {
            break;
        }
        let glyphs: Vec<GlyphId> = participants
            .iter()
            .map(|&i| tokens[i].glyph_id().unwrap_or_default())
            .collect();
        match query.lookup(script, tag, &glyphs, cursor) {
            Some(Substitution::Ligature { glyph, len })
                if len > 1 && cursor + len <= participants.len() =>
            {
                tokens[participants[cursor]].set_state(GLYPH_INDEX, StateValue::Glyph(glyph));
                for &i in &participants[cursor + 1..cursor + len] {
                    tokens[i].set_deleted(true);
                }
            }
            Some(Substitution::Ligature { glyph, len: 1 }) | Some(Substitution::Single(glyph)) => {
                tokens[participants[cursor]].set_state(GLYPH_INDEX, StateValue::Glyph(glyph));
            }
            _ => {}
        }
        cursor += 1;
    }
}
