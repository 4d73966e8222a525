// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Latin standard ligatures.

use crate::feature::{tag_from_bytes, FeatureQuery, Script};
use crate::token::Token;

/// Applies `liga` over a closed latin word range. Pure longest-match
/// ligature replacement; every live token participates.
pub(crate) fn apply_standard_ligatures<F: FeatureQuery>(tokens: &mut [Token], query: &F) {
    super::apply_ligatures(tokens, query, Script::Latin, tag_from_bytes(b"liga"), |_| true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::testing::{gid, seeded_tokens, MockFont};
    use crate::token::GLYPH_INDEX;
    use crate::StateValue;

    fn liga_font() -> MockFont {
        let liga = tag_from_bytes(b"liga");
        MockFont {
            ligatures: vec![
                (liga, vec![gid('f'), gid('i')], 900),
                (liga, vec![gid('f'), gid('f'), gid('i')], 901),
            ],
            features: vec![(Script::Latin, liga)],
            ..Default::default()
        }
    }

    #[test]
    fn fi_collapses_to_one_glyph() {
        let font = liga_font();
        let mut tokens = seeded_tokens("fi", &font);
        apply_standard_ligatures(&mut tokens, &font);
        assert_eq!(tokens[0].state(GLYPH_INDEX), Some(&StateValue::Glyph(900)));
        assert!(!tokens[0].is_deleted());
        assert!(tokens[1].is_deleted());
    }

    #[test]
    fn longest_match_wins() {
        let font = liga_font();
        let mut tokens = seeded_tokens("ffi", &font);
        apply_standard_ligatures(&mut tokens, &font);
        assert_eq!(tokens[0].state(GLYPH_INDEX), Some(&StateValue::Glyph(901)));
        assert!(tokens[1].is_deleted());
        assert!(tokens[2].is_deleted());
    }

    #[test]
    fn no_match_leaves_tokens_untouched() {
        let font = liga_font();
        let mut tokens = seeded_tokens("ab", &font);
        apply_standard_ligatures(&mut tokens, &font);
        assert_eq!(tokens[0].state(GLYPH_INDEX), Some(&StateValue::Glyph(gid('a'))));
        assert!(tokens.iter().all(|t| !t.is_deleted()));
    }

    #[test]
    fn consumed_tokens_do_not_rematch() {
        let font = liga_font();
        let mut tokens = seeded_tokens("fifi", &font);
        apply_standard_ligatures(&mut tokens, &font);
        assert_eq!(tokens[0].state(GLYPH_INDEX), Some(&StateValue::Glyph(900)));
        assert!(tokens[1].is_deleted());
        assert_eq!(tokens[2].state(GLYPH_INDEX), Some(&StateValue::Glyph(900)));
        assert!(tokens[3].is_deleted());
    }
}
