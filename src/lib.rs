// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

/*!
Contextual tokenization and bidirectional text shaping.

ipanema is the shaping core that sits between a font decoder and a
rasterizer: it ingests a sequence of Unicode scalar values together
with a font's substitution oracle and produces a reordered,
re-substituted sequence of glyph identifiers ready for layout.

Two layers do the work. The [`Tokenizer`] drives one forward pass over
the text while registered [context checkers](ContextChecker) claim
named, possibly overlapping ranges of it (words, sentences) and
registered modifiers attach per-token state; destructive edits keep the
claimed ranges consistent with the token vector. On top of it, [`Bidi`]
registers the built-in Latin and Arabic contexts and drives the shaping
pipeline: arabic presentation forms (`isol`/`init`/`medi`/`fina`),
arabic required ligatures (`rlig`), latin standard ligatures (`liga`)
and right-to-left reversal of arabic sentence ranges.

The font itself stays behind the [`FeatureQuery`] trait; this crate
never parses font binaries.

```
use ipanema::{Bidi, FeatureQuery, FeatureSpec, Script, Substitution, Tag};
use ipanema::tag_from_bytes;

struct SmallCaps; // some table-backed oracle

impl FeatureQuery for SmallCaps {
    fn supports(&self, script: Script, _tag: Option<Tag>) -> bool {
        script == Script::Latin
    }
    fn lookup(
        &self,
        _script: Script,
        _tag: Tag,
        glyphs: &[u16],
        index: usize,
    ) -> Option<Substitution> {
        // "fi" -> one ligature glyph
        (glyphs[index..].starts_with(&[102, 105]))
            .then_some(Substitution::Ligature { glyph: 900, len: 2 })
    }
    fn glyph_index(&self, ch: char) -> u16 {
        ch as u16
    }
}

let mut bidi = Bidi::default();
bidi.apply_features(
    SmallCaps,
    &[FeatureSpec { script: Script::Latin, tags: vec![tag_from_bytes(b"liga")] }],
);
assert_eq!(bidi.get_text_glyphs("fi").unwrap(), vec![900]);
```
*/

mod bidi;
mod context;
mod error;
mod event;
mod feature;
mod shape;
mod token;
mod tokenizer;

pub mod text;

pub use bidi::{Bidi, Direction, FeatureSpec};
pub use context::{ContextChecker, ContextParams, ContextPredicate, ContextRange};
pub use error::{Result, ShapeError};
pub use event::{CoreEvent, EventBus, EventHandler, EventPayload, Subscription};
pub use feature::{
    tag_from_bytes, tag_from_str_lossy, tag_to_string, FeatureQuery, Script, Substitution, Tag,
};
pub use token::{StateValue, Token, DELETED, FORM, GLYPH_INDEX};
pub use tokenizer::{ModifierCondition, ModifierFn, Rud, Tokenizer};

/// Glyph identifier.
pub type GlyphId = u16;
