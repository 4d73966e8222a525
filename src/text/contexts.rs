// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Start/end predicates for the built-in script contexts.
//!
//! The end predicates look one character ahead: a range closes on its
//! last member, not on the character after it, so a one-character word
//! opens and closes at the same index.

use super::unicode::{is_arabic, is_latin, is_whitespace};
use crate::context::ContextParams;

pub(crate) const LATIN_WORD: &str = "latinWord";
pub(crate) const ARABIC_WORD: &str = "arabicWord";
pub(crate) const ARABIC_SENTENCE: &str = "arabicSentence";

pub(crate) fn latin_word_start(params: &ContextParams) -> bool {
    is_latin(params.current()) && !params.get(-1).is_some_and(is_latin)
}

pub(crate) fn latin_word_end(params: &ContextParams) -> bool {
    is_latin(params.current()) && !params.get(1).is_some_and(is_latin)
}

pub(crate) fn arabic_word_start(params: &ContextParams) -> bool {
    is_arabic(params.current()) && !params.get(-1).is_some_and(is_arabic)
}

pub(crate) fn arabic_word_end(params: &ContextParams) -> bool {
    is_arabic(params.current()) && !params.get(1).is_some_and(is_arabic)
}

pub(crate) fn arabic_sentence_start(params: &ContextParams) -> bool {
    is_arabic(params.current()) && !params.get(-1).is_some_and(is_arabic)
}

/// A sentence survives interior whitespace and in-block punctuation, and
/// closes before any other script: a non-Arabic, non-whitespace
/// character ends it immediately, whitespace ends it only when no Arabic
/// character occurs later in the stream.
pub(crate) fn arabic_sentence_end(params: &ContextParams) -> bool {
    match params.get(1) {
        None => true,
        Some(next) if is_arabic(next) => false,
        Some(next) if !is_whitespace(next) => true,
        Some(_) => !params.lookahead().iter().copied().any(is_arabic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(chars: &[char], index: usize) -> ContextParams {
        ContextParams::new(chars, index)
    }

    #[test]
    fn latin_word_boundaries() {
        let chars: Vec<char> = "ab cd".chars().collect();
        assert!(latin_word_start(&at(&chars, 0)));
        assert!(!latin_word_start(&at(&chars, 1)));
        assert!(latin_word_end(&at(&chars, 1)));
        assert!(latin_word_start(&at(&chars, 3)));
        assert!(latin_word_end(&at(&chars, 4)));
    }

    #[test]
    fn one_character_word_opens_and_closes() {
        let chars: Vec<char> = "a ".chars().collect();
        assert!(latin_word_start(&at(&chars, 0)));
        assert!(latin_word_end(&at(&chars, 0)));
    }

    #[test]
    fn sentence_survives_interior_whitespace() {
        // Two arabic words; whitespace keeps the sentence open.
        let chars: Vec<char> = "\u{0645}\u{0627} \u{0628}".chars().collect();
        assert!(arabic_sentence_start(&at(&chars, 0)));
        assert!(!arabic_sentence_end(&at(&chars, 1)));
        assert!(arabic_sentence_end(&at(&chars, 3)));
    }

    #[test]
    fn sentence_splits_before_latin() {
        let chars: Vec<char> = "\u{0645}\u{0627} abc".chars().collect();
        // Whitespace follows, but nothing arabic after it.
        assert!(arabic_sentence_end(&at(&chars, 1)));
    }

    #[test]
    fn sentence_ends_before_terminal_punctuation() {
        let chars: Vec<char> = "\u{0645}\u{0627}.".chars().collect();
        assert!(arabic_sentence_end(&at(&chars, 1)));
    }
}
