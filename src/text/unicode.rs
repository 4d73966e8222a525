// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Character classes driving context detection.

/// Returns true for characters in the Arabic script blocks: Arabic,
/// Arabic Supplement, Arabic Extended-A and the two Presentation Forms
/// blocks. Arabic-Indic digits and in-block punctuation are included;
/// both are script-neutral within an Arabic run.
pub fn is_arabic(ch: char) -> bool {
    matches!(ch as u32,
        0x0600..=0x06FF
        | 0x0750..=0x077F
        | 0x08A0..=0x08FF
        | 0xFB50..=0xFDFF
        | 0xFE70..=0xFEFF)
}

/// Arabic-Indic and extended Arabic-Indic digits.
pub fn is_arabic_digit(ch: char) -> bool {
    matches!(ch as u32, 0x0660..=0x0669 | 0x06F0..=0x06F9)
}

/// Tashkeel (vocalization) marks. Transparent for joining purposes.
pub fn is_tashkeel(ch: char) -> bool {
    matches!(ch as u32,
        0x0610..=0x061A
        | 0x064B..=0x065F
        | 0x0670
        | 0x06D6..=0x06DC
        | 0x06DF..=0x06E4
        | 0x06E7..=0x06E8
        | 0x06EA..=0x06ED
        | 0x08D3..=0x08E1
        | 0x08E3..=0x08FF)
}

/// Latin script letters plus ASCII digits.
pub fn is_latin(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(ch as u32,
            // Latin-1 letters, skipping the multiply/divide signs.
            0x00C0..=0x00D6
            | 0x00D8..=0x00F6
            // Latin Extended-A and Extended-B.
            | 0x00F8..=0x024F)
}

/// Unicode whitespace.
pub fn is_whitespace(ch: char) -> bool {
    ch.is_whitespace()
}

/// Punctuation as the tokenizer observes it: ASCII punctuation, the
/// General Punctuation block and the Arabic punctuation signs.
pub fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation()
        || matches!(ch as u32,
            0x2000..=0x206F
            | 0x060C
            | 0x061B
            | 0x061F
            | 0x066A..=0x066D
            | 0x06D4)
}

/// Sentence terminating punctuation, Arabic equivalents included.
pub fn is_sentence_terminal(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '\u{061F}' | '\u{06D4}')
}
