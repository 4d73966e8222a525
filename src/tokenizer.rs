// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

/*!
Contextual tokenizer.

One forward pass converts text into a token vector while the registered
context checkers claim named, possibly overlapping ranges of it. Every
destructive edit (insert, remove, replace and their range forms)
recomputes the context ranges before returning, so stored ranges always
match a from-scratch scan of the current tokens; `silent` edits skip
both the recompute and the event dispatch, and [`Tokenizer::compose_rud`]
uses that to collapse a batch into a single notification.
*/

use crate::context::{ContextChecker, ContextParams, ContextPredicate, ContextRange};
use crate::error::{Result, ShapeError};
use crate::event::{CoreEvent, EventBus, EventHandler, EventPayload, Subscription};
use crate::token::{StateValue, Token};
use rustc_hash::FxHashMap;
use tracing::warn;

/// Condition gating a modifier; the modifier applies where it holds.
pub type ModifierCondition = Box<dyn Fn(&Token, &ContextParams) -> bool>;

/// Computes the value a modifier writes into its token state slot.
pub type ModifierFn = Box<dyn Fn(&Token, &ContextParams) -> StateValue>;

struct TokenModifier {
    id: String,
    condition: Option<ModifierCondition>,
    modify: ModifierFn,
}

/// One edit inside a [`Tokenizer::compose_rud`] batch.
pub enum Rud {
    Insert { index: usize, tokens: Vec<Token> },
    Remove { index: usize },
    RemoveRange { start: usize, count: Option<usize> },
    Replace { index: usize, token: Token },
    ReplaceRange {
        start: usize,
        count: Option<usize>,
        tokens: Vec<Token>,
    },
}

/// Contextual tokenizer owning the token vector and context registry.
#[derive(Default)]
pub struct Tokenizer {
    tokens: Vec<Token>,
    registered_contexts: FxHashMap<String, usize>,
    context_checkers: Vec<ContextChecker>,
    events: EventBus,
    modifiers: Vec<TokenModifier>,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes an observer to a tokenizer event.
    pub fn on(
        &mut self,
        event: CoreEvent,
        handler: impl FnMut(&EventPayload) + 'static,
    ) -> Subscription {
        self.events.subscribe(event, Box::new(handler) as EventHandler)
    }

    /// Removes an observer subscription.
    pub fn off(&mut self, sub: Subscription) -> Result<()> {
        self.events.unsubscribe(sub)
    }

    /// Registers a modifier writing `state[id]` on each new token where
    /// `condition` holds (or unconditionally when absent). Modifiers run
    /// in registration order at token creation.
    pub fn register_modifier(
        &mut self,
        id: impl Into<String>,
        condition: Option<ModifierCondition>,
        modify: ModifierFn,
    ) {
        self.modifiers.push(TokenModifier {
            id: id.into(),
            condition,
            modify,
        });
    }

    /// True if a modifier with this id has been registered.
    pub fn has_modifier(&self, id: &str) -> bool {
        self.modifiers.iter().any(|m| m.id == id)
    }

    /// Registers a named context checker, appended to the checker order.
    pub fn register_context_checker(
        &mut self,
        name: &str,
        check_start: ContextPredicate,
        check_end: ContextPredicate,
    ) -> Result<()> {
        if self.registered_contexts.contains_key(name) {
            return Err(ShapeError::DuplicateContext(name.to_string()));
        }
        self.registered_contexts
            .insert(name.to_string(), self.context_checkers.len());
        self.context_checkers
            .push(ContextChecker::new(name, check_start, check_end));
        Ok(())
    }

    /// The checker registered under `name`.
    pub fn context(&self, name: &str) -> Option<&ContextChecker> {
        let index = *self.registered_contexts.get(name)?;
        self.context_checkers.get(index)
    }

    /// Completed ranges of a registered context.
    pub fn context_ranges(&self, name: &str) -> Result<&[ContextRange]> {
        self.context(name)
            .map(ContextChecker::ranges)
            .ok_or_else(|| ShapeError::UnknownContext(name.to_string()))
    }

    /// Tokens covered by a range.
    pub fn range_tokens(&self, range: &ContextRange) -> &[Token] {
        let len = self.tokens.len();
        &self.tokens[range.start.min(len)..range.end().min(len)]
    }

    pub(crate) fn range_tokens_mut(&mut self, range: &ContextRange) -> &mut [Token] {
        let len = self.tokens.len();
        &mut self.tokens[range.start.min(len)..range.end().min(len)]
    }

    /// The characters covered by a range.
    pub fn range_text(&self, range: &ContextRange) -> String {
        self.range_tokens(range).iter().map(|t| t.ch).collect()
    }

    /// The current token vector.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The characters of the current token vector, deleted tokens
    /// included.
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.ch).collect()
    }

    /// Rebuilds the token vector from `text` in one forward pass.
    ///
    /// Emits `Start`, then per character `Next` → context checks (with
    /// their `ContextStart`/`ContextEnd`) → `NewToken`, then `End`. The
    /// input is consumed as Unicode scalar values; surrogate pairs in
    /// the source encoding never reach this API.
    pub fn tokenize(&mut self, text: &str) -> &[Token] {
        self.tokens.clear();
        for checker in &mut self.context_checkers {
            checker.reset();
        }
        let chars: Vec<char> = text.chars().collect();
        self.tokens.reserve(chars.len());
        self.events.dispatch(&EventPayload::Start);
        for (index, &ch) in chars.iter().enumerate() {
            let params = ContextParams::new(&chars, index);
            self.events.dispatch(&EventPayload::Next { index });
            self.run_context_check(&params);
            let mut token = Token::new(ch);
            for modifier in &self.modifiers {
                let applies = modifier
                    .condition
                    .as_ref()
                    .is_none_or(|condition| condition(&token, &params));
                if applies {
                    let value = (modifier.modify)(&token, &params);
                    token.set_state(modifier.id.clone(), value);
                }
            }
            self.tokens.push(token);
            self.events.dispatch(&EventPayload::NewToken { index });
        }
        self.events.dispatch(&EventPayload::End {
            len: self.tokens.len(),
        });
        &self.tokens
    }

    /// Runs every checker, in registration order, against one position.
    ///
    /// The end check is evaluated after the start check so a one-token
    /// context can open and close at the same index.
    fn run_context_check(&mut self, params: &ContextParams) {
        let index = params.index();
        for checker in self.context_checkers.iter_mut() {
            if checker.open_range.is_none() && (checker.check_start)(params) {
                checker.open_range = Some(index);
                if self.events.has_subscribers(CoreEvent::ContextStart) {
                    self.events.dispatch(&EventPayload::ContextStart {
                        context: checker.name.clone(),
                        index,
                    });
                }
            }
            if let Some(start) = checker.open_range {
                if (checker.check_end)(params) {
                    let range = ContextRange {
                        id: format!("{}.{}", checker.name, checker.ranges.len()),
                        start,
                        end_offset: index - start + 1,
                    };
                    checker.ranges.push(range.clone());
                    checker.open_range = None;
                    if self.events.has_subscribers(CoreEvent::ContextEnd) {
                        self.events.dispatch(&EventPayload::ContextEnd {
                            context: checker.name.clone(),
                            range,
                        });
                    }
                }
            }
        }
    }

    /// Recomputes every context's ranges from the current tokens, then
    /// emits `UpdateContextsRanges`. Every non-silent edit calls this
    /// before its own event, so stored ranges are consistent with the
    /// token vector between user-observable operations.
    pub fn update_contexts_ranges(&mut self) {
        for checker in &mut self.context_checkers {
            checker.reset();
        }
        let chars: Vec<char> = self.tokens.iter().map(|t| t.ch).collect();
        for index in 0..chars.len() {
            let params = ContextParams::new(&chars, index);
            self.run_context_check(&params);
        }
        self.events.dispatch(&EventPayload::UpdateContextsRanges);
    }

    /// Splice-inserts tokens at `index`.
    pub fn insert_token(&mut self, tokens: Vec<Token>, index: usize, silent: bool) -> Result<()> {
        if tokens.is_empty() {
            return Err(ShapeError::EmptyInsert);
        }
        if index > self.tokens.len() {
            return Err(ShapeError::IndexOutOfBounds {
                index,
                len: self.tokens.len(),
            });
        }
        let count = tokens.len();
        self.tokens.splice(index..index, tokens);
        if !silent {
            self.update_contexts_ranges();
            self.events
                .dispatch(&EventPayload::InsertToken { index, count });
        }
        Ok(())
    }

    /// Splice-removes the token at `index`.
    pub fn remove_token(&mut self, index: usize, silent: bool) -> Result<()> {
        if index >= self.tokens.len() {
            return Err(ShapeError::IndexOutOfBounds {
                index,
                len: self.tokens.len(),
            });
        }
        self.tokens.remove(index);
        if !silent {
            self.update_contexts_ranges();
            self.events.dispatch(&EventPayload::RemoveToken { index });
        }
        Ok(())
    }

    /// Splice-removes `count` tokens starting at `start`; `None` removes
    /// through the end. Out-of-range spans are clamped.
    pub fn remove_range(&mut self, start: usize, count: Option<usize>, silent: bool) -> Result<()> {
        let len = self.tokens.len();
        let start = start.min(len);
        let end = count.map_or(len, |c| (start + c).min(len));
        let removed = end - start;
        self.tokens.drain(start..end);
        if !silent {
            self.update_contexts_ranges();
            self.events.dispatch(&EventPayload::RemoveRange {
                start,
                count: removed,
            });
        }
        Ok(())
    }

    /// Replaces the token at `index`.
    pub fn replace_token(&mut self, index: usize, token: Token, silent: bool) -> Result<()> {
        if index >= self.tokens.len() {
            return Err(ShapeError::IndexOutOfBounds {
                index,
                len: self.tokens.len(),
            });
        }
        self.tokens[index] = token;
        if !silent {
            self.update_contexts_ranges();
            self.events.dispatch(&EventPayload::ReplaceToken { index });
        }
        Ok(())
    }

    /// Replaces `count` tokens starting at `start` with `tokens`;
    /// `None` replaces through the end.
    pub fn replace_range(
        &mut self,
        start: usize,
        count: Option<usize>,
        tokens: Vec<Token>,
        silent: bool,
    ) -> Result<()> {
        let len = self.tokens.len();
        let end = match count {
            Some(c) => start.checked_add(c).filter(|&e| e <= len),
            None if start <= len => Some(len),
            None => None,
        };
        let Some(end) = end else {
            return Err(ShapeError::InvalidRange {
                start,
                end: count.map_or(len, |c| start + c),
                len,
            });
        };
        let removed = end - start;
        let inserted = tokens.len();
        self.tokens.splice(start..end, tokens);
        if !silent {
            self.update_contexts_ranges();
            self.events.dispatch(&EventPayload::ReplaceRange {
                start,
                removed,
                inserted,
            });
        }
        Ok(())
    }

    /// Runs a batch of edits in silent mode and issues a single
    /// composite notification.
    ///
    /// The batch fails only when every sub-operation failed; otherwise
    /// the successes take effect, failed sub-operations are dropped, and
    /// one context recompute plus one `ComposeRud` event cover the whole
    /// batch. The returned vector reports each sub-operation's outcome
    /// in order.
    pub fn compose_rud(&mut self, ops: Vec<Rud>) -> Result<Vec<Result<()>>> {
        let mut outcomes = Vec::with_capacity(ops.len());
        for (index, op) in ops.into_iter().enumerate() {
            let result = match op {
                Rud::Insert { index, tokens } => self.insert_token(tokens, index, true),
                Rud::Remove { index } => self.remove_token(index, true),
                Rud::RemoveRange { start, count } => self.remove_range(start, count, true),
                Rud::Replace { index, token } => self.replace_token(index, token, true),
                Rud::ReplaceRange {
                    start,
                    count,
                    tokens,
                } => self.replace_range(start, count, tokens, true),
            };
            if let Err(err) = &result {
                warn!("dropping batched edit {index}: {err}");
            }
            outcomes.push(result);
        }
        if !outcomes.is_empty() && outcomes.iter().all(|r| r.is_err()) {
            let report = outcomes
                .into_iter()
                .enumerate()
                .filter_map(|(i, r)| r.err().map(|e| (i, e)))
                .collect();
            return Err(ShapeError::BatchFailed(report));
        }
        let applied = outcomes.iter().filter(|r| r.is_ok()).count();
        self.update_contexts_ranges();
        self.events.dispatch(&EventPayload::ComposeRud { applied });
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::contexts::{
        arabic_word_end, arabic_word_start, latin_word_end, latin_word_start, ARABIC_WORD,
        LATIN_WORD,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    fn latin_tokenizer() -> Tokenizer {
        let mut tokenizer = Tokenizer::new();
        tokenizer
            .register_context_checker(
                LATIN_WORD,
                Box::new(latin_word_start),
                Box::new(latin_word_end),
            )
            .unwrap();
        tokenizer
    }

    fn range_spans(tokenizer: &Tokenizer, name: &str) -> Vec<(usize, usize)> {
        tokenizer
            .context_ranges(name)
            .unwrap()
            .iter()
            .map(|r| (r.start, r.end_offset))
            .collect()
    }

    #[test]
    fn tokenize_builds_one_token_per_scalar() {
        let mut tokenizer = Tokenizer::new();
        let tokens = tokenizer.tokenize("a\u{0628}\u{1F600}");
        let chars: Vec<char> = tokens.iter().map(|t| t.ch).collect();
        assert_eq!(chars, vec!['a', '\u{0628}', '\u{1F600}']);
    }

    #[test]
    fn tokenize_emits_events_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut tokenizer = latin_tokenizer();
        for event in [
            CoreEvent::Start,
            CoreEvent::Next,
            CoreEvent::ContextStart,
            CoreEvent::ContextEnd,
            CoreEvent::NewToken,
            CoreEvent::End,
        ] {
            let log = Rc::clone(&log);
            tokenizer.on(event, move |payload| {
                log.borrow_mut().push(payload.event());
            });
        }
        tokenizer.tokenize("ab");
        assert_eq!(
            *log.borrow(),
            vec![
                CoreEvent::Start,
                CoreEvent::Next,
                CoreEvent::ContextStart,
                CoreEvent::NewToken,
                CoreEvent::Next,
                CoreEvent::ContextEnd,
                CoreEvent::NewToken,
                CoreEvent::End,
            ]
        );
    }

    #[test]
    fn word_ranges_are_disjoint_sorted_and_identified() {
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("ab cd  e");
        let ranges = tokenizer.context_ranges(LATIN_WORD).unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].id, "latinWord.0");
        assert_eq!(ranges[2].id, "latinWord.2");
        assert_eq!(range_spans(&tokenizer, LATIN_WORD), vec![(0, 2), (3, 2), (7, 1)]);
        // Disjoint and sorted, total coverage within bounds.
        let mut last_end = 0;
        let mut covered = 0;
        for range in ranges {
            assert!(range.start >= last_end);
            last_end = range.end();
            covered += range.end_offset;
        }
        assert!(covered <= tokenizer.tokens().len());
    }

    #[test]
    fn checkers_run_in_registration_order_over_the_same_scan() {
        let mut tokenizer = latin_tokenizer();
        tokenizer
            .register_context_checker(
                ARABIC_WORD,
                Box::new(arabic_word_start),
                Box::new(arabic_word_end),
            )
            .unwrap();
        tokenizer.tokenize("ab \u{0645}\u{0627}");
        assert_eq!(range_spans(&tokenizer, LATIN_WORD), vec![(0, 2)]);
        assert_eq!(range_spans(&tokenizer, ARABIC_WORD), vec![(3, 2)]);
    }

    #[test]
    fn duplicate_context_name_is_rejected() {
        let mut tokenizer = latin_tokenizer();
        let result = tokenizer.register_context_checker(
            LATIN_WORD,
            Box::new(latin_word_start),
            Box::new(latin_word_end),
        );
        assert!(matches!(result, Err(ShapeError::DuplicateContext(_))));
    }

    #[test]
    fn unknown_context_is_rejected() {
        let tokenizer = latin_tokenizer();
        assert!(matches!(
            tokenizer.context_ranges("thaiWord"),
            Err(ShapeError::UnknownContext(_))
        ));
    }

    #[test]
    fn modifiers_write_state_in_registration_order() {
        let mut tokenizer = Tokenizer::new();
        tokenizer.register_modifier(
            "glyphIndex",
            None,
            Box::new(|token, _| StateValue::Glyph(token.ch as u16)),
        );
        tokenizer.register_modifier(
            "vowel",
            Some(Box::new(|token, _| "aeiou".contains(token.ch))),
            Box::new(|_, _| StateValue::Flag(true)),
        );
        tokenizer.tokenize("hi");
        let tokens = tokenizer.tokens();
        assert_eq!(tokens[0].state("glyphIndex"), Some(&StateValue::Glyph('h' as u16)));
        assert_eq!(tokens[0].state("vowel"), None);
        assert_eq!(tokens[1].state("vowel"), Some(&StateValue::Flag(true)));
        // The last applicable modifier is the active state.
        assert_eq!(tokens[1].active_state().unwrap().0, "vowel");
    }

    #[test]
    fn edits_recompute_ranges_to_match_a_fresh_scan() {
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("ab cd");
        tokenizer.remove_token(2, false).unwrap();
        assert_eq!(tokenizer.text(), "abcd");
        let mut fresh = latin_tokenizer();
        fresh.tokenize("abcd");
        assert_eq!(
            tokenizer.context_ranges(LATIN_WORD).unwrap(),
            fresh.context_ranges(LATIN_WORD).unwrap()
        );
    }

    #[test]
    fn replace_range_keeps_ranges_consistent() {
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("ab cd");
        let replacement: Vec<Token> = "x ".chars().map(Token::new).collect();
        tokenizer.replace_range(0, Some(2), replacement, false).unwrap();
        assert_eq!(tokenizer.text(), "x  cd");
        let mut fresh = latin_tokenizer();
        fresh.tokenize("x  cd");
        assert_eq!(
            tokenizer.context_ranges(LATIN_WORD).unwrap(),
            fresh.context_ranges(LATIN_WORD).unwrap()
        );
    }

    #[test]
    fn silent_edits_skip_recompute_and_events() {
        let count = Rc::new(RefCell::new(0));
        let mut tokenizer = latin_tokenizer();
        let c = Rc::clone(&count);
        tokenizer.on(CoreEvent::UpdateContextsRanges, move |_| {
            *c.borrow_mut() += 1;
        });
        tokenizer.tokenize("ab");
        tokenizer.remove_token(0, true).unwrap();
        assert_eq!(*count.borrow(), 0);
        // Stale until recomputed by hand.
        assert_eq!(range_spans(&tokenizer, LATIN_WORD), vec![(0, 2)]);
        tokenizer.update_contexts_ranges();
        assert_eq!(*count.borrow(), 1);
        assert_eq!(range_spans(&tokenizer, LATIN_WORD), vec![(0, 1)]);
    }

    #[test]
    fn out_of_bounds_edits_fail_softly() {
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("ab");
        assert!(matches!(
            tokenizer.remove_token(5, false),
            Err(ShapeError::IndexOutOfBounds { index: 5, len: 2 })
        ));
        assert!(matches!(
            tokenizer.replace_token(2, Token::new('x'), false),
            Err(ShapeError::IndexOutOfBounds { .. })
        ));
        assert!(matches!(
            tokenizer.replace_range(1, Some(4), vec![Token::new('x')], false),
            Err(ShapeError::InvalidRange { .. })
        ));
        assert!(matches!(
            tokenizer.insert_token(vec![], 0, false),
            Err(ShapeError::EmptyInsert)
        ));
        assert_eq!(tokenizer.text(), "ab");
    }

    #[test]
    fn remove_range_to_end_and_clamped() {
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("abcde");
        tokenizer.remove_range(3, None, false).unwrap();
        assert_eq!(tokenizer.text(), "abc");
        tokenizer.remove_range(1, Some(10), false).unwrap();
        assert_eq!(tokenizer.text(), "a");
    }

    #[test]
    fn compose_rud_batches_into_single_notification() {
        let updates = Rc::new(RefCell::new(0));
        let composites = Rc::new(RefCell::new(0));
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("abc");
        let u = Rc::clone(&updates);
        tokenizer.on(CoreEvent::UpdateContextsRanges, move |_| {
            *u.borrow_mut() += 1;
        });
        let c = Rc::clone(&composites);
        tokenizer.on(CoreEvent::ComposeRud, move |payload| {
            if let EventPayload::ComposeRud { applied } = payload {
                assert_eq!(*applied, 2);
            }
            *c.borrow_mut() += 1;
        });
        let outcomes = tokenizer
            .compose_rud(vec![
                Rud::Remove { index: 0 },
                Rud::Insert {
                    index: 0,
                    tokens: vec![Token::new('X')],
                },
            ])
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|r| r.is_ok()));
        assert_eq!(tokenizer.tokens().len(), 3);
        assert_eq!(tokenizer.text(), "Xbc");
        assert_eq!(*updates.borrow(), 1);
        assert_eq!(*composites.borrow(), 1);
    }

    #[test]
    fn compose_rud_partial_success_is_not_a_failure() {
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("abc");
        let outcomes = tokenizer
            .compose_rud(vec![
                Rud::Remove { index: 99 },
                Rud::Replace {
                    index: 0,
                    token: Token::new('z'),
                },
            ])
            .unwrap();
        assert!(outcomes[0].is_err());
        assert!(outcomes[1].is_ok());
        assert_eq!(tokenizer.text(), "zbc");
    }

    #[test]
    fn compose_rud_fails_when_every_edit_fails() {
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("abc");
        let result = tokenizer.compose_rud(vec![
            Rud::Remove { index: 99 },
            Rud::Replace {
                index: 42,
                token: Token::new('z'),
            },
        ]);
        match result {
            Err(ShapeError::BatchFailed(report)) => {
                assert_eq!(report.len(), 2);
                assert_eq!(report[0].0, 0);
                assert_eq!(report[1].0, 1);
            }
            other => panic!("expected BatchFailed, got {other:?}"),
        }
        assert_eq!(tokenizer.text(), "abc");
    }

    #[test]
    fn range_text_and_tokens() {
        let mut tokenizer = latin_tokenizer();
        tokenizer.tokenize("ab cd");
        let ranges = tokenizer.context_ranges(LATIN_WORD).unwrap().to_vec();
        assert_eq!(tokenizer.range_text(&ranges[1]), "cd");
        assert_eq!(tokenizer.range_tokens(&ranges[0]).len(), 2);
    }
}
