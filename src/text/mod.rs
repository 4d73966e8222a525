// Copyright (c) 2023-present, Raphael Amorim.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

/*!
Character properties and script context predicates.

The classification tables are vendored rather than pulled from a Unicode
crate: the pipeline needs a small, fixed slice of the character database
(script blocks, joining types, sentence punctuation) and the tables must
match the context checkers exactly.
*/

pub(crate) mod contexts;
mod joining;
mod unicode;

pub use joining::{joining_type, JoiningForm, JoiningType};
pub use unicode::*;
