/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! The single source of truth for how many words an instruction occupies
//! and whether its first word needs patching once labels and subroutines
//! are known. Shared, conceptually, by the assembler's finaliser and a
//! kernel-side executor — so it is written as a safe, total, index-based
//! walk over a word slice rather than raw pointer arithmetic.

use crate::opcode::{imm16, opcode_bits, Opcode};

/// What the finaliser must rewrite in an instruction's first word once
/// every label and subroutine position is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchClass {
    None,
    LabelOffset,
    SubOffset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction starting at the given index is `word_count` words
    /// long and needs `patch` applied to its first word at `finalise()`.
    Continue {
        next_index: usize,
        patch: PatchClass,
    },
    /// The word at the given index does not start a valid instruction.
    Invalid,
}

fn ceil_div4(byte_len: u32) -> u32 {
    (byte_len + 3) / 4
}

/// Decodes the instruction starting at `words[index]` and reports how far
/// to advance. Never panics and never reads past `words`'s end: a
/// multi-word instruction whose length field would run off the end of
/// the slice is reported as `Invalid` rather than read out of bounds.
pub fn step(words: &[u32], index: usize) -> StepOutcome {
    let Some(&word0) = words.get(index) else {
        return StepOutcome::Invalid;
    };
    let Ok(opcode) = Opcode::try_from(opcode_bits(word0)) else {
        return StepOutcome::Invalid;
    };

    use Opcode::*;
    let (word_count, patch): (usize, PatchClass) = match opcode {
        Branch | BranchRegEqNull | BranchRegNeNull | BranchEqRegReg | BranchNeRegReg
        | BranchLtRegReg | BranchLeRegReg | BranchGtRegReg | BranchGeRegReg => {
            (1, PatchClass::LabelOffset)
        }
        BranchAttrOpArg => {
            let Some(&word1) = words.get(index + 1) else {
                return StepOutcome::Invalid;
            };
            let byte_len = imm16(word1) as u32;
            (2 + ceil_div4(byte_len) as usize, PatchClass::LabelOffset)
        }
        BranchAttrEqNull | BranchAttrNeNull | BranchAttrOpParam | BranchAttrOpAttr => {
            (2, PatchClass::LabelOffset)
        }
        Call => (1, PatchClass::SubOffset),
        LoadConst64 => (3, PatchClass::None),
        LoadConst32 => (2, PatchClass::None),
        LoadConstMem => {
            let byte_len = imm16(word0) as u32;
            (1 + ceil_div4(byte_len) as usize, PatchClass::None)
        }
        _ => (1, PatchClass::None),
    };

    if index + word_count > words.len() {
        return StepOutcome::Invalid;
    }
    StepOutcome::Continue {
        next_index: index + word_count,
        patch,
    }
}

/// Walks every instruction in `words` from the start, returning the index
/// of each instruction's first word paired with its patch class. Stops
/// and returns `None` at the first invalid instruction, the way the
/// kernel-side executor would refuse a malformed program.
pub fn walk(words: &[u32]) -> Option<Vec<(usize, PatchClass)>> {
    let mut out = Vec::new();
    let mut index = 0;
    while index < words.len() {
        match step(words, index) {
            StepOutcome::Continue { next_index, patch } => {
                out.push((index, patch));
                index = next_index;
            }
            StepOutcome::Invalid => return None,
        }
    }
    Some(out)
}
