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

pub mod buffer;
pub mod encoder;
pub mod metainfo;
pub mod preprocessor;

use buffer::Buffer;
use metainfo::MetaInfo;

use preprocessor::{step, PatchClass, StepOutcome};

use crate::condition::UnknownHandling;
use crate::errors::AssemblerError;
use crate::opcode::Opcode;
use crate::schema::TableSchema;

/// Tracks `def_sub`/`ret_sub` state the way the source's `m_flags` bit for
/// "inside a subroutine definition" does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineState {
    Idle,
    InSubroutineDef,
}

/// Builds one interpreted program. One instance per thread; nothing here
/// synchronizes, blocks, or touches the filesystem — see the module docs
/// on `finalise` for why that matters.
///
/// Every public method returns `Result`, but once any call fails the
/// assembler remembers that failure and every later call returns the same
/// error without doing any work — the sticky-error behavior the source's
/// plain-`int`-returning API gets by checking `m_error` at the top of
/// every method.
pub struct Assembler<'a> {
    buffer: Buffer<'a>,
    meta: MetaInfo,
    schema: Option<&'a dyn TableSchema>,
    unknown_handling: UnknownHandling,
    first_sub_instruction_pos: Option<u32>,
    sub_state: SubroutineState,
    number_of_calls: u32,
    touches_disk: bool,
    finalised: bool,
    dead: Option<AssemblerError>,
}

impl<'a> Assembler<'a> {
    /// A program built into a dynamically growing, crate-owned buffer.
    pub fn new() -> Self {
        Assembler {
            buffer: Buffer::owned(),
            meta: MetaInfo::new(),
            schema: None,
            unknown_handling: UnknownHandling::default(),
            first_sub_instruction_pos: None,
            sub_state: SubroutineState::Idle,
            number_of_calls: 0,
            touches_disk: false,
            finalised: false,
            dead: None,
        }
    }

    /// A program built directly into caller-owned storage. Once `words`
    /// is exhausted, further emits fail with `TooManyInstructions` rather
    /// than growing the buffer.
    pub fn with_buffer(words: &'a mut [u32]) -> Self {
        Assembler {
            buffer: Buffer::borrowed(words),
            meta: MetaInfo::new(),
            schema: None,
            unknown_handling: UnknownHandling::default(),
            first_sub_instruction_pos: None,
            sub_state: SubroutineState::Idle,
            number_of_calls: 0,
            touches_disk: false,
            finalised: false,
            dead: None,
        }
    }

    pub fn with_table_schema(mut self, schema: &'a dyn TableSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_unknown_handling(mut self, handling: UnknownHandling) -> Self {
        self.unknown_handling = handling;
        self
    }

    pub fn unknown_handling(&self) -> UnknownHandling {
        self.unknown_handling
    }

    fn check_alive(&self) -> Result<(), AssemblerError> {
        match &self.dead {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn poison<T>(&mut self, err: AssemblerError) -> Result<T, AssemblerError> {
        self.dead = Some(err.clone());
        Err(err)
    }

    pub(crate) fn current_position(&self) -> u32 {
        self.buffer.instructions_length() as u32
    }

    pub(crate) fn schema(&self) -> Option<&'a dyn TableSchema> {
        self.schema
    }

    pub(crate) fn mark_disk_touched(&mut self) {
        self.touches_disk = true;
    }

    pub(crate) fn check_attribute(&self, attribute_id: u16) -> Result<(), AssemblerError> {
        let schema = self.schema.ok_or(AssemblerError::TableNotSet)?;
        schema
            .column(attribute_id)
            .map(|_| ())
            .ok_or(AssemblerError::BadAttributeId { attribute_id })
    }

    pub(crate) fn check_bindable(&self, lhs: u16, rhs: u16) -> Result<(), AssemblerError> {
        let schema = self.schema.ok_or(AssemblerError::TableNotSet)?;
        if schema.bindable(lhs, rhs) {
            Ok(())
        } else {
            Err(AssemblerError::ColumnsNotBindable { lhs, rhs })
        }
    }

    pub(crate) fn emit1(&mut self, word: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        match self.buffer.add1(word) {
            Ok(()) => Ok(()),
            Err(e) => self.poison(e),
        }
    }

    pub(crate) fn emit2(&mut self, a: u32, b: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        match self.buffer.add2(a, b) {
            Ok(()) => Ok(()),
            Err(e) => self.poison(e),
        }
    }

    pub(crate) fn emit3(&mut self, a: u32, b: u32, c: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        match self.buffer.add3(a, b, c) {
            Ok(()) => Ok(()),
            Err(e) => self.poison(e),
        }
    }

    pub(crate) fn emit_words(&mut self, words: &[u32]) -> Result<(), AssemblerError> {
        self.check_alive()?;
        match self.buffer.add_words(words) {
            Ok(()) => Ok(()),
            Err(e) => self.poison(e),
        }
    }

    pub(crate) fn fail<T>(&mut self, err: AssemblerError) -> Result<T, AssemblerError> {
        self.check_alive()?;
        self.poison(err)
    }

    /// Defines `label` at the current instruction position. A label's
    /// value is the word offset of the next instruction emitted after
    /// this call.
    pub fn def_label(&mut self, label: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        let position = self.current_position();
        match self.meta.define_label(&mut self.buffer, label, position) {
            Ok(()) => Ok(()),
            Err(e) => self.poison(e),
        }
    }

    /// Opens a subroutine definition at the current position. Must be
    /// preceded by at least one `call_sub` naming some subroutine number,
    /// and cannot nest.
    pub fn def_sub(&mut self, sub: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if self.sub_state == SubroutineState::InSubroutineDef {
            return self.fail(AssemblerError::BadState {
                reason: "def_sub called while already inside a subroutine definition".into(),
            });
        }
        if self.number_of_calls == 0 {
            return self.fail(AssemblerError::BadState {
                reason: "def_sub called before any call_sub".into(),
            });
        }
        let position = self.current_position();
        if self.first_sub_instruction_pos.is_none() {
            self.first_sub_instruction_pos = Some(position);
        }
        let relative = position - self.first_sub_instruction_pos.unwrap();
        match self.meta.define_sub(&mut self.buffer, sub, relative) {
            Ok(()) => {
                self.sub_state = SubroutineState::InSubroutineDef;
                Ok(())
            }
            Err(e) => self.poison(e),
        }
    }

    /// Closes the subroutine definition opened by `def_sub`, emitting a
    /// `RETURN` instruction.
    pub fn ret_sub(&mut self) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if self.sub_state != SubroutineState::InSubroutineDef {
            return self.fail(AssemblerError::BadState {
                reason: "ret_sub called outside a subroutine definition".into(),
            });
        }
        self.sub_state = SubroutineState::Idle;
        self.emit1(Opcode::Return.as_u8() as u32)
    }

    pub(crate) fn note_call(&mut self) {
        self.number_of_calls += 1;
    }

    pub fn words_used(&self) -> usize {
        self.buffer.instructions_length()
    }

    pub fn uses_disk(&self) -> bool {
        self.touches_disk
    }

    pub fn is_finalised(&self) -> bool {
        self.finalised
    }

    /// Patches every `BRANCH*` and `CALL` instruction in place: label
    /// references become signed relative offsets, subroutine references
    /// become offsets within the subroutine section. Must run exactly
    /// once, after every instruction has been emitted.
    pub fn finalise(&mut self) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if self.finalised {
            return self.fail(AssemblerError::BadState {
                reason: "finalise called twice".into(),
            });
        }

        if self.buffer.instructions_length() == 0 {
            match self.emit1(Opcode::ExitOk.as_u8() as u32) {
                Ok(()) => {}
                Err(e) => return Err(e),
            }
        }

        let patches = self.collect_patches()?;
        for (index, patch) in patches {
            self.apply_patch(index, patch)?;
        }

        self.finalised = true;
        Ok(())
    }

    fn collect_patches(&mut self) -> Result<Vec<(usize, PatchClass)>, AssemblerError> {
        let words = self.buffer.instructions();
        let mut out = Vec::new();
        let mut index = 0;
        while index < words.len() {
            match step(words, index) {
                StepOutcome::Continue { next_index, patch } => {
                    if patch != PatchClass::None {
                        out.push((index, patch));
                    }
                    index = next_index;
                }
                StepOutcome::Invalid => {
                    return self.fail(AssemblerError::BadState {
                        reason: "instruction stream is not well-formed".into(),
                    });
                }
            }
        }
        Ok(out)
    }

    fn apply_patch(&mut self, index: usize, patch: PatchClass) -> Result<(), AssemblerError> {
        let word0 = self.buffer.instructions()[index];
        let reference = crate::opcode::imm16(word0) as u32;

        let patched_high_bits = match patch {
            PatchClass::LabelOffset => {
                let label_pos = match self.meta.label_position(reference) {
                    Some(pos) => pos,
                    None => {
                        return self.fail(AssemblerError::LabelNotFound { label: reference });
                    }
                };
                let current = index as u32;
                if label_pos >= current {
                    let offset = label_pos - current;
                    if offset > 0x7FFF {
                        return self.fail(AssemblerError::BadLabelBranch { label: reference });
                    }
                    offset << 16
                } else {
                    let offset = current - label_pos;
                    if offset > 0x7FFF {
                        return self.fail(AssemblerError::BadLabelBranch { label: reference });
                    }
                    (offset << 16) | (1 << 31)
                }
            }
            PatchClass::SubOffset => match self.meta.sub_position(reference) {
                Some(pos) => {
                    if pos > 0xFFFF {
                        return self.fail(AssemblerError::BadSubroutineOffset { sub: reference });
                    }
                    pos << 16
                }
                None => {
                    return self.fail(AssemblerError::SubroutineNotFound { sub: reference });
                }
            },
            PatchClass::None => return Ok(()),
        };

        let low_bits = word0 & 0xFFFF;
        self.buffer.instructions_mut()[index] = low_bits | patched_high_bits;
        Ok(())
    }

    /// The finalised word stream, ready to hand to a kernel-side executor.
    pub fn words(&self) -> &[u32] {
        self.buffer.instructions()
    }

    pub fn into_words(self) -> Vec<u32> {
        self.buffer.into_instructions()
    }
}

impl<'a> Default for Assembler<'a> {
    fn default() -> Self {
        Assembler::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticky_error_poisons_every_later_call() {
        let mut asm = Assembler::new();
        asm.def_sub(0).unwrap_err(); // BadState: no call_sub yet
        let err = asm.def_label(0).unwrap_err();
        assert!(matches!(err, AssemblerError::BadState { .. }));
    }

    #[test]
    fn finalise_on_empty_program_emits_exit_ok() {
        let mut asm = Assembler::new();
        asm.finalise().unwrap();
        assert_eq!(asm.words(), &[Opcode::ExitOk.as_u8() as u32]);
    }

    #[test]
    fn finalise_is_not_reentrant() {
        let mut asm = Assembler::new();
        asm.finalise().unwrap();
        assert!(matches!(
            asm.finalise().unwrap_err(),
            AssemblerError::BadState { .. }
        ));
    }
}
