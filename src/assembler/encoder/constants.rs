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

//! The `LOAD_CONST*` family: loading an immediate value into a register,
//! from a 16-bit literal up through an arbitrary byte string read into
//! the memory buffer.

use super::utility::{ceil_div4, pack_bytes_le};
use crate::assembler::Assembler;
use crate::errors::AssemblerError;
use crate::opcode::{pack_imm16, pack_reg, Opcode, REG1_SHIFT, REG2_SHIFT};
use crate::register::Register;

impl<'a> Assembler<'a> {
    pub fn load_const_null(&mut self, reg: Register) -> Result<(), AssemblerError> {
        self.emit1(Opcode::LoadConstNull.as_u8() as u32 | pack_reg(REG1_SHIFT, reg.index()))
    }

    pub fn load_const16(&mut self, reg: Register, value: u16) -> Result<(), AssemblerError> {
        self.emit1(
            Opcode::LoadConst16.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg.index())
                | pack_imm16(value),
        )
    }

    pub fn load_const32(&mut self, reg: Register, value: u32) -> Result<(), AssemblerError> {
        let word0 = Opcode::LoadConst32.as_u8() as u32 | pack_reg(REG1_SHIFT, reg.index());
        self.emit2(word0, value)
    }

    pub fn load_const64(&mut self, reg: Register, value: u64) -> Result<(), AssemblerError> {
        let word0 = Opcode::LoadConst64.as_u8() as u32 | pack_reg(REG1_SHIFT, reg.index());
        let low = value as u32;
        let high = (value >> 32) as u32;
        self.emit3(word0, low, high)
    }

    /// Loads an arbitrary byte string into the memory buffer at
    /// `reg_mem_offset`, packed little-endian into words and zero-padded
    /// to a whole number of words, and records its byte length into
    /// `reg_size_dst`. `bytes.len()` must fit the instruction's 16-bit
    /// length field.
    pub fn load_const_mem(
        &mut self,
        reg_mem_offset: Register,
        reg_size_dst: Register,
        bytes: &[u8],
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if bytes.len() > u16::MAX as usize {
            return self.fail(AssemblerError::BadLength { len: bytes.len() });
        }
        let word0 = Opcode::LoadConstMem.as_u8() as u32
            | pack_reg(REG1_SHIFT, reg_mem_offset.index())
            | pack_reg(REG2_SHIFT, reg_size_dst.index())
            | pack_imm16(bytes.len() as u16);
        let mut words = Vec::with_capacity(1 + ceil_div4(bytes.len() as u32) as usize);
        words.push(word0);
        words.extend(pack_bytes_le(bytes));
        self.emit_words(&words)
    }
}
