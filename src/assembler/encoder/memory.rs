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

//! Program-memory <-> register transfers (each with a constant-offset and
//! a register-offset addressing form) and the `CONVERT_SIZE` /
//! `WRITE_SIZE_MEM` / `WRITE_INTERPRETER_OUTPUT` extended-opcode pair.

use crate::assembler::Assembler;
use crate::errors::AssemblerError;
use crate::opcode::{pack_extended, pack_imm16, pack_reg, Opcode, REG1_SHIFT, REG2_SHIFT};
use crate::register::Register;

impl<'a> Assembler<'a> {
    fn read_mem_to_reg_const(&mut self, opcode: Opcode, dst: Register, constant: u16) -> Result<(), AssemblerError> {
        self.emit1(opcode.as_u8() as u32 | pack_reg(REG1_SHIFT, dst.index()) | pack_imm16(constant))
    }

    fn read_mem_to_reg_reg(&mut self, opcode: Opcode, dst: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.emit1(
            opcode.as_u8() as u32
                | pack_reg(REG1_SHIFT, offset_reg.index())
                | pack_reg(REG2_SHIFT, dst.index())
                | pack_extended(),
        )
    }

    fn write_mem_from_reg_const(&mut self, opcode: Opcode, src: Register, constant: u16) -> Result<(), AssemblerError> {
        self.emit1(opcode.as_u8() as u32 | pack_reg(REG1_SHIFT, src.index()) | pack_imm16(constant))
    }

    fn write_mem_from_reg_reg(&mut self, opcode: Opcode, src: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.emit1(
            opcode.as_u8() as u32
                | pack_reg(REG1_SHIFT, src.index())
                | pack_reg(REG2_SHIFT, offset_reg.index())
                | pack_extended(),
        )
    }

    pub fn read_uint8_mem_to_reg_const(&mut self, dst: Register, constant: u16) -> Result<(), AssemblerError> {
        self.read_mem_to_reg_const(Opcode::ReadUint8MemToReg, dst, constant)
    }
    pub fn read_uint8_mem_to_reg_reg(&mut self, dst: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.read_mem_to_reg_reg(Opcode::ReadUint8MemToReg, dst, offset_reg)
    }
    pub fn read_uint16_mem_to_reg_const(&mut self, dst: Register, constant: u16) -> Result<(), AssemblerError> {
        self.read_mem_to_reg_const(Opcode::ReadUint16MemToReg, dst, constant)
    }
    pub fn read_uint16_mem_to_reg_reg(&mut self, dst: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.read_mem_to_reg_reg(Opcode::ReadUint16MemToReg, dst, offset_reg)
    }
    pub fn read_uint32_mem_to_reg_const(&mut self, dst: Register, constant: u16) -> Result<(), AssemblerError> {
        self.read_mem_to_reg_const(Opcode::ReadUint32MemToReg, dst, constant)
    }
    pub fn read_uint32_mem_to_reg_reg(&mut self, dst: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.read_mem_to_reg_reg(Opcode::ReadUint32MemToReg, dst, offset_reg)
    }
    pub fn read_int64_mem_to_reg_const(&mut self, dst: Register, constant: u16) -> Result<(), AssemblerError> {
        self.read_mem_to_reg_const(Opcode::ReadInt64MemToReg, dst, constant)
    }
    pub fn read_int64_mem_to_reg_reg(&mut self, dst: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.read_mem_to_reg_reg(Opcode::ReadInt64MemToReg, dst, offset_reg)
    }

    pub fn write_uint8_reg_to_mem_const(&mut self, src: Register, constant: u16) -> Result<(), AssemblerError> {
        self.write_mem_from_reg_const(Opcode::WriteUint8RegToMem, src, constant)
    }
    pub fn write_uint8_reg_to_mem_reg(&mut self, src: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.write_mem_from_reg_reg(Opcode::WriteUint8RegToMem, src, offset_reg)
    }
    pub fn write_uint16_reg_to_mem_const(&mut self, src: Register, constant: u16) -> Result<(), AssemblerError> {
        self.write_mem_from_reg_const(Opcode::WriteUint16RegToMem, src, constant)
    }
    pub fn write_uint16_reg_to_mem_reg(&mut self, src: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.write_mem_from_reg_reg(Opcode::WriteUint16RegToMem, src, offset_reg)
    }
    pub fn write_uint32_reg_to_mem_const(&mut self, src: Register, constant: u16) -> Result<(), AssemblerError> {
        self.write_mem_from_reg_const(Opcode::WriteUint32RegToMem, src, constant)
    }
    pub fn write_uint32_reg_to_mem_reg(&mut self, src: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.write_mem_from_reg_reg(Opcode::WriteUint32RegToMem, src, offset_reg)
    }
    pub fn write_int64_reg_to_mem_const(&mut self, src: Register, constant: u16) -> Result<(), AssemblerError> {
        self.write_mem_from_reg_const(Opcode::WriteInt64RegToMem, src, constant)
    }
    pub fn write_int64_reg_to_mem_reg(&mut self, src: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.write_mem_from_reg_reg(Opcode::WriteInt64RegToMem, src, offset_reg)
    }

    /// Converts the byte length at `offset_reg` into a row size, storing
    /// the result in `dst`.
    pub fn convert_size(&mut self, dst: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.emit1(
            Opcode::ConvertSize.as_u8() as u32
                | pack_reg(REG1_SHIFT, offset_reg.index())
                | pack_reg(REG2_SHIFT, dst.index()),
        )
    }

    /// `CONVERT_SIZE`'s extended form: writes the row size to the memory
    /// buffer instead of a register.
    pub fn write_size_mem(&mut self, dst: Register, offset_reg: Register) -> Result<(), AssemblerError> {
        self.emit1(
            Opcode::ConvertSize.as_u8() as u32
                | pack_reg(REG1_SHIFT, offset_reg.index())
                | pack_reg(REG2_SHIFT, dst.index())
                | pack_extended(),
        )
    }

    /// `LOAD_CONST_MEM`'s extended form: writes `reg`'s value to output
    /// slot `output_index` instead of loading a constant.
    pub fn write_interpreter_output(&mut self, reg: Register, output_index: u16) -> Result<(), AssemblerError> {
        self.emit1(
            Opcode::LoadConstMem.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg.index())
                | pack_imm16(output_index)
                | pack_extended(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::{extended, reg_at};

    #[test]
    fn register_offset_form_sets_the_extended_bit() {
        let mut asm = Assembler::new();
        asm.read_uint8_mem_to_reg_reg(Register::R2, Register::R1).unwrap();
        let word = asm.words()[0];
        assert!(extended(word));
        assert_eq!(reg_at(word, REG1_SHIFT), 1);
        assert_eq!(reg_at(word, REG2_SHIFT), 2);
    }

    #[test]
    fn constant_offset_form_does_not_set_the_extended_bit() {
        let mut asm = Assembler::new();
        asm.read_uint8_mem_to_reg_const(Register::R2, 40).unwrap();
        let word = asm.words()[0];
        assert!(!extended(word));
        assert_eq!(word >> 16, 40);
    }

    #[test]
    fn write_size_mem_reuses_convert_size_opcode_extended() {
        let mut asm = Assembler::new();
        asm.write_size_mem(Register::R0, Register::R1).unwrap();
        let word = asm.words()[0];
        assert_eq!(crate::opcode::opcode_bits(word), Opcode::ConvertSize.as_u8());
        assert!(extended(word));
    }
}
