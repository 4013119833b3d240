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

use crate::assembler::Assembler;
use crate::errors::AssemblerError;
use crate::opcode::{pack_imm16, pack_reg, Opcode, REG1_SHIFT, REG2_SHIFT, REG3_SHIFT};
use crate::register::Register;

impl<'a> Assembler<'a> {
    fn reg_reg_op(
        &mut self,
        opcode: Opcode,
        dst: Register,
        src1: Register,
        src2: Register,
    ) -> Result<(), AssemblerError> {
        self.emit1(
            opcode.as_u8() as u32
                | pack_reg(REG1_SHIFT, src1.index())
                | pack_reg(REG2_SHIFT, src2.index())
                | pack_reg(REG3_SHIFT, dst.index()),
        )
    }

    fn const_reg_op(
        &mut self,
        opcode: Opcode,
        dst: Register,
        src: Register,
        constant: u16,
    ) -> Result<(), AssemblerError> {
        self.emit1(
            opcode.as_u8() as u32
                | pack_reg(REG1_SHIFT, src.index())
                | pack_reg(REG2_SHIFT, dst.index())
                | pack_imm16(constant),
        )
    }

    pub fn add_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::AddRegReg, dst, a, b)
    }

    pub fn sub_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::SubRegReg, dst, a, b)
    }

    pub fn lshift_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::LshiftRegReg, dst, a, b)
    }

    pub fn rshift_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::RshiftRegReg, dst, a, b)
    }

    pub fn mul_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::MulRegReg, dst, a, b)
    }

    pub fn div_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::DivRegReg, dst, a, b)
    }

    pub fn and_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::AndRegReg, dst, a, b)
    }

    pub fn or_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::OrRegReg, dst, a, b)
    }

    pub fn xor_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::XorRegReg, dst, a, b)
    }

    pub fn mod_reg_reg(&mut self, dst: Register, a: Register, b: Register) -> Result<(), AssemblerError> {
        self.reg_reg_op(Opcode::ModRegReg, dst, a, b)
    }

    pub fn not_reg_reg(&mut self, dst: Register, src: Register) -> Result<(), AssemblerError> {
        self.emit1(
            Opcode::NotRegReg.as_u8() as u32
                | pack_reg(REG1_SHIFT, src.index())
                | pack_reg(REG3_SHIFT, dst.index()),
        )
    }

    pub fn add_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::AddConstRegToReg, dst, src, value)
    }

    pub fn sub_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::SubConstRegToReg, dst, src, value)
    }

    pub fn lshift_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::LshiftConstRegToReg, dst, src, value)
    }

    pub fn rshift_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::RshiftConstRegToReg, dst, src, value)
    }

    pub fn mul_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::MulConstRegToReg, dst, src, value)
    }

    pub fn div_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::DivConstRegToReg, dst, src, value)
    }

    pub fn and_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::AndConstRegToReg, dst, src, value)
    }

    pub fn or_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::OrConstRegToReg, dst, src, value)
    }

    pub fn xor_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::XorConstRegToReg, dst, src, value)
    }

    pub fn mod_const_reg_to_reg(&mut self, dst: Register, src: Register, value: u16) -> Result<(), AssemblerError> {
        self.const_reg_op(Opcode::ModConstRegToReg, dst, src, value)
    }
}
