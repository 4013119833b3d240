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
use crate::opcode::{pack_extended, pack_imm16, pack_reg, Opcode, REG1_SHIFT, REG2_SHIFT};
use crate::register::Register;

const MAX_LABEL_FIELD: u32 = 0xFFFF;
/// `BRANCH_*_REG_CONST16` shares its opcode word with label/offset (bits
/// 16..31) and the extended bit (15, set to pick this form over the
/// reg-reg form), leaving only bits 9..14 for the comparison constant.
const CONST_SHIFT: u32 = 9;
const MAX_BRANCH_CONST: u16 = 1 << (15 - CONST_SHIFT);

fn check_label(label: u32) -> Result<(), AssemblerError> {
    if label > MAX_LABEL_FIELD {
        Err(AssemblerError::BadBranchToLabel { label })
    } else {
        Ok(())
    }
}

impl<'a> Assembler<'a> {
    /// Unconditional branch to `label`. The label number, not a resolved
    /// offset, is stored here; `finalise` rewrites it into a relative
    /// offset once every label position is known.
    pub fn branch(&mut self, label: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = check_label(label) {
            return self.fail(e);
        }
        self.emit1(Opcode::Branch.as_u8() as u32 | pack_imm16(label as u16))
    }

    pub fn branch_reg_eq_null(&mut self, reg: Register, label: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = check_label(label) {
            return self.fail(e);
        }
        self.emit1(
            Opcode::BranchRegEqNull.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg.index())
                | pack_imm16(label as u16),
        )
    }

    pub fn branch_reg_ne_null(&mut self, reg: Register, label: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = check_label(label) {
            return self.fail(e);
        }
        self.emit1(
            Opcode::BranchRegNeNull.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg.index())
                | pack_imm16(label as u16),
        )
    }

    /// `reversed` mirrors the executor's canonical comparison order: EQ/NE
    /// are symmetric and pack lhs first, but LT/LE/GT/GE pack rhs first so
    /// the executor always compares reg1-against-reg2 the same direction.
    fn branch_reg_reg(
        &mut self,
        opcode: Opcode,
        lhs: Register,
        rhs: Register,
        reversed: bool,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = check_label(label) {
            return self.fail(e);
        }
        let (reg1, reg2) = if reversed { (rhs, lhs) } else { (lhs, rhs) };
        self.emit1(
            opcode.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg1.index())
                | pack_reg(REG2_SHIFT, reg2.index())
                | pack_imm16(label as u16),
        )
    }

    pub fn branch_eq_reg_reg(
        &mut self,
        lhs: Register,
        rhs: Register,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_reg(Opcode::BranchEqRegReg, lhs, rhs, false, label)
    }

    pub fn branch_ne_reg_reg(
        &mut self,
        lhs: Register,
        rhs: Register,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_reg(Opcode::BranchNeRegReg, lhs, rhs, false, label)
    }

    pub fn branch_lt_reg_reg(
        &mut self,
        lhs: Register,
        rhs: Register,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_reg(Opcode::BranchLtRegReg, lhs, rhs, true, label)
    }

    pub fn branch_le_reg_reg(
        &mut self,
        lhs: Register,
        rhs: Register,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_reg(Opcode::BranchLeRegReg, lhs, rhs, true, label)
    }

    pub fn branch_gt_reg_reg(
        &mut self,
        lhs: Register,
        rhs: Register,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_reg(Opcode::BranchGtRegReg, lhs, rhs, true, label)
    }

    pub fn branch_ge_reg_reg(
        &mut self,
        lhs: Register,
        rhs: Register,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_reg(Opcode::BranchGeRegReg, lhs, rhs, true, label)
    }

    /// Branches against a small constant instead of a second register,
    /// reusing the reg-reg opcode with the extended bit set. The constant
    /// shares its word with the label/offset field, so it only has room
    /// for `MAX_BRANCH_CONST` values.
    fn branch_reg_const16(
        &mut self,
        opcode: Opcode,
        reg: Register,
        value: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = check_label(label) {
            return self.fail(e);
        }
        if value >= MAX_BRANCH_CONST {
            return self.fail(AssemblerError::BadConstant);
        }
        self.emit1(
            opcode.as_u8() as u32
                | pack_extended()
                | pack_reg(REG1_SHIFT, reg.index())
                | (value as u32) << CONST_SHIFT
                | pack_imm16(label as u16),
        )
    }

    pub fn branch_eq_reg_const16(
        &mut self,
        reg: Register,
        value: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_const16(Opcode::BranchEqRegReg, reg, value, label)
    }

    pub fn branch_ne_reg_const16(
        &mut self,
        reg: Register,
        value: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_const16(Opcode::BranchNeRegReg, reg, value, label)
    }

    pub fn branch_lt_reg_const16(
        &mut self,
        reg: Register,
        value: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_const16(Opcode::BranchLtRegReg, reg, value, label)
    }

    pub fn branch_le_reg_const16(
        &mut self,
        reg: Register,
        value: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_const16(Opcode::BranchLeRegReg, reg, value, label)
    }

    pub fn branch_gt_reg_const16(
        &mut self,
        reg: Register,
        value: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_const16(Opcode::BranchGtRegReg, reg, value, label)
    }

    pub fn branch_ge_reg_const16(
        &mut self,
        reg: Register,
        value: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.branch_reg_const16(Opcode::BranchGeRegReg, reg, value, label)
    }

    pub fn exit_ok(&mut self) -> Result<(), AssemblerError> {
        self.emit1(Opcode::ExitOk.as_u8() as u32)
    }

    pub fn exit_ok_last(&mut self) -> Result<(), AssemblerError> {
        self.emit1(Opcode::ExitOkLast.as_u8() as u32)
    }

    pub fn exit_refuse(&mut self, error_code: u16) -> Result<(), AssemblerError> {
        self.emit1(Opcode::ExitRefuse.as_u8() as u32 | pack_imm16(error_code))
    }

    /// Calls subroutine `sub`, which must later be defined with `def_sub`.
    pub fn call_sub(&mut self, sub: u32) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if sub > MAX_LABEL_FIELD {
            return self.fail(AssemblerError::BadSubNumber { sub });
        }
        self.note_call();
        self.emit1(Opcode::Call.as_u8() as u32 | pack_imm16(sub as u16))
    }
}
