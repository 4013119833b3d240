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

use super::utility::{mask_bits_beyond, pack_bytes_le};
use crate::assembler::Assembler;
use crate::condition::BinaryCondition;
use crate::errors::AssemblerError;
use crate::opcode::{pack_imm16, pack_reg, Opcode, REG1_SHIFT, REG2_SHIFT, REG3_SHIFT, REG4_SHIFT};
use crate::register::Register;
use crate::schema::{ColumnType, StorageKind};

const NULLS_SHIFT: u32 = 6;
const COND_SHIFT: u32 = 12;
/// `READ_PARTIAL_ATTR_TO_MEM` packs all four register operands into word 0,
/// leaving only bits 19..31 for the attribute id.
const PARTIAL_ATTR_ID_SHIFT: u32 = 19;
const MAX_PARTIAL_ATTR_ID: u16 = (1 << (32 - PARTIAL_ATTR_ID_SHIFT)) - 1;

impl<'a> Assembler<'a> {
    fn note_storage(&mut self, attribute_id: u16) {
        if let Some(schema) = self.schema() {
            if let Some(column) = schema.column(attribute_id) {
                if column.storage == StorageKind::Disk {
                    self.mark_disk_touched();
                }
            }
        }
    }

    pub fn read_attr_into_reg(
        &mut self,
        reg: Register,
        attribute_id: u16,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        self.note_storage(attribute_id);
        self.emit1(
            Opcode::ReadAttrIntoReg.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg.index())
                | pack_imm16(attribute_id),
        )
    }

    pub fn write_attr_from_reg(
        &mut self,
        reg: Register,
        attribute_id: u16,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        self.note_storage(attribute_id);
        self.emit1(
            Opcode::WriteAttrFromReg.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg.index())
                | pack_imm16(attribute_id),
        )
    }

    /// Copies the whole column into program memory at `reg_mem_offset`,
    /// recording its byte length into `reg_dst`.
    pub fn read_attr_to_mem(
        &mut self,
        reg_mem_offset: Register,
        reg_dst: Register,
        attribute_id: u16,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        self.note_storage(attribute_id);
        self.emit1(
            Opcode::ReadAttrToMem.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg_mem_offset.index())
                | pack_reg(REG3_SHIFT, reg_dst.index())
                | pack_imm16(attribute_id),
        )
    }

    /// Writes `reg_size` bytes from program memory at `reg_mem_offset`
    /// into the column.
    pub fn write_attr_from_mem(
        &mut self,
        reg_mem_offset: Register,
        reg_size: Register,
        attribute_id: u16,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        self.note_storage(attribute_id);
        self.emit1(
            Opcode::WriteAttrFromMem.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg_mem_offset.index())
                | pack_reg(REG2_SHIFT, reg_size.index())
                | pack_imm16(attribute_id),
        )
    }

    /// Appends `reg_size` bytes from program memory at `reg_mem_offset`
    /// to the variable-length column.
    pub fn append_attr_from_mem(
        &mut self,
        reg_mem_offset: Register,
        reg_size: Register,
        attribute_id: u16,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        self.note_storage(attribute_id);
        self.emit1(
            Opcode::AppendAttrFromMem.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg_mem_offset.index())
                | pack_reg(REG2_SHIFT, reg_size.index())
                | pack_imm16(attribute_id),
        )
    }

    /// Copies `reg_size` bytes starting at `reg_pos` of the column into
    /// program memory at `reg_mem_offset`, recording the byte length into
    /// `reg_dst`. All four register operands and the attribute id share a
    /// single word, so `attribute_id` is limited to `MAX_PARTIAL_ATTR_ID`
    /// rather than the usual 16-bit range.
    pub fn read_partial_attr_to_mem(
        &mut self,
        reg_mem_offset: Register,
        reg_pos: Register,
        reg_size: Register,
        reg_dst: Register,
        attribute_id: u16,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if attribute_id > MAX_PARTIAL_ATTR_ID {
            return self.fail(AssemblerError::BadAttributeId { attribute_id });
        }
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        self.note_storage(attribute_id);
        self.emit1(
            Opcode::ReadPartialAttrToMem.as_u8() as u32
                | pack_reg(REG1_SHIFT, reg_mem_offset.index())
                | pack_reg(REG2_SHIFT, reg_pos.index())
                | pack_reg(REG3_SHIFT, reg_dst.index())
                | pack_reg(REG4_SHIFT, reg_size.index())
                | (attribute_id as u32) << PARTIAL_ATTR_ID_SHIFT,
        )
    }

    fn branch_attr_word0(&self, opcode: Opcode, cond: BinaryCondition, label: u16) -> u32 {
        let nulls = crate::condition::NullSemantics::from(self.unknown_handling()).as_u8();
        opcode.as_u8() as u32
            | (nulls as u32) << NULLS_SHIFT
            | (cond.as_u8() as u32) << COND_SHIFT
            | pack_imm16(label)
    }

    pub fn branch_attr_eq_null(
        &mut self,
        attribute_id: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        let word0 = self.branch_attr_word0(Opcode::BranchAttrEqNull, BinaryCondition::Eq, label as u16);
        self.emit2(word0, attribute_id as u32)
    }

    pub fn branch_attr_ne_null(
        &mut self,
        attribute_id: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        let word0 = self.branch_attr_word0(Opcode::BranchAttrNeNull, BinaryCondition::Ne, label as u16);
        self.emit2(word0, attribute_id as u32)
    }

    pub fn branch_attr_op_param(
        &mut self,
        cond: BinaryCondition,
        attribute_id: u16,
        param_no: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        let word0 = self.branch_attr_word0(Opcode::BranchAttrOpParam, cond, label as u16);
        let word1 = attribute_id as u32 | (param_no as u32) << 16;
        self.emit2(word0, word1)
    }

    pub fn branch_attr_op_attr(
        &mut self,
        cond: BinaryCondition,
        lhs_attribute_id: u16,
        rhs_attribute_id: u16,
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if let Err(e) = self.check_attribute(lhs_attribute_id) {
            return self.fail(e);
        }
        if let Err(e) = self.check_attribute(rhs_attribute_id) {
            return self.fail(e);
        }
        if let Err(e) = self.check_bindable(lhs_attribute_id, rhs_attribute_id) {
            return self.fail(e);
        }
        let word0 = self.branch_attr_word0(Opcode::BranchAttrOpAttr, cond, label as u16);
        let word1 = lhs_attribute_id as u32 | (rhs_attribute_id as u32) << 16;
        self.emit2(word0, word1)
    }

    /// Compares the attribute's value against a literal byte string.
    /// `literal` is packed little-endian into words and zero-padded to a
    /// whole number of words; a zero-length literal is rejected. Against a
    /// `Bit` column, bits beyond the column's declared `bit_length` are
    /// zeroed in the packed literal so the executor's word-wise compare
    /// ignores them.
    pub fn branch_attr_op_arg(
        &mut self,
        cond: BinaryCondition,
        attribute_id: u16,
        literal: &[u8],
        label: u32,
    ) -> Result<(), AssemblerError> {
        self.check_alive()?;
        if literal.is_empty() {
            return self.fail(AssemblerError::BadLength { len: 0 });
        }
        if literal.len() > u16::MAX as usize {
            return self.fail(AssemblerError::BadLength { len: literal.len() });
        }
        if let Err(e) = self.check_attribute(attribute_id) {
            return self.fail(e);
        }
        let word0 = self.branch_attr_word0(Opcode::BranchAttrOpArg, cond, label as u16);
        let word1 = attribute_id as u32 | (literal.len() as u32) << 16;
        let mut data_words = pack_bytes_le(literal);
        if let Some(column) = self.schema().and_then(|s| s.column(attribute_id)) {
            if column.column_type == ColumnType::Bit {
                mask_bits_beyond(&mut data_words, column.bit_length);
            }
        }
        let mut words = vec![word0, word1];
        words.extend(data_words);
        self.emit_words(&words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::reg_at;
    use crate::schema::{test_support::MapSchema, ColumnInfo, StorageKind};

    fn schema() -> MapSchema {
        MapSchema::new().with_column(ColumnInfo {
            attribute_id: 17,
            byte_length: 4,
            array_size: 1,
            ..Default::default()
        })
    }

    #[test]
    fn branch_attr_op_arg_packs_length_and_zero_extends() {
        let schema = schema();
        let mut asm = Assembler::new().with_table_schema(&schema);
        asm.branch_attr_op_arg(BinaryCondition::Le, 17, &[0x41, 0x42, 0x43], 0)
            .unwrap();
        let words = asm.words();
        assert_eq!(words.len(), 3);
        assert_eq!(words[1] & 0xFFFF, 17);
        assert_eq!(words[1] >> 16, 3);
        assert_eq!(words[2], u32::from_le_bytes([0x41, 0x42, 0x43, 0]));
    }

    #[test]
    fn branch_attr_op_arg_rejects_empty_literal() {
        let schema = schema();
        let mut asm = Assembler::new().with_table_schema(&schema);
        assert_eq!(
            asm.branch_attr_op_arg(BinaryCondition::Eq, 17, &[], 0)
                .unwrap_err(),
            AssemblerError::BadLength { len: 0 }
        );
    }

    #[test]
    fn branch_attr_op_attr_requires_bindable_columns() {
        let schema = MapSchema::new()
            .with_column(ColumnInfo {
                attribute_id: 1,
                byte_length: 4,
                array_size: 1,
                ..Default::default()
            })
            .with_column(ColumnInfo {
                attribute_id: 2,
                byte_length: 8,
                array_size: 1,
                ..Default::default()
            });
        let mut asm = Assembler::new().with_table_schema(&schema);
        assert_eq!(
            asm.branch_attr_op_attr(BinaryCondition::Eq, 1, 2, 0)
                .unwrap_err(),
            AssemblerError::ColumnsNotBindable { lhs: 1, rhs: 2 }
        );
    }

    #[test]
    fn reading_a_disk_column_marks_the_program_as_touching_disk() {
        let schema = MapSchema::new().with_column(ColumnInfo {
            attribute_id: 9,
            byte_length: 4,
            array_size: 1,
            storage: StorageKind::Disk,
            ..Default::default()
        });
        let mut asm = Assembler::new().with_table_schema(&schema);
        asm.read_attr_into_reg(Register::R0, 9).unwrap();
        assert!(asm.uses_disk());
    }

    #[test]
    fn read_attr_to_mem_packs_both_registers() {
        let schema = schema();
        let mut asm = Assembler::new().with_table_schema(&schema);
        asm.read_attr_to_mem(Register::R1, Register::R2, 17).unwrap();
        let word = asm.words()[0];
        assert_eq!(reg_at(word, REG1_SHIFT), 1);
        assert_eq!(reg_at(word, REG3_SHIFT), 2);
        assert_eq!(word & 0xFFFF, Opcode::ReadAttrToMem.as_u8() as u32);
        assert_eq!(word >> 16, 17);
    }

    #[test]
    fn write_attr_from_mem_packs_offset_and_size_registers() {
        let schema = schema();
        let mut asm = Assembler::new().with_table_schema(&schema);
        asm.write_attr_from_mem(Register::R3, Register::R4, 17).unwrap();
        let word = asm.words()[0];
        assert_eq!(reg_at(word, REG1_SHIFT), 3);
        assert_eq!(reg_at(word, REG2_SHIFT), 4);
    }

    #[test]
    fn read_partial_attr_to_mem_packs_all_four_registers_in_one_word() {
        let schema = schema();
        let mut asm = Assembler::new().with_table_schema(&schema);
        asm.read_partial_attr_to_mem(
            Register::R1,
            Register::R2,
            Register::R3,
            Register::R4,
            17,
        )
        .unwrap();
        let words = asm.words();
        assert_eq!(words.len(), 1);
        let word = words[0];
        assert_eq!(reg_at(word, REG1_SHIFT), 1);
        assert_eq!(reg_at(word, REG2_SHIFT), 2);
        assert_eq!(reg_at(word, REG3_SHIFT), 3);
        assert_eq!(reg_at(word, REG4_SHIFT), 4);
        assert_eq!(word >> PARTIAL_ATTR_ID_SHIFT, 17);
    }

    #[test]
    fn read_partial_attr_to_mem_rejects_attribute_ids_past_the_13_bit_field() {
        let schema = schema();
        let mut asm = Assembler::new().with_table_schema(&schema);
        let err = asm
            .read_partial_attr_to_mem(
                Register::R0,
                Register::R0,
                Register::R0,
                Register::R0,
                MAX_PARTIAL_ATTR_ID + 1,
            )
            .unwrap_err();
        assert_eq!(
            err,
            AssemblerError::BadAttributeId {
                attribute_id: MAX_PARTIAL_ATTR_ID + 1
            }
        );
    }

    #[test]
    fn branch_attr_op_arg_zeroes_bit_column_literal_past_its_declared_width() {
        let schema = MapSchema::new().with_column(ColumnInfo {
            attribute_id: 20,
            column_type: ColumnType::Bit,
            byte_length: 2,
            array_size: 1,
            bit_length: 12,
            ..Default::default()
        });
        let mut asm = Assembler::new().with_table_schema(&schema);
        asm.branch_attr_op_arg(BinaryCondition::Eq, 20, &[0xFF, 0xFF], 0)
            .unwrap();
        let words = asm.words();
        // 12 significant bits out of 16: the top nibble of the packed
        // word must be masked to zero.
        assert_eq!(words[2], 0x0FFF);
    }
}
