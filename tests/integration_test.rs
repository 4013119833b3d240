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

use tupleasm::opcode::{pack_imm16, pack_reg, Opcode, REG1_SHIFT};
use tupleasm::{Assembler, AssemblerError, Register};

#[test]
fn s1_load_const32_into_register_then_exit() {
    let mut asm = Assembler::new();
    asm.load_const32(Register::R3, 0x1234_5678).unwrap();
    asm.exit_ok().unwrap();
    asm.finalise().unwrap();

    assert_eq!(
        asm.words(),
        &[
            Opcode::LoadConst32.as_u8() as u32 | pack_reg(REG1_SHIFT, 3),
            0x1234_5678,
            Opcode::ExitOk.as_u8() as u32,
        ]
    );
}

#[test]
fn s2_forward_branch_resolves_to_the_distance_from_the_branch_word() {
    let mut asm = Assembler::new();
    asm.branch(0).unwrap();
    asm.exit_refuse(626).unwrap();
    asm.def_label(0).unwrap();
    asm.exit_ok().unwrap();
    asm.finalise().unwrap();

    // label 0 is defined two words after the branch word: offset = 2.
    assert_eq!(
        asm.words(),
        &[
            Opcode::Branch.as_u8() as u32 | pack_imm16(2),
            Opcode::ExitRefuse.as_u8() as u32 | pack_imm16(626),
            Opcode::ExitOk.as_u8() as u32,
        ]
    );
}

#[test]
fn s3_backward_branch_sets_the_direction_bit() {
    let mut asm = Assembler::new();
    asm.def_label(0).unwrap();
    asm.load_const16(Register::R0, 1).unwrap();
    asm.branch(0).unwrap();
    asm.exit_ok().unwrap();
    asm.finalise().unwrap();

    let words = asm.words();
    assert_eq!(words[0], Opcode::LoadConst16.as_u8() as u32 | pack_imm16(1));
    assert_eq!(
        words[1],
        Opcode::Branch.as_u8() as u32 | (1u32 << 31) | pack_imm16(1)
    );
    assert_eq!(words[2], Opcode::ExitOk.as_u8() as u32);
}

#[test]
fn s4_call_resolves_to_the_subroutine_offset_within_its_section() {
    let mut asm = Assembler::new();
    asm.call_sub(0).unwrap();
    asm.exit_ok().unwrap();
    asm.def_sub(0).unwrap();
    asm.ret_sub().unwrap();
    asm.finalise().unwrap();

    assert_eq!(
        asm.words(),
        &[
            Opcode::Call.as_u8() as u32,
            Opcode::ExitOk.as_u8() as u32,
            Opcode::Return.as_u8() as u32,
        ]
    );
}

#[test]
fn s5_a_caller_owned_buffer_refuses_to_grow_past_its_capacity() {
    let mut words = [0u32; 2];
    let mut asm = Assembler::with_buffer(&mut words);
    asm.load_const32(Register::R0, 0).unwrap();
    let err = asm.exit_ok().unwrap_err();
    assert_eq!(err, AssemblerError::TooManyInstructions);
}

#[test]
fn s6_branching_to_an_undefined_label_fails_at_finalise() {
    let mut asm = Assembler::new();
    asm.branch(7).unwrap();
    asm.exit_ok().unwrap();
    let err = asm.finalise().unwrap_err();
    assert_eq!(err, AssemblerError::LabelNotFound { label: 7 });
}

#[test]
fn s7_branch_attr_op_arg_carries_a_zero_extended_literal() {
    let schema = tupleasm::schema::test_support::MapSchema::new().with_column(
        tupleasm::schema::ColumnInfo {
            attribute_id: 17,
            byte_length: 4,
            array_size: 1,
            storage: tupleasm::schema::StorageKind::MainMemory,
            ..Default::default()
        },
    );
    let mut asm = Assembler::new().with_table_schema(&schema);
    asm.branch_attr_op_arg(
        tupleasm::condition::BinaryCondition::Le,
        17,
        &[0x41, 0x42, 0x43],
        0,
    )
    .unwrap();
    asm.exit_refuse(999).unwrap();
    asm.def_label(0).unwrap();
    asm.exit_ok().unwrap();
    asm.finalise().unwrap();

    let words = asm.words();
    assert_eq!(words.len(), 5);
    assert_eq!(words[1] & 0xFFFF, 17);
    assert_eq!(words[1] >> 16, 3);
    assert_eq!(words[2], u32::from_le_bytes([0x41, 0x42, 0x43, 0]));
    // label 0 lands at word index 4; the branch's own word is at index 0.
    assert_eq!(words[0] >> 16, 4);
    assert_eq!(words[3], Opcode::ExitRefuse.as_u8() as u32 | pack_imm16(999));
    assert_eq!(words[4], Opcode::ExitOk.as_u8() as u32);
}

#[test]
fn finalising_an_empty_program_produces_a_single_exit_ok() {
    let mut asm = Assembler::new();
    asm.finalise().unwrap();
    assert_eq!(asm.words(), &[Opcode::ExitOk.as_u8() as u32]);
}

#[test]
fn def_sub_without_a_preceding_call_sub_is_rejected() {
    let mut asm = Assembler::new();
    let err = asm.def_sub(0).unwrap_err();
    assert!(matches!(err, AssemblerError::BadState { .. }));
}

#[test]
fn a_program_with_no_table_schema_rejects_attribute_access() {
    let mut asm = Assembler::new();
    let err = asm.read_attr_into_reg(Register::R0, 1).unwrap_err();
    assert_eq!(err, AssemblerError::TableNotSet);
}
