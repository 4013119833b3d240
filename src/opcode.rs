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

//! The closed instruction set and the bit layout every instruction word
//! shares: opcode in bits 0..5, up to four 3-bit register fields starting
//! at bit 6, a 16-bit immediate/label/attribute-id field at bits 16..31,
//! and an "extended" flag at bit 15 whose meaning is opcode-specific (it
//! never widens the opcode itself — sixty opcodes fit six bits with room
//! to spare).

/// Bit position of the register-offset / addressing-mode flag. Only a
/// handful of opcodes read it; for the rest the bit must be zero.
pub const EXTENDED_BIT: u32 = 15;
pub const REG1_SHIFT: u32 = 6;
pub const REG2_SHIFT: u32 = 9;
pub const REG3_SHIFT: u32 = 12;
pub const REG4_SHIFT: u32 = 16;
pub const IMM16_SHIFT: u32 = 16;
const OPCODE_MASK: u32 = 0x3F;
const REG_MASK: u32 = 0x7;

pub fn opcode_bits(word: u32) -> u8 {
    (word & OPCODE_MASK) as u8
}

pub fn reg_at(word: u32, shift: u32) -> u8 {
    ((word >> shift) & REG_MASK) as u8
}

pub fn imm16(word: u32) -> u16 {
    (word >> IMM16_SHIFT) as u16
}

pub fn extended(word: u32) -> bool {
    (word >> EXTENDED_BIT) & 1 != 0
}

pub fn pack_reg(shift: u32, reg: u8) -> u32 {
    (reg as u32 & REG_MASK) << shift
}

pub fn pack_imm16(imm: u16) -> u32 {
    (imm as u32) << IMM16_SHIFT
}

pub fn pack_extended() -> u32 {
    1 << EXTENDED_BIT
}

/// The closed set of instructions §2 requires decoders to accept exactly.
/// Numeric values are the wire contract the kernel-side executor shares
/// with every assembled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    ReadAttrIntoReg = 1,
    WriteAttrFromReg = 2,
    LoadConstNull = 3,
    LoadConst16 = 4,
    LoadConst32 = 5,
    LoadConst64 = 6,
    AddRegReg = 7,
    SubRegReg = 8,
    Branch = 9,
    BranchRegEqNull = 10,
    BranchRegNeNull = 11,
    BranchEqRegReg = 12,
    BranchNeRegReg = 13,
    BranchLtRegReg = 14,
    BranchLeRegReg = 15,
    BranchGtRegReg = 16,
    BranchGeRegReg = 17,
    ExitOk = 18,
    ExitRefuse = 19,
    Call = 20,
    Return = 21,
    ExitOkLast = 22,
    BranchAttrOpArg = 23,
    BranchAttrEqNull = 24,
    BranchAttrNeNull = 25,
    BranchAttrOpParam = 26,
    BranchAttrOpAttr = 27,
    LshiftRegReg = 28,
    RshiftRegReg = 29,
    MulRegReg = 30,
    DivRegReg = 31,
    AndRegReg = 32,
    OrRegReg = 33,
    XorRegReg = 34,
    NotRegReg = 35,
    ModRegReg = 36,
    AddConstRegToReg = 37,
    SubConstRegToReg = 38,
    LshiftConstRegToReg = 39,
    RshiftConstRegToReg = 40,
    MulConstRegToReg = 41,
    DivConstRegToReg = 42,
    AndConstRegToReg = 43,
    OrConstRegToReg = 44,
    XorConstRegToReg = 45,
    ModConstRegToReg = 46,
    ReadPartialAttrToMem = 47,
    ReadAttrToMem = 48,
    ReadUint8MemToReg = 49,
    ReadUint16MemToReg = 50,
    ReadUint32MemToReg = 51,
    ReadInt64MemToReg = 52,
    WriteUint8RegToMem = 53,
    WriteUint16RegToMem = 54,
    WriteUint32RegToMem = 55,
    WriteInt64RegToMem = 56,
    WriteAttrFromMem = 57,
    AppendAttrFromMem = 58,
    /// Extended (bit 15 set) reuses this opcode as `WRITE_INTERPRETER_OUTPUT`.
    LoadConstMem = 59,
    /// Extended (bit 15 set) reuses this opcode as `WRITE_SIZE_MEM`.
    ConvertSize = 60,
}

impl Opcode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Opcode::*;
        Ok(match value {
            1 => ReadAttrIntoReg,
            2 => WriteAttrFromReg,
            3 => LoadConstNull,
            4 => LoadConst16,
            5 => LoadConst32,
            6 => LoadConst64,
            7 => AddRegReg,
            8 => SubRegReg,
            9 => Branch,
            10 => BranchRegEqNull,
            11 => BranchRegNeNull,
            12 => BranchEqRegReg,
            13 => BranchNeRegReg,
            14 => BranchLtRegReg,
            15 => BranchLeRegReg,
            16 => BranchGtRegReg,
            17 => BranchGeRegReg,
            18 => ExitOk,
            19 => ExitRefuse,
            20 => Call,
            21 => Return,
            22 => ExitOkLast,
            23 => BranchAttrOpArg,
            24 => BranchAttrEqNull,
            25 => BranchAttrNeNull,
            26 => BranchAttrOpParam,
            27 => BranchAttrOpAttr,
            28 => LshiftRegReg,
            29 => RshiftRegReg,
            30 => MulRegReg,
            31 => DivRegReg,
            32 => AndRegReg,
            33 => OrRegReg,
            34 => XorRegReg,
            35 => NotRegReg,
            36 => ModRegReg,
            37 => AddConstRegToReg,
            38 => SubConstRegToReg,
            39 => LshiftConstRegToReg,
            40 => RshiftConstRegToReg,
            41 => MulConstRegToReg,
            42 => DivConstRegToReg,
            43 => AndConstRegToReg,
            44 => OrConstRegToReg,
            45 => XorConstRegToReg,
            46 => ModConstRegToReg,
            47 => ReadPartialAttrToMem,
            48 => ReadAttrToMem,
            49 => ReadUint8MemToReg,
            50 => ReadUint16MemToReg,
            51 => ReadUint32MemToReg,
            52 => ReadInt64MemToReg,
            53 => WriteUint8RegToMem,
            54 => WriteUint16RegToMem,
            55 => WriteUint32RegToMem,
            56 => WriteInt64RegToMem,
            57 => WriteAttrFromMem,
            58 => AppendAttrFromMem,
            59 => LoadConstMem,
            60 => ConvertSize,
            _ => return Err(()),
        })
    }
}

pub fn decode_opcode(word: u32) -> Result<Opcode, ()> {
    Opcode::try_from(opcode_bits(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_defined_opcode_round_trips() {
        for raw in 1..=60u8 {
            let op = Opcode::try_from(raw).unwrap();
            assert_eq!(op.as_u8(), raw);
        }
    }

    #[test]
    fn zero_and_past_sixty_are_rejected() {
        assert!(Opcode::try_from(0).is_err());
        assert!(Opcode::try_from(61).is_err());
        assert!(Opcode::try_from(255).is_err());
    }

    #[test]
    fn field_packing_round_trips_through_a_word() {
        let word = Opcode::AddRegReg.as_u8() as u32
            | pack_reg(REG1_SHIFT, 1)
            | pack_reg(REG2_SHIFT, 2)
            | pack_reg(REG3_SHIFT, 3);
        assert_eq!(decode_opcode(word).unwrap(), Opcode::AddRegReg);
        assert_eq!(reg_at(word, REG1_SHIFT), 1);
        assert_eq!(reg_at(word, REG2_SHIFT), 2);
        assert_eq!(reg_at(word, REG3_SHIFT), 3);
        assert!(!extended(word));
    }

    #[test]
    fn extended_bit_does_not_perturb_opcode_bits() {
        let word = Opcode::ConvertSize.as_u8() as u32 | pack_extended();
        assert_eq!(decode_opcode(word).unwrap(), Opcode::ConvertSize);
        assert!(extended(word));
    }
}
