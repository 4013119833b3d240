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

/// Binary comparison used by the attribute-branch family. Numeric values
/// are part of the wire contract, reused from the kernel executor this
/// bytecode targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryCondition {
    Eq = 0,
    Ne = 1,
    Lt = 2,
    Le = 3,
    Gt = 4,
    Ge = 5,
    Like = 6,
    NotLike = 7,
    AndEqMask = 8,
    AndNeMask = 9,
    AndEqZero = 10,
    AndNeZero = 11,
}

impl BinaryCondition {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for BinaryCondition {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use BinaryCondition::*;
        Ok(match value {
            0 => Eq,
            1 => Ne,
            2 => Lt,
            3 => Le,
            4 => Gt,
            5 => Ge,
            6 => Like,
            7 => NotLike,
            8 => AndEqMask,
            9 => AndNeMask,
            10 => AndEqZero,
            11 => AndNeZero,
            _ => return Err(()),
        })
    }
}

/// How a BRANCH_ATTR_* comparison treats a NULL operand, packed into bits
/// 6..7 of the instruction's first word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullSemantics {
    CmpEqual = 0x0,
    BreakOutIfNull = 0x2,
    ContinueIfNull = 0x3,
}

impl NullSemantics {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The per-program policy an `Assembler` is configured with, which decides
/// which `NullSemantics` each emitted BRANCH_ATTR_* carries. Kept as a
/// separate type from `NullSemantics` because "no unknowns expected" is a
/// caller-level assertion, not a wire-level encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownHandling {
    /// The caller asserts no compared attribute is ever NULL; comparisons
    /// against NULL are encoded as `NULL_CMP_EQUAL`.
    CmpHasNoUnknowns,
    /// A NULL operand should break out of the interpreted program.
    BranchIfUnknown,
    /// A NULL operand should fall through to the next instruction.
    ContinueIfUnknown,
}

impl Default for UnknownHandling {
    fn default() -> Self {
        UnknownHandling::CmpHasNoUnknowns
    }
}

impl From<UnknownHandling> for NullSemantics {
    fn from(value: UnknownHandling) -> Self {
        match value {
            UnknownHandling::CmpHasNoUnknowns => NullSemantics::CmpEqual,
            UnknownHandling::BranchIfUnknown => NullSemantics::BreakOutIfNull,
            UnknownHandling::ContinueIfUnknown => NullSemantics::ContinueIfNull,
        }
    }
}
