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

use crate::errors::AssemblerError;

/// One of the eight general-purpose registers the interpreter operand set
/// addresses. Wraps a validated `0..8` value rather than an eight-variant
/// enum, since registers here arrive as runtime operands of encoder calls,
/// not as tokens out of a parsed operand list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(u8);

/// Registers are numbered 0 through 7; nothing wider fits the 3-bit field
/// each instruction word reserves for a register operand.
pub const MAX_REGISTER: u8 = 8;

impl Register {
    pub const R0: Register = Register(0);
    pub const R1: Register = Register(1);
    pub const R2: Register = Register(2);
    pub const R3: Register = Register(3);
    pub const R4: Register = Register(4);
    pub const R5: Register = Register(5);
    pub const R6: Register = Register(6);
    pub const R7: Register = Register(7);

    pub fn new(index: u8) -> Result<Register, AssemblerError> {
        if index < MAX_REGISTER {
            Ok(Register(index))
        } else {
            Err(AssemblerError::BadRegister { register: index })
        }
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Register {
    type Error = AssemblerError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Register::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_through_seven() {
        for i in 0..MAX_REGISTER {
            assert_eq!(Register::new(i).unwrap().index(), i);
        }
    }

    #[test]
    fn rejects_eight_and_above() {
        let err = Register::new(8).unwrap_err();
        assert_eq!(err, AssemblerError::BadRegister { register: 8 });
    }
}
