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

//! Builds interpreted-code programs for a register-based bytecode
//! interpreter: an [`assembler::Assembler`] emits instruction words into a
//! word buffer, resolves label and subroutine references against
//! metainfo recorded as it goes, and [`assembler::Assembler::finalise`]
//! patches every branch and call into a relative offset the kernel-side
//! executor can walk without ever consulting the assembler again.

pub mod assembler;
pub mod condition;
pub mod errors;
pub mod opcode;
pub mod register;
pub mod schema;

pub use assembler::Assembler;
pub use condition::{BinaryCondition, NullSemantics, UnknownHandling};
pub use errors::AssemblerError;
pub use register::Register;
pub use schema::{ColumnInfo, StorageKind, TableSchema};
