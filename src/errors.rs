use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblerError {
    #[error("instruction buffer is full")]
    TooManyInstructions,

    #[error("register {register} is not one of the eight general-purpose registers")]
    BadRegister { register: u8 },

    #[error("attribute id {attribute_id} is not present in the table schema")]
    BadAttributeId { attribute_id: u16 },

    #[error("constant value does not fit the instruction that carries it")]
    BadConstant,

    #[error("label number {label} exceeds the maximum of 65535")]
    BadLabelNum { label: u32 },

    #[error("branch to label {label} exceeds the 16-bit label field")]
    BadBranchToLabel { label: u32 },

    #[error("branch to label {label} resolves to an offset that does not fit a 15-bit magnitude")]
    BadLabelBranch { label: u32 },

    #[error("label {label} was referenced but never defined")]
    LabelNotFound { label: u32 },

    #[error("subroutine number {sub} exceeds the maximum of 65535")]
    BadSubNumber { sub: u32 },

    #[error("subroutine {sub} was called but never defined")]
    SubroutineNotFound { sub: u32 },

    #[error("subroutine {sub} resolves to an offset that does not fit the patch field")]
    BadSubroutineOffset { sub: u32 },

    #[error("operation is not valid in the current assembler state: {reason}")]
    BadState { reason: String },

    #[error("operation requires a table schema, but none was configured")]
    TableNotSet,

    #[error("attribute {lhs} and attribute {rhs} are not bindable against each other")]
    ColumnsNotBindable { lhs: u16, rhs: u16 },

    #[error("literal length {len} is invalid for this instruction")]
    BadLength { len: usize },
}

impl AssemblerError {
    /// Stable numeric identity for this error, independent of the
    /// `Display` text. Analogous to the source executor's plain `int`
    /// error codes, kept here so callers across a wire boundary can match
    /// on a number rather than a formatted string.
    pub fn code(&self) -> u32 {
        match self {
            AssemblerError::TooManyInstructions => 1,
            AssemblerError::BadRegister { .. } => 2,
            AssemblerError::BadAttributeId { .. } => 3,
            AssemblerError::BadConstant => 4,
            AssemblerError::BadLabelNum { .. } => 5,
            AssemblerError::BadBranchToLabel { .. } => 6,
            AssemblerError::BadLabelBranch { .. } => 7,
            AssemblerError::LabelNotFound { .. } => 8,
            AssemblerError::BadSubNumber { .. } => 9,
            AssemblerError::SubroutineNotFound { .. } => 10,
            AssemblerError::BadSubroutineOffset { .. } => 11,
            AssemblerError::BadState { .. } => 12,
            AssemblerError::TableNotSet => 13,
            AssemblerError::ColumnsNotBindable { .. } => 14,
            AssemblerError::BadLength { .. } => 15,
        }
    }
}
