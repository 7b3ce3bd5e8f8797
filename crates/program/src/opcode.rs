//! The closed enumeration of BEAST instruction codes.
//!
//! Mirrors `include/beast/opcodes.hpp` from the original BEAST implementation, with the
//! `GetMax`/`GetMin` family assigned the sequential codes `0x49`-`0x4c` (undefined in the
//! original header, see `SPEC_FULL.md`).

/// A single BEAST instruction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum OpCode {
    NoOp = 0x00,
    DeclareVariable = 0x01,
    SetVariable = 0x02,
    UndeclareVariable = 0x03,
    AddConstantToVariable = 0x04,
    AddVariableToVariable = 0x05,
    SubtractConstantFromVariable = 0x06,
    SubtractVariableFromVariable = 0x07,
    RelativeJumpToVariableAddressIfVariableGt0 = 0x08,
    RelativeJumpToVariableAddressIfVariableLt0 = 0x09,
    RelativeJumpToVariableAddressIfVariableEq0 = 0x0a,
    AbsoluteJumpToVariableAddressIfVariableGt0 = 0x0b,
    AbsoluteJumpToVariableAddressIfVariableLt0 = 0x0c,
    AbsoluteJumpToVariableAddressIfVariableEq0 = 0x0d,
    RelativeJumpIfVariableGt0 = 0x0e,
    RelativeJumpIfVariableLt0 = 0x0f,
    RelativeJumpIfVariableEq0 = 0x10,
    AbsoluteJumpIfVariableGt0 = 0x11,
    AbsoluteJumpIfVariableLt0 = 0x12,
    AbsoluteJumpIfVariableEq0 = 0x13,
    LoadMemorySizeIntoVariable = 0x14,
    CheckIfVariableIsInput = 0x15,
    CheckIfVariableIsOutput = 0x16,
    LoadInputCountIntoVariable = 0x17,
    LoadOutputCountIntoVariable = 0x18,
    LoadCurrentAddressIntoVariable = 0x19,
    PrintVariable = 0x1a,
    SetStringTableEntry = 0x1b,
    PrintStringFromStringTable = 0x1c,
    LoadStringTableLimitIntoVariable = 0x1d,
    Terminate = 0x1e,
    CopyVariable = 0x1f,
    LoadStringItemLengthIntoVariable = 0x20,
    LoadStringItemIntoVariables = 0x21,
    PerformSystemCall = 0x22,
    BitShiftVariableLeft = 0x23,
    BitShiftVariableRight = 0x24,
    BitWiseInvertVariable = 0x25,
    BitWiseAndTwoVariables = 0x26,
    BitWiseOrTwoVariables = 0x27,
    BitWiseXorTwoVariables = 0x28,
    LoadRandomValueIntoVariable = 0x29,
    ModuloVariableByConstant = 0x2a,
    ModuloVariableByVariable = 0x2b,
    RotateVariableLeft = 0x2c,
    RotateVariableRight = 0x2d,
    UnconditionalJumpToAbsoluteAddress = 0x2e,
    UnconditionalJumpToAbsoluteVariableAddress = 0x2f,
    UnconditionalJumpToRelativeAddress = 0x30,
    UnconditionalJumpToRelativeVariableAddress = 0x31,
    CheckIfInputWasSet = 0x32,
    LoadStringTableItemLengthLimitIntoVariable = 0x33,
    PushVariableOnStack = 0x34,
    PushConstantOnStack = 0x35,
    PopVariableFromStack = 0x36,
    PopFromStack = 0x37,
    CheckIfStackIsEmpty = 0x38,
    SwapVariables = 0x39,
    SetVariableStringTableEntry = 0x3a,
    PrintVariableStringFromStringTable = 0x3b,
    LoadVariableStringItemLengthIntoVariable = 0x3c,
    LoadVariableStringItemIntoVariables = 0x3d,
    TerminateWithVariableReturnCode = 0x3e,
    VariableBitShiftVariableLeft = 0x3f,
    VariableBitShiftVariableRight = 0x40,
    VariableRotateVariableLeft = 0x41,
    VariableRotateVariableRight = 0x42,
    CompareIfVariableGtConstant = 0x43,
    CompareIfVariableLtConstant = 0x44,
    CompareIfVariableEqConstant = 0x45,
    CompareIfVariableGtVariable = 0x46,
    CompareIfVariableLtVariable = 0x47,
    CompareIfVariableEqVariable = 0x48,
    GetMaxOfVariableAndConstant = 0x49,
    GetMinOfVariableAndConstant = 0x4a,
    GetMaxOfVariableAndVariable = 0x4b,
    GetMinOfVariableAndVariable = 0x4c,
}

impl OpCode {
    /// The highest assigned opcode value.
    pub const MAX: u8 = 0x4c;
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

impl TryFrom<u8> for OpCode {
    /// The undefined opcode byte, for the caller to wrap into its own error type.
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use OpCode::*;
        Ok(match value {
            0x00 => NoOp,
            0x01 => DeclareVariable,
            0x02 => SetVariable,
            0x03 => UndeclareVariable,
            0x04 => AddConstantToVariable,
            0x05 => AddVariableToVariable,
            0x06 => SubtractConstantFromVariable,
            0x07 => SubtractVariableFromVariable,
            0x08 => RelativeJumpToVariableAddressIfVariableGt0,
            0x09 => RelativeJumpToVariableAddressIfVariableLt0,
            0x0a => RelativeJumpToVariableAddressIfVariableEq0,
            0x0b => AbsoluteJumpToVariableAddressIfVariableGt0,
            0x0c => AbsoluteJumpToVariableAddressIfVariableLt0,
            0x0d => AbsoluteJumpToVariableAddressIfVariableEq0,
            0x0e => RelativeJumpIfVariableGt0,
            0x0f => RelativeJumpIfVariableLt0,
            0x10 => RelativeJumpIfVariableEq0,
            0x11 => AbsoluteJumpIfVariableGt0,
            0x12 => AbsoluteJumpIfVariableLt0,
            0x13 => AbsoluteJumpIfVariableEq0,
            0x14 => LoadMemorySizeIntoVariable,
            0x15 => CheckIfVariableIsInput,
            0x16 => CheckIfVariableIsOutput,
            0x17 => LoadInputCountIntoVariable,
            0x18 => LoadOutputCountIntoVariable,
            0x19 => LoadCurrentAddressIntoVariable,
            0x1a => PrintVariable,
            0x1b => SetStringTableEntry,
            0x1c => PrintStringFromStringTable,
            0x1d => LoadStringTableLimitIntoVariable,
            0x1e => Terminate,
            0x1f => CopyVariable,
            0x20 => LoadStringItemLengthIntoVariable,
            0x21 => LoadStringItemIntoVariables,
            0x22 => PerformSystemCall,
            0x23 => BitShiftVariableLeft,
            0x24 => BitShiftVariableRight,
            0x25 => BitWiseInvertVariable,
            0x26 => BitWiseAndTwoVariables,
            0x27 => BitWiseOrTwoVariables,
            0x28 => BitWiseXorTwoVariables,
            0x29 => LoadRandomValueIntoVariable,
            0x2a => ModuloVariableByConstant,
            0x2b => ModuloVariableByVariable,
            0x2c => RotateVariableLeft,
            0x2d => RotateVariableRight,
            0x2e => UnconditionalJumpToAbsoluteAddress,
            0x2f => UnconditionalJumpToAbsoluteVariableAddress,
            0x30 => UnconditionalJumpToRelativeAddress,
            0x31 => UnconditionalJumpToRelativeVariableAddress,
            0x32 => CheckIfInputWasSet,
            0x33 => LoadStringTableItemLengthLimitIntoVariable,
            0x34 => PushVariableOnStack,
            0x35 => PushConstantOnStack,
            0x36 => PopVariableFromStack,
            0x37 => PopFromStack,
            0x38 => CheckIfStackIsEmpty,
            0x39 => SwapVariables,
            0x3a => SetVariableStringTableEntry,
            0x3b => PrintVariableStringFromStringTable,
            0x3c => LoadVariableStringItemLengthIntoVariable,
            0x3d => LoadVariableStringItemIntoVariables,
            0x3e => TerminateWithVariableReturnCode,
            0x3f => VariableBitShiftVariableLeft,
            0x40 => VariableBitShiftVariableRight,
            0x41 => VariableRotateVariableLeft,
            0x42 => VariableRotateVariableRight,
            0x43 => CompareIfVariableGtConstant,
            0x44 => CompareIfVariableLtConstant,
            0x45 => CompareIfVariableEqConstant,
            0x46 => CompareIfVariableGtVariable,
            0x47 => CompareIfVariableLtVariable,
            0x48 => CompareIfVariableEqVariable,
            0x49 => GetMaxOfVariableAndConstant,
            0x4a => GetMinOfVariableAndConstant,
            0x4b => GetMaxOfVariableAndVariable,
            0x4c => GetMinOfVariableAndVariable,
            other => return Err(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_defined_opcode() {
        for value in 0..=OpCode::MAX {
            let op = OpCode::try_from(value).expect("defined opcode");
            assert_eq!(u8::from(op), value);
        }
    }

    #[test]
    fn rejects_undefined_opcode() {
        assert!(OpCode::try_from(0xff).is_err());
    }
}
