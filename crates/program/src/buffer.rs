//! The growable/fixed byte buffer that backs an assembled BEAST program.

use crate::error::{ProgramError, ProgramResult};
use crate::opcode::OpCode;

/// The declared type of a BEAST variable.
///
/// `Int32` stores a plain 32-bit signed value; `Link` stores the index of another
/// variable and is resolved through [`VmSession::resolve`](../beast_vm/struct.VmSession.html#method.resolve)
/// when the "follow links" flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VariableType {
    Int32 = 0x00,
    Link = 0x01,
}

impl TryFrom<u8> for VariableType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(VariableType::Int32),
            0x01 => Ok(VariableType::Link),
            other => Err(other),
        }
    }
}

impl From<VariableType> for u8 {
    fn from(value: VariableType) -> Self {
        value as u8
    }
}

/// A byte-coded program buffer.
///
/// A `Program` is append-only: bytes are written at the current cursor (always the end of
/// the buffer) via [`append1`](Program::append1)/[`append2`](Program::append2)/
/// [`append4`](Program::append4)/[`append_flag`](Program::append_flag)/
/// [`append_opcode`](Program::append_opcode), and read back at an arbitrary offset via
/// [`read1`](Program::read1)/[`read2`](Program::read2)/[`read4`](Program::read4). All
/// multi-byte values are little-endian two's-complement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    data: Vec<u8>,
    fixed_capacity: Option<usize>,
}

impl Program {
    /// Creates a new program with a fixed byte capacity. Appends that would exceed it fail.
    pub fn new_fixed(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            fixed_capacity: Some(capacity),
        }
    }

    /// Creates a new program whose capacity expands on demand.
    pub fn new_growing() -> Self {
        Self {
            data: Vec::new(),
            fixed_capacity: None,
        }
    }

    /// Creates a growing program pre-seeded with existing bytes (e.g. a candidate drawn
    /// from a pipe slot).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            data: bytes,
            fixed_capacity: None,
        }
    }

    /// The number of bytes currently stored.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The current append cursor. Equal to [`size`](Program::size), since the buffer is
    /// append-only; callers use this to remember a target for a later absolute jump.
    pub fn pointer(&self) -> usize {
        self.data.len()
    }

    /// The fixed capacity, or `None` if this program grows on demand.
    pub fn capacity(&self) -> Option<usize> {
        self.fixed_capacity
    }

    /// A read-only view of the stored bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the program, returning its raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn ensure_fits(&self, additional: usize) -> ProgramResult<()> {
        if let Some(capacity) = self.fixed_capacity {
            if self.data.len() + additional > capacity {
                return Err(ProgramError::CapacityExceeded {
                    cursor: self.data.len(),
                    requested: additional,
                    capacity,
                });
            }
        }
        Ok(())
    }

    /// Appends a single byte.
    pub fn append1(&mut self, value: u8) -> ProgramResult<()> {
        self.ensure_fits(1)?;
        self.data.push(value);
        Ok(())
    }

    /// Appends a little-endian `i16`.
    pub fn append2(&mut self, value: i16) -> ProgramResult<()> {
        self.ensure_fits(2)?;
        self.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Appends a little-endian `i32`.
    pub fn append4(&mut self, value: i32) -> ProgramResult<()> {
        self.ensure_fits(4)?;
        self.data.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Appends a boolean flag byte (`0x01` for `true`, `0x00` for `false`).
    pub fn append_flag(&mut self, flag: bool) -> ProgramResult<()> {
        self.append1(if flag { 0x01 } else { 0x00 })
    }

    /// Appends an opcode byte.
    pub fn append_opcode(&mut self, opcode: OpCode) -> ProgramResult<()> {
        self.append1(opcode.into())
    }

    /// Appends a length-prefixed string: an `i16` length followed by its raw bytes.
    ///
    /// Fails with [`ProgramError::InvalidArgument`] if the string is longer than `i16::MAX`.
    pub fn append_string(&mut self, content: &[u8]) -> ProgramResult<()> {
        if content.len() > i16::MAX as usize {
            return Err(ProgramError::InvalidArgument {
                reason: format!(
                    "string of {} bytes exceeds the maximum encodable length of {}",
                    content.len(),
                    i16::MAX
                ),
            });
        }
        self.append2(content.len() as i16)?;
        self.ensure_fits(content.len())?;
        self.data.extend_from_slice(content);
        Ok(())
    }

    /// Appends another program's full byte content verbatim at the current cursor.
    pub fn insert_program(&mut self, other: &Program) -> ProgramResult<()> {
        self.ensure_fits(other.data.len())?;
        self.data.extend_from_slice(&other.data);
        Ok(())
    }

    fn require_range(&self, offset: usize, len: usize) -> ProgramResult<()> {
        if offset.checked_add(len).map_or(true, |end| end > self.data.len()) {
            return Err(ProgramError::Underflow {
                offset,
                requested: len,
                size: self.data.len(),
            });
        }
        Ok(())
    }

    /// Reads a single signed byte at `offset`.
    pub fn read1(&self, offset: usize) -> ProgramResult<i8> {
        self.require_range(offset, 1)?;
        Ok(self.data[offset] as i8)
    }

    /// Reads a little-endian `i16` at `offset`.
    pub fn read2(&self, offset: usize) -> ProgramResult<i16> {
        self.require_range(offset, 2)?;
        let bytes: [u8; 2] = self.data[offset..offset + 2].try_into().expect("range checked above");
        Ok(i16::from_le_bytes(bytes))
    }

    /// Reads a little-endian `i32` at `offset`.
    pub fn read4(&self, offset: usize) -> ProgramResult<i32> {
        self.require_range(offset, 4)?;
        let bytes: [u8; 4] = self.data[offset..offset + 4].try_into().expect("range checked above");
        Ok(i32::from_le_bytes(bytes))
    }

    /// Reads `len` raw bytes starting at `offset`.
    pub fn read_bytes(&self, offset: usize, len: usize) -> ProgramResult<&[u8]> {
        self.require_range(offset, len)?;
        Ok(&self.data[offset..offset + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fixed_program_rejects_overflowing_append() {
        let mut program = Program::new_fixed(2);
        program.append1(1).unwrap();
        let before = program.as_bytes().to_vec();
        let err = program.append2(42).unwrap_err();
        assert!(matches!(err, ProgramError::CapacityExceeded { .. }));
        assert_eq!(program.as_bytes(), before, "bytes must be unchanged on failed append");
    }

    #[test]
    fn growing_program_expands() {
        let mut program = Program::new_growing();
        for i in 0..1000 {
            program.append4(i).unwrap();
        }
        assert_eq!(program.size(), 4000);
    }

    #[test]
    fn read_past_end_is_underflow() {
        let mut program = Program::new_growing();
        program.append1(1).unwrap();
        assert!(matches!(program.read4(0), Err(ProgramError::Underflow { .. })));
    }

    #[test]
    fn little_endian_round_trip() {
        let mut program = Program::new_growing();
        program.append4(-44).unwrap();
        assert_eq!(program.read4(0).unwrap(), -44);
    }

    #[test]
    fn string_too_long_is_rejected() {
        let mut program = Program::new_growing();
        let huge = vec![0u8; i16::MAX as usize + 1];
        assert!(matches!(
            program.append_string(&huge),
            Err(ProgramError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn insert_program_appends_verbatim() {
        let mut inner = Program::new_growing();
        inner.append1(0xab).unwrap();
        inner.append4(7).unwrap();

        let mut outer = Program::new_growing();
        outer.append1(0x01).unwrap();
        outer.insert_program(&inner).unwrap();

        assert_eq!(outer.as_bytes(), [0x01, 0xab, 7, 0, 0, 0]);
    }

    #[test]
    fn pointer_tracks_size() {
        let mut program = Program::new_growing();
        assert_eq!(program.pointer(), 0);
        program.append4(1).unwrap();
        assert_eq!(program.pointer(), 4);
    }

    proptest! {
        #[test]
        fn append4_read4_round_trips_every_i32(value: i32) {
            let mut program = Program::new_growing();
            program.append4(value).unwrap();
            prop_assert_eq!(program.read4(0).unwrap(), value);
        }

        #[test]
        fn append_string_read_bytes_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut program = Program::new_growing();
            program.append_string(&bytes).unwrap();
            let len = program.read2(0).unwrap() as u16 as usize;
            prop_assert_eq!(len, bytes.len());
            prop_assert_eq!(program.read_bytes(2, len).unwrap(), bytes);
        }

        #[test]
        fn insert_program_preserves_total_byte_count(a in proptest::collection::vec(any::<u8>(), 0..64), b in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut inner = Program::from_bytes(b.clone());
            let mut outer = Program::from_bytes(a.clone());
            outer.insert_program(&inner).unwrap();
            prop_assert_eq!(outer.size(), a.len() + b.len());
            inner.append1(0).unwrap();
            prop_assert_eq!(inner.size(), b.len() + 1);
        }
    }
}
