//! Binary and symbolic representations of 900-series instructions.
//!
//! An instruction occupies one 18-bit word.  The bits look like this
//! (least significant bit on the right, bits numbered 1 to 18 as the
//! Elliott manuals number them):
//!
//! |B-modify|Function|Operand (address) field|
//! |--------|--------|-----------------------|
//! | 1 bit  | 4 bits |       13 bits         |
//! |  (18)  |(14-17) |        (1-13)         |
//!
//! In the usual written form a B-modified instruction carries a
//! leading `/`, so `/4 100` loads A from location 100 plus the
//! contents of the B register.
//!
//! Function 14 (shift) and function 15 (input/output) do not address
//! the store; instead the low 13 bits of the effective address select
//! the operation.  [`Operation::decode`] turns the function and the
//! effective address into a single value for the control unit to
//! dispatch on.

use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

#[cfg(test)]
use test_strategy::{proptest, Arbitrary};

use super::types::Address;
use super::word::Word;

const B_MODIFY_BIT: u32 = 1 << 17;
const FUNCTION_SHIFT: u32 = 13;
const FUNCTION_MASK: u32 = 0o17;

/// Describes why an instruction could not be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeFailure {
    /// Function numbers are four bits wide.
    InvalidFunction(u8),
    /// A function 14 instruction whose shift count is in the
    /// unassigned range 2048..=6143.
    UnsupportedShift(u16),
    /// A function 15 instruction naming no known device operation.
    UnsupportedIo(u16),
}

impl Display for DecodeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeFailure::InvalidFunction(n) => write!(f, "there is no function {n}"),
            DecodeFailure::UnsupportedShift(n) => {
                write!(f, "Unsupported 14 {n} shift instruction")
            }
            DecodeFailure::UnsupportedIo(n) => write!(f, "Unsupported 15 {n} i/o instruction"),
        }
    }
}

impl Error for DecodeFailure {}

/// The sixteen function codes.
#[repr(u8)]
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Function {
    LoadB = 0,
    Add = 1,
    NegateAdd = 2,
    StoreQ = 3,
    LoadA = 4,
    StoreA = 5,
    Collate = 6,
    JumpIfZero = 7,
    Jump = 8,
    JumpIfNegative = 9,
    Increment = 10,
    StoreS = 11,
    Multiply = 12,
    Divide = 13,
    Shift = 14,
    InputOutput = 15,
}

impl Function {
    pub const COUNT: usize = 16;

    pub const ALL: [Function; Function::COUNT] = [
        Function::LoadB,
        Function::Add,
        Function::NegateAdd,
        Function::StoreQ,
        Function::LoadA,
        Function::StoreA,
        Function::Collate,
        Function::JumpIfZero,
        Function::Jump,
        Function::JumpIfNegative,
        Function::Increment,
        Function::StoreS,
        Function::Multiply,
        Function::Divide,
        Function::Shift,
        Function::InputOutput,
    ];

    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Functions 10 and above take two digits when written out.
    pub const fn is_two_digit(self) -> bool {
        self.number() > 9
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::LoadB => "load B",
            Function::Add => "add",
            Function::NegateAdd => "negate and add",
            Function::StoreQ => "store Q",
            Function::LoadA => "load A",
            Function::StoreA => "store A",
            Function::Collate => "collate",
            Function::JumpIfZero => "jump if zero",
            Function::Jump => "jump",
            Function::JumpIfNegative => "jump if negative",
            Function::Increment => "increment in store",
            Function::StoreS => "store S",
            Function::Multiply => "multiply",
            Function::Divide => "divide",
            Function::Shift => "shift",
            Function::InputOutput => "input/output",
        }
    }
}

impl TryFrom<u8> for Function {
    type Error = DecodeFailure;
    fn try_from(n: u8) -> Result<Function, DecodeFailure> {
        Function::ALL
            .get(usize::from(n))
            .copied()
            .ok_or(DecodeFailure::InvalidFunction(n))
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        Display::fmt(&self.number(), f)
    }
}

/// A decoded function 14 instruction.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ShiftOperation {
    /// Operand 0..=2047 shifts A:Q left by that many places.
    Left(u16),
    /// Operand 6144..=8191 shifts A:Q right (arithmetically) by 8192
    /// minus the operand.
    Right(u16),
}

impl ShiftOperation {
    /// Shifts longer than this leave nothing of the original A:Q.
    pub const MAX_PLACES: u16 = 36;

    const LEFT_LIMIT: u16 = 2047;
    const RIGHT_START: u16 = 6144;

    /// The number of places requested by the instruction.
    pub const fn places(self) -> u16 {
        match self {
            ShiftOperation::Left(n) | ShiftOperation::Right(n) => n,
        }
    }

    /// The number of places actually shifted.
    pub const fn effective_places(self) -> u16 {
        let n = self.places();
        if n > Self::MAX_PLACES {
            Self::MAX_PLACES
        } else {
            n
        }
    }
}

impl TryFrom<u16> for ShiftOperation {
    type Error = DecodeFailure;
    fn try_from(operand: u16) -> Result<ShiftOperation, DecodeFailure> {
        let operand = operand & Address::OFFSET_MASK;
        if operand <= Self::LEFT_LIMIT {
            Ok(ShiftOperation::Left(operand))
        } else if operand >= Self::RIGHT_START {
            Ok(ShiftOperation::Right(Address::MODULE_SIZE - operand))
        } else {
            Err(DecodeFailure::UnsupportedShift(operand))
        }
    }
}

/// A decoded function 15 instruction.
#[repr(u16)]
#[cfg_attr(test, derive(Arbitrary))]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum IoOperation {
    ReadTape = 2048,
    ReadTeletype = 2052,
    MovePlotter = 4864,
    PunchTape = 6144,
    WriteTeletype = 6148,
    LevelTerminate = 7168,
}

impl IoOperation {
    pub const fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for IoOperation {
    type Error = DecodeFailure;
    fn try_from(operand: u16) -> Result<IoOperation, DecodeFailure> {
        use IoOperation::*;
        match operand & Address::OFFSET_MASK {
            2048 => Ok(ReadTape),
            2052 => Ok(ReadTeletype),
            4864 => Ok(MovePlotter),
            6144 => Ok(PunchTape),
            6148 => Ok(WriteTeletype),
            7168 => Ok(LevelTerminate),
            other => Err(DecodeFailure::UnsupportedIo(other)),
        }
    }
}

/// What an instruction does, once its effective address is known.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operation {
    LoadB,
    Add,
    NegateAdd,
    StoreQ,
    LoadA,
    StoreA,
    Collate,
    JumpIfZero,
    Jump,
    JumpIfNegative,
    Increment,
    StoreS,
    Multiply,
    Divide,
    Shift(ShiftOperation),
    Io(IoOperation),
}

impl Operation {
    /// Decodes an instruction with function `function` and effective
    /// address `m`.  Only functions 14 and 15 can fail.
    pub fn decode(function: Function, m: Address) -> Result<Operation, DecodeFailure> {
        Ok(match function {
            Function::LoadB => Operation::LoadB,
            Function::Add => Operation::Add,
            Function::NegateAdd => Operation::NegateAdd,
            Function::StoreQ => Operation::StoreQ,
            Function::LoadA => Operation::LoadA,
            Function::StoreA => Operation::StoreA,
            Function::Collate => Operation::Collate,
            Function::JumpIfZero => Operation::JumpIfZero,
            Function::Jump => Operation::Jump,
            Function::JumpIfNegative => Operation::JumpIfNegative,
            Function::Increment => Operation::Increment,
            Function::StoreS => Operation::StoreS,
            Function::Multiply => Operation::Multiply,
            Function::Divide => Operation::Divide,
            Function::Shift => Operation::Shift(ShiftOperation::try_from(m.offset())?),
            Function::InputOutput => Operation::Io(IoOperation::try_from(m.offset())?),
        })
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Instruction(Word);

impl Instruction {
    /// Assembles an instruction.  Bits of `operand` above the 13-bit
    /// field are discarded.
    pub const fn new(b_modified: bool, function: Function, operand: u16) -> Instruction {
        let b = if b_modified { B_MODIFY_BIT } else { 0 };
        Instruction(Word::truncate(
            b | ((function as u32) << FUNCTION_SHIFT)
                | (operand as u32 & Address::OFFSET_MASK as u32),
        ))
    }

    pub const fn bits(&self) -> Word {
        self.0
    }

    pub const fn is_b_modified(&self) -> bool {
        self.0.bits() & B_MODIFY_BIT != 0
    }

    pub const fn function_number(&self) -> u8 {
        ((self.0.bits() >> FUNCTION_SHIFT) & FUNCTION_MASK) as u8
    }

    pub fn function(&self) -> Function {
        // Four bits always name a function.
        Function::ALL[usize::from(self.function_number())]
    }

    /// The 13-bit operand field.
    pub const fn operand(&self) -> u16 {
        (self.0.bits() & Address::OFFSET_MASK as u32) as u16
    }
}

impl From<Word> for Instruction {
    fn from(w: Word) -> Instruction {
        Instruction(w)
    }
}

impl From<Instruction> for Word {
    fn from(inst: Instruction) -> Word {
        inst.0
    }
}

/// Writes the instruction in the conventional `/f a` form.
impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        if self.is_b_modified() {
            f.write_str("/")?;
        }
        write!(f, "{} {}", self.function_number(), self.operand())
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Instruction({self}, bits={:?})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_layout() {
        let inst = Instruction::new(true, Function::Jump, 8177);
        assert_eq!(inst.bits().bits(), (1 << 17) | (8 << 13) | 8177);
        assert!(inst.is_b_modified());
        assert_eq!(inst.function(), Function::Jump);
        assert_eq!(inst.operand(), 8177);
        assert_eq!(inst.to_string(), "/8 8177");
    }

    #[test]
    fn test_operand_is_truncated() {
        let inst = Instruction::new(false, Function::LoadA, 8192 + 3);
        assert_eq!(inst.operand(), 3);
        assert_eq!(inst.function(), Function::LoadA);
        assert!(!inst.is_b_modified());
    }

    #[test]
    fn test_bootstrap_word_decodes() {
        // Four 7-bit tape characters 8, 4, 63, 113 assemble into this.
        let inst = Instruction::from(Word::truncate(73713));
        assert_eq!(inst.to_string(), "8 8177");
    }

    #[test]
    fn test_function_numbers() {
        for (n, f) in Function::ALL.iter().enumerate() {
            assert_eq!(usize::from(f.number()), n);
            assert_eq!(Function::try_from(f.number()), Ok(*f));
        }
        assert_eq!(
            Function::try_from(16),
            Err(DecodeFailure::InvalidFunction(16))
        );
    }

    #[test]
    fn test_function_names() {
        assert_eq!(Function::JumpIfZero.name(), "jump if zero");
        assert_eq!(Function::StoreS.name(), "store S");
        let mut names: Vec<&str> = Function::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Function::ALL.len());
    }

    #[test]
    fn test_shift_decoding() {
        assert_eq!(ShiftOperation::try_from(0), Ok(ShiftOperation::Left(0)));
        assert_eq!(
            ShiftOperation::try_from(2047),
            Ok(ShiftOperation::Left(2047))
        );
        assert_eq!(ShiftOperation::try_from(8191), Ok(ShiftOperation::Right(1)));
        assert_eq!(
            ShiftOperation::try_from(6144),
            Ok(ShiftOperation::Right(2048))
        );
        assert_eq!(
            ShiftOperation::try_from(2048),
            Err(DecodeFailure::UnsupportedShift(2048))
        );
        assert_eq!(
            ShiftOperation::try_from(6143),
            Err(DecodeFailure::UnsupportedShift(6143))
        );
        assert_eq!(ShiftOperation::Left(40).effective_places(), 36);
        assert_eq!(ShiftOperation::Right(3).effective_places(), 3);
    }

    #[test]
    fn test_io_decoding() {
        assert_eq!(IoOperation::try_from(2048), Ok(IoOperation::ReadTape));
        assert_eq!(IoOperation::try_from(7168), Ok(IoOperation::LevelTerminate));
        assert_eq!(
            IoOperation::try_from(2049),
            Err(DecodeFailure::UnsupportedIo(2049))
        );
    }

    #[test]
    fn test_decode_uses_offset_of_effective_address() {
        // Module bits play no part in selecting the operation.
        assert_eq!(
            Operation::decode(Function::InputOutput, Address::new(8192 + 6148)),
            Ok(Operation::Io(IoOperation::WriteTeletype))
        );
        assert_eq!(
            Operation::decode(Function::Add, Address::new(16000)),
            Ok(Operation::Add)
        );
    }

    #[proptest]
    fn io_code_round_trip(op: IoOperation) {
        assert_eq!(IoOperation::try_from(op.code()), Ok(op));
    }

    #[proptest]
    fn fields_round_trip(
        b_modified: bool,
        function: Function,
        #[strategy(0u16..8192)] operand: u16,
    ) {
        let inst = Instruction::new(b_modified, function, operand);
        assert_eq!(inst.is_b_modified(), b_modified);
        assert_eq!(inst.function(), function);
        assert_eq!(inst.operand(), operand);
    }
}
