//! # ALU Instructions and Barrel Shifter
//!
//! The 16 data processing operations (bits 24-21 of the instruction) and the
//! barrel shifter that feeds their second operand.
//!
//! ```text
//! 31-28  27-26  25   24-21   20   19-16  15-12  11-0
//! [Cond] [ 00 ] [I] [OpCode] [S] [ Rn ] [ Rd ] [Operand2]
//! ```
//!
//! Operations split into two families, and the split decides where the carry
//! flag comes from when S is set:
//! - **Logical** (AND, EOR, TST, TEQ, ORR, MOV, BIC, MVN): carry is the
//!   barrel shifter's carry-out.
//! - **Arithmetic** (SUB, RSB, ADD, ADC, SBC, RSC, CMP, CMN): carry comes
//!   from the add/subtract itself.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::flags::ShiftKind;

/// The 16 data processing opcodes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ArmModeAluInstruction {
    /// Logical AND: `Rd = Rn AND Op2`
    And = 0x0,
    /// Exclusive OR: `Rd = Rn XOR Op2`
    Eor = 0x1,
    /// Subtract: `Rd = Rn - Op2`
    Sub = 0x2,
    /// Reverse Subtract: `Rd = Op2 - Rn`
    Rsb = 0x3,
    /// Add: `Rd = Rn + Op2`
    Add = 0x4,
    /// Add with Carry: `Rd = Rn + Op2 + C`
    Adc = 0x5,
    /// Subtract with Carry: `Rd = Rn - Op2 - !C`
    Sbc = 0x6,
    /// Reverse Subtract with Carry: `Rd = Op2 - Rn - !C`
    Rsc = 0x7,
    /// Test bits (AND, flags only, no result written)
    Tst = 0x8,
    /// Test Equivalence (XOR, flags only, no result written)
    Teq = 0x9,
    /// Compare (SUB, flags only, no result written)
    Cmp = 0xA,
    /// Compare Negative (ADD, flags only, no result written)
    Cmn = 0xB,
    /// Logical OR: `Rd = Rn OR Op2`
    Orr = 0xC,
    /// Move: `Rd = Op2` (Rn is ignored)
    Mov = 0xD,
    /// Bit Clear: `Rd = Rn AND NOT Op2`
    Bic = 0xE,
    /// Move Not: `Rd = NOT Op2` (Rn is ignored)
    Mvn = 0xF,
}

impl std::fmt::Display for ArmModeAluInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("AND"),
            Self::Eor => f.write_str("EOR"),
            Self::Sub => f.write_str("SUB"),
            Self::Rsb => f.write_str("RSB"),
            Self::Add => f.write_str("ADD"),
            Self::Adc => f.write_str("ADC"),
            Self::Sbc => f.write_str("SBC"),
            Self::Rsc => f.write_str("RSC"),
            Self::Tst => f.write_str("TST"),
            Self::Teq => f.write_str("TEQ"),
            Self::Cmp => f.write_str("CMP"),
            Self::Cmn => f.write_str("CMN"),
            Self::Orr => f.write_str("ORR"),
            Self::Mov => f.write_str("MOV"),
            Self::Bic => f.write_str("BIC"),
            Self::Mvn => f.write_str("MVN"),
        }
    }
}

impl From<u32> for ArmModeAluInstruction {
    fn from(alu_op_code: u32) -> Self {
        match alu_op_code {
            0x0 => Self::And,
            0x1 => Self::Eor,
            0x2 => Self::Sub,
            0x3 => Self::Rsb,
            0x4 => Self::Add,
            0x5 => Self::Adc,
            0x6 => Self::Sbc,
            0x7 => Self::Rsc,
            0x8 => Self::Tst,
            0x9 => Self::Teq,
            0xA => Self::Cmp,
            0xB => Self::Cmn,
            0xC => Self::Orr,
            0xD => Self::Mov,
            0xE => Self::Bic,
            0xF => Self::Mvn,
            _ => unreachable!(),
        }
    }
}

/// Classification of ALU instructions for carry handling.
#[derive(Eq, PartialEq, Debug)]
pub enum AluInstructionKind {
    Logical,
    Arithmetic,
}

/// Trait to classify ALU instructions as logical or arithmetic.
pub trait Kind {
    fn kind(&self) -> AluInstructionKind;
}

impl Kind for ArmModeAluInstruction {
    fn kind(&self) -> AluInstructionKind {
        use ArmModeAluInstruction::*;
        match &self {
            And | Eor | Tst | Teq | Orr | Mov | Bic | Mvn => AluInstructionKind::Logical,
            Sub | Rsb | Add | Adc | Sbc | Rsc | Cmp | Cmn => AluInstructionKind::Arithmetic,
        }
    }
}

/// Result of an ALU or shift operation, including the flags it produced.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Default)]
pub struct ArithmeticOpResult {
    /// The computed result value.
    pub result: u32,
    /// Carry flag (C): last bit shifted out, or unsigned carry / no-borrow.
    pub carry: bool,
    /// Overflow flag (V): signed arithmetic overflow.
    pub overflow: bool,
    /// Sign flag (N): bit 31 of result.
    pub sign: bool,
    /// Zero flag (Z): result is zero.
    pub zero: bool,
}

/// Performs a barrel shifter operation.
///
/// `shift_amount` is either the 5-bit immediate from the instruction or the
/// bottom byte of a register. The immediate encoding overloads amount 0:
/// `LSR #0`/`ASR #0` mean a shift by 32 and `ROR #0` means RRX. A
/// register-sourced amount of 0 never reaches this function (the operand
/// evaluation returns the value unshifted with carry untouched).
///
/// Returns the shifted value and the shifter carry-out; `overflow`, `sign`
/// and `zero` are left at their defaults.
pub fn shift(kind: ShiftKind, shift_amount: u32, rm: u32, carry: bool) -> ArithmeticOpResult {
    match kind {
        ShiftKind::Lsl => match shift_amount {
            // LSL#0: no shift performed, the C flag is NOT affected.
            0 => ArithmeticOpResult {
                result: rm,
                carry,
                ..Default::default()
            },
            // LSL#1..32: the carry-out is the last bit shifted past the top.
            1..=32 => ArithmeticOpResult {
                result: if shift_amount == 32 {
                    0
                } else {
                    rm << shift_amount
                },
                carry: rm.get_bit((32 - shift_amount) as u8),
                ..Default::default()
            },
            // LSL by more than 32: everything is shifted out.
            _ => ArithmeticOpResult {
                result: 0,
                carry: false,
                ..Default::default()
            },
        },
        ShiftKind::Lsr => match shift_amount {
            // LSR#0 encodes LSR#32: zero result, carry = bit 31 of Rm.
            0 => ArithmeticOpResult {
                result: 0,
                carry: rm.get_bit(31),
                ..Default::default()
            },
            1..=32 => ArithmeticOpResult {
                result: if shift_amount == 32 {
                    0
                } else {
                    rm >> shift_amount
                },
                carry: rm.get_bit((shift_amount - 1) as u8),
                ..Default::default()
            },
            _ => ArithmeticOpResult {
                result: 0,
                carry: false,
                ..Default::default()
            },
        },
        ShiftKind::Asr => match shift_amount {
            1..=31 => ArithmeticOpResult {
                result: ((rm as i32) >> shift_amount) as u32,
                carry: rm.get_bit((shift_amount - 1) as u8),
                ..Default::default()
            },
            // ASR#0 encodes ASR#32, and any amount >= 32 behaves the same:
            // the result is the sign bit replicated through the word.
            _ => ArithmeticOpResult {
                result: ((rm as i32) >> 31) as u32,
                carry: rm.get_bit(31),
                ..Default::default()
            },
        },
        ShiftKind::Ror => {
            // ROR by n > 32 gives the same result and carry as ROR by n-32,
            // so reduce until the amount is in 1..=32.
            let mut new_shift_amount = shift_amount;

            if shift_amount > 32 {
                new_shift_amount %= 32;

                // A multiple of 32 reduces to ROR#32, not ROR#0.
                if new_shift_amount == 0 {
                    new_shift_amount = 32;
                }
            }

            match new_shift_amount {
                // ROR#0 encodes RRX: the carry is appended on the left and
                // everything moves right one place.
                0 => ArithmeticOpResult {
                    result: (rm >> 1) | ((carry as u32) << 31),
                    carry: rm.get_bit(0),
                    ..Default::default()
                },
                1..=31 => ArithmeticOpResult {
                    result: rm.rotate_right(new_shift_amount),
                    carry: rm.get_bit((new_shift_amount - 1) as u8),
                    ..Default::default()
                },
                // ROR#32 returns Rm unchanged with carry = bit 31.
                32 => ArithmeticOpResult {
                    result: rm,
                    carry: rm.get_bit(31),
                    ..Default::default()
                },
                _ => unreachable!(),
            }
        }
    }
}

/// How the shift amount of a register operand is specified.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ShiftOperator {
    /// Shift amount is an immediate value (0-31, or special encodings).
    Immediate(u32),
    /// Shift amount comes from a register (bottom 8 bits used).
    Register(u32),
}

impl std::fmt::Display for ShiftOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate(value) => write!(f, "#{value}"),
            Self::Register(register) => write!(f, "R{register}"),
        }
    }
}

/// The second operand of a data processing instruction: either a register
/// run through the barrel shifter, or an 8-bit immediate rotated right by an
/// even amount.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum AluSecondOperandInfo {
    /// Register operand with optional shift.
    Register {
        shift_op: ShiftOperator,
        shift_kind: ShiftKind,
        register: u32,
    },
    /// Immediate operand with rotation (`base` rotated right by `shift`,
    /// where `shift` is already the doubled 4-bit field).
    Immediate { base: u32, shift: u32 },
}

impl std::fmt::Display for AluSecondOperandInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Register {
                shift_op,
                shift_kind,
                register,
            } => {
                if let ShiftOperator::Immediate(0) = shift_op {
                    // Amount 0 renders by what it means, not what it encodes.
                    return match shift_kind {
                        ShiftKind::Lsl => write!(f, "R{register}"),
                        ShiftKind::Ror => write!(f, "R{register}, RRX"),
                        _ => write!(f, "R{register}, {shift_kind} #32"),
                    };
                }

                write!(f, "R{register}, {shift_kind} {shift_op}")
            }
            Self::Immediate { base, shift } => {
                write!(f, "#{}", base.rotate_right(shift))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_logical_instruction() {
        let instruction_kind = ArmModeAluInstruction::from(9).kind();

        assert_eq!(instruction_kind, AluInstructionKind::Logical);
    }

    #[test]
    fn test_arithmetic_instruction() {
        let instruction_kind = ArmModeAluInstruction::from(2).kind();

        assert_eq!(instruction_kind, AluInstructionKind::Arithmetic);
    }

    #[test]
    fn shift_lsl() {
        // LSL#0 keeps the value and the carry-in.
        let r = shift(ShiftKind::Lsl, 0, 0xF0F0_F0F0, true);
        assert_eq!(r.result, 0xF0F0_F0F0);
        assert!(r.carry);

        let r = shift(ShiftKind::Lsl, 4, 0xF000_0001, false);
        assert_eq!(r.result, 0x0000_0010);
        assert!(r.carry);

        // LSL#32: zero result, carry = bit 0.
        let r = shift(ShiftKind::Lsl, 32, 0x0000_0001, false);
        assert_eq!(r.result, 0);
        assert!(r.carry);

        // LSL beyond 32: zero result, zero carry.
        let r = shift(ShiftKind::Lsl, 33, 0xFFFF_FFFF, true);
        assert_eq!(r.result, 0);
        assert!(!r.carry);
    }

    #[test]
    fn shift_lsr() {
        let r = shift(ShiftKind::Lsr, 2, 5, false);
        assert_eq!(r.result, 1);
        assert!(!r.carry);

        let r = shift(ShiftKind::Lsr, 1, 0b11, false);
        assert_eq!(r.result, 1);
        assert!(r.carry);

        // LSR#0 encodes LSR#32.
        let r = shift(ShiftKind::Lsr, 0, 0x8000_0000, false);
        assert_eq!(r.result, 0);
        assert!(r.carry);

        let r = shift(ShiftKind::Lsr, 33, 0xFFFF_FFFF, true);
        assert_eq!(r.result, 0);
        assert!(!r.carry);
    }

    #[test]
    fn shift_asr() {
        let r = shift(ShiftKind::Asr, 4, 0x8000_0000, false);
        assert_eq!(r.result, 0xF800_0000);
        assert!(!r.carry);

        // ASR#0 encodes ASR#32: the sign fills the word.
        let r = shift(ShiftKind::Asr, 0, 0x8000_0000, false);
        assert_eq!(r.result, 0xFFFF_FFFF);
        assert!(r.carry);

        let r = shift(ShiftKind::Asr, 0, 0x7FFF_FFFF, true);
        assert_eq!(r.result, 0);
        assert!(!r.carry);
    }

    #[test]
    fn shift_ror_and_rrx() {
        let r = shift(ShiftKind::Ror, 8, 0x0000_00FF, false);
        assert_eq!(r.result, 0xFF00_0000);
        assert!(r.carry);

        // ROR#0 encodes RRX.
        let r = shift(ShiftKind::Ror, 0, 0b11, true);
        assert_eq!(r.result, 0x8000_0001);
        assert!(r.carry);

        let r = shift(ShiftKind::Ror, 0, 0b10, false);
        assert_eq!(r.result, 0b1);
        assert!(!r.carry);

        // ROR#32 keeps the value, carry = bit 31.
        let r = shift(ShiftKind::Ror, 32, 0x8000_0001, false);
        assert_eq!(r.result, 0x8000_0001);
        assert!(r.carry);

        // ROR#34 behaves as ROR#2.
        let r = shift(ShiftKind::Ror, 34, 0b110, false);
        assert_eq!(r.result, shift(ShiftKind::Ror, 2, 0b110, false).result);
    }

    #[test]
    fn shifter_is_pure() {
        let first = shift(ShiftKind::Ror, 7, 0xDEAD_BEEF, true);
        let second = shift(ShiftKind::Ror, 7, 0xDEAD_BEEF, true);

        assert_eq!(first.result, second.result);
        assert_eq!(first.carry, second.carry);
    }

    #[test]
    fn second_operand_rendering() {
        let op = AluSecondOperandInfo::Immediate { base: 3, shift: 24 };
        assert_eq!(op.to_string(), "#768");

        let op = AluSecondOperandInfo::Register {
            shift_op: ShiftOperator::Immediate(0),
            shift_kind: ShiftKind::Lsl,
            register: 2,
        };
        assert_eq!(op.to_string(), "R2");

        let op = AluSecondOperandInfo::Register {
            shift_op: ShiftOperator::Immediate(0),
            shift_kind: ShiftKind::Ror,
            register: 7,
        };
        assert_eq!(op.to_string(), "R7, RRX");

        let op = AluSecondOperandInfo::Register {
            shift_op: ShiftOperator::Register(3),
            shift_kind: ShiftKind::Lsr,
            register: 1,
        };
        assert_eq!(op.to_string(), "R1, LSR R3");
    }
}
