use logger::log;
use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{
    AluSecondOperandInfo, ArmModeAluInstruction, ShiftOperator,
};
use crate::cpu::condition::Condition;
use crate::cpu::flags::{
    HalfwordDataTransferOffsetKind, HalfwordTransferKind, Indexing, LoadStoreKind, Offsetting,
    OperandKind, ReadWriteKind, ShiftKind,
};

/// Possible operation on transfer data.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum SingleDataTransferKind {
    /// Load from memory into a register.
    Ldr,

    /// Store from a register into memory.
    Str,
}

impl From<u32> for SingleDataTransferKind {
    fn from(op_code: u32) -> Self {
        if op_code.get_bit(20) {
            Self::Ldr
        } else {
            Self::Str
        }
    }
}

/// How the offset of a single data transfer is specified.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SingleDataTransferOffsetInfo {
    Immediate {
        offset: u32,
    },
    RegisterImmediate {
        shift_amount: u32,
        shift_kind: ShiftKind,
        reg_offset: u32,
    },
}

impl std::fmt::Display for SingleDataTransferOffsetInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate { offset } => {
                write!(f, "#{offset}")?;
            }
            Self::RegisterImmediate {
                shift_amount,
                shift_kind,
                reg_offset,
            } => {
                write!(f, "R{reg_offset}, {shift_kind} #{shift_amount}")?;
            }
        };

        Ok(())
    }
}

/// A fully decoded 32-bit ARM instruction.
///
/// The coprocessor variants and `SoftwareInterrupt` are recognized by the
/// decoder but never executed; `Undefined` is the hole in the encoding
/// space.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum ArmModeInstruction {
    DataProcessing {
        condition: Condition,
        alu_instruction: ArmModeAluInstruction,
        set_conditions: bool,
        op_kind: OperandKind,
        rn: u32,
        destination: u32,
        op2: AluSecondOperandInfo,
    },
    Multiply {
        variant: ArmModeMultiplyVariant,
        condition: Condition,
        should_set_codes: bool,
        rd_destination_register: u32,
        rn_accumulate_register: u32,
        rs_operand_register: u32,
        rm_operand_register: u32,
    },
    MultiplyLong {
        variant: ArmModeMultiplyLongVariant,
        condition: Condition,
        should_set_codes: bool,
        rdhi_destination_register: u32,
        rdlo_destination_register: u32,
        rs_operand_register: u32,
        rm_operand_register: u32,
    },
    HalfwordDataTransfer {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store_kind: LoadStoreKind,
        offset_kind: HalfwordDataTransferOffsetKind,
        base_register: u32,
        source_destination_register: u32,
        transfer_kind: HalfwordTransferKind,
    },
    SingleDataTransfer {
        condition: Condition,
        kind: SingleDataTransferKind,
        quantity: ReadWriteKind,
        write_back: bool,
        indexing: Indexing,
        rd: u32,
        base_register: u32,
        offset_info: SingleDataTransferOffsetInfo,
        offsetting: Offsetting,
    },
    BlockDataTransfer {
        condition: Condition,
        indexing: Indexing,
        offsetting: Offsetting,
        load_psr: bool,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: u32,
        register_list: u32,
    },
    Branch {
        condition: Condition,
        link: bool,
        offset: u32,
    },
    SoftwareInterrupt,
    CoprocessorDataTransfer,
    CoprocessorDataOperation,
    CoprocessorRegisterTransfer,
    Undefined,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmModeMultiplyVariant {
    Mul,
    Mla,
}

impl From<u32> for ArmModeMultiplyVariant {
    fn from(op_code: u32) -> Self {
        match op_code.get_bits(21..=24) {
            0b0000 => Self::Mul,
            0b0001 => Self::Mla,
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Display for ArmModeMultiplyVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mul => f.write_str("MUL"),
            Self::Mla => f.write_str("MLA"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmModeMultiplyLongVariant {
    Umull,
    Umlal,
    Smull,
    Smlal,
}

impl From<u32> for ArmModeMultiplyLongVariant {
    fn from(op_code: u32) -> Self {
        match op_code.get_bits(21..=24) {
            0b0100 => Self::Umull,
            0b0101 => Self::Umlal,
            0b0110 => Self::Smull,
            0b0111 => Self::Smlal,
            _ => unreachable!(),
        }
    }
}

impl std::fmt::Display for ArmModeMultiplyLongVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Umull => f.write_str("UMULL"),
            Self::Umlal => f.write_str("UMLAL"),
            Self::Smull => f.write_str("SMULL"),
            Self::Smlal => f.write_str("SMLAL"),
        }
    }
}

impl ArmModeInstruction {
    /// Assembler-like rendering, for logs and host-side listings.
    #[must_use]
    pub fn disassembler(&self) -> String {
        match self {
            Self::DataProcessing {
                condition,
                alu_instruction,
                set_conditions,
                op_kind: _,
                rn,
                destination,
                op2,
            } => {
                let set_string = if *set_conditions { "S" } else { "" };
                match alu_instruction {
                    ArmModeAluInstruction::And
                    | ArmModeAluInstruction::Eor
                    | ArmModeAluInstruction::Sub
                    | ArmModeAluInstruction::Rsb
                    | ArmModeAluInstruction::Add
                    | ArmModeAluInstruction::Adc
                    | ArmModeAluInstruction::Sbc
                    | ArmModeAluInstruction::Rsc
                    | ArmModeAluInstruction::Orr
                    | ArmModeAluInstruction::Bic => {
                        format!(
                            "{alu_instruction}{condition}{set_string} R{destination}, R{rn}, {op2}"
                        )
                    }
                    ArmModeAluInstruction::Tst
                    | ArmModeAluInstruction::Teq
                    | ArmModeAluInstruction::Cmp
                    | ArmModeAluInstruction::Cmn => {
                        format!("{alu_instruction}{condition} R{rn}, {op2}")
                    }
                    ArmModeAluInstruction::Mov | ArmModeAluInstruction::Mvn => {
                        format!("{alu_instruction}{condition}{set_string} R{destination}, {op2}")
                    }
                }
            }
            Self::Multiply {
                variant,
                condition,
                should_set_codes,
                rd_destination_register,
                rn_accumulate_register,
                rs_operand_register,
                rm_operand_register,
            } => {
                let set_string = if *should_set_codes { "S" } else { "" };
                match variant {
                    ArmModeMultiplyVariant::Mul => format!(
                        "{variant}{condition}{set_string} R{rd_destination_register}, \
                         R{rm_operand_register}, R{rs_operand_register}"
                    ),
                    ArmModeMultiplyVariant::Mla => format!(
                        "{variant}{condition}{set_string} R{rd_destination_register}, \
                         R{rm_operand_register}, R{rs_operand_register}, R{rn_accumulate_register}"
                    ),
                }
            }
            Self::MultiplyLong {
                variant,
                condition,
                should_set_codes,
                rdhi_destination_register,
                rdlo_destination_register,
                rs_operand_register,
                rm_operand_register,
            } => {
                let set_string = if *should_set_codes { "S" } else { "" };
                format!(
                    "{variant}{condition}{set_string} R{rdlo_destination_register}, \
                     R{rdhi_destination_register}, R{rm_operand_register}, R{rs_operand_register}"
                )
            }
            Self::HalfwordDataTransfer {
                condition,
                indexing,
                offsetting,
                load_store_kind,
                transfer_kind,
                source_destination_register,
                offset_kind,
                base_register,
                write_back,
                ..
            } => {
                let sign = match offsetting {
                    Offsetting::Up => "+",
                    Offsetting::Down => "-",
                };

                let offset = match offset_kind {
                    HalfwordDataTransferOffsetKind::Immediate { offset } => {
                        if *offset == 0 {
                            String::new()
                        } else {
                            format!(",#{sign}{offset}")
                        }
                    }
                    HalfwordDataTransferOffsetKind::Register { register } => {
                        format!(",{sign}R{register}")
                    }
                };

                let op = match load_store_kind {
                    LoadStoreKind::Store => "STR",
                    LoadStoreKind::Load => "LDR",
                };
                let w = if *write_back { "!" } else { "" };

                let address = match indexing {
                    Indexing::Pre => {
                        format!("[R{base_register}{offset}{w}]")
                    }
                    Indexing::Post => {
                        format!("[R{base_register}]{offset}")
                    }
                };

                format!("{op}{condition}{transfer_kind} R{source_destination_register}, {address}")
            }
            Self::SingleDataTransfer {
                condition,
                kind,
                quantity,
                write_back,
                indexing,
                rd,
                base_register,
                offset_info,
                offsetting,
            } => {
                let op = match kind {
                    SingleDataTransferKind::Ldr => "LDR",
                    SingleDataTransferKind::Str => "STR",
                };
                let b = match quantity {
                    ReadWriteKind::Word => "",
                    ReadWriteKind::Byte => "B",
                };

                let sign = match offsetting {
                    Offsetting::Up => "+",
                    Offsetting::Down => "-",
                };
                let w = if *write_back { "!" } else { "" };

                let address = match indexing {
                    Indexing::Pre => format!("[R{base_register}, {sign}{offset_info}{w}]"),
                    Indexing::Post => format!("[R{base_register}], {sign}{offset_info}"),
                };

                format!("{op}{condition}{b} R{rd}, {address}")
            }
            Self::BlockDataTransfer {
                condition,
                indexing,
                offsetting,
                load_psr,
                write_back,
                load_store,
                rn,
                register_list,
            } => {
                let op = match load_store {
                    LoadStoreKind::Store => "STM",
                    LoadStoreKind::Load => "LDM",
                };

                let offset_modifier = match offsetting {
                    Offsetting::Down => "D",
                    Offsetting::Up => "I",
                };
                let index_type = match indexing {
                    Indexing::Pre => "B",
                    Indexing::Post => "A",
                };

                let mut registers = String::new();
                for i in 0..=15 {
                    if register_list.get_bit(i) {
                        registers.push_str(&format!("R{i}, "));
                    }
                }

                let w = if *write_back { "!" } else { "" };
                let f = if *load_psr { "^" } else { "" };
                format!("{op}{condition}{offset_modifier}{index_type}, R{rn}{w} {{{registers}}}{f}")
            }
            Self::Branch {
                condition,
                link,
                offset,
            } => {
                let link = if *link { "L" } else { "" };
                format!("B{link}{condition} 0x{offset:08X}")
            }
            Self::SoftwareInterrupt => "SWI".to_string(),
            Self::CoprocessorDataTransfer => "LDC/STC".to_string(),
            Self::CoprocessorDataOperation => "CDP".to_string(),
            Self::CoprocessorRegisterTransfer => "MRC/MCR".to_string(),
            Self::Undefined => "UND".to_string(),
        }
    }
}

impl From<u32> for ArmModeInstruction {
    fn from(op_code: u32) -> Self {
        use ArmModeInstruction::*;

        let condition = Condition::from(op_code.get_bits(28..=31) as u8);
        // NOTE: The order matters: patterns are probed from the ones with
        // the most known bits down, and the first match wins. Multiply comes
        // before the halfword transfers because the 1001 nibble in bits 7:4
        // satisfies the halfword discriminator too.
        if op_code.get_bits(23..=27) == 0b00001 && op_code.get_bits(4..=7) == 0b1001 {
            let variant = ArmModeMultiplyLongVariant::from(op_code);

            let should_set_codes = op_code.get_bit(20);

            let rm_operand_register = op_code.get_bits(0..=3);
            let rs_operand_register = op_code.get_bits(8..=11);
            let rdlo_destination_register = op_code.get_bits(12..=15);
            let rdhi_destination_register = op_code.get_bits(16..=19);

            MultiplyLong {
                variant,
                condition,
                should_set_codes,
                rdhi_destination_register,
                rdlo_destination_register,
                rm_operand_register,
                rs_operand_register,
            }
        } else if op_code.get_bits(22..=27) == 0b000000 && op_code.get_bits(4..=7) == 0b1001 {
            let variant = ArmModeMultiplyVariant::from(op_code);

            let should_set_codes = op_code.get_bit(20);

            let rm_operand_register = op_code.get_bits(0..=3);
            let rs_operand_register = op_code.get_bits(8..=11);
            let rn_accumulate_register = op_code.get_bits(12..=15);
            let rd_destination_register = op_code.get_bits(16..=19);

            Multiply {
                variant,
                condition,
                should_set_codes,
                rd_destination_register,
                rn_accumulate_register,
                rm_operand_register,
                rs_operand_register,
            }
        } else if op_code.get_bits(25..=27) == 0b000 && op_code.get_bit(7) && op_code.get_bit(4) {
            // S/H = 00 in this shape is the swap/semaphore space, which this
            // machine does not implement.
            if op_code.get_bits(5..=6) == 0b00 {
                return Undefined;
            }

            let indexing: Indexing = op_code.get_bit(24).into();
            let offsetting: Offsetting = op_code.get_bit(23).into();
            let write_back = op_code.get_bit(21);
            let load_store_kind: LoadStoreKind = op_code.get_bit(20).into();
            let base_register = op_code.get_bits(16..=19);
            let source_destination_register = op_code.get_bits(12..=15);
            let transfer_kind: HalfwordTransferKind = (op_code.get_bits(5..=6) as u8).into();
            let operand_kind: OperandKind = op_code.get_bit(22).into();

            HalfwordDataTransfer {
                condition,
                indexing,
                offsetting,
                write_back,
                load_store_kind,
                offset_kind: if operand_kind == OperandKind::Register {
                    HalfwordDataTransferOffsetKind::Register {
                        register: op_code.get_bits(0..=3),
                    }
                } else {
                    let immediate_offset_high = op_code.get_bits(8..=11);
                    let immediate_offset_low = op_code.get_bits(0..=3);

                    HalfwordDataTransferOffsetKind::Immediate {
                        offset: (immediate_offset_high << 4) | immediate_offset_low,
                    }
                },
                base_register,
                source_destination_register,
                transfer_kind,
            }
        } else if op_code.get_bits(25..=27) == 0b011 && op_code.get_bit(4) {
            log("undefined instruction decode...");
            Undefined
        } else if op_code.get_bits(24..=27) == 0b1111 {
            SoftwareInterrupt
        } else if op_code.get_bits(24..=27) == 0b1110 && op_code.get_bit(4) {
            CoprocessorRegisterTransfer
        } else if op_code.get_bits(24..=27) == 0b1110 && !op_code.get_bit(4) {
            CoprocessorDataOperation
        } else if op_code.get_bits(25..=27) == 0b110 {
            CoprocessorDataTransfer
        } else if op_code.get_bits(25..=27) == 0b100 {
            let indexing = op_code.get_bit(24).into();
            let offsetting = op_code.get_bit(23).into();
            let load_psr = op_code.get_bit(22);
            let write_back = op_code.get_bit(21);
            let load_store = op_code.get_bit(20).into();
            let rn = op_code.get_bits(16..=19);
            let register_list = op_code.get_bits(0..=15);

            BlockDataTransfer {
                condition,
                indexing,
                offsetting,
                load_psr,
                write_back,
                load_store,
                rn,
                register_list,
            }
        } else if op_code.get_bits(25..=27) == 0b101 {
            let link = op_code.get_bit(24);
            let offset = op_code.get_bits(0..=23) << 2;
            Branch {
                condition,
                link,
                offset,
            }
        } else if op_code.get_bits(26..=27) == 0b01 {
            // NOTE: the I bit meaning is inverted here compared to data
            // processing: set means register offset.
            let op_kind: OperandKind = (!op_code.get_bit(25)).into();
            let indexing: Indexing = op_code.get_bit(24).into();
            let offsetting: Offsetting = op_code.get_bit(23).into();
            let quantity: ReadWriteKind = op_code.get_bit(22).into();
            let load_store: SingleDataTransferKind = op_code.into();
            let write_back = op_code.get_bit(21);
            let rn = op_code.get_bits(16..=19);
            let rd = op_code.get_bits(12..=15);

            let offset_info = match op_kind {
                OperandKind::Immediate => {
                    let offset = op_code.get_bits(0..=11);
                    SingleDataTransferOffsetInfo::Immediate { offset }
                }
                OperandKind::Register => {
                    let shift_amount = op_code.get_bits(7..=11);
                    let shift_kind: ShiftKind = op_code.get_bits(5..=6).into();
                    let reg_offset = op_code.get_bits(0..=3);
                    SingleDataTransferOffsetInfo::RegisterImmediate {
                        shift_amount,
                        shift_kind,
                        reg_offset,
                    }
                }
            };

            SingleDataTransfer {
                condition,
                kind: load_store,
                quantity,
                write_back,
                indexing,
                rd,
                base_register: rn,
                offset_info,
                offsetting,
            }
        } else if op_code.get_bits(26..=27) == 0b00 {
            let alu_instruction = op_code.get_bits(21..=24).into();
            let set_conditions = op_code.get_bit(20);
            let rn = op_code.get_bits(16..=19);
            let op_kind: OperandKind = op_code.get_bit(25).into();
            let rd = op_code.get_bits(12..=15);

            let op2 = match op_kind {
                OperandKind::Immediate => {
                    let shift = op_code.get_bits(8..=11) * 2;
                    let base = op_code.get_bits(0..=7);
                    AluSecondOperandInfo::Immediate { base, shift }
                }
                OperandKind::Register => {
                    let shift_kind: ShiftKind = op_code.get_bits(5..=6).into();
                    let shift_by_register = op_code.get_bit(4);
                    let register = op_code.get_bits(0..=3);
                    let shift_op = if shift_by_register {
                        ShiftOperator::Register(op_code.get_bits(8..=11))
                    } else {
                        ShiftOperator::Immediate(op_code.get_bits(7..=11))
                    };
                    AluSecondOperandInfo::Register {
                        shift_op,
                        shift_kind,
                        register,
                    }
                }
            };

            DataProcessing {
                condition,
                alu_instruction,
                set_conditions,
                op_kind,
                rn,
                destination: rd,
                op2,
            }
        } else {
            log("not identified instruction");
            Undefined
        }
    }
}

impl std::fmt::Display for ArmModeInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decode_branch() {
        let output = ArmModeInstruction::from(0b1110_1010_0000_0000_0000_0000_0111_1111);
        assert_eq!(
            ArmModeInstruction::Branch {
                condition: Condition::AL,
                link: false,
                offset: 508,
            },
            output
        );
        assert_eq!("B 0x000001FC", output.disassembler());

        let output = ArmModeInstruction::from(0b1110_1011_0000_0000_0000_0000_0111_1111);
        assert_eq!(
            ArmModeInstruction::Branch {
                condition: Condition::AL,
                link: true,
                offset: 508,
            },
            output
        );
        assert_eq!("BL 0x000001FC", output.disassembler());

        let output = ArmModeInstruction::from(0b0000_1010_0000_0000_0000_0000_0111_1111);
        assert_eq!(
            ArmModeInstruction::Branch {
                condition: Condition::EQ,
                link: false,
                offset: 508,
            },
            output
        );
        assert_eq!("BEQ 0x000001FC", output.disassembler());
    }

    #[test]
    fn decode_mov_immediate() {
        // mov r0, #233
        let output = ArmModeInstruction::from(0xE3A0_00E9);

        assert_eq!(
            ArmModeInstruction::DataProcessing {
                condition: Condition::AL,
                alu_instruction: ArmModeAluInstruction::Mov,
                set_conditions: false,
                op_kind: OperandKind::Immediate,
                rn: 0,
                destination: 0,
                op2: AluSecondOperandInfo::Immediate { base: 233, shift: 0 },
            },
            output
        );
        assert_eq!("MOV R0, #233", output.disassembler());
    }

    #[test]
    fn decode_orr_immediate() {
        // orr r0, r0, #768
        let output = ArmModeInstruction::from(0xE380_0C03);

        assert_eq!(
            ArmModeInstruction::DataProcessing {
                condition: Condition::AL,
                alu_instruction: ArmModeAluInstruction::Orr,
                set_conditions: false,
                op_kind: OperandKind::Immediate,
                rn: 0,
                destination: 0,
                op2: AluSecondOperandInfo::Immediate { base: 3, shift: 24 },
            },
            output
        );
        assert_eq!("ORR R0, R0, #768", output.disassembler());
    }

    #[test]
    fn decode_mov_with_register_shift() {
        // lsr r2, r3, #2 encodes as mov r2, r3, lsr #2
        let output = ArmModeInstruction::from(0xE1A0_2123);

        assert_eq!(
            ArmModeInstruction::DataProcessing {
                condition: Condition::AL,
                alu_instruction: ArmModeAluInstruction::Mov,
                set_conditions: false,
                op_kind: OperandKind::Register,
                rn: 0,
                destination: 2,
                op2: AluSecondOperandInfo::Register {
                    shift_op: ShiftOperator::Immediate(2),
                    shift_kind: ShiftKind::Lsr,
                    register: 3,
                },
            },
            output
        );
        assert_eq!("MOV R2, R3, LSR #2", output.disassembler());
    }

    #[test]
    fn decode_multiply_long() {
        // umull r2, r3, r0, r1
        let output = ArmModeInstruction::from(0xE083_2190);

        assert_eq!(
            ArmModeInstruction::MultiplyLong {
                variant: ArmModeMultiplyLongVariant::Umull,
                condition: Condition::AL,
                should_set_codes: false,
                rdhi_destination_register: 3,
                rdlo_destination_register: 2,
                rs_operand_register: 1,
                rm_operand_register: 0,
            },
            output
        );
        assert_eq!("UMULL R2, R3, R0, R1", output.disassembler());
    }

    #[test]
    fn decode_multiply() {
        // mla r0, r2, r3, r3
        let output = ArmModeInstruction::from(0xE020_3392);

        assert_eq!(
            ArmModeInstruction::Multiply {
                variant: ArmModeMultiplyVariant::Mla,
                condition: Condition::AL,
                should_set_codes: false,
                rd_destination_register: 0,
                rn_accumulate_register: 3,
                rs_operand_register: 3,
                rm_operand_register: 2,
            },
            output
        );
    }

    #[test]
    fn decode_half_word_data_transfer_immediate_offset() {
        let output = ArmModeInstruction::from(0b1110_0001_1100_0001_0000_0000_1011_0000);
        assert_eq!(
            ArmModeInstruction::HalfwordDataTransfer {
                condition: Condition::AL,
                indexing: Indexing::Pre,
                offsetting: Offsetting::Up,
                write_back: false,
                load_store_kind: LoadStoreKind::Store,
                offset_kind: HalfwordDataTransferOffsetKind::Immediate { offset: 0 },
                base_register: 1,
                source_destination_register: 0,
                transfer_kind: HalfwordTransferKind::UnsignedHalfwords,
            },
            output
        );
    }

    #[test]
    fn decode_half_word_data_transfer_register_offset() {
        let output = ArmModeInstruction::from(0b1110_0001_1000_0010_0000_0000_1011_0001);
        assert_eq!(
            ArmModeInstruction::HalfwordDataTransfer {
                condition: Condition::AL,
                indexing: Indexing::Pre,
                offsetting: Offsetting::Up,
                write_back: false,
                load_store_kind: LoadStoreKind::Store,
                offset_kind: HalfwordDataTransferOffsetKind::Register { register: 1 },
                base_register: 2,
                source_destination_register: 0,
                transfer_kind: HalfwordTransferKind::UnsignedHalfwords,
            },
            output
        );
    }

    #[test]
    fn decode_single_data_transfer() {
        // strb r1, [r0]
        let output = ArmModeInstruction::from(0xE5C0_1000);
        assert_eq!(
            ArmModeInstruction::SingleDataTransfer {
                condition: Condition::AL,
                kind: SingleDataTransferKind::Str,
                quantity: ReadWriteKind::Byte,
                write_back: false,
                indexing: Indexing::Pre,
                rd: 1,
                base_register: 0,
                offset_info: SingleDataTransferOffsetInfo::Immediate { offset: 0 },
                offsetting: Offsetting::Up,
            },
            output
        );
        assert_eq!("STRB R1, [R0, +#0]", output.disassembler());

        // ldr r1, [pc, #44]
        let output = ArmModeInstruction::from(0xE59F_102C);
        assert_eq!(
            ArmModeInstruction::SingleDataTransfer {
                condition: Condition::AL,
                kind: SingleDataTransferKind::Ldr,
                quantity: ReadWriteKind::Word,
                write_back: false,
                indexing: Indexing::Pre,
                rd: 1,
                base_register: 15,
                offset_info: SingleDataTransferOffsetInfo::Immediate { offset: 44 },
                offsetting: Offsetting::Up,
            },
            output
        );
    }

    #[test]
    fn decode_block_data_transfer() {
        // ldmia r13!, {r1, r5, r7}
        let output = ArmModeInstruction::from(0b1110_1000_1011_1101_0000_0000_1010_0010);
        assert_eq!(
            ArmModeInstruction::BlockDataTransfer {
                condition: Condition::AL,
                indexing: Indexing::Post,
                offsetting: Offsetting::Up,
                load_psr: false,
                write_back: true,
                load_store: LoadStoreKind::Load,
                rn: 13,
                register_list: 0b0000_0000_1010_0010,
            },
            output
        );
    }

    #[test]
    fn decode_swi_and_coprocessor_space() {
        assert_eq!(
            ArmModeInstruction::from(0xEF00_0042),
            ArmModeInstruction::SoftwareInterrupt
        );
        assert_eq!(
            ArmModeInstruction::from(0xEE00_0000),
            ArmModeInstruction::CoprocessorDataOperation
        );
        assert_eq!(
            ArmModeInstruction::from(0xEE07_0F58),
            ArmModeInstruction::CoprocessorRegisterTransfer
        );
        assert_eq!(
            ArmModeInstruction::from(0xED90_0100),
            ArmModeInstruction::CoprocessorDataTransfer
        );
    }

    #[test]
    fn decode_undefined() {
        // 011 with bit 4 set is the architecturally undefined hole.
        assert_eq!(
            ArmModeInstruction::from(0xE7F0_00F0),
            ArmModeInstruction::Undefined
        );
        // Swap encodings are not part of the supported subset.
        assert_eq!(
            ArmModeInstruction::from(0xE100_0090),
            ArmModeInstruction::Undefined
        );
    }
}
