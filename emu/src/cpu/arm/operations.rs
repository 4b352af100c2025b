use crate::bitwise::Bits;
use crate::cpu::arm::alu_instruction::{
    shift, AluInstructionKind, AluSecondOperandInfo, ArithmeticOpResult, ArmModeAluInstruction,
    Kind, ShiftOperator,
};
use crate::cpu::arm::instructions::{
    ArmModeMultiplyLongVariant, ArmModeMultiplyVariant, SingleDataTransferKind,
    SingleDataTransferOffsetInfo,
};
use crate::cpu::flags::{
    HalfwordDataTransferOffsetKind, HalfwordTransferKind, Indexing, LoadStoreKind, Offsetting,
    ReadWriteKind, ShiftKind,
};
use crate::cpu::registers::{REG_LR, REG_PC};
use crate::cpu::system::System;
use crate::fault::{AccessWidth, Fault};
use crate::memory::io_device::IoDevice;

pub const SIZE_OF_INSTRUCTION: u32 = 4;

impl System {
    pub(crate) fn data_processing(
        &mut self,
        alu_instruction: ArmModeAluInstruction,
        set_conditions: bool,
        rn: u32,
        destination: u32,
        op2: AluSecondOperandInfo,
    ) {
        let op1 = self.read_register(rn);
        let op2 = self.get_operand(alu_instruction, set_conditions, op2);

        use ArmModeAluInstruction::*;
        match alu_instruction {
            And => self.and(destination, op1, op2, set_conditions),
            Eor => self.eor(destination, op1, op2, set_conditions),
            Sub => self.sub(destination, op1, op2, set_conditions),
            Rsb => self.sub(destination, op2, op1, set_conditions),
            Add => self.add(destination, op1, op2, set_conditions),
            Adc => self.adc(destination, op1, op2, set_conditions),
            Sbc => self.sbc(destination, op1, op2, set_conditions),
            Rsc => self.sbc(destination, op2, op1, set_conditions),
            // The four test operations discard the result and write the
            // flags whatever the decoded S bit says.
            Tst => self.tst(op1, op2),
            Teq => self.teq(op1, op2),
            Cmp => self.cmp(op1, op2),
            Cmn => self.cmn(op1, op2),
            Orr => self.orr(destination, op1, op2, set_conditions),
            Mov => self.mov(destination, op2, set_conditions),
            Bic => self.bic(destination, op1, op2, set_conditions),
            Mvn => self.mvn(destination, op2, set_conditions),
        };
    }

    /// Evaluates operand-2 of a data processing instruction, feeding the
    /// barrel shifter where a register operand asks for it.
    pub(crate) fn get_operand(
        &mut self,
        alu_instruction: ArmModeAluInstruction,
        s: bool,
        op2: AluSecondOperandInfo,
    ) -> u32 {
        match op2 {
            AluSecondOperandInfo::Register {
                shift_op,
                shift_kind,
                register,
            } => {
                let rm = self.read_register(register);

                let shift_amount = match shift_op {
                    ShiftOperator::Immediate(amount) => amount,
                    ShiftOperator::Register(rs) => {
                        let amount = self.registers.register_at(rs as usize) & 0xFF;

                        // A register-sourced amount of 0 uses Rm directly
                        // and leaves the carry untouched.
                        if amount == 0 {
                            return rm;
                        }

                        amount
                    }
                };

                self.shift_operand(alu_instruction, s, shift_kind, shift_amount, rm)
            }
            AluSecondOperandInfo::Immediate { base, shift } => base.rotate_right(shift),
        }
    }

    pub(crate) fn shift_operand(
        &mut self,
        alu_instruction: ArmModeAluInstruction,
        s: bool,
        shift_kind: ShiftKind,
        shift_amount: u32,
        rm: u32,
    ) -> u32 {
        let result = shift(shift_kind, shift_amount, rm, self.cpsr.carry_flag());

        // Logical ALU instructions with S set take the carry from the
        // barrel shifter.
        if alu_instruction.kind() == AluInstructionKind::Logical && s {
            self.cpsr.set_carry_flag(result.carry);
        }

        result.result
    }

    fn and(&mut self, rd: u32, rn: u32, op2: u32, s: bool) {
        let result = rn & op2;

        self.write_register(rd, result);

        if s {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.get_bit(31));
        }
    }

    fn eor(&mut self, rd: u32, rn: u32, op2: u32, s: bool) {
        let result = rn ^ op2;

        self.write_register(rd, result);

        if s {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.get_bit(31));
        }
    }

    fn sub(&mut self, rd: u32, first: u32, second: u32, s: bool) {
        let sub_result = Self::sub_inner_op(first, second);

        self.write_register(rd, sub_result.result);

        if s {
            self.cpsr.set_flags(&sub_result);
        }
    }

    fn add(&mut self, rd: u32, rn: u32, op2: u32, s: bool) {
        let add_result = Self::add_inner_op(rn, op2);

        self.write_register(rd, add_result.result);

        if s {
            self.cpsr.set_flags(&add_result);
        }
    }

    fn adc(&mut self, rd: u32, rn: u32, op2: u32, s: bool) {
        let carry: u32 = self.cpsr.carry_flag().into();

        let first_op_result = Self::add_inner_op(rn, op2);
        let second_op_result = Self::add_inner_op(first_op_result.result, carry);

        let result_op = ArithmeticOpResult {
            result: second_op_result.result,
            carry: first_op_result.carry || second_op_result.carry,
            overflow: first_op_result.overflow || second_op_result.overflow,
            sign: second_op_result.sign,
            zero: second_op_result.zero,
        };

        self.write_register(rd, result_op.result);

        if s {
            self.cpsr.set_flags(&result_op);
        }
    }

    fn sbc(&mut self, rd: u32, first: u32, second: u32, s: bool) {
        let borrow: u32 = (!self.cpsr.carry_flag()).into();

        let first_op_result = Self::sub_inner_op(first, second);
        let second_op_result = Self::sub_inner_op(first_op_result.result, borrow);

        let result = ArithmeticOpResult {
            result: second_op_result.result,
            // C stays set only when neither step borrowed.
            carry: first_op_result.carry && second_op_result.carry,
            overflow: first_op_result.overflow || second_op_result.overflow,
            sign: second_op_result.sign,
            zero: second_op_result.zero,
        };

        self.write_register(rd, result.result);

        if s {
            self.cpsr.set_flags(&result);
        }
    }

    fn tst(&mut self, rn: u32, op2: u32) {
        let value = rn & op2;

        self.cpsr.set_sign_flag(value.is_bit_on(31));
        self.cpsr.set_zero_flag(value == 0);
    }

    fn teq(&mut self, rn: u32, op2: u32) {
        let value = rn ^ op2;

        self.cpsr.set_sign_flag(value.is_bit_on(31));
        self.cpsr.set_zero_flag(value == 0);
    }

    fn cmp(&mut self, rn: u32, op2: u32) {
        let sub_result = Self::sub_inner_op(rn, op2);

        self.cpsr.set_flags(&sub_result);
    }

    fn cmn(&mut self, rn: u32, op2: u32) {
        let add_result = Self::add_inner_op(rn, op2);

        self.cpsr.set_flags(&add_result);
    }

    fn orr(&mut self, rd: u32, rn: u32, op2: u32, s: bool) {
        let result = rn | op2;

        self.write_register(rd, result);

        if s {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.is_bit_on(31));
        }
    }

    fn mov(&mut self, rd: u32, op2: u32, s: bool) {
        self.write_register(rd, op2);

        if s {
            self.cpsr.set_zero_flag(op2 == 0);
            self.cpsr.set_sign_flag(op2.get_bit(31));
        }
    }

    fn bic(&mut self, rd: u32, rn: u32, op2: u32, s: bool) {
        let result = rn & !op2;

        self.write_register(rd, result);

        if s {
            self.cpsr.set_sign_flag(result.get_bit(31));
            self.cpsr.set_zero_flag(result == 0);
        }
    }

    fn mvn(&mut self, rd: u32, op2: u32, s: bool) {
        let result = !op2;

        self.write_register(rd, result);

        if s {
            self.cpsr.set_sign_flag(result.get_bit(31));
            self.cpsr.set_zero_flag(result == 0);
        }
    }

    pub(crate) fn add_inner_op(first_op: u32, second_op: u32) -> ArithmeticOpResult {
        // The sum runs in 64 bits so bit 32 is the carry-out.
        let result_and_carry = (first_op as u64).wrapping_add(second_op as u64);
        let result = result_and_carry as u32;

        let sign_op1 = first_op.get_bit(31);
        let sign_op2 = second_op.get_bit(31);
        let sign_r = result.get_bit(31);

        let carry = (result_and_carry >> 32) & 1 == 1;

        // Overflow only occurs when the operands share a sign and the result
        // has the opposite one.
        let same_sign = sign_op1 == sign_op2;

        ArithmeticOpResult {
            result,
            carry,
            overflow: same_sign && (sign_op1 != sign_r),
            sign: sign_r,
            zero: result == 0,
        }
    }

    pub(crate) fn sub_inner_op(first_op: u32, second_op: u32) -> ArithmeticOpResult {
        let result = first_op.wrapping_sub(second_op);

        let sign_op1 = first_op.get_bit(31);
        let sign_op2 = second_op.get_bit(31);
        let sign_r = result.get_bit(31);

        let different_sign = sign_op1 != sign_op2;

        ArithmeticOpResult {
            result,
            // C is set when no borrow occurred, i.e. minuend >= subtrahend
            // in unsigned terms.
            carry: first_op >= second_op,
            overflow: different_sign && sign_op2 == sign_r,
            sign: sign_r,
            zero: result == 0,
        }
    }

    pub(crate) fn branch(&mut self, is_link: bool, offset: u32) {
        let offset = offset.sign_extended(26) as i32;

        if is_link {
            // The stored PC holds the address of the next instruction,
            // exactly what the return needs.
            self.registers
                .set_register_at(REG_LR, self.registers.program_counter());
        }

        let pc = self.read_register(REG_PC) as i32;
        self.write_pc(pc.wrapping_add(offset) as u32);
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn single_data_transfer(
        &mut self,
        kind: SingleDataTransferKind,
        quantity: ReadWriteKind,
        write_back: bool,
        indexing: Indexing,
        rd: u32,
        base_register: u32,
        offset_info: SingleDataTransferOffsetInfo,
        offsetting: Offsetting,
    ) -> Result<(), Fault> {
        let address = self.read_register(base_register);

        let amount = match offset_info {
            SingleDataTransferOffsetInfo::Immediate { offset } => offset,
            SingleDataTransferOffsetInfo::RegisterImmediate {
                shift_amount,
                shift_kind,
                reg_offset,
            } => {
                let value = self.registers.register_at(reg_offset as usize);
                shift(shift_kind, shift_amount, value, self.cpsr.carry_flag()).result
            }
        };

        let offset_address = match offsetting {
            Offsetting::Down => address.wrapping_sub(amount),
            Offsetting::Up => address.wrapping_add(amount),
        };

        // Post-indexed transfers still use the base as the address.
        let transfer_address = match indexing {
            Indexing::Post => address,
            Indexing::Pre => offset_address,
        } as usize;

        match kind {
            SingleDataTransferKind::Ldr => {
                let value = match quantity {
                    ReadWriteKind::Byte => self.memory.read_at(transfer_address)?.into(),
                    ReadWriteKind::Word => self.memory.read_word(transfer_address)?,
                };
                self.write_register(rd, value);
            }
            SingleDataTransferKind::Str => {
                let value = self.read_register(rd);
                match quantity {
                    ReadWriteKind::Byte => self.memory.write_at(transfer_address, value as u8)?,
                    ReadWriteKind::Word => self.memory.write_word(transfer_address, value)?,
                }
            }
        }

        // Base writeback happens after a successful transfer so a faulting
        // access leaves the base register untouched. Post indexing always
        // writes back.
        if indexing == Indexing::Post || write_back {
            self.registers
                .set_register_at(base_register as usize, offset_address);
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn half_word_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store_kind: LoadStoreKind,
        offset_kind: HalfwordDataTransferOffsetKind,
        base_register: u32,
        source_destination_register: u32,
        transfer_kind: HalfwordTransferKind,
    ) -> Result<(), Fault> {
        let address = self.read_register(base_register);

        let offset = match offset_kind {
            HalfwordDataTransferOffsetKind::Immediate { offset } => offset,
            HalfwordDataTransferOffsetKind::Register { register } => {
                self.registers.register_at(register as usize)
            }
        };

        let effective = match offsetting {
            Offsetting::Down => address.wrapping_sub(offset),
            Offsetting::Up => address.wrapping_add(offset),
        };

        let transfer_address = match indexing {
            Indexing::Pre => effective,
            Indexing::Post => address,
        } as usize;

        match load_store_kind {
            LoadStoreKind::Store => {
                let value = self.read_register(source_destination_register);
                match transfer_kind {
                    HalfwordTransferKind::UnsignedHalfwords => {
                        self.memory.write_half_word(transfer_address, value as u16)?;
                    }
                    // S/H = 10 and 11 encode loads only.
                    _ => {
                        return Err(Fault::Unsupported {
                            address: self
                                .registers
                                .program_counter()
                                .wrapping_sub(SIZE_OF_INSTRUCTION),
                        })
                    }
                }
            }
            LoadStoreKind::Load => {
                let value = match transfer_kind {
                    HalfwordTransferKind::UnsignedHalfwords => {
                        self.memory.read_half_word(transfer_address)?.into()
                    }
                    HalfwordTransferKind::SignedByte => {
                        let byte: u32 = self.memory.read_at(transfer_address)?.into();
                        byte.sign_extended(8)
                    }
                    HalfwordTransferKind::SignedHalfwords => {
                        let half: u32 = self.memory.read_half_word(transfer_address)?.into();
                        half.sign_extended(16)
                    }
                };
                self.write_register(source_destination_register, value);
            }
        }

        if indexing == Indexing::Post || write_back {
            self.registers
                .set_register_at(base_register as usize, effective);
        }

        Ok(())
    }

    pub(crate) fn block_data_transfer(
        &mut self,
        indexing: Indexing,
        offsetting: Offsetting,
        write_back: bool,
        load_store: LoadStoreKind,
        rn: u32,
        register_list: u32,
    ) -> Result<(), Fault> {
        let base = self.registers.register_at(rn as usize);

        // The whole span is validated up front: a fault must not leave a
        // partially transferred block behind.
        let span = register_list.count_ones() * 4;
        if span > 0 {
            let lowest = match (offsetting, indexing) {
                (Offsetting::Up, Indexing::Post) => base,
                (Offsetting::Up, Indexing::Pre) => base.wrapping_add(4),
                (Offsetting::Down, Indexing::Post) => base.wrapping_sub(span - 4),
                (Offsetting::Down, Indexing::Pre) => base.wrapping_sub(span),
            };
            self.memory
                .check_range(lowest, span as usize, AccessWidth::Word)?;
        }

        let transfer: fn(&mut Self, usize, usize) -> Result<(), Fault> = match load_store {
            LoadStoreKind::Store => |system, address, reg_source| {
                let value = system.read_register(reg_source as u32);
                system.memory.write_word(address, value)
            },
            LoadStoreKind::Load => |system, address, reg_destination| {
                let value = system.memory.read_word(address)?;
                system.write_register(reg_destination as u32, value);
                Ok(())
            },
        };

        let mut address = base;
        self.exec_block_transfer(register_list, indexing, offsetting, &mut address, transfer)?;

        if write_back {
            self.registers.set_register_at(rn as usize, address);
        }

        Ok(())
    }

    fn exec_block_transfer(
        &mut self,
        register_list: u32,
        indexing: Indexing,
        offsetting: Offsetting,
        address: &mut u32,
        transfer: fn(&mut Self, usize, usize) -> Result<(), Fault>,
    ) -> Result<(), Fault> {
        let change_address = |address: u32| match offsetting {
            Offsetting::Down => address.wrapping_sub(4),
            Offsetting::Up => address.wrapping_add(4),
        };

        for slot in 0..16u8 {
            // Descending transfers walk the register list from the top so
            // the lowest-numbered register still lands at the lowest
            // address.
            let reg = match offsetting {
                Offsetting::Up => slot,
                Offsetting::Down => 15 - slot,
            };

            if register_list.is_bit_on(reg) {
                if indexing == Indexing::Pre {
                    *address = change_address(*address);
                }

                transfer(self, *address as usize, reg.into())?;

                if indexing == Indexing::Post {
                    *address = change_address(*address);
                }
            }
        }

        Ok(())
    }

    pub(crate) fn multiply(
        &mut self,
        mul_variant: ArmModeMultiplyVariant,
        set_condition_codes: bool,
        rd: u32,
        rn: u32,
        rs: u32,
        rm: u32,
    ) {
        use ArmModeMultiplyVariant::*;
        match mul_variant {
            // 32-bit by 32-bit, bottom 32-bit result.
            Mul => self.mul_or_mla(set_condition_codes, false, rd, rn, rs, rm),
            // Same, plus a 32-bit accumulate.
            Mla => self.mul_or_mla(set_condition_codes, true, rd, rn, rs, rm),
        }
    }

    pub(crate) fn multiply_long(
        &mut self,
        mul_variant: ArmModeMultiplyLongVariant,
        set_condition_codes: bool,
        rdhi: u32,
        rdlo: u32,
        rs: u32,
        rm: u32,
    ) {
        use ArmModeMultiplyLongVariant::*;
        match mul_variant {
            Umull => self.umull_or_umlal(set_condition_codes, false, rdhi, rdlo, rs, rm),
            Umlal => self.umull_or_umlal(set_condition_codes, true, rdhi, rdlo, rs, rm),
            Smull => self.smull_or_smlal(set_condition_codes, false, rdhi, rdlo, rs, rm),
            Smlal => self.smull_or_smlal(set_condition_codes, true, rdhi, rdlo, rs, rm),
        }
    }

    fn mul_or_mla(
        &mut self,
        set_condition_codes: bool,
        does_accumulate: bool,
        rd: u32,
        rn: u32,
        rs: u32,
        rm: u32,
    ) {
        let rm_operand_value = self.registers.register_at(rm as usize);
        let rs_operand_value = self.registers.register_at(rs as usize);

        let mut result = rm_operand_value.wrapping_mul(rs_operand_value);
        if does_accumulate {
            result = result.wrapping_add(self.registers.register_at(rn as usize));
        }

        self.write_register(rd, result);

        if set_condition_codes {
            // C and V are architecturally unpredictable; both stay put.
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag(result.get_bit(31));
        }
    }

    fn umull_or_umlal(
        &mut self,
        set_condition_codes: bool,
        does_accumulate: bool,
        rdhi: u32,
        rdlo: u32,
        rs: u32,
        rm: u32,
    ) {
        let rm_operand_value = self.registers.register_at(rm as usize) as u64;
        let rs_operand_value = self.registers.register_at(rs as usize) as u64;

        let mut result = rm_operand_value.wrapping_mul(rs_operand_value);
        if does_accumulate {
            let accumulator = (self.registers.register_at(rdhi as usize) as u64) << 32
                | self.registers.register_at(rdlo as usize) as u64;
            result = result.wrapping_add(accumulator);
        }

        self.write_long_multiply_result(set_condition_codes, rdhi, rdlo, result);
    }

    fn smull_or_smlal(
        &mut self,
        set_condition_codes: bool,
        does_accumulate: bool,
        rdhi: u32,
        rdlo: u32,
        rs: u32,
        rm: u32,
    ) {
        let rm_operand_value = self.registers.register_at(rm as usize) as i32 as i64;
        let rs_operand_value = self.registers.register_at(rs as usize) as i32 as i64;

        let mut result = rm_operand_value.wrapping_mul(rs_operand_value);
        if does_accumulate {
            let accumulator = ((self.registers.register_at(rdhi as usize) as u64) << 32
                | self.registers.register_at(rdlo as usize) as u64)
                as i64;
            result = result.wrapping_add(accumulator);
        }

        self.write_long_multiply_result(set_condition_codes, rdhi, rdlo, result as u64);
    }

    fn write_long_multiply_result(
        &mut self,
        set_condition_codes: bool,
        rdhi: u32,
        rdlo: u32,
        result: u64,
    ) {
        self.registers
            .set_register_at(rdlo as usize, result as u32);
        self.registers
            .set_register_at(rdhi as usize, (result >> 32) as u32);

        if set_condition_codes {
            self.cpsr.set_zero_flag(result == 0);
            self.cpsr.set_sign_flag((result >> 63) & 1 == 1);
        }
    }
}
