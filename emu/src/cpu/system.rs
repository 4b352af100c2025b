use logger::log;

use crate::cpu::arm::instructions::ArmModeInstruction;
use crate::cpu::arm::mode::ArmModeOpcode;
use crate::cpu::arm::operations::SIZE_OF_INSTRUCTION;
use crate::cpu::psr::Psr;
use crate::cpu::registers::{Registers, REG_PC};
use crate::fault::Fault;
use crate::memory::internal_memory::InternalMemory;

/// What a single [`System::step`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction retired; the machine can take another step.
    Continue,
    /// A termination condition fired (see [`System::step`]).
    Halt,
    /// The instruction could not execute; the machine state is the state
    /// from just before it.
    Fault(Fault),
}

/// The whole machine: 16 registers, the CPSR, and a flat memory image.
///
/// The system owns its state exclusively. A host may borrow memory
/// read-only through [`System::memory`] between steps; nothing inside
/// synchronizes, because nothing else may mutate it.
///
/// ## Program counter bookkeeping
///
/// R15 has a single storage cell holding the next fetch address. `step`
/// advances it by 4 right after fetching, so during execution it holds the
/// executing instruction's address + 4; the architectural read adds 4 more
/// (the prefetch rule: an instruction reading R15 observes its own address
/// + 8), and architectural writes store the branch target directly while
/// recording that a branch happened.
pub struct System {
    pub cpsr: Psr,
    pub registers: Registers,
    pub(crate) memory: InternalMemory,
    branched: bool,
}

impl System {
    /// A machine whose memory starts as `image` (at address 0, zero-filled
    /// beyond it) with the default capacity.
    pub fn new(image: &[u8]) -> Result<Self, Fault> {
        Ok(Self::from_memory(InternalMemory::new(image)?))
    }

    /// Same as [`System::new`] with an explicit memory capacity.
    pub fn with_capacity(image: &[u8], capacity: usize) -> Result<Self, Fault> {
        Ok(Self::from_memory(InternalMemory::with_capacity(
            image, capacity,
        )?))
    }

    fn from_memory(memory: InternalMemory) -> Self {
        Self {
            cpsr: Psr::default(),
            registers: Registers::default(),
            memory,
            branched: false,
        }
    }

    /// Read-only view of memory, e.g. for rendering a framebuffer region.
    #[must_use]
    pub fn memory(&self) -> &InternalMemory {
        &self.memory
    }

    /// Mutable access for hosts that poke data into the image between
    /// steps (test fixtures, loaders).
    pub fn memory_mut(&mut self) -> &mut InternalMemory {
        &mut self.memory
    }

    /// Architectural register read: R15 observes the prefetch quirk and
    /// reads as the executing instruction's address + 8.
    pub(crate) fn read_register(&self, reg: u32) -> u32 {
        let value = self.registers.register_at(reg as usize);
        if reg == REG_PC {
            value.wrapping_add(4)
        } else {
            value
        }
    }

    /// Architectural register write: R15 takes effect as a branch.
    pub(crate) fn write_register(&mut self, reg: u32, value: u32) {
        if reg == REG_PC {
            self.write_pc(value);
        } else {
            self.registers.set_register_at(reg as usize, value);
        }
    }

    pub(crate) fn write_pc(&mut self, value: u32) {
        self.registers.set_program_counter(value);
        self.branched = true;
    }

    /// Fetches, decodes and executes one instruction.
    ///
    /// Halts when:
    /// - the fetch address is outside memory (the program ran off the end),
    /// - the fetched word is all zeros (zero-filled memory would execute as
    ///   `andeq r0, r0, r0` forever; PC still advances past the word),
    /// - the executed instruction branched to address 0 (the return-to-zero
    ///   convention of the test fixtures).
    ///
    /// A fault leaves every register, the CPSR and memory exactly as they
    /// were before the faulting instruction; R15 points back at it.
    pub fn step(&mut self) -> StepOutcome {
        let address = self.registers.program_counter();
        let word = match self.memory.read_word(address as usize) {
            Ok(word) => word,
            Err(_) => return StepOutcome::Halt,
        };
        self.registers
            .set_program_counter(address.wrapping_add(SIZE_OF_INSTRUCTION));

        if word == 0 {
            return StepOutcome::Halt;
        }

        let op_code = ArmModeOpcode::from(word);
        if !self.cpsr.can_execute(op_code.condition) {
            return StepOutcome::Continue;
        }

        if let Err(fault) = self.execute_arm(op_code) {
            self.registers.set_program_counter(address);
            return StepOutcome::Fault(fault);
        }

        if self.branched && self.registers.program_counter() == 0 {
            return StepOutcome::Halt;
        }

        StepOutcome::Continue
    }

    /// Dispatches one decoded instruction to its handler. The stored R15 is
    /// expected to hold the instruction's address + 4, as `step` arranges.
    pub fn execute_arm(&mut self, op_code: ArmModeOpcode) -> Result<(), Fault> {
        self.branched = false;

        match op_code.instruction {
            ArmModeInstruction::DataProcessing {
                condition: _,
                alu_instruction,
                set_conditions,
                op_kind: _,
                rn,
                destination,
                op2,
            } => {
                self.data_processing(alu_instruction, set_conditions, rn, destination, op2);
                Ok(())
            }
            ArmModeInstruction::Multiply {
                variant,
                condition: _,
                should_set_codes,
                rd_destination_register,
                rn_accumulate_register,
                rs_operand_register,
                rm_operand_register,
            } => {
                self.multiply(
                    variant,
                    should_set_codes,
                    rd_destination_register,
                    rn_accumulate_register,
                    rs_operand_register,
                    rm_operand_register,
                );
                Ok(())
            }
            ArmModeInstruction::MultiplyLong {
                variant,
                condition: _,
                should_set_codes,
                rdhi_destination_register,
                rdlo_destination_register,
                rs_operand_register,
                rm_operand_register,
            } => {
                self.multiply_long(
                    variant,
                    should_set_codes,
                    rdhi_destination_register,
                    rdlo_destination_register,
                    rs_operand_register,
                    rm_operand_register,
                );
                Ok(())
            }
            ArmModeInstruction::HalfwordDataTransfer {
                condition: _,
                indexing,
                offsetting,
                write_back,
                load_store_kind,
                offset_kind,
                base_register,
                source_destination_register,
                transfer_kind,
            } => self.half_word_data_transfer(
                indexing,
                offsetting,
                write_back,
                load_store_kind,
                offset_kind,
                base_register,
                source_destination_register,
                transfer_kind,
            ),
            ArmModeInstruction::SingleDataTransfer {
                condition: _,
                kind,
                quantity,
                write_back,
                indexing,
                rd,
                base_register,
                offset_info,
                offsetting,
            } => self.single_data_transfer(
                kind,
                quantity,
                write_back,
                indexing,
                rd,
                base_register,
                offset_info,
                offsetting,
            ),
            ArmModeInstruction::BlockDataTransfer {
                condition: _,
                indexing,
                offsetting,
                // User-mode transfer semantics are not modeled; the bit is
                // decoded and ignored.
                load_psr: _,
                write_back,
                load_store,
                rn,
                register_list,
            } => self.block_data_transfer(
                indexing,
                offsetting,
                write_back,
                load_store,
                rn,
                register_list,
            ),
            ArmModeInstruction::Branch {
                condition: _,
                link,
                offset,
            } => {
                self.branch(link, offset);
                Ok(())
            }
            ArmModeInstruction::SoftwareInterrupt
            | ArmModeInstruction::CoprocessorDataTransfer
            | ArmModeInstruction::CoprocessorDataOperation
            | ArmModeInstruction::CoprocessorRegisterTransfer => Err(Fault::Unsupported {
                address: self.instruction_address(),
            }),
            ArmModeInstruction::Undefined => {
                log(format!(
                    "undefined instruction {:#010X} reached execution",
                    op_code.raw
                ));
                Err(Fault::Decode {
                    address: self.instruction_address(),
                    word: op_code.raw,
                })
            }
        }
    }

    /// Sets the program counter and steps until a non-`Continue` outcome.
    pub fn run_from(&mut self, address: u32) -> StepOutcome {
        self.registers.set_program_counter(address);
        loop {
            match self.step() {
                StepOutcome::Continue => {}
                outcome => return outcome,
            }
        }
    }

    fn instruction_address(&self) -> u32 {
        self.registers
            .program_counter()
            .wrapping_sub(SIZE_OF_INSTRUCTION)
    }
}
