// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! CPU (MIPS R3000A) emulation
//!
//! One [`CPU::step`] call executes one guest instruction. The two pipeline
//! artifacts the R3000A exposes to software are modelled with plain state,
//! not with any pipeline machinery:
//!
//! - **Branch delay**: a taken branch stores its target in `next_pc` and the
//!   instruction after the branch still executes before the target is
//!   fetched. `took_branch`/`in_branch_delay` track this across steps so
//!   exceptions in a delay slot report the right EPC.
//! - **Load delay**: a load's result parks in a single [`LoadDelay`] slot
//!   and is only committed at the start of the following step, so the
//!   instruction right after a load still observes the old register value.
//!
//! Register writes land in a shadow file (`pending_regs`) that is copied
//! into the committed file at the end of every step; this keeps reads inside
//! an instruction looking at pre-instruction state.

mod cop0;
mod decode;
mod instructions;

#[cfg(test)]
mod tests;

pub use cop0::{ExceptionCause, COP0};

use crate::core::error::Result;
use crate::core::memory::Bus;

/// BIOS entry point (KSEG1)
pub const RESET_VECTOR: u32 = 0xBFC0_0000;

/// Load delay slot
///
/// The result of a load instruction cannot be used by the immediately
/// following instruction; at most one of these is in flight at a time.
#[derive(Debug, Clone, Copy)]
pub struct LoadDelay {
    /// Target register
    reg: u8,
    /// Value to load
    value: u32,
}

/// CPU (MIPS R3000A)
///
/// # Specifications
/// - Architecture: MIPS I (32-bit)
/// - Clock frequency: 33.8688 MHz
/// - Registers: 32 general-purpose registers + HI/LO
///
/// # Example
/// ```
/// use emberps::core::cpu::CPU;
///
/// let mut cpu = CPU::new();
/// cpu.reset();
/// assert_eq!(cpu.reg(0), 0); // r0 is always 0
/// ```
pub struct CPU {
    /// General purpose registers (r0-r31), committed state
    ///
    /// r0 is hardwired to 0.
    regs: [u32; 32],

    /// Shadow register file taking this instruction's writes
    ///
    /// Copied into `regs` at the end of each step.
    pending_regs: [u32; 32],

    /// Address of the instruction being fetched this step
    pc: u32,

    /// Address of the instruction after next (branch targets land here)
    next_pc: u32,

    /// PC of the instruction currently executing (exception bookkeeping)
    current_pc: u32,

    /// HI register (multiply result upper half / division remainder)
    hi: u32,

    /// LO register (multiply result lower half / division quotient)
    lo: u32,

    /// Coprocessor 0 (System Control)
    cop0: COP0,

    /// Outstanding load, if any
    load_delay: Option<LoadDelay>,

    /// A branch was taken by the instruction executing this step
    took_branch: bool,

    /// The instruction executing this step sits in a branch delay slot
    in_branch_delay: bool,

    /// Raw word of the instruction currently executing
    current_instruction: u32,
}

impl CPU {
    /// Create a new CPU at the reset state
    ///
    /// PC starts at the BIOS entry point 0xBFC00000 (KSEG1); all registers
    /// are zero, HI/LO are documented-zero, no load is in flight.
    pub fn new() -> Self {
        Self {
            regs: [0u32; 32],
            pending_regs: [0u32; 32],
            pc: RESET_VECTOR,
            next_pc: RESET_VECTOR.wrapping_add(4),
            current_pc: RESET_VECTOR,
            hi: 0,
            lo: 0,
            cop0: COP0::new(),
            load_delay: None,
            took_branch: false,
            in_branch_delay: false,
            current_instruction: 0,
        }
    }

    /// Reset the CPU as if power-cycled
    pub fn reset(&mut self) {
        self.regs = [0u32; 32];
        self.pending_regs = [0u32; 32];
        self.pc = RESET_VECTOR;
        self.next_pc = RESET_VECTOR.wrapping_add(4);
        self.current_pc = RESET_VECTOR;
        self.hi = 0;
        self.lo = 0;
        self.cop0.reset();
        self.load_delay = None;
        self.took_branch = false;
        self.in_branch_delay = false;
        self.current_instruction = 0;
    }

    /// Read a general purpose register (committed state)
    #[inline(always)]
    pub fn reg(&self, index: u8) -> u32 {
        self.regs[index as usize]
    }

    /// Write a general purpose register
    ///
    /// The write lands in the shadow file and becomes visible when the step
    /// commits. Writes to r0 are discarded.
    #[inline(always)]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        if index != 0 {
            self.pending_regs[index as usize] = value;
        }
    }

    /// Read a register including any value committed earlier this step
    ///
    /// LWL/LWR use this to merge with an in-flight load targeting the same
    /// register.
    #[inline(always)]
    pub(super) fn pending_reg(&self, index: u8) -> u32 {
        self.pending_regs[index as usize]
    }

    /// Schedule a register write through the load delay slot
    ///
    /// A new load replaces whatever was in the slot; the replaced value
    /// never reaches the register file.
    pub fn set_reg_delayed(&mut self, index: u8, value: u32) {
        if index != 0 {
            self.load_delay = Some(LoadDelay { reg: index, value });
        }
    }

    /// Execute one instruction
    ///
    /// Performs, in order: instruction fetch (through COP0 translation),
    /// PC advance, retirement of the outstanding load, branch-delay
    /// bookkeeping, execution, and the register-file commit.
    ///
    /// # Arguments
    ///
    /// * `bus` - Memory bus for instruction and data accesses
    ///
    /// # Returns
    ///
    /// Number of cycles consumed (always 1; timing is out of scope)
    ///
    /// # Errors
    ///
    /// Fatal conditions only: unmapped bus accesses and unhandled
    /// coprocessor instructions. Guest-visible exceptions (overflow,
    /// address errors, syscall, ...) redirect PC through COP0 and are
    /// not errors.
    pub fn step(&mut self, bus: &mut Bus) -> Result<u32> {
        self.current_pc = self.pc;

        // Settle the branch-delay bookkeeping before anything can fault, so
        // the exception path sees whether THIS instruction is in a slot
        self.in_branch_delay = self.took_branch;
        self.took_branch = false;

        // A misaligned PC can only come from a bad jump target
        if self.current_pc & 0x3 != 0 {
            self.address_error(ExceptionCause::AddressErrorLoad, self.current_pc);
            return Ok(1);
        }

        self.current_instruction = bus.read32(self.cop0.translate_address(self.pc))?;

        self.pc = self.next_pc;
        self.next_pc = self.next_pc.wrapping_add(4);

        // Retire the outstanding load before this instruction writes
        if let Some(delay) = self.load_delay.take() {
            self.set_reg(delay.reg, delay.value);
        }

        self.execute_instruction(bus)?;

        // Commit this instruction's register writes
        self.regs = self.pending_regs;

        Ok(1)
    }

    /// Take a branch: the target is fetched after the delay slot runs
    #[inline(always)]
    pub(super) fn branch(&mut self, offset: i32) {
        // `pc` already points at the delay slot, so the target is
        // delay_slot_pc + offset = branch_pc + 4 + offset
        self.next_pc = self.pc.wrapping_add(offset as u32);
        self.took_branch = true;
    }

    /// Enter a CPU exception
    ///
    /// COP0 records cause/EPC and selects the vector; PC is redirected
    /// immediately (the delay slot of the faulting instruction does not
    /// run).
    pub(super) fn exception(&mut self, cause: ExceptionCause) {
        log::debug!(
            "Exception {:?} at PC=0x{:08X} (delay slot: {})",
            cause,
            self.current_pc,
            self.in_branch_delay
        );

        let handler = self
            .cop0
            .enter_exception(cause, self.current_pc, self.in_branch_delay);
        self.pc = handler;
        self.next_pc = handler.wrapping_add(4);
    }

    /// Address-error exception with BadVaddr bookkeeping
    pub(super) fn address_error(&mut self, cause: ExceptionCause, addr: u32) {
        self.cop0.set_bad_vaddr(addr);
        self.exception(cause);
    }

    // Data access path: COP0 translates, the bus routes. Stores are
    // suppressed while SR isolates the data cache (the BIOS clears the
    // scratchpad through the cache that way).

    /// Read 8-bit value at a virtual address
    pub fn load8(&self, bus: &Bus, vaddr: u32) -> Result<u8> {
        bus.read8(self.cop0.translate_address(vaddr))
    }

    /// Read 16-bit value at a virtual address
    pub fn load16(&self, bus: &Bus, vaddr: u32) -> Result<u16> {
        bus.read16(self.cop0.translate_address(vaddr))
    }

    /// Read 32-bit value at a virtual address
    pub fn load32(&self, bus: &Bus, vaddr: u32) -> Result<u32> {
        bus.read32(self.cop0.translate_address(vaddr))
    }

    /// Write 8-bit value at a virtual address
    pub fn store8(&mut self, bus: &mut Bus, vaddr: u32, value: u8) -> Result<()> {
        if self.cop0.cache_isolated() {
            log::trace!("Cache isolated, store8 to 0x{:08X} suppressed", vaddr);
            return Ok(());
        }
        bus.write8(self.cop0.translate_address(vaddr), value)
    }

    /// Write 16-bit value at a virtual address
    pub fn store16(&mut self, bus: &mut Bus, vaddr: u32, value: u16) -> Result<()> {
        if self.cop0.cache_isolated() {
            log::trace!("Cache isolated, store16 to 0x{:08X} suppressed", vaddr);
            return Ok(());
        }
        bus.write16(self.cop0.translate_address(vaddr), value)
    }

    /// Write 32-bit value at a virtual address
    pub fn store32(&mut self, bus: &mut Bus, vaddr: u32, value: u32) -> Result<()> {
        if self.cop0.cache_isolated() {
            log::trace!("Cache isolated, store32 to 0x{:08X} suppressed", vaddr);
            return Ok(());
        }
        bus.write32(self.cop0.translate_address(vaddr), value)
    }

    /// Current PC value
    pub fn pc(&self) -> u32 {
        self.pc
    }

    /// Whether the instruction executing this step is in a delay slot
    pub fn in_delay_slot(&self) -> bool {
        self.in_branch_delay
    }

    /// HI register
    pub fn hi(&self) -> u32 {
        self.hi
    }

    /// LO register
    pub fn lo(&self) -> u32 {
        self.lo
    }

    /// Coprocessor 0 view (status/cause inspection)
    pub fn cop0(&self) -> &COP0 {
        &self.cop0
    }

    /// Mutable coprocessor 0 view
    pub fn cop0_mut(&mut self) -> &mut COP0 {
        &mut self.cop0
    }

    /// Dump the register file through the logger
    ///
    /// Called by the CLI when execution dies so the crash site is usable.
    pub fn dump_registers(&self) {
        log::error!(
            "PC=0x{:08X} HI=0x{:08X} LO=0x{:08X} instr=0x{:08X}",
            self.current_pc,
            self.hi,
            self.lo,
            self.current_instruction
        );
        for row in 0..8 {
            let i = row * 4;
            log::error!(
                "r{:<2}=0x{:08X} r{:<2}=0x{:08X} r{:<2}=0x{:08X} r{:<2}=0x{:08X}",
                i,
                self.regs[i],
                i + 1,
                self.regs[i + 1],
                i + 2,
                self.regs[i + 2],
                i + 3,
                self.regs[i + 3]
            );
        }
        log::error!(
            "SR=0x{:08X} CAUSE=0x{:08X} EPC=0x{:08X}",
            self.cop0.sr(),
            self.cop0.cause(),
            self.cop0.epc()
        );
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}
