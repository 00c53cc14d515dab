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

//! Instruction handlers
//!
//! Decode is a two-level match: the primary opcode in bits 31:26, with
//! opcode 0 dispatching on the funct field (SPECIAL), opcode 1 on the rt
//! field (REGIMM branches), and opcodes 0x10-0x13 on the rs field
//! (coprocessor moves). Unknown encodings raise the RESERVED_INSTRUCTION
//! exception rather than killing the emulator; the BIOS never executes one
//! unless something upstream already went wrong, and the warn log makes
//! that visible.

use super::decode::{decode_i_type, decode_j_type, decode_r_type};
use super::{ExceptionCause, CPU};
use crate::core::error::{EmulatorError, Result};
use crate::core::memory::Bus;

impl CPU {
    /// Decode and execute the current instruction
    pub(super) fn execute_instruction(&mut self, bus: &mut Bus) -> Result<()> {
        let instruction = self.current_instruction;
        let opcode = instruction >> 26;

        match opcode {
            0x00 => self.execute_special(instruction),
            0x01 => self.execute_bcondz(instruction),
            0x02 => self.op_j(instruction),
            0x03 => self.op_jal(instruction),
            0x04 => self.op_beq(instruction),
            0x05 => self.op_bne(instruction),
            0x06 => self.op_blez(instruction),
            0x07 => self.op_bgtz(instruction),
            0x08 => self.op_addi(instruction),
            0x09 => self.op_addiu(instruction),
            0x0A => self.op_slti(instruction),
            0x0B => self.op_sltiu(instruction),
            0x0C => self.op_andi(instruction),
            0x0D => self.op_ori(instruction),
            0x0E => self.op_xori(instruction),
            0x0F => self.op_lui(instruction),
            0x10 => self.execute_cop0(instruction),
            0x11 => self.op_cop_unusable(),
            0x12 => self.op_cop2(instruction),
            0x13 => self.op_cop_unusable(),
            0x20 => self.op_lb(instruction, bus),
            0x21 => self.op_lh(instruction, bus),
            0x22 => self.op_lwl(instruction, bus),
            0x23 => self.op_lw(instruction, bus),
            0x24 => self.op_lbu(instruction, bus),
            0x25 => self.op_lhu(instruction, bus),
            0x26 => self.op_lwr(instruction, bus),
            0x28 => self.op_sb(instruction, bus),
            0x29 => self.op_sh(instruction, bus),
            0x2A => self.op_swl(instruction, bus),
            0x2B => self.op_sw(instruction, bus),
            0x2E => self.op_swr(instruction, bus),
            0x30 | 0x31 | 0x33 => self.op_cop_unusable(), // LWC0/1/3
            0x32 => self.op_lwc2(instruction),
            0x38 | 0x39 | 0x3B => self.op_cop_unusable(), // SWC0/1/3
            0x3A => self.op_swc2(instruction),
            _ => self.op_illegal(),
        }
    }

    /// SPECIAL instructions (opcode 0x00), dispatched on funct
    fn execute_special(&mut self, instruction: u32) -> Result<()> {
        let (rs, rt, rd, shamt, funct) = decode_r_type(instruction);

        match funct {
            0x00 => self.op_sll(rt, rd, shamt),
            0x02 => self.op_srl(rt, rd, shamt),
            0x03 => self.op_sra(rt, rd, shamt),
            0x04 => self.op_sllv(rs, rt, rd),
            0x06 => self.op_srlv(rs, rt, rd),
            0x07 => self.op_srav(rs, rt, rd),
            0x08 => self.op_jr(rs),
            0x09 => self.op_jalr(rs, rd),
            0x0C => self.op_syscall(),
            0x0D => self.op_break(),
            0x10 => self.op_mfhi(rd),
            0x11 => self.op_mthi(rs),
            0x12 => self.op_mflo(rd),
            0x13 => self.op_mtlo(rs),
            0x18 => self.op_mult(rs, rt),
            0x19 => self.op_multu(rs, rt),
            0x1A => self.op_div(rs, rt),
            0x1B => self.op_divu(rs, rt),
            0x20 => self.op_add(rs, rt, rd),
            0x21 => self.op_addu(rs, rt, rd),
            0x22 => self.op_sub(rs, rt, rd),
            0x23 => self.op_subu(rs, rt, rd),
            0x24 => self.op_and(rs, rt, rd),
            0x25 => self.op_or(rs, rt, rd),
            0x26 => self.op_xor(rs, rt, rd),
            0x27 => self.op_nor(rs, rt, rd),
            0x2A => self.op_slt(rs, rt, rd),
            0x2B => self.op_sltu(rs, rt, rd),
            _ => self.op_illegal(),
        }
    }

    /// REGIMM branches (opcode 0x01): BLTZ, BGEZ, BLTZAL, BGEZAL
    ///
    /// Bit 16 of the instruction selects GEZ over LTZ; the link forms are
    /// encoded as `(rt >> 1) & 0xF == 8` and write r31 whether or not the
    /// branch is taken.
    fn execute_bcondz(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let offset = ((imm as i16) as i32) << 2;

        let is_bgez = (rt & 0x01) as u32;
        let is_link = (rt >> 1) & 0xF == 8;

        // 1 when the value is negative; XOR flips the test for BGEZ
        let test = ((self.reg(rs) as i32) < 0) as u32;
        let take = test ^ is_bgez;

        if is_link {
            self.set_reg(31, self.next_pc);
        }

        if take != 0 {
            self.branch(offset);
        }
        Ok(())
    }

    // === Jumps ===

    /// J: Jump
    ///
    /// Operation: next_PC = (PC & 0xF0000000) | (target << 2)
    fn op_j(&mut self, instruction: u32) -> Result<()> {
        let (_, target) = decode_j_type(instruction);
        self.next_pc = (self.pc & 0xF000_0000) | (target << 2);
        self.took_branch = true;
        Ok(())
    }

    /// JAL: Jump And Link
    ///
    /// Like J, with the return address (instruction after the delay slot)
    /// written to r31.
    fn op_jal(&mut self, instruction: u32) -> Result<()> {
        let (_, target) = decode_j_type(instruction);
        self.set_reg(31, self.next_pc);
        self.next_pc = (self.pc & 0xF000_0000) | (target << 2);
        self.took_branch = true;
        Ok(())
    }

    /// JR: Jump Register
    fn op_jr(&mut self, rs: u8) -> Result<()> {
        self.next_pc = self.reg(rs);
        self.took_branch = true;
        Ok(())
    }

    /// JALR: Jump And Link Register
    ///
    /// The return address goes to rd (conventionally r31).
    fn op_jalr(&mut self, rs: u8, rd: u8) -> Result<()> {
        let target = self.reg(rs);
        self.set_reg(rd, self.next_pc);
        self.next_pc = target;
        self.took_branch = true;
        Ok(())
    }

    // === Branches ===

    /// BEQ: Branch on Equal
    ///
    /// Operation: if (rs == rt) PC = PC + 4 + (sign_extend(offset) << 2)
    fn op_beq(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let offset = ((imm as i16) as i32) << 2;

        if self.reg(rs) == self.reg(rt) {
            self.branch(offset);
        }
        Ok(())
    }

    /// BNE: Branch on Not Equal
    fn op_bne(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let offset = ((imm as i16) as i32) << 2;

        if self.reg(rs) != self.reg(rt) {
            self.branch(offset);
        }
        Ok(())
    }

    /// BLEZ: Branch on Less than or Equal to Zero (signed)
    fn op_blez(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, _, imm) = decode_i_type(instruction);
        let offset = ((imm as i16) as i32) << 2;

        if (self.reg(rs) as i32) <= 0 {
            self.branch(offset);
        }
        Ok(())
    }

    /// BGTZ: Branch on Greater Than Zero (signed)
    fn op_bgtz(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, _, imm) = decode_i_type(instruction);
        let offset = ((imm as i16) as i32) << 2;

        if (self.reg(rs) as i32) > 0 {
            self.branch(offset);
        }
        Ok(())
    }

    // === Arithmetic ===

    /// ADD: Add Word (traps on signed overflow)
    ///
    /// Operation: rd = rs + rt; ARITHMETIC_OVERFLOW aborts the write.
    fn op_add(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let a = self.reg(rs) as i32;
        let b = self.reg(rt) as i32;

        match a.checked_add(b) {
            Some(value) => self.set_reg(rd, value as u32),
            None => self.exception(ExceptionCause::Overflow),
        }
        Ok(())
    }

    /// ADDU: Add Unsigned Word (wraps silently)
    fn op_addu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = self.reg(rs).wrapping_add(self.reg(rt));
        self.set_reg(rd, value);
        Ok(())
    }

    /// ADDI: Add Immediate Word (traps on signed overflow)
    ///
    /// The 16-bit immediate is sign extended.
    fn op_addi(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let imm = (imm as i16) as i32;
        let a = self.reg(rs) as i32;

        match a.checked_add(imm) {
            Some(value) => self.set_reg(rt, value as u32),
            None => self.exception(ExceptionCause::Overflow),
        }
        Ok(())
    }

    /// ADDIU: Add Immediate Unsigned Word
    ///
    /// Despite the name the immediate is still sign extended; only the
    /// overflow trap is dropped.
    fn op_addiu(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let imm = ((imm as i16) as i32) as u32;
        let value = self.reg(rs).wrapping_add(imm);
        self.set_reg(rt, value);
        Ok(())
    }

    /// SUB: Subtract Word (traps on signed overflow)
    fn op_sub(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let a = self.reg(rs) as i32;
        let b = self.reg(rt) as i32;

        match a.checked_sub(b) {
            Some(value) => self.set_reg(rd, value as u32),
            None => self.exception(ExceptionCause::Overflow),
        }
        Ok(())
    }

    /// SUBU: Subtract Unsigned Word (wraps silently)
    fn op_subu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = self.reg(rs).wrapping_sub(self.reg(rt));
        self.set_reg(rd, value);
        Ok(())
    }

    // === Logical ===

    /// AND: Bitwise AND
    fn op_and(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = self.reg(rs) & self.reg(rt);
        self.set_reg(rd, value);
        Ok(())
    }

    /// OR: Bitwise OR
    fn op_or(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = self.reg(rs) | self.reg(rt);
        self.set_reg(rd, value);
        Ok(())
    }

    /// XOR: Bitwise Exclusive OR
    fn op_xor(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = self.reg(rs) ^ self.reg(rt);
        self.set_reg(rd, value);
        Ok(())
    }

    /// NOR: Bitwise NOT OR
    fn op_nor(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = !(self.reg(rs) | self.reg(rt));
        self.set_reg(rd, value);
        Ok(())
    }

    /// ANDI: AND with zero-extended immediate
    fn op_andi(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let value = self.reg(rs) & (imm as u32);
        self.set_reg(rt, value);
        Ok(())
    }

    /// ORI: OR with zero-extended immediate
    fn op_ori(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let value = self.reg(rs) | (imm as u32);
        self.set_reg(rt, value);
        Ok(())
    }

    /// XORI: XOR with zero-extended immediate
    fn op_xori(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let value = self.reg(rs) ^ (imm as u32);
        self.set_reg(rt, value);
        Ok(())
    }

    /// LUI: Load Upper Immediate
    ///
    /// Operation: rt = imm << 16 (low half cleared)
    fn op_lui(&mut self, instruction: u32) -> Result<()> {
        let (_, _, rt, imm) = decode_i_type(instruction);
        self.set_reg(rt, (imm as u32) << 16);
        Ok(())
    }

    // === Shifts ===

    /// SLL: Shift Left Logical (SLL r0, r0, 0 is the canonical NOP)
    fn op_sll(&mut self, rt: u8, rd: u8, shamt: u8) -> Result<()> {
        let value = self.reg(rt) << shamt;
        self.set_reg(rd, value);
        Ok(())
    }

    /// SRL: Shift Right Logical
    fn op_srl(&mut self, rt: u8, rd: u8, shamt: u8) -> Result<()> {
        let value = self.reg(rt) >> shamt;
        self.set_reg(rd, value);
        Ok(())
    }

    /// SRA: Shift Right Arithmetic (sign bit propagates)
    fn op_sra(&mut self, rt: u8, rd: u8, shamt: u8) -> Result<()> {
        let value = ((self.reg(rt) as i32) >> shamt) as u32;
        self.set_reg(rd, value);
        Ok(())
    }

    /// SLLV: Shift Left Logical Variable (low 5 bits of rs)
    fn op_sllv(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = self.reg(rt) << (self.reg(rs) & 0x1F);
        self.set_reg(rd, value);
        Ok(())
    }

    /// SRLV: Shift Right Logical Variable
    fn op_srlv(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = self.reg(rt) >> (self.reg(rs) & 0x1F);
        self.set_reg(rd, value);
        Ok(())
    }

    /// SRAV: Shift Right Arithmetic Variable
    fn op_srav(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = ((self.reg(rt) as i32) >> (self.reg(rs) & 0x1F)) as u32;
        self.set_reg(rd, value);
        Ok(())
    }

    // === Comparison ===

    /// SLT: Set on Less Than (signed)
    fn op_slt(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = ((self.reg(rs) as i32) < (self.reg(rt) as i32)) as u32;
        self.set_reg(rd, value);
        Ok(())
    }

    /// SLTU: Set on Less Than Unsigned
    fn op_sltu(&mut self, rs: u8, rt: u8, rd: u8) -> Result<()> {
        let value = (self.reg(rs) < self.reg(rt)) as u32;
        self.set_reg(rd, value);
        Ok(())
    }

    /// SLTI: Set on Less Than Immediate (signed compare)
    fn op_slti(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let imm = (imm as i16) as i32;
        let value = ((self.reg(rs) as i32) < imm) as u32;
        self.set_reg(rt, value);
        Ok(())
    }

    /// SLTIU: Set on Less Than Immediate Unsigned
    ///
    /// The immediate is sign extended first, then the compare is unsigned.
    fn op_sltiu(&mut self, instruction: u32) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let imm = ((imm as i16) as i32) as u32;
        let value = (self.reg(rs) < imm) as u32;
        self.set_reg(rt, value);
        Ok(())
    }

    // === Multiply / Divide ===

    /// MULT: Multiply Word (signed), result in HI:LO
    fn op_mult(&mut self, rs: u8, rt: u8) -> Result<()> {
        let a = (self.reg(rs) as i32) as i64;
        let b = (self.reg(rt) as i32) as i64;
        let product = (a * b) as u64;

        self.hi = (product >> 32) as u32;
        self.lo = product as u32;
        Ok(())
    }

    /// MULTU: Multiply Unsigned Word, result in HI:LO
    fn op_multu(&mut self, rs: u8, rt: u8) -> Result<()> {
        let product = (self.reg(rs) as u64) * (self.reg(rt) as u64);

        self.hi = (product >> 32) as u32;
        self.lo = product as u32;
        Ok(())
    }

    /// DIV: Divide Word (signed)
    ///
    /// Quotient in LO, remainder in HI. Division never traps; the two
    /// undefined cases produce the documented R3000A fixtures:
    /// - n / 0: LO = 0xFFFFFFFF for n >= 0 else 1, HI = n
    /// - 0x80000000 / -1: LO = 0x80000000, HI = 0
    fn op_div(&mut self, rs: u8, rt: u8) -> Result<()> {
        let n = self.reg(rs) as i32;
        let d = self.reg(rt) as i32;

        if d == 0 {
            self.hi = n as u32;
            self.lo = if n >= 0 { 0xFFFF_FFFF } else { 1 };
        } else if n as u32 == 0x8000_0000 && d == -1 {
            self.hi = 0;
            self.lo = 0x8000_0000;
        } else {
            self.hi = (n % d) as u32;
            self.lo = (n / d) as u32;
        }
        Ok(())
    }

    /// DIVU: Divide Unsigned Word
    ///
    /// n / 0: LO = 0xFFFFFFFF, HI = n.
    fn op_divu(&mut self, rs: u8, rt: u8) -> Result<()> {
        let n = self.reg(rs);
        let d = self.reg(rt);

        if d == 0 {
            self.hi = n;
            self.lo = 0xFFFF_FFFF;
        } else {
            self.hi = n % d;
            self.lo = n / d;
        }
        Ok(())
    }

    /// MFHI: Move From HI
    fn op_mfhi(&mut self, rd: u8) -> Result<()> {
        self.set_reg(rd, self.hi);
        Ok(())
    }

    /// MTHI: Move To HI
    fn op_mthi(&mut self, rs: u8) -> Result<()> {
        self.hi = self.reg(rs);
        Ok(())
    }

    /// MFLO: Move From LO
    fn op_mflo(&mut self, rd: u8) -> Result<()> {
        self.set_reg(rd, self.lo);
        Ok(())
    }

    /// MTLO: Move To LO
    fn op_mtlo(&mut self, rs: u8) -> Result<()> {
        self.lo = self.reg(rs);
        Ok(())
    }

    // === Loads ===

    /// LB: Load Byte (sign-extended, through the load delay slot)
    fn op_lb(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        let value = self.load8(bus, addr)? as i8 as i32 as u32;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LBU: Load Byte Unsigned
    fn op_lbu(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        let value = self.load8(bus, addr)? as u32;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LH: Load Halfword (sign-extended; address must be even)
    fn op_lh(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        if addr & 0x1 != 0 {
            self.address_error(ExceptionCause::AddressErrorLoad, addr);
            return Ok(());
        }

        let value = self.load16(bus, addr)? as i16 as i32 as u32;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LHU: Load Halfword Unsigned
    fn op_lhu(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        if addr & 0x1 != 0 {
            self.address_error(ExceptionCause::AddressErrorLoad, addr);
            return Ok(());
        }

        let value = self.load16(bus, addr)? as u32;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LW: Load Word (address must be word aligned)
    fn op_lw(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        if addr & 0x3 != 0 {
            self.address_error(ExceptionCause::AddressErrorLoad, addr);
            return Ok(());
        }

        let value = self.load32(bus, addr)?;
        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LWL: Load Word Left
    ///
    /// Fills the upper bytes of rt from the word containing the (possibly
    /// unaligned) address. Merges with a load already in flight for the
    /// same register, which is how the LWL/LWR pair assembles an unaligned
    /// word in two instructions.
    fn op_lwl(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        let cur = self.pending_reg(rt);
        let word = self.load32(bus, addr & !0x3)?;

        let value = match addr & 0x3 {
            0 => (cur & 0x00FF_FFFF) | (word << 24),
            1 => (cur & 0x0000_FFFF) | (word << 16),
            2 => (cur & 0x0000_00FF) | (word << 8),
            _ => word,
        };

        self.set_reg_delayed(rt, value);
        Ok(())
    }

    /// LWR: Load Word Right
    ///
    /// Counterpart of LWL for the lower bytes.
    fn op_lwr(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        let cur = self.pending_reg(rt);
        let word = self.load32(bus, addr & !0x3)?;

        let value = match addr & 0x3 {
            0 => word,
            1 => (cur & 0xFF00_0000) | (word >> 8),
            2 => (cur & 0xFFFF_0000) | (word >> 16),
            _ => (cur & 0xFFFF_FF00) | (word >> 24),
        };

        self.set_reg_delayed(rt, value);
        Ok(())
    }

    // === Stores ===

    /// SB: Store Byte
    fn op_sb(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        self.store8(bus, addr, self.reg(rt) as u8)
    }

    /// SH: Store Halfword (address must be even)
    fn op_sh(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        if addr & 0x1 != 0 {
            self.address_error(ExceptionCause::AddressErrorStore, addr);
            return Ok(());
        }

        self.store16(bus, addr, self.reg(rt) as u16)
    }

    /// SW: Store Word (address must be word aligned)
    fn op_sw(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);

        if addr & 0x3 != 0 {
            self.address_error(ExceptionCause::AddressErrorStore, addr);
            return Ok(());
        }

        self.store32(bus, addr, self.reg(rt))
    }

    /// SWL: Store Word Left
    ///
    /// Read-modify-write of the containing word; no alignment requirement.
    fn op_swl(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);
        let v = self.reg(rt);

        let aligned = addr & !0x3;
        let cur = self.load32(bus, aligned)?;

        let value = match addr & 0x3 {
            0 => (cur & 0xFFFF_FF00) | (v >> 24),
            1 => (cur & 0xFFFF_0000) | (v >> 16),
            2 => (cur & 0xFF00_0000) | (v >> 8),
            _ => v,
        };

        self.store32(bus, aligned, value)
    }

    /// SWR: Store Word Right
    fn op_swr(&mut self, instruction: u32, bus: &mut Bus) -> Result<()> {
        let (_, rs, rt, imm) = decode_i_type(instruction);
        let addr = self.reg(rs).wrapping_add((imm as i16) as i32 as u32);
        let v = self.reg(rt);

        let aligned = addr & !0x3;
        let cur = self.load32(bus, aligned)?;

        let value = match addr & 0x3 {
            0 => v,
            1 => (cur & 0x0000_00FF) | (v << 8),
            2 => (cur & 0x0000_FFFF) | (v << 16),
            _ => (cur & 0x00FF_FFFF) | (v << 24),
        };

        self.store32(bus, aligned, value)
    }

    // === System / Coprocessor ===

    /// SYSCALL: System Call exception
    fn op_syscall(&mut self) -> Result<()> {
        self.exception(ExceptionCause::Syscall);
        Ok(())
    }

    /// BREAK: Breakpoint exception
    fn op_break(&mut self) -> Result<()> {
        self.exception(ExceptionCause::Breakpoint);
        Ok(())
    }

    /// COP0 dispatch (opcode 0x10) on the rs field
    ///
    /// - 0x00: MFC0 (through the load delay slot)
    /// - 0x02: CFC0
    /// - 0x04: MTC0
    /// - 0x06: CTC0
    /// - 0x10-0x1F: cop0 operations; funct 0x10 is RFE, the TLB operations
    ///   are accepted and ignored (nothing maps through the TLB on PSX)
    fn execute_cop0(&mut self, instruction: u32) -> Result<()> {
        let rs = ((instruction >> 21) & 0x1F) as u8;
        let rt = ((instruction >> 16) & 0x1F) as u8;
        let rd = ((instruction >> 11) & 0x1F) as usize;

        match rs {
            0x00 | 0x02 => {
                // MFC0 / CFC0
                let value = self.cop0.read_reg(rd);
                self.set_reg_delayed(rt, value);
                Ok(())
            }
            0x04 | 0x06 => {
                // MTC0 / CTC0
                self.cop0.write_reg(rd, self.reg(rt));
                Ok(())
            }
            0x10..=0x1F => {
                let funct = instruction & 0x3F;
                if funct == 0x10 {
                    self.cop0.return_from_exception();
                } else {
                    log::debug!("TLB operation 0x{:02X} ignored", funct);
                }
                Ok(())
            }
            _ => self.op_illegal(),
        }
    }

    /// COP2 (GTE): present on hardware, not in this core
    ///
    /// Reaching it means the guest got far enough to do geometry; there is
    /// nothing sensible to do but stop.
    fn op_cop2(&mut self, instruction: u32) -> Result<()> {
        Err(EmulatorError::UnhandledInstruction {
            instruction,
            pc: self.current_pc,
        })
    }

    /// LWC2: load word to GTE data register
    fn op_lwc2(&mut self, instruction: u32) -> Result<()> {
        Err(EmulatorError::UnhandledInstruction {
            instruction,
            pc: self.current_pc,
        })
    }

    /// SWC2: store word from GTE data register
    fn op_swc2(&mut self, instruction: u32) -> Result<()> {
        Err(EmulatorError::UnhandledInstruction {
            instruction,
            pc: self.current_pc,
        })
    }

    /// Coprocessors 1 and 3 do not exist on the PSX
    fn op_cop_unusable(&mut self) -> Result<()> {
        log::warn!(
            "Coprocessor-unusable instruction 0x{:08X} at PC=0x{:08X}",
            self.current_instruction,
            self.current_pc
        );
        self.exception(ExceptionCause::CoprocessorUnusable);
        Ok(())
    }

    /// Unknown opcode or funct
    fn op_illegal(&mut self) -> Result<()> {
        log::warn!(
            "Reserved instruction 0x{:08X} at PC=0x{:08X}",
            self.current_instruction,
            self.current_pc
        );
        self.exception(ExceptionCause::ReservedInstruction);
        Ok(())
    }
}
