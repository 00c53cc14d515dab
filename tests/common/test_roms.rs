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

//! Hand-assembled MIPS encodings for guest test programs

/// The canonical NOP
#[allow(dead_code)]
pub const NOP: u32 = 0x00000000;

/// Encode an I-type instruction
#[allow(dead_code)]
pub fn itype(op: u32, rs: u32, rt: u32, imm: u16) -> u32 {
    (op << 26) | (rs << 21) | (rt << 16) | imm as u32
}

/// Encode an R-type (SPECIAL) instruction
#[allow(dead_code)]
pub fn rtype(rs: u32, rt: u32, rd: u32, shamt: u32, funct: u32) -> u32 {
    (rs << 21) | (rt << 16) | (rd << 11) | (shamt << 6) | funct
}

/// LUI rt, imm
#[allow(dead_code)]
pub fn lui(rt: u32, imm: u16) -> u32 {
    itype(0x0F, 0, rt, imm)
}

/// ORI rt, rs, imm
#[allow(dead_code)]
pub fn ori(rt: u32, rs: u32, imm: u16) -> u32 {
    itype(0x0D, rs, rt, imm)
}

/// ADDIU rt, rs, imm
#[allow(dead_code)]
pub fn addiu(rt: u32, rs: u32, imm: u16) -> u32 {
    itype(0x09, rs, rt, imm)
}

/// LW rt, offset(rs)
#[allow(dead_code)]
pub fn lw(rt: u32, rs: u32, offset: u16) -> u32 {
    itype(0x23, rs, rt, offset)
}

/// SW rt, offset(rs)
#[allow(dead_code)]
pub fn sw(rt: u32, rs: u32, offset: u16) -> u32 {
    itype(0x2B, rs, rt, offset)
}

/// BEQ rs, rt, offset (in instructions)
#[allow(dead_code)]
pub fn beq(rs: u32, rt: u32, offset: u16) -> u32 {
    itype(0x04, rs, rt, offset)
}

/// OR rd, rs, rt
#[allow(dead_code)]
pub fn or(rd: u32, rs: u32, rt: u32) -> u32 {
    rtype(rs, rt, rd, 0, 0x25)
}

/// SYSCALL
#[allow(dead_code)]
pub const SYSCALL: u32 = 0x0000000C;
