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

use super::*;

#[test]
fn test_branch_delay_slot_executes() {
    // ADDIU r2, r0, 1
    // BEQ   r0, r0, +2   (always taken, skips the "= 3" instruction)
    // ADDIU r2, r0, 2    (delay slot, executes)
    // ADDIU r2, r0, 3    (skipped)
    // ADDIU r5, r0, 0x42 (branch target)
    let (mut cpu, mut bus) = setup(&[
        itype(0x09, 0, 2, 1),
        itype(0x04, 0, 0, 2),
        itype(0x09, 0, 2, 2),
        itype(0x09, 0, 2, 3),
        itype(0x09, 0, 5, 0x42),
    ]);

    run(&mut cpu, &mut bus, 4);

    assert_eq!(cpu.reg(2), 2);
    assert_eq!(cpu.reg(5), 0x42);
}

#[test]
fn test_branch_target_arithmetic() {
    // Branch at 0x80000004 with offset +2: target = 0x80000008 + 8
    let (mut cpu, mut bus) = setup(&[
        NOP,
        itype(0x04, 0, 0, 2), // BEQ r0, r0, +2
        NOP,
    ]);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.next_pc, 0x8000_0010);

    // Delay slot fetch happens next, then the target
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x8000_0010);
}

#[test]
fn test_beq_not_taken() {
    let (mut cpu, mut bus) = setup(&[
        itype(0x04, 1, 2, 4), // BEQ r1, r2 (+4, not taken)
        NOP,
    ]);
    seed_reg(&mut cpu, 1, 1);
    seed_reg(&mut cpu, 2, 2);

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 0x8000_0008);
}

#[test]
fn test_bne_backward_branch() {
    // Count r1 down from 3: classic delay-slot loop
    //   0x00: ADDIU r1, r0, 3
    //   0x04: ADDIU r1, r1, -1   (loop body and delay slot)
    //   0x08: BNE   r1, r0, -2   (back to 0x04)
    //   0x0C: ADDIU r1, r1, -1   (delay slot)
    //   0x10: ...
    let (mut cpu, mut bus) = setup(&[
        itype(0x09, 0, 1, 3),
        itype(0x09, 1, 1, 0xFFFF),
        itype(0x05, 1, 0, 0xFFFE),
        itype(0x09, 1, 1, 0xFFFF),
        NOP,
    ]);

    // 3 -> body decrement (2) -> branch taken -> slot decrement (1)
    // -> body decrement (0)
    run(&mut cpu, &mut bus, 5);
    assert_eq!(cpu.reg(1), 0);

    // BNE at 0x08 sees r1 == 0 and falls through to its delay slot
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x8000_000C);
    assert_eq!(cpu.next_pc, 0x8000_0010);
}

#[test]
fn test_blez_bgtz() {
    let (mut cpu, mut bus) = setup(&[
        itype(0x06, 1, 0, 8), // BLEZ r1 (negative: taken)
        NOP,
    ]);
    seed_reg(&mut cpu, 1, 0xFFFF_FFFF);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 0x8000_0004 + 32);

    let (mut cpu, mut bus) = setup(&[
        itype(0x07, 1, 0, 8), // BGTZ r1 (zero: not taken)
        NOP,
    ]);
    seed_reg(&mut cpu, 1, 0);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 0x8000_0008);
}

#[test]
fn test_bltz_bgez() {
    // REGIMM rt=0x00: BLTZ, rt=0x01: BGEZ
    let (mut cpu, mut bus) = setup(&[itype(0x01, 1, 0x00, 4), NOP]);
    seed_reg(&mut cpu, 1, 0x8000_0000);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 0x8000_0004 + 16); // taken

    let (mut cpu, mut bus) = setup(&[itype(0x01, 1, 0x01, 4), NOP]);
    seed_reg(&mut cpu, 1, 0x8000_0000);
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 0x8000_0008); // not taken
}

#[test]
fn test_bltzal_links_even_when_not_taken() {
    // BLTZAL (rt=0x10) on a positive value: no branch, but r31 is written
    let (mut cpu, mut bus) = setup(&[itype(0x01, 1, 0x10, 4), NOP]);
    seed_reg(&mut cpu, 1, 5);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.reg(31), 0x8000_0008);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x8000_0008); // fell through
}

#[test]
fn test_bgezal_taken() {
    // BGEZAL (rt=0x11) on zero: taken, r31 = instruction after the slot
    let (mut cpu, mut bus) = setup(&[itype(0x01, 0, 0x11, 4), NOP]);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.reg(31), 0x8000_0008);
    assert_eq!(cpu.pc, 0x8000_0004 + 16);
}

#[test]
fn test_j() {
    // J to physical 0x1000 within the current 256 MiB window
    let (mut cpu, mut bus) = setup(&[jtype(0x02, 0x1000 >> 2), NOP]);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.next_pc, 0x8000_1000);

    cpu.step(&mut bus).unwrap(); // delay slot
    assert_eq!(cpu.pc, 0x8000_1000);
}

#[test]
fn test_jal_links_r31() {
    let (mut cpu, mut bus) = setup(&[jtype(0x03, 0x1000 >> 2), NOP]);

    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.reg(31), 0x8000_0008);
    assert_eq!(cpu.next_pc, 0x8000_1000);
}

#[test]
fn test_jr_returns() {
    let (mut cpu, mut bus) = setup(&[rtype(31, 0, 0, 0, 0x08), NOP]);
    seed_reg(&mut cpu, 31, 0x8000_0100);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.pc, 0x8000_0100);
}

#[test]
fn test_jalr_links_rd() {
    // JALR r5, r1: jump to r1, link into r5
    let (mut cpu, mut bus) = setup(&[rtype(1, 0, 5, 0, 0x09), NOP]);
    seed_reg(&mut cpu, 1, 0x8000_0200);

    run(&mut cpu, &mut bus, 2);

    assert_eq!(cpu.reg(5), 0x8000_0008);
    assert_eq!(cpu.pc, 0x8000_0200);
}

#[test]
fn test_in_delay_slot_flag() {
    let (mut cpu, mut bus) = setup(&[itype(0x04, 0, 0, 2), NOP, NOP]);

    cpu.step(&mut bus).unwrap(); // the branch itself
    assert!(!cpu.in_delay_slot());

    cpu.step(&mut bus).unwrap(); // delay slot
    assert!(cpu.in_delay_slot());
}
