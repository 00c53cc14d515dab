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

//! BIOS loading and boot-path tests

mod common;

use common::fixtures::{bios_with_size, boot_with_program, step_n, BIOS_SIZE};
use common::test_roms::*;
use emberps::core::error::EmulatorError;
use emberps::core::system::System;

#[test]
fn test_boot_starts_at_reset_vector() {
    let system = boot_with_program(&[NOP]);
    assert_eq!(system.pc(), 0xBFC00000);
}

#[test]
fn test_boot_executes_from_bios() {
    // LUI r1, 0xDEAD at the reset vector
    let mut system = boot_with_program(&[lui(1, 0xDEAD)]);

    step_n(&mut system, 1);

    assert_eq!(system.cpu().reg(1), 0xDEAD0000);
    assert_eq!(system.pc(), 0xBFC00004);
}

#[test]
fn test_empty_bios_is_a_sea_of_nops() {
    let mut system = boot_with_program(&[]);

    step_n(&mut system, 64);

    assert_eq!(system.pc(), 0xBFC00000 + 64 * 4);
    assert_eq!(system.cycles(), 64);
}

#[test]
fn test_bios_rejects_short_file() {
    let bios = bios_with_size(BIOS_SIZE / 2);
    let mut system = System::new();

    let result = system.load_bios(bios.path().to_str().unwrap());
    assert_eq!(
        result,
        Err(EmulatorError::InvalidBiosSize {
            expected: BIOS_SIZE,
            got: BIOS_SIZE / 2,
        })
    );
}

#[test]
fn test_bios_rejects_long_file() {
    let bios = bios_with_size(BIOS_SIZE + 1);
    let mut system = System::new();

    assert!(matches!(
        system.load_bios(bios.path().to_str().unwrap()),
        Err(EmulatorError::InvalidBiosSize { .. })
    ));
}

#[test]
fn test_bios_missing_file() {
    let mut system = System::new();

    assert!(matches!(
        system.load_bios("/nonexistent/SCPH1001.BIN"),
        Err(EmulatorError::BiosNotFound { .. })
    ));
}

#[test]
fn test_bios_region_immutable_from_guest() {
    // Guest stores aimed at the BIOS are ignored
    let mut system = boot_with_program(&[
        lui(1, 0xBFC0),        // r1 = 0xBFC00000
        addiu(2, 0, 0x1234),   // r2 = 0x1234
        sw(2, 1, 0),           // SW r2, 0(r1)
        lw(3, 1, 0),           // LW r3, 0(r1)
        NOP,
    ]);

    step_n(&mut system, 5);

    // r3 re-read the original first instruction, not 0x1234
    assert_eq!(system.cpu().reg(3), lui(1, 0xBFC0));
}
