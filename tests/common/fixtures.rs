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

//! Test fixtures: on-disk BIOS images and booted systems

use emberps::core::system::System;
use std::io::Write;
use tempfile::NamedTempFile;

/// Size a valid BIOS image must have
#[allow(dead_code)]
pub const BIOS_SIZE: usize = 512 * 1024;

/// Write a 512 KiB BIOS image with `program` at the reset vector
///
/// The returned handle keeps the temp file alive; ask it for the path.
#[allow(dead_code)]
pub fn bios_with_program(program: &[u32]) -> NamedTempFile {
    let mut image = vec![0u8; BIOS_SIZE];
    for (i, word) in program.iter().enumerate() {
        image[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }

    let mut file = NamedTempFile::new().expect("failed to create temp BIOS");
    file.write_all(&image).expect("failed to write temp BIOS");
    file.flush().expect("failed to flush temp BIOS");
    file
}

/// Write a BIOS-shaped file of an arbitrary (possibly wrong) size
#[allow(dead_code)]
pub fn bios_with_size(size: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp BIOS");
    file.write_all(&vec![0u8; size]).expect("failed to write temp BIOS");
    file.flush().expect("failed to flush temp BIOS");
    file
}

/// Boot a fresh system from a BIOS image holding `program`
#[allow(dead_code)]
pub fn boot_with_program(program: &[u32]) -> System {
    let bios = bios_with_program(program);
    let mut system = System::new();
    system
        .load_bios(bios.path().to_str().unwrap())
        .expect("failed to load generated BIOS");
    system.reset();
    system
}

/// Step the system `n` times, panicking on any fatal error
#[allow(dead_code)]
pub fn step_n(system: &mut System, n: usize) {
    for _ in 0..n {
        system.step().expect("unexpected fatal error while stepping");
    }
}
