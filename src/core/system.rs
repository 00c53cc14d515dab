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

//! System integration
//!
//! Ties the CPU and the bus together and provides the stepping loop the
//! front-end drives. The guest is single-threaded and cooperatively
//! stepped: one [`System::step`] call is one guest instruction, and DMA
//! transfers complete inside the bus write that starts them.

use super::cpu::CPU;
use super::error::Result;
use super::memory::Bus;

/// PlayStation system: CPU + bus (RAM, BIOS, DMA, stubs)
///
/// # Example
/// ```no_run
/// use emberps::core::system::System;
///
/// let mut system = System::new();
/// system.load_bios("SCPH1001.BIN").unwrap();
/// system.reset();
/// for _ in 0..1000 {
///     system.step().unwrap();
/// }
/// ```
pub struct System {
    /// CPU instance (owns COP0)
    cpu: CPU,
    /// Memory bus (owns RAM, BIOS, DMA, GPU/SPU stubs)
    bus: Bus,
    /// Total cycles executed since reset
    cycles: u64,
}

impl System {
    /// Create a new System with all components at power-on state
    pub fn new() -> Self {
        Self {
            cpu: CPU::new(),
            bus: Bus::new(),
            cycles: 0,
        }
    }

    /// Load a BIOS ROM file (must be exactly 512 KiB)
    pub fn load_bios(&mut self, path: &str) -> Result<()> {
        self.bus.load_bios(path)
    }

    /// Reset the system as if power-cycled
    ///
    /// RAM and registers clear; the loaded BIOS image survives.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.cycles = 0;
    }

    /// Execute one CPU instruction
    ///
    /// # Returns
    /// Number of cycles consumed
    ///
    /// # Errors
    /// Propagates fatal conditions (unmapped bus access, unhandled
    /// coprocessor instruction); the caller should dump state and stop.
    pub fn step(&mut self) -> Result<u32> {
        let cycles = self.cpu.step(&mut self.bus)?;
        self.cycles += cycles as u64;
        Ok(cycles)
    }

    /// Current program counter
    pub fn pc(&self) -> u32 {
        self.cpu.pc()
    }

    /// Total cycles executed since reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// CPU view
    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    /// Mutable CPU view
    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    /// Bus view
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable bus view
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
