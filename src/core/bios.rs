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

//! BIOS ROM image
//!
//! The PlayStation BIOS is a 512 KiB ROM mapped at physical address
//! 0x1FC00000 (virtual 0xBFC00000 through KSEG1, which is where the CPU
//! starts fetching after reset). The image is loaded once at startup and
//! never written.

use crate::core::error::{EmulatorError, Result};
use std::fs::File;
use std::io::Read;

/// BIOS image size (512 KiB)
pub const BIOS_SIZE: usize = 512 * 1024;

/// Read-only BIOS ROM
///
/// All accessors take an offset into the image, not a bus address; the bus
/// subtracts the region base before calling in. Half-word and word reads
/// compose bytes little-endian (LSB at the lowest address).
pub struct Bios {
    /// Raw image bytes
    data: Vec<u8>,
}

impl Bios {
    /// Create an empty (all-zero) BIOS image
    ///
    /// Useful for tests that inject hand-assembled programs; a real image
    /// is loaded over it with [`Bios::load`].
    pub fn new() -> Self {
        Self {
            data: vec![0u8; BIOS_SIZE],
        }
    }

    /// Load a BIOS ROM file
    ///
    /// The file must be exactly 512 KiB; anything else is rejected before
    /// any byte is copied.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the BIOS file (e.g. SCPH1001.BIN)
    ///
    /// # Errors
    ///
    /// - `EmulatorError::BiosNotFound` if the file cannot be opened
    /// - `EmulatorError::InvalidBiosSize` if the size is not 0x80000 bytes
    /// - `EmulatorError::IoError` if reading fails
    pub fn load(&mut self, path: &str) -> Result<()> {
        let mut file = File::open(path).map_err(|_| EmulatorError::BiosNotFound {
            path: path.to_string(),
        })?;

        let metadata = file.metadata()?;
        if metadata.len() != BIOS_SIZE as u64 {
            return Err(EmulatorError::InvalidBiosSize {
                expected: BIOS_SIZE,
                got: metadata.len() as usize,
            });
        }

        file.read_exact(&mut self.data)?;
        log::info!("BIOS image loaded ({} bytes) from {}", BIOS_SIZE, path);

        Ok(())
    }

    /// Read 8-bit value at `offset`
    #[inline(always)]
    pub fn read8(&self, offset: u32) -> u8 {
        self.data[offset as usize]
    }

    /// Read 16-bit little-endian value at `offset`
    #[inline(always)]
    pub fn read16(&self, offset: u32) -> u16 {
        let offset = offset as usize;
        u16::from_le_bytes([self.data[offset], self.data[offset + 1]])
    }

    /// Read 32-bit little-endian value at `offset`
    #[inline(always)]
    pub fn read32(&self, offset: u32) -> u32 {
        let offset = offset as usize;
        u32::from_le_bytes([
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
            self.data[offset + 3],
        ])
    }

    /// Write directly into the image (test helper)
    ///
    /// Bypasses the read-only nature of the ROM so tests can place
    /// hand-assembled programs at the reset vector.
    ///
    /// # Panics
    ///
    /// Panics if `offset + data.len()` exceeds the image size.
    #[cfg(test)]
    pub(crate) fn write_for_test(&mut self, offset: usize, data: &[u8]) {
        let end = offset + data.len();
        assert!(
            end <= BIOS_SIZE,
            "BIOS write out of bounds: offset={}, len={}",
            offset,
            data.len()
        );
        self.data[offset..end].copy_from_slice(data);
    }
}

impl Default for Bios {
    fn default() -> Self {
        Self::new()
    }
}
