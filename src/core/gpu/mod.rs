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

//! GPU command-port stub
//!
//! Only the two command ports and the status word exist here; rasterization
//! belongs to an external component. GP0 receives render/packet words (from
//! the CPU at 0x1F801810 and from DMA channel 2), GP1 receives control words
//! at 0x1F801814. Everything is absorbed.

/// GPUSTAT value reported while stubbed
///
/// Bits 26-28 set: ready to receive command word, ready to send VRAM data,
/// ready to receive DMA block. The BIOS polls these before talking to GP0.
pub const GPUSTAT_READY: u32 = 0x1C00_0000;

/// GPU register stub
///
/// Tracks nothing but the number of words absorbed, which is occasionally
/// useful when tracing a BIOS boot.
pub struct GPU {
    /// GP0 words received (commands and packet data)
    gp0_words: u64,
    /// GP1 words received (control)
    gp1_words: u64,
}

impl GPU {
    /// Create a new GPU stub
    pub fn new() -> Self {
        Self {
            gp0_words: 0,
            gp1_words: 0,
        }
    }

    /// Reset to power-on state
    pub fn reset(&mut self) {
        self.gp0_words = 0;
        self.gp1_words = 0;
    }

    /// Absorb a GP0 command/packet word
    pub fn write_gp0(&mut self, word: u32) {
        self.gp0_words += 1;
        log::trace!("GP0 <- 0x{:08X}", word);
    }

    /// Absorb a GP1 control word
    pub fn write_gp1(&mut self, word: u32) {
        self.gp1_words += 1;
        log::trace!("GP1 <- 0x{:08X}", word);
    }

    /// GPUREAD response register; no responses are generated
    pub fn read_response(&self) -> u32 {
        0
    }

    /// GPUSTAT status word
    pub fn status(&self) -> u32 {
        GPUSTAT_READY
    }

    /// Total GP0 words absorbed since reset
    pub fn gp0_word_count(&self) -> u64 {
        self.gp0_words
    }

    /// Total GP1 words absorbed since reset
    pub fn gp1_word_count(&self) -> u64 {
        self.gp1_words
    }
}

impl Default for GPU {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_word_constant() {
        let gpu = GPU::new();
        assert_eq!(gpu.status(), 0x1C000000);
    }

    #[test]
    fn test_gp0_words_absorbed() {
        let mut gpu = GPU::new();
        gpu.write_gp0(0xE1000000);
        gpu.write_gp0(0x28FF0000);
        gpu.write_gp1(0x08000001);
        assert_eq!(gpu.gp0_word_count(), 2);
        assert_eq!(gpu.gp1_word_count(), 1);
        assert_eq!(gpu.read_response(), 0);
    }

    #[test]
    fn test_reset_clears_counters() {
        let mut gpu = GPU::new();
        gpu.write_gp0(0);
        gpu.write_gp1(0);
        gpu.reset();
        assert_eq!(gpu.gp0_word_count(), 0);
    }
}
