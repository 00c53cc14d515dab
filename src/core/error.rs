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

/// Emulator error types
use std::fmt;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Emulator error types
///
/// These cover the fatal, host-level failures. Guest-visible CPU exceptions
/// (overflow, address errors, syscall, ...) are not errors; they are state
/// transitions handled through COP0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmulatorError {
    /// BIOS file could not be opened
    BiosNotFound {
        /// Path that was tried
        path: String,
    },

    /// BIOS has an unexpected size
    InvalidBiosSize {
        /// Expected size in bytes
        expected: usize,
        /// Actual size in bytes
        got: usize,
    },

    /// Invalid memory access (unmapped physical address)
    InvalidMemoryAccess {
        /// The address that was accessed
        address: u32,
    },

    /// Instruction the interpreter cannot continue past (GTE and friends)
    UnhandledInstruction {
        /// The raw instruction word
        instruction: u32,
        /// Address it was fetched from
        pc: u32,
    },

    /// DMA transfer configuration the hardware does not support
    UnsupportedDmaTransfer {
        /// Channel number (0-6)
        channel: usize,
        /// What was wrong with the request
        reason: &'static str,
    },

    /// I/O error (file operations)
    IoError {
        /// Error message
        message: String,
    },
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulatorError::BiosNotFound { path } => {
                write!(f, "BIOS file not found: {}", path)
            }
            EmulatorError::InvalidBiosSize { expected, got } => {
                write!(
                    f,
                    "Invalid BIOS size: expected {} bytes, got {} bytes",
                    expected, got
                )
            }
            EmulatorError::InvalidMemoryAccess { address } => {
                write!(f, "Invalid memory access at address 0x{:08X}", address)
            }
            EmulatorError::UnhandledInstruction { instruction, pc } => {
                write!(
                    f,
                    "Unhandled instruction 0x{:08X} at PC=0x{:08X}",
                    instruction, pc
                )
            }
            EmulatorError::UnsupportedDmaTransfer { channel, reason } => {
                write!(f, "Unsupported DMA transfer on channel {}: {}", channel, reason)
            }
            EmulatorError::IoError { message } => {
                write!(f, "I/O error: {}", message)
            }
        }
    }
}

impl std::error::Error for EmulatorError {}

impl From<std::io::Error> for EmulatorError {
    fn from(err: std::io::Error) -> Self {
        EmulatorError::IoError {
            message: err.to_string(),
        }
    }
}
