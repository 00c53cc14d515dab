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
use crate::core::memory::{Bus, RAM_SIZE};


/// Set the DPCR enable bit (bit 4n+3) for `channel` on top of the reset value
fn dpcr_enabling(channel: usize) -> u32 {
    DMA::DPCR_RESET | (1 << (channel * 4 + 3))
}

/// Fresh RAM + GPU stub for driving the engine directly
fn ram_and_gpu() -> (Vec<u8>, GPU) {
    (vec![0u8; RAM_SIZE], GPU::new())
}
