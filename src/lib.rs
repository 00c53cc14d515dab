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

//! PlayStation 1 CPU and bus core
//!
//! This library emulates the heart of the PSX: the MIPS R3000A interpreter,
//! coprocessor 0, the memory bus with its memory-mapped I/O decoding, and the
//! seven-channel DMA controller. The GPU and SPU exist only as the register
//! stubs the bus needs to boot a BIOS.
//!
//! # Example
//!
//! ```no_run
//! use emberps::core::system::System;
//!
//! let mut system = System::new();
//! system.load_bios("SCPH1001.BIN").unwrap();
//! system.reset();
//! system.step().unwrap();
//! ```

pub mod core;
