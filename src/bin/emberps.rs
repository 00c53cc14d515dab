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

use clap::Parser;
use emberps::core::error::Result;
use emberps::core::system::System;
use log::{error, info};

/// PlayStation (PSX) CPU/bus core
#[derive(Parser)]
#[command(name = "emberps")]
#[command(about = "PlayStation CPU and bus core emulator", long_about = None)]
struct Args {
    /// Path to PlayStation BIOS file (e.g., SCPH1001.BIN)
    bios_file: String,

    /// Number of instructions to execute
    #[arg(short = 'n', long, default_value = "1000000")]
    instructions: usize,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("emberps v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let mut system = System::new();

    info!("Loading BIOS from: {}", args.bios_file);
    if let Err(e) = system.load_bios(&args.bios_file) {
        error!("Failed to load BIOS: {}", e);
        return Err(e);
    }

    info!("Starting emulation...");
    system.reset();

    let total_instructions = args.instructions;
    let log_interval = (total_instructions / 10).max(1);

    for i in 0..total_instructions {
        if i % log_interval == 0 && i > 0 {
            info!(
                "Progress: {}/{} instructions | PC: 0x{:08X}",
                i,
                total_instructions,
                system.pc()
            );
        }

        if let Err(e) = system.step() {
            error!("Error at PC=0x{:08X}: {}", system.pc(), e);
            error!("Instruction count: {}", i);
            system.cpu().dump_registers();
            return Err(e);
        }
    }

    info!("Emulation completed successfully!");
    info!("Total instructions: {}", total_instructions);
    info!("Final PC: 0x{:08X}", system.pc());

    Ok(())
}
