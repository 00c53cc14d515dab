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

//! DMA (Direct Memory Access) Controller
//!
//! Seven channels move words between RAM and peripherals without the CPU.
//! Each channel has three registers:
//! - **MADR** (+0x00): base address in RAM
//! - **BCR** (+0x04): block size / block count
//! - **CHCR** (+0x08): direction, step, sync mode, enable, trigger
//!
//! plus the two global registers **DPCR** (0x1F8010F0, per-channel priority
//! and enable nibbles) and **DICR** (0x1F8010F4, completion interrupt
//! enables and flags).
//!
//! # Channels
//!
//! | Channel | Device   |
//! |---------|----------|
//! | 0       | MDEC In  |
//! | 1       | MDEC Out |
//! | 2       | GPU      |
//! | 3       | CD-ROM   |
//! | 4       | SPU      |
//! | 5       | PIO      |
//! | 6       | OTC      |
//!
//! # Transfer modes
//!
//! - **Mode 0** (immediate): one block, length from BCR bits 0-15
//! - **Mode 1** (request): block size x block count words
//! - **Mode 2** (linked list): GPU command lists, channel 2 only
//!
//! Transfers run to completion synchronously inside the CHCR write that
//! activates the channel; real hardware would stall the CPU for roughly the
//! same duration.
//!
//! # References
//!
//! - [PSX-SPX: DMA Controller](http://problemkaputt.de/psx-spx.htm#dmacontroller)

use crate::core::error::{EmulatorError, Result};
use crate::core::gpu::GPU;

#[cfg(test)]
mod tests;

/// Transfer direction (CHCR bit 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Device to RAM
    ToRam,
    /// RAM to device
    FromRam,
}

/// Address step per transferred word (CHCR bit 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// +4 per word
    Forward,
    /// -4 per word (OTC builds its list backward)
    Backward,
}

/// Channel synchronization mode (CHCR bits 9-10)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Transfer the whole block at once, started by the manual trigger
    Immediate,
    /// Transfer block-by-block on device request
    Request,
    /// Follow a linked list in RAM (GPU only)
    LinkedList,
}

/// Single DMA channel
///
/// Raw register values are kept alongside the fields decoded from CHCR at
/// write time, so register reads echo exactly what was written while the
/// transfer engine works with typed state.
#[derive(Clone)]
pub struct Channel {
    /// Memory address register (MADR), masked to 0x00FFFFFF on write
    base_address: u32,

    /// Block control register (BCR)
    ///
    /// - Bits 0-15: block size in words
    /// - Bits 16-31: block count (request mode)
    block_control: u32,

    /// Channel control register (CHCR), raw value
    channel_control: u32,

    /// Decoded CHCR bit 0
    direction: Direction,

    /// Decoded CHCR bit 1
    step: Step,

    /// Decoded CHCR bits 9-10
    sync_mode: SyncMode,

    /// DMA chopping window size (CHCR bits 16-18)
    dma_chop_window: u8,

    /// CPU chopping window size (CHCR bits 20-22)
    cpu_chop_window: u8,

    /// Channel ID (0-6)
    id: u8,
}

impl Channel {
    fn new(id: u8) -> Self {
        Self {
            base_address: 0,
            block_control: 0,
            channel_control: 0,
            direction: Direction::ToRam,
            step: Step::Forward,
            sync_mode: SyncMode::Immediate,
            dma_chop_window: 0,
            cpu_chop_window: 0,
            id,
        }
    }

    /// Channel enable (CHCR bit 24)
    #[inline(always)]
    pub fn enabled(&self) -> bool {
        (self.channel_control & 0x0100_0000) != 0
    }

    /// Manual trigger (CHCR bit 28, consulted in immediate mode only)
    #[inline(always)]
    pub fn trigger(&self) -> bool {
        (self.channel_control & 0x1000_0000) != 0
    }

    /// Transfer direction
    #[inline(always)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Synchronization mode
    #[inline(always)]
    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    /// Number of words for a block transfer
    ///
    /// Immediate mode uses the low 16 bits of BCR; request mode multiplies
    /// block size by block count.
    fn block_word_count(&self) -> u32 {
        let block_size = self.block_control & 0xFFFF;
        match self.sync_mode {
            SyncMode::Immediate => block_size,
            SyncMode::Request => block_size * (self.block_control >> 16),
            SyncMode::LinkedList => 0,
        }
    }

    /// Clear the enable bit once a transfer completes
    fn deactivate(&mut self) {
        log::trace!("DMA{} deactivated", self.id);
        self.channel_control &= !0x0100_0000;
    }
}

/// DMA controller with 7 channels
///
/// # Examples
///
/// ```
/// use emberps::core::dma::DMA;
///
/// let dma = DMA::new();
/// assert_eq!(dma.control(), 0x07654321);
/// ```
pub struct DMA {
    /// The seven channels, indexed by port number
    channels: [Channel; 7],

    /// DMA control register (DPCR)
    ///
    /// One nibble per channel; bit 3 of each nibble is the channel enable.
    /// Reset value 0x07654321 encodes the default priority ordering.
    control: u32,

    /// DMA interrupt register (DICR)
    ///
    /// - Bit 15: force IRQ
    /// - Bits 16-22: per-channel IRQ enable
    /// - Bit 23: master IRQ enable
    /// - Bits 24-30: per-channel IRQ flags (write 1 to acknowledge)
    /// - Bit 31: master IRQ flag, recomputed after every change
    interrupt: u32,
}

impl DMA {
    /// Channel 0: MDEC In
    pub const CH_MDEC_IN: usize = 0;
    /// Channel 1: MDEC Out
    pub const CH_MDEC_OUT: usize = 1;
    /// Channel 2: GPU (lists + image data)
    pub const CH_GPU: usize = 2;
    /// Channel 3: CD-ROM
    pub const CH_CDROM: usize = 3;
    /// Channel 4: SPU
    pub const CH_SPU: usize = 4;
    /// Channel 5: PIO (expansion port)
    pub const CH_PIO: usize = 5;
    /// Channel 6: OTC (ordering table clear)
    pub const CH_OTC: usize = 6;

    /// DPCR reset value
    pub const DPCR_RESET: u32 = 0x0765_4321;

    /// Create a new DMA controller with all channels idle
    pub fn new() -> Self {
        Self {
            channels: [
                Channel::new(0),
                Channel::new(1),
                Channel::new(2),
                Channel::new(3),
                Channel::new(4),
                Channel::new(5),
                Channel::new(6),
            ],
            control: Self::DPCR_RESET,
            interrupt: 0,
        }
    }

    // Register access

    /// Read channel MADR
    pub fn base_address(&self, channel: usize) -> u32 {
        self.channels[channel].base_address
    }

    /// Write channel MADR (masked to the 16 MiB RAM window)
    pub fn set_base_address(&mut self, channel: usize, value: u32) {
        self.channels[channel].base_address = value & 0x00FF_FFFF;
        log::trace!("DMA{} MADR = 0x{:08X}", channel, value);
    }

    /// Read channel BCR
    pub fn block_control(&self, channel: usize) -> u32 {
        self.channels[channel].block_control
    }

    /// Write channel BCR
    pub fn set_block_control(&mut self, channel: usize, value: u32) {
        self.channels[channel].block_control = value;
        log::trace!("DMA{} BCR = 0x{:08X}", channel, value);
    }

    /// Read channel CHCR
    pub fn channel_control(&self, channel: usize) -> u32 {
        self.channels[channel].channel_control
    }

    /// Write channel CHCR, decoding the control fields
    ///
    /// The caller (the bus) checks [`DMA::channel_ready`] afterwards and
    /// runs the transfer while still inside the register write.
    pub fn set_channel_control(&mut self, channel: usize, value: u32) {
        let ch = &mut self.channels[channel];
        ch.channel_control = value;

        ch.direction = if value & 1 != 0 {
            Direction::FromRam
        } else {
            Direction::ToRam
        };
        ch.step = if value & 2 != 0 {
            Step::Backward
        } else {
            Step::Forward
        };
        match (value >> 9) & 3 {
            0 => ch.sync_mode = SyncMode::Immediate,
            1 => ch.sync_mode = SyncMode::Request,
            2 => ch.sync_mode = SyncMode::LinkedList,
            _ => log::warn!("DMA{} CHCR with reserved sync mode 3, keeping previous", channel),
        }
        ch.dma_chop_window = ((value >> 16) & 0x7) as u8;
        ch.cpu_chop_window = ((value >> 20) & 0x7) as u8;

        if ch.enabled() {
            log::debug!(
                "DMA{} started: madr=0x{:08X} bcr=0x{:08X} chcr=0x{:08X}",
                channel,
                ch.base_address,
                ch.block_control,
                value
            );
        }
    }

    /// Read DPCR
    pub fn control(&self) -> u32 {
        self.control
    }

    /// Write DPCR
    pub fn set_control(&mut self, value: u32) {
        self.control = value;
        log::trace!("DPCR = 0x{:08X}", value);
    }

    /// Read DICR
    pub fn interrupt(&self) -> u32 {
        self.interrupt
    }

    /// Write DICR
    ///
    /// Bits 0-23 (minus reserved 6-14) are replaced by the written value;
    /// writing 1 to any of bits 24-30 acknowledges that channel's flag.
    /// The master flag in bit 31 is then recomputed.
    pub fn set_interrupt(&mut self, value: u32) {
        self.interrupt &= 0xFF00_0000;
        self.interrupt |= value & 0x00FF_803F;
        self.interrupt &= !(value & 0x7F00_0000);
        self.update_irq_active();
        log::trace!("DICR = 0x{:08X}", self.interrupt);
    }

    /// Whether a CHCR write should start a transfer on `channel`
    ///
    /// The channel must be enabled (CHCR bit 24), in immediate mode also
    /// manually triggered (bit 28), and its DPCR enable bit (bit 4*n+3)
    /// must be set.
    pub fn channel_ready(&self, channel: usize) -> bool {
        let ch = &self.channels[channel];

        let triggered = match ch.sync_mode {
            SyncMode::Immediate => ch.trigger(),
            _ => true,
        };

        let master_enabled = self.control & (1 << (channel * 4 + 3)) != 0;

        ch.enabled() && triggered && master_enabled
    }

    /// Run a transfer on `channel` to completion
    ///
    /// Linked-list mode walks GPU command lists; every other mode is a block
    /// copy. Completion bookkeeping (DICR flags, CHCR enable bit) happens
    /// before returning.
    pub fn run_channel(&mut self, channel: usize, ram: &mut [u8], gpu: &mut GPU) -> Result<()> {
        match self.channels[channel].sync_mode {
            SyncMode::LinkedList => self.list_copy(channel, ram, gpu)?,
            _ => self.block_copy(channel, ram, gpu)?,
        }

        self.transfer_done(channel);
        Ok(())
    }

    /// Block copy engine (sync modes 0 and 1)
    ///
    /// From RAM the words go to the destination port (the GPU stub for
    /// channel 2, a sink elsewhere). To RAM, channel 6 writes the ordering
    /// table terminator list; other ports have no backing device and supply
    /// zero words.
    fn block_copy(&mut self, channel: usize, ram: &mut [u8], gpu: &mut GPU) -> Result<()> {
        let ch = &self.channels[channel];
        let mut addr = ch.base_address;
        let direction = ch.direction;
        let increment: u32 = match ch.step {
            Step::Forward => 4,
            Step::Backward => 4u32.wrapping_neg(),
        };
        let mut remaining = ch.block_word_count();

        log::debug!(
            "DMA{} block copy: addr=0x{:08X} words={} dir={:?}",
            channel,
            addr,
            remaining,
            direction
        );

        while remaining > 0 {
            let cur = addr & 0x001F_FFFC;

            match direction {
                Direction::FromRam => {
                    let word = ram_read32(ram, cur);
                    if channel == Self::CH_GPU {
                        gpu.write_gp0(word);
                    } else {
                        log::trace!("DMA{} word 0x{:08X} -> port sink", channel, word);
                    }
                }
                Direction::ToRam => {
                    let value = if channel == Self::CH_OTC {
                        if remaining == 1 {
                            // End-of-table marker
                            0x00FF_FFFF
                        } else {
                            addr.wrapping_sub(4) & 0x001F_FFFF
                        }
                    } else {
                        // Stub ports source nothing
                        0
                    };
                    ram_write32(ram, cur, value);
                }
            }

            addr = addr.wrapping_add(increment);
            remaining -= 1;
        }

        Ok(())
    }

    /// Linked-list copy engine (sync mode 2, GPU channel only)
    ///
    /// Each node is a header word: low 24 bits point at the next node, the
    /// high 8 bits count the payload words that follow immediately. Bit 23
    /// of the header terminates the list.
    fn list_copy(&mut self, channel: usize, ram: &mut [u8], gpu: &mut GPU) -> Result<()> {
        let ch = &self.channels[channel];

        if ch.direction == Direction::ToRam {
            return Err(EmulatorError::UnsupportedDmaTransfer {
                channel,
                reason: "linked-list transfer to RAM",
            });
        }
        if channel != Self::CH_GPU {
            return Err(EmulatorError::UnsupportedDmaTransfer {
                channel,
                reason: "linked-list transfer on a non-GPU channel",
            });
        }

        let mut addr = ch.base_address & 0x001F_FFFC;

        loop {
            let header = ram_read32(ram, addr);
            let mut words_left = header >> 24;

            while words_left > 0 {
                addr = addr.wrapping_add(4) & 0x001F_FFFC;
                gpu.write_gp0(ram_read32(ram, addr));
                words_left -= 1;
            }

            if header & 0x0080_0000 != 0 {
                break;
            }

            addr = header & 0x001F_FFFC;
        }

        log::debug!("DMA{} linked-list transfer complete", channel);
        Ok(())
    }

    /// End-of-transfer bookkeeping
    ///
    /// Sets the channel's DICR flag when its interrupt is enabled, clears
    /// the CHCR enable bit and recomputes the master IRQ flag.
    fn transfer_done(&mut self, channel: usize) {
        let enable_mask = 1 << (16 + channel);
        if self.interrupt & enable_mask != 0 {
            self.interrupt |= 1 << (24 + channel);
        }

        self.channels[channel].deactivate();
        self.update_irq_active();
    }

    /// Recompute the master IRQ flag (DICR bit 31)
    ///
    /// Active when forced (bit 15) or when the master enable (bit 23) is set
    /// and any channel flag matches its enable bit.
    fn update_irq_active(&mut self) {
        let forced = (self.interrupt >> 15) & 1 != 0;
        let master = (self.interrupt >> 23) & 1 != 0;
        let signal = (self.interrupt >> 16) & (self.interrupt >> 24) & 0x7F != 0;

        if forced || (master && signal) {
            self.interrupt |= 0x8000_0000;
        } else {
            self.interrupt &= !0x8000_0000;
        }
    }
}

impl Default for DMA {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a RAM word on behalf of the transfer engine
///
/// Addresses are masked to the word-aligned 2 MiB window, so transfers wrap
/// instead of running off the end of RAM.
#[inline(always)]
fn ram_read32(ram: &[u8], addr: u32) -> u32 {
    let addr = (addr & 0x001F_FFFC) as usize;
    u32::from_le_bytes([ram[addr], ram[addr + 1], ram[addr + 2], ram[addr + 3]])
}

/// Write a RAM word on behalf of the transfer engine
#[inline(always)]
fn ram_write32(ram: &mut [u8], addr: u32, value: u32) {
    let addr = (addr & 0x001F_FFFC) as usize;
    ram[addr..addr + 4].copy_from_slice(&value.to_le_bytes());
}
