// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! I/O port operations
//!
//! Memory-mapped I/O routing for the bus: memory-control registers, the
//! interrupt and timer stubs, GPU command ports, SPU registers, expansion
//! regions and the DMA register block. A 32-bit write to a DMA channel
//! control register is the one place where an MMIO access has side effects
//! beyond a register file: if the write activates the channel and its DPCR
//! enable bit is set, the whole transfer runs before the write returns.

use super::{Bus, MemoryRegion};
use crate::core::error::{EmulatorError, Result};

/// DMA global control register (DPCR)
const DMA_DPCR: u32 = 0x1F80_10F0;
/// DMA interrupt register (DICR)
const DMA_DICR: u32 = 0x1F80_10F4;
/// Constant fuse value read at 0x1F8010F8
const DMA_FUSE_F8: u32 = 0x7FFA_C68B;
/// Constant fuse value read at 0x1F8010FC
const DMA_FUSE_FC: u32 = 0x00FF_FFF7;

impl Bus {
    /// Read from an I/O port (8-bit)
    pub(super) fn io_read8(&self, paddr: u32, region: MemoryRegion) -> Result<u8> {
        match region {
            MemoryRegion::Expansion1 | MemoryRegion::Expansion2 => {
                log::trace!("Expansion read8 at 0x{:08X} -> 0xFF", paddr);
                Ok(0xFF)
            }
            _ => {
                log::trace!("I/O port read8 at 0x{:08X} -> 0x00", paddr);
                Ok(0)
            }
        }
    }

    /// Read from an I/O port (16-bit)
    pub(super) fn io_read16(&self, paddr: u32, region: MemoryRegion) -> Result<u16> {
        match region {
            MemoryRegion::Spu => Ok(self.spu.read_reg(paddr)),
            MemoryRegion::Expansion1 | MemoryRegion::Expansion2 => {
                log::trace!("Expansion read16 at 0x{:08X} -> 0xFFFF", paddr);
                Ok(0xFFFF)
            }
            MemoryRegion::IrqControl => {
                log::warn!("16-bit IRQ register read at 0x{:08X} -> 0", paddr);
                Ok(0)
            }
            MemoryRegion::Timers => {
                log::trace!("Timer read16 at 0x{:08X} -> 0", paddr);
                Ok(0)
            }
            _ => {
                log::warn!("I/O port read16 at 0x{:08X} -> 0", paddr);
                Ok(0)
            }
        }
    }

    /// Read from an I/O port (32-bit)
    pub(super) fn io_read32(&self, paddr: u32, region: MemoryRegion) -> Result<u32> {
        match region {
            MemoryRegion::MemControl => {
                let index = ((paddr - 0x1F80_1000) / 4) as usize;
                Ok(self.mem_ctrl[index])
            }
            MemoryRegion::RamSize => Ok(self.ram_size),
            MemoryRegion::CacheControl => {
                log::debug!("Cache control read at 0x{:08X} -> 0", paddr);
                Ok(0)
            }
            MemoryRegion::IrqControl => {
                log::warn!("IRQ register read at 0x{:08X} -> 0", paddr);
                Ok(0)
            }
            MemoryRegion::Dma => self.dma_register_read32(paddr),
            MemoryRegion::Timers => {
                // Counters are stubbed; the BIOS busy-waits on 0 just fine
                log::trace!("Timer read32 at 0x{:08X} -> 0", paddr);
                Ok(0)
            }
            MemoryRegion::Gpu => {
                if paddr == 0x1F80_1810 {
                    Ok(self.gpu.read_response())
                } else {
                    Ok(self.gpu.status())
                }
            }
            MemoryRegion::Spu => {
                let lo = self.spu.read_reg(paddr) as u32;
                let hi = self.spu.read_reg(paddr + 2) as u32;
                Ok((hi << 16) | lo)
            }
            MemoryRegion::Expansion1 | MemoryRegion::Expansion2 => {
                log::trace!("Expansion read32 at 0x{:08X} -> 0xFFFFFFFF", paddr);
                Ok(0xFFFF_FFFF)
            }
            _ => Err(EmulatorError::InvalidMemoryAccess { address: paddr }),
        }
    }

    /// Write to an I/O port (8-bit)
    pub(super) fn io_write8(&mut self, paddr: u32, value: u8, region: MemoryRegion) -> Result<()> {
        match region {
            MemoryRegion::Expansion1 | MemoryRegion::Expansion2 => {
                log::trace!(
                    "Expansion write8 at 0x{:08X} = 0x{:02X} (ignored)",
                    paddr,
                    value
                );
                Ok(())
            }
            _ => {
                log::warn!("I/O port write8 at 0x{:08X} = 0x{:02X} (ignored)", paddr, value);
                Ok(())
            }
        }
    }

    /// Write to an I/O port (16-bit)
    pub(super) fn io_write16(&mut self, paddr: u32, value: u16, region: MemoryRegion) -> Result<()> {
        match region {
            MemoryRegion::Spu => {
                self.spu.write_reg(paddr, value);
                Ok(())
            }
            MemoryRegion::Timers => {
                log::warn!("Timer write16 at 0x{:08X} = 0x{:04X} (ignored)", paddr, value);
                Ok(())
            }
            MemoryRegion::IrqControl => {
                log::warn!("16-bit IRQ register write at 0x{:08X} = 0x{:04X} (ignored)", paddr, value);
                Ok(())
            }
            MemoryRegion::Dma => {
                log::warn!(
                    "16-bit DMA register write at 0x{:08X} = 0x{:04X}, widening",
                    paddr,
                    value
                );
                self.dma_register_write32(paddr, value as u32)
            }
            _ => {
                log::warn!("I/O port write16 at 0x{:08X} = 0x{:04X} (ignored)", paddr, value);
                Ok(())
            }
        }
    }

    /// Write to an I/O port (32-bit)
    pub(super) fn io_write32(&mut self, paddr: u32, value: u32, region: MemoryRegion) -> Result<()> {
        match region {
            MemoryRegion::MemControl => {
                let index = ((paddr - 0x1F80_1000) / 4) as usize;
                self.mem_ctrl[index] = value;
                log::trace!("Memory control [{}] = 0x{:08X}", index, value);
                Ok(())
            }
            MemoryRegion::RamSize => {
                self.ram_size = value;
                log::trace!("RAM size register = 0x{:08X}", value);
                Ok(())
            }
            MemoryRegion::CacheControl => {
                // Opaque: the guest's cache configuration has no effect here
                log::debug!("Cache control write = 0x{:08X}", value);
                Ok(())
            }
            MemoryRegion::IrqControl => {
                log::warn!("IRQ register write at 0x{:08X} = 0x{:08X} (ignored)", paddr, value);
                Ok(())
            }
            MemoryRegion::Dma => self.dma_register_write32(paddr, value),
            MemoryRegion::Timers => {
                log::warn!("Timer write32 at 0x{:08X} = 0x{:08X} (ignored)", paddr, value);
                Ok(())
            }
            MemoryRegion::Gpu => {
                if paddr == 0x1F80_1810 {
                    self.gpu.write_gp0(value);
                } else {
                    self.gpu.write_gp1(value);
                }
                Ok(())
            }
            MemoryRegion::Spu => {
                self.spu.write_reg(paddr, value as u16);
                self.spu.write_reg(paddr + 2, (value >> 16) as u16);
                Ok(())
            }
            MemoryRegion::Expansion1 | MemoryRegion::Expansion2 => {
                log::trace!(
                    "Expansion write32 at 0x{:08X} = 0x{:08X} (ignored)",
                    paddr,
                    value
                );
                Ok(())
            }
            _ => Err(EmulatorError::InvalidMemoryAccess { address: paddr }),
        }
    }

    /// Read a DMA register (channel registers, DPCR, DICR, fuse constants)
    fn dma_register_read32(&self, paddr: u32) -> Result<u32> {
        match paddr {
            DMA_DPCR => Ok(self.dma.control()),
            DMA_DICR => Ok(self.dma.interrupt()),
            0x1F80_10F8 => Ok(DMA_FUSE_F8),
            0x1F80_10FC => Ok(DMA_FUSE_FC),
            _ => {
                let channel = (((paddr >> 4) & 0xF) - 8) as usize;
                match paddr & 0xF {
                    0x0 => Ok(self.dma.base_address(channel)),
                    0x4 => Ok(self.dma.block_control(channel)),
                    0x8 => Ok(self.dma.channel_control(channel)),
                    _ => Err(EmulatorError::InvalidMemoryAccess { address: paddr }),
                }
            }
        }
    }

    /// Write a DMA register, starting a transfer when the write activates a
    /// channel whose DPCR enable bit is set
    fn dma_register_write32(&mut self, paddr: u32, value: u32) -> Result<()> {
        match paddr {
            DMA_DPCR => {
                self.dma.set_control(value);
                Ok(())
            }
            DMA_DICR => {
                self.dma.set_interrupt(value);
                Ok(())
            }
            0x1F80_10F8 | 0x1F80_10FC => {
                log::warn!("Write to DMA fuse register 0x{:08X} (ignored)", paddr);
                Ok(())
            }
            _ => {
                let channel = (((paddr >> 4) & 0xF) - 8) as usize;
                match paddr & 0xF {
                    0x0 => {
                        self.dma.set_base_address(channel, value);
                        Ok(())
                    }
                    0x4 => {
                        self.dma.set_block_control(channel, value);
                        Ok(())
                    }
                    0x8 => {
                        self.dma.set_channel_control(channel, value);
                        if self.dma.channel_ready(channel) {
                            self.dma.run_channel(channel, &mut self.ram, &mut self.gpu)?;
                        }
                        Ok(())
                    }
                    _ => Err(EmulatorError::InvalidMemoryAccess { address: paddr }),
                }
            }
        }
    }
}
