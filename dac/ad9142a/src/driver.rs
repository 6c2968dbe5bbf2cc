use embedded_hal::digital::OutputPin;
use embedded_hal_async::{
    delay::DelayNs,
    spi::{Operation, SpiDevice},
};

use crate::{
    regs::{addr, Ad9142aRegs},
    DriverError, Instruction, CHIP_ID,
};

/// `RESET` must be held low for at least this long.
const RESET_PULSE_US: u32 = 1;
const RESET_RECOVERY_US: u32 = 100;
const PLL_POLL_INTERVAL_US: u32 = 100;

pub struct Driver<Spi, Delay, ResetPin>
where
    Spi: SpiDevice,
    Delay: DelayNs,
    ResetPin: OutputPin,
{
    spi: Spi,
    delay: Delay,
    reset: ResetPin,
    regs: Ad9142aRegs,
    /// What the chip is known to hold, `None` until the first reset or commit.
    committed: Option<Ad9142aRegs>,
}

impl<Spi, Delay, ResetPin> Driver<Spi, Delay, ResetPin>
where
    Spi: SpiDevice,
    Delay: DelayNs,
    ResetPin: OutputPin,
{
    pub const fn new(spi: Spi, delay: Delay, reset: ResetPin) -> Self {
        Self {
            spi,
            delay,
            reset,
            regs: Ad9142aRegs::DEFAULT,
            committed: None,
        }
    }

    pub fn release(self) -> (Spi, Delay, ResetPin) {
        (self.spi, self.delay, self.reset)
    }

    /// The shadow register map.
    pub fn regs(&self) -> &Ad9142aRegs {
        &self.regs
    }

    /// Change the shadow register map. Nothing is sent until [`Self::commit()`].
    pub fn regs_mut(&mut self) -> &mut Ad9142aRegs {
        &mut self.regs
    }

    /// Pulse the active low `RESET` pin.
    /// The shadow registers return to their defaults.
    pub async fn hw_reset(&mut self) -> Result<(), DriverError> {
        self.reset.set_low().map_err(|_| DriverError::Pin)?;
        self.delay.delay_us(RESET_PULSE_US).await;
        self.reset.set_high().map_err(|_| DriverError::Pin)?;
        self.delay.delay_us(RESET_RECOVERY_US).await;

        self.regs = Ad9142aRegs::DEFAULT;
        self.committed = Some(Ad9142aRegs::DEFAULT);
        Ok(())
    }

    /// Reset through `DEVICE_RESET`, which does not self clear.
    /// The shadow registers return to their defaults.
    pub async fn soft_reset(&mut self) -> Result<(), DriverError> {
        self.regs.device_reset = 1;
        self.write_reg(addr::SPI_CONTROL).await?;

        self.regs = Ad9142aRegs::DEFAULT;
        self.write_reg(addr::SPI_CONTROL).await?;

        self.committed = Some(Ad9142aRegs::DEFAULT);
        Ok(())
    }

    /// Write the shadow value of a single register.
    pub async fn write_reg(&mut self, addr: u16) -> Result<(), DriverError> {
        let tx = Instruction::write_reg(&self.regs, addr).to_bytes();
        self.spi.write(&tx).await?;

        if let Some(committed) = &mut self.committed {
            committed.set_reg(addr, tx[2]);
        }
        Ok(())
    }

    /// Read a single register and unpack it into the shadow registers.
    pub async fn read_reg(&mut self, addr: u16) -> Result<u8, DriverError> {
        let header = Instruction::read_reg(addr).header();
        let mut rx = [0; 1];
        self.spi
            .transaction(&mut [Operation::Write(&header), Operation::Read(&mut rx)])
            .await?;

        let value = rx[0];
        self.regs.set_reg(addr, value);
        if let Some(committed) = &mut self.committed {
            committed.set_reg(addr, value);
        }
        Ok(value)
    }

    /// Write every register whose shadow value differs from what the chip holds.
    /// Every register is written if the chip state is unknown.
    /// Returns the number of registers written.
    pub async fn commit(&mut self) -> Result<usize, DriverError> {
        let current = self.regs;
        let mut written = 0;

        match self.committed {
            Some(previous) => {
                for addr in current.changed_addresses(&previous) {
                    self.write_reg(addr).await?;
                    written += 1;
                }
            }
            None => {
                for addr in Ad9142aRegs::ADDRESSES {
                    self.write_reg(addr).await?;
                    written += 1;
                }
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Committed {} registers", written);

        self.committed = Some(current);
        Ok(written)
    }

    /// Read a register, let `f` change the shadow registers, and write it back.
    pub async fn modify<F: FnOnce(&mut Ad9142aRegs)>(
        &mut self,
        addr: u16,
        f: F,
    ) -> Result<(), DriverError> {
        self.read_reg(addr).await?;
        f(&mut self.regs);
        self.write_reg(addr).await
    }

    pub async fn read_chip_id(&mut self) -> Result<u8, DriverError> {
        match self.read_reg(addr::CHIP_ID).await? {
            CHIP_ID => Ok(CHIP_ID),
            other => Err(DriverError::InvalidChipId(other)),
        }
    }

    /// Poll `PLL_LOCK` until it is set or `timeout_us` has passed.
    /// The last wait is cut short so the budget is never exceeded.
    pub async fn wait_for_pll_lock(&mut self, timeout_us: u32) -> Result<(), DriverError> {
        let mut remaining = timeout_us;
        loop {
            self.read_reg(addr::PLL_STATUS0).await?;
            if self.regs.pll_lock != 0 {
                return Ok(());
            }

            if remaining == 0 {
                return Err(DriverError::Timeout);
            }

            let wait = remaining.min(PLL_POLL_INTERVAL_US);
            self.delay.delay_us(wait).await;
            remaining -= wait;
        }
    }
}
