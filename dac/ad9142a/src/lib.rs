#![cfg_attr(not(test), no_std)]

mod driver;
mod error;
mod instruction;
pub mod regs;

pub use driver::Driver;
pub use error::DriverError;
pub use instruction::Instruction;
pub use regs::{Ad9142aRegs, FrameResetMode, InterpolationMode};

/// Value read back from the `CHIP_ID` register.
pub const CHIP_ID: u8 = 0x0A;
