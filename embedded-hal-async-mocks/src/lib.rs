//! `mockall` doubles for the `embedded-hal` and `embedded-hal-async` traits used by the drivers.

pub mod delay;
pub mod pin;
pub mod spi;
