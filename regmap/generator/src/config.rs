//! Generator settings.

use crate::{
    error::Error,
    util::{camel_case, is_ident},
};

/// Settings for one generated register map.
///
/// The SPI word helpers follow the layout `read_flag | address | data`, where the
/// data byte sits in the low 8 bits and the address starts at `addr_shift`.
///
/// ```
/// use regmap_gen::GeneratorConfig;
///
/// let config = GeneratorConfig::new("ad9142a_regs").with_source_name("ad9142a.regs");
/// assert_eq!("Ad9142aRegs", config.struct_name());
/// assert_eq!(0x7FFF, config.max_address());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Base name, e.g. `ad9142a_regs`. The struct is named after it in CamelCase.
    pub name: String,
    /// Table name shown in the generated header.
    pub source_name: Option<String>,
    /// Bit position of the address in the SPI word.
    pub addr_shift: u32,
    /// Bit set in the SPI word to request a read.
    pub read_flag_bit: u32,
}

impl GeneratorConfig {
    pub const DEFAULT_ADDR_SHIFT: u32 = 8;
    pub const DEFAULT_READ_FLAG_BIT: u32 = 23;

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source_name: None,
            addr_shift: Self::DEFAULT_ADDR_SHIFT,
            read_flag_bit: Self::DEFAULT_READ_FLAG_BIT,
        }
    }

    pub fn with_source_name(mut self, source_name: &str) -> Self {
        self.source_name = Some(source_name.to_string());
        self
    }

    pub fn with_addr_shift(mut self, addr_shift: u32) -> Self {
        self.addr_shift = addr_shift;
        self
    }

    pub fn with_read_flag_bit(mut self, read_flag_bit: u32) -> Self {
        self.read_flag_bit = read_flag_bit;
        self
    }

    pub fn struct_name(&self) -> String {
        camel_case(&self.name)
    }

    pub fn source_name(&self) -> &str {
        self.source_name.as_deref().unwrap_or(&self.name)
    }

    /// Largest address that fits between the data byte and the read flag.
    pub fn max_address(&self) -> u16 {
        let bits = self.read_flag_bit.saturating_sub(self.addr_shift);
        if bits >= 16 {
            u16::MAX
        } else {
            ((1u32 << bits) - 1) as u16
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !is_ident(&self.name) {
            return Err(Error::Config("name must be a valid identifier"));
        }
        if self.addr_shift < 8 {
            return Err(Error::Config("addr_shift must leave room for the data byte"));
        }
        if self.read_flag_bit <= self.addr_shift {
            return Err(Error::Config("read_flag_bit must be above addr_shift"));
        }
        if self.read_flag_bit > 31 {
            return Err(Error::Config("read_flag_bit must fit in a 32-bit word"));
        }
        Ok(())
    }
}
