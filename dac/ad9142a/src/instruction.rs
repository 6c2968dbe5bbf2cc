use bitfield::bitfield;

use crate::Ad9142aRegs;

bitfield! {
    /// The 24 bit SPI word, clocked out MSB first.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Instruction(u32);
    impl Debug;
    /// Set for a read, cleared for a write.
    pub is_read, set_read: 23;
    pub u16, address, set_address: 22, 8;
    /// Ignored by the chip for reads.
    pub u8, data, set_data: 7, 0;
}

impl Instruction {
    /// Write the current shadow value of `addr`.
    pub fn write_reg(regs: &Ad9142aRegs, addr: u16) -> Self {
        Self(regs.get_write_reg(addr))
    }

    pub fn read_reg(addr: u16) -> Self {
        Self(Ad9142aRegs::get_read_reg(addr))
    }

    pub fn to_bytes(self) -> [u8; 3] {
        let [_, high, low, data] = self.0.to_be_bytes();
        [high, low, data]
    }

    /// The read/write flag and address, without the data byte.
    pub fn header(self) -> [u8; 2] {
        let [high, low, _] = self.to_bytes();
        [high, low]
    }
}

#[cfg(test)]
mod tests {
    use crate::regs::addr;

    use super::*;

    #[test]
    fn write_reg() {
        let instruction = Instruction::write_reg(&Ad9142aRegs::DEFAULT, addr::PD_CONTROL);

        assert!(!instruction.is_read());
        assert_eq!(addr::PD_CONTROL, instruction.address());
        assert_eq!(0xC0, instruction.data());
        assert_eq!([0x00, 0x01, 0xC0], instruction.to_bytes());
    }

    #[test]
    fn read_reg() {
        let instruction = Instruction::read_reg(addr::CHIP_ID);

        assert!(instruction.is_read());
        assert_eq!(addr::CHIP_ID, instruction.address());
        assert_eq!([0x80, 0x1F, 0x00], instruction.to_bytes());
        assert_eq!([0x80, 0x1F], instruction.header());
    }

    #[test]
    fn fields() {
        let mut instruction = Instruction(0);
        instruction.set_read(true);
        instruction.set_address(0x65);
        instruction.set_data(0xA5);

        assert_eq!(0x80_65A5, instruction.0);
    }
}
