//! Rust source output for a [`RegisterMap`].
//!
//! The output only needs `core`, plus `num_traits` and `num_derive` when a field
//! carries an enum, so it can be `include!`d from a `no_std` driver crate.
//!
//! ```text
//! pub enum FrameResetMode { .. }        one per enum field
//! pub mod addr { .. }                   one constant per named register
//! pub struct Ad9142aRegs { .. }         one member per field
//! impl Ad9142aRegs {
//!     ADDRESSES, get_reg, set_reg,
//!     get_write_reg, get_read_reg,
//!     changed_addresses
//! }
//! ```

use std::fmt::Write;

use crate::{
    config::GeneratorConfig,
    error::Error,
    table::{Field, RegisterMap},
    util::{camel_case, const_case, hex_u8, snake_case},
};

/// Check that `map` can be rendered with `config`, without rendering it.
pub fn check(map: &RegisterMap, config: &GeneratorConfig) -> Result<(), Error> {
    config.validate()?;
    if map.fields().is_empty() {
        return Err(Error::EmptyTable);
    }

    let max = config.max_address();
    if let Some(field) = map.fields().iter().find(|f| f.address > max) {
        return Err(Error::AddressRange {
            name: field.name.clone(),
            address: field.address,
            max,
        });
    }
    Ok(())
}

/// Render `map` as Rust source.
pub fn render(map: &RegisterMap, config: &GeneratorConfig) -> Result<String, Error> {
    check(map, config)?;

    let mut out = String::new();
    writeln!(
        out,
        "// Generated by regmap-gen from `{}`. Do not edit.",
        config.source_name()
    )?;

    for field in map.fields().iter().filter(|f| f.has_enum()) {
        write_enum(&mut out, field)?;
    }

    write_addr_module(&mut out, map)?;
    write_struct(&mut out, map, config)?;
    write_impl(&mut out, map, config)?;

    log::debug!(
        "rendered {} with {} fields, {} bytes",
        config.struct_name(),
        map.fields().len(),
        out.len()
    );
    Ok(out)
}

fn write_enum(out: &mut String, field: &Field) -> Result<(), Error> {
    writeln!(out)?;
    writeln!(out, "/// Values of the `{}` field.", field.name)?;
    writeln!(
        out,
        "#[derive(Clone, Copy, Debug, PartialEq, Eq, num_derive::FromPrimitive)]"
    )?;
    writeln!(out, "#[repr(u8)]")?;
    writeln!(out, "pub enum {} {{", camel_case(&field.name))?;
    for variant in &field.variants {
        writeln!(
            out,
            "    {} = {},",
            camel_case(&variant.name),
            hex_u8(variant.value)
        )?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn write_addr_module(out: &mut String, map: &RegisterMap) -> Result<(), Error> {
    let registers = map.registers();
    if registers.is_empty() {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "/// Register addresses.")?;
    writeln!(out, "pub mod addr {{")?;
    for (name, address) in registers {
        writeln!(
            out,
            "    pub const {}: u16 = {};",
            const_case(name),
            hex_u8(address)
        )?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn write_struct(out: &mut String, map: &RegisterMap, config: &GeneratorConfig) -> Result<(), Error> {
    let name = config.struct_name();

    writeln!(out)?;
    writeln!(out, "/// Shadow copy of the `{}` register map.", config.name)?;
    writeln!(out, "#[derive(Clone, Copy, Debug, PartialEq, Eq)]")?;
    writeln!(out, "pub struct {name} {{")?;
    for field in map.fields() {
        writeln!(out, "    /// `{}` at `{}`.", field.name, location(field))?;
        let vis = if field.is_reserved() { "" } else { "pub " };
        writeln!(
            out,
            "    {vis}{}: {},",
            snake_case(&field.name),
            field_type(field)
        )?;
    }
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "impl Default for {name} {{")?;
    writeln!(out, "    fn default() -> Self {{")?;
    writeln!(out, "        Self::DEFAULT")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    Ok(())
}

fn write_impl(out: &mut String, map: &RegisterMap, config: &GeneratorConfig) -> Result<(), Error> {
    let addresses = map.addresses();

    writeln!(out)?;
    writeln!(out, "impl {} {{", config.struct_name())?;

    writeln!(out, "    /// Every field at its table default.")?;
    writeln!(out, "    pub const DEFAULT: Self = Self {{")?;
    for field in map.fields() {
        writeln!(
            out,
            "        {}: {},",
            snake_case(&field.name),
            default_expr(field)
        )?;
    }
    writeln!(out, "    }};")?;
    writeln!(out)?;

    writeln!(
        out,
        "    /// Every address that holds at least one field, ascending."
    )?;
    writeln!(
        out,
        "    pub const ADDRESSES: [u16; {}] = [",
        addresses.len()
    )?;
    for chunk in addresses.chunks(8) {
        let line: Vec<String> = chunk.iter().map(|&a| hex_u8(a)).collect();
        writeln!(out, "        {},", line.join(", "))?;
    }
    writeln!(out, "    ];")?;
    writeln!(out)?;

    writeln!(out, "    /// Pack the fields of register `addr` into its byte value.")?;
    writeln!(out, "    pub fn get_reg(&self, addr: u16) -> u8 {{")?;
    writeln!(out, "        let mut reg: u8 = 0;")?;
    writeln!(out, "        match addr {{")?;
    for &address in &addresses {
        writeln!(out, "            {} => {{", hex_u8(address))?;
        for field in map.fields_at(address) {
            writeln!(out, "                reg |= {};", pack_expr(field))?;
        }
        writeln!(out, "            }}")?;
    }
    writeln!(out, "            _ => {{}}")?;
    writeln!(out, "        }}")?;
    writeln!(out, "        reg")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    /// Unpack a byte read from register `addr` into its fields.")?;
    writeln!(out, "    pub fn set_reg(&mut self, addr: u16, reg: u8) {{")?;
    writeln!(out, "        match addr {{")?;
    for &address in &addresses {
        writeln!(out, "            {} => {{", hex_u8(address))?;
        for field in map.fields_at(address) {
            let member = snake_case(&field.name);
            let bits = unpack_expr(field);
            if field.has_enum() {
                writeln!(
                    out,
                    "                if let Some(value) = <{} as num_traits::FromPrimitive>::from_u8({bits}) {{",
                    camel_case(&field.name)
                )?;
                writeln!(out, "                    self.{member} = value;")?;
                writeln!(out, "                }}")?;
            } else {
                writeln!(out, "                self.{member} = {bits};")?;
            }
        }
        writeln!(out, "            }}")?;
    }
    writeln!(out, "            _ => {{}}")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(
        out,
        "    /// The SPI word that writes the current value of register `addr`."
    )?;
    writeln!(out, "    pub fn get_write_reg(&self, addr: u16) -> u32 {{")?;
    writeln!(
        out,
        "        (u32::from(addr) << {}) | u32::from(self.get_reg(addr))",
        config.addr_shift
    )?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(out, "    /// The SPI word that reads register `addr`.")?;
    writeln!(out, "    pub fn get_read_reg(addr: u16) -> u32 {{")?;
    writeln!(
        out,
        "        (u32::from(addr) << {}) | (1 << {})",
        config.addr_shift, config.read_flag_bit
    )?;
    writeln!(out, "    }}")?;
    writeln!(out)?;

    writeln!(
        out,
        "    /// Addresses whose packed value differs from `previous`, ascending."
    )?;
    writeln!(
        out,
        "    pub fn changed_addresses<'a>(&'a self, previous: &'a Self) -> impl Iterator<Item = u16> + 'a {{"
    )?;
    writeln!(out, "        Self::ADDRESSES")?;
    writeln!(out, "            .into_iter()")?;
    writeln!(
        out,
        "            .filter(move |&addr| self.get_reg(addr) != previous.get_reg(addr))"
    )?;
    writeln!(out, "    }}")?;

    writeln!(out, "}}")?;
    Ok(())
}

fn location(field: &Field) -> String {
    if field.bits.low == field.bits.high {
        format!("{}[{}]", hex_u8(field.address), field.bits.low)
    } else {
        format!(
            "{}[{}:{}]",
            hex_u8(field.address),
            field.bits.low,
            field.bits.high
        )
    }
}

fn field_type(field: &Field) -> String {
    if field.has_enum() {
        camel_case(&field.name)
    } else {
        "u8".to_string()
    }
}

fn default_expr(field: &Field) -> String {
    match field.default_variant() {
        Some(variant) if field.has_enum() => {
            format!("{}::{}", camel_case(&field.name), camel_case(&variant.name))
        }
        _ => hex_u8(field.default_value().unwrap_or(0)),
    }
}

/// `(value & mask) << shift`, without the no-op parts.
fn pack_expr(field: &Field) -> String {
    let member = snake_case(&field.name);
    let value = if field.has_enum() {
        format!("(self.{member} as u8)")
    } else {
        format!("self.{member}")
    };

    match (field.mask(), field.shift()) {
        (0xFF, _) => value,
        (mask, 0) => format!("{value} & {}", hex_u8(mask)),
        (mask, shift) => format!("({value} & {}) << {shift}", hex_u8(mask)),
    }
}

/// `(reg >> shift) & mask`, without the no-op parts.
fn unpack_expr(field: &Field) -> String {
    match (field.mask(), field.shift()) {
        (0xFF, _) => "reg".to_string(),
        (mask, 0) => format!("reg & {}", hex_u8(mask)),
        (mask, shift) => format!("(reg >> {shift}) & {}", hex_u8(mask)),
    }
}

#[cfg(test)]
mod tests {
    use crate::table::parse;

    use super::*;

    const TABLE: &str = "\
## PD_CONTROL
PD_IDAC             0x01[7]     1
PD_QDAC             0x01[6]     1
PD_FRAME            0x01[0]     0
## DATA_CNTR_1
CLEAR_WARN          0x0B[7]     0
DATA_CNTR_1_Reserved  0x0B[0:6] 0x39
## CHIP_ID
CHIP_ID             0x1F[0:7]   0xA
## INTERPOLATION_CTRL
INTERPOLATION_MODE  0x28[0:1]   x2      x2, x4, x8
";

    fn rendered() -> String {
        let map = parse(TABLE).unwrap();
        render(&map, &GeneratorConfig::new("ad9142a_regs").with_source_name("ad9142a.regs"))
            .unwrap()
    }

    #[test]
    fn header_names_source() {
        assert!(rendered().starts_with("// Generated by regmap-gen from `ad9142a.regs`."));
    }

    #[test]
    fn struct_members() {
        let code = rendered();
        assert!(code.contains("pub struct Ad9142aRegs {"));
        assert!(code.contains("    /// `PD_IDAC` at `0x01[7]`.\n    pub pd_idac: u8,"));
        assert!(code.contains("    pub chip_id: u8,"));
        assert!(code.contains("    pub interpolation_mode: InterpolationMode,"));
        // reserved bits are private
        assert!(code.contains("    data_cntr_1_reserved: u8,"));
        assert!(!code.contains("pub data_cntr_1_reserved"));
    }

    #[test]
    fn defaults() {
        let code = rendered();
        assert!(code.contains("        pd_idac: 0x01,"));
        assert!(code.contains("        data_cntr_1_reserved: 0x39,"));
        assert!(code.contains("        chip_id: 0x0a,"));
        assert!(code.contains("        interpolation_mode: InterpolationMode::X2,"));
    }

    #[test]
    fn enums() {
        let code = rendered();
        assert!(code.contains(
            "#[repr(u8)]\npub enum InterpolationMode {\n    X2 = 0x00,\n    X4 = 0x01,\n    X8 = 0x02,\n}"
        ));
    }

    #[test]
    fn addr_constants() {
        let code = rendered();
        assert!(code.contains("    pub const PD_CONTROL: u16 = 0x01;"));
        assert!(code.contains("    pub const CHIP_ID: u16 = 0x1f;"));
    }

    #[test]
    fn get_reg_packs_every_field() {
        let code = rendered();
        assert!(code.contains("pub const ADDRESSES: [u16; 4] = [\n        0x01, 0x0b, 0x1f, 0x28,\n    ];"));
        assert!(code.contains(
            "            0x01 => {\n                reg |= (self.pd_idac & 0x01) << 7;\n                reg |= (self.pd_qdac & 0x01) << 6;\n                reg |= self.pd_frame & 0x01;\n            }"
        ));
        assert!(code.contains("                reg |= self.data_cntr_1_reserved & 0x7f;"));
        assert!(code.contains("                reg |= self.chip_id;"));
        assert!(code.contains("                reg |= (self.interpolation_mode as u8) & 0x03;"));
    }

    #[test]
    fn set_reg_unpacks_every_field() {
        let code = rendered();
        assert!(code.contains("                self.pd_idac = (reg >> 7) & 0x01;"));
        assert!(code.contains("                self.chip_id = reg;"));
        assert!(code.contains(
            "if let Some(value) = <InterpolationMode as num_traits::FromPrimitive>::from_u8(reg & 0x03) {"
        ));
    }

    #[test]
    fn spi_word_helpers() {
        let code = rendered();
        assert!(code.contains("        (u32::from(addr) << 8) | u32::from(self.get_reg(addr))"));
        assert!(code.contains("        (u32::from(addr) << 8) | (1 << 23)"));

        let map = parse(TABLE).unwrap();
        let config = GeneratorConfig::new("regs")
            .with_addr_shift(8)
            .with_read_flag_bit(15);
        let code = render(&map, &config).unwrap();
        assert!(code.contains("pub struct Regs {"));
        assert!(code.contains("        (u32::from(addr) << 8) | (1 << 15)"));
    }

    #[test]
    fn rejects_addresses_beyond_the_word() {
        let map = parse("FAR 0x80[0] 0").unwrap();
        let config = GeneratorConfig::new("regs").with_read_flag_bit(15);
        let err = render(&map, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::AddressRange {
                address: 0x80,
                max: 0x7F,
                ..
            }
        ));
    }

    #[test]
    fn check_agrees_with_render() {
        let map = parse("FAR 0x8000[0] 0").unwrap();
        let config = GeneratorConfig::new("regs");
        assert!(matches!(
            check(&map, &config),
            Err(Error::AddressRange { address: 0x8000, max: 0x7FFF, .. })
        ));
        assert!(render(&map, &config).is_err());

        check(&parse(TABLE).unwrap(), &config).unwrap();
    }

    #[test]
    fn rejects_empty_tables() {
        let map = parse("# nothing here\n").unwrap();
        let err = render(&map, &GeneratorConfig::new("regs")).unwrap_err();
        assert!(matches!(err, Error::EmptyTable));
    }
}
