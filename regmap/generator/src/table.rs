//! Register table model and parser.
//!
//! A table is a list of field lines:
//!
//! ```text
//! ## PD_CONTROL
//! PD_IDAC             0x01[7]     1
//! FRAME_PIN_USAGE     0x09[0:1]   0
//! FRAME_RESET_MODE    0x22[0:1]   fifo_and_nco    fifo, nco, fifo_and_nco, none
//! ```
//!
//! `#` starts a comment. A `## NAME` line names the register holding the fields
//! that follow it.

use std::collections::BTreeSet;

use crate::{
    error::{Error, SyntaxError},
    util::is_ident,
};

/// Registers are one byte wide.
pub const REGISTER_BITS: u8 = 8;

/// Inclusive bit positions of a field within its register byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    pub low: u8,
    pub high: u8,
}

impl BitRange {
    /// Build a range from its two ends, in either order.
    pub fn new(a: u8, b: u8) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub const fn width(&self) -> u8 {
        self.high - self.low + 1
    }

    /// Right-aligned mask covering `width()` bits.
    pub const fn mask(&self) -> u8 {
        ((1u16 << self.width()) - 1) as u8
    }

    pub const fn overlaps(&self, other: &BitRange) -> bool {
        self.low <= other.high && other.low <= self.high
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub value: u32,
}

/// The default column, either a number or the name of an enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    Number(u32),
    Variant(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    /// Name from the closest preceding `## NAME` header.
    pub register: Option<String>,
    pub address: u16,
    pub bits: BitRange,
    pub default: DefaultValue,
    pub variants: Vec<EnumVariant>,
    /// 1-based line in the table.
    pub line: usize,
}

impl Field {
    pub const fn mask(&self) -> u8 {
        self.bits.mask()
    }

    pub const fn shift(&self) -> u32 {
        self.bits.low as u32
    }

    pub const fn width(&self) -> u8 {
        self.bits.width()
    }

    /// Reserved fields keep their default and are not exposed for writing.
    pub fn is_reserved(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with("reserved")
    }

    pub fn has_enum(&self) -> bool {
        !self.variants.is_empty()
    }

    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// The default as a raw field value, resolving variant names.
    pub fn default_value(&self) -> Option<u32> {
        match &self.default {
            DefaultValue::Number(value) => Some(*value),
            DefaultValue::Variant(name) => self.variant(name).map(|v| v.value),
        }
    }

    /// The variant selected by the default, for enum fields.
    pub fn default_variant(&self) -> Option<&EnumVariant> {
        match &self.default {
            DefaultValue::Number(value) => self.variants.iter().find(|v| v.value == *value),
            DefaultValue::Variant(name) => self.variant(name),
        }
    }
}

/// A parsed and validated register table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterMap {
    fields: Vec<Field>,
}

impl RegisterMap {
    /// Build a map from already parsed fields, validating them.
    pub fn new(fields: Vec<Field>) -> Result<Self, Error> {
        let map = Self { fields };
        map.validate()?;
        Ok(map)
    }

    /// All fields in table order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Distinct addresses that hold at least one field, ascending.
    pub fn addresses(&self) -> Vec<u16> {
        self.fields
            .iter()
            .map(|f| f.address)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Fields at `address` in table order.
    pub fn fields_at(&self, address: u16) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.address == address)
    }

    /// Named registers as `(name, address)`, ascending by address.
    /// Validation guarantees one name per address.
    pub fn registers(&self) -> Vec<(&str, u16)> {
        let mut registers: Vec<(&str, u16)> = Vec::new();
        for field in &self.fields {
            if let Some(register) = field.register.as_deref() {
                if !registers.iter().any(|&(_, a)| a == field.address) {
                    registers.push((register, field.address));
                }
            }
        }
        registers.sort_by_key(|&(_, address)| address);
        registers
    }
}

/// Parse and validate a register table.
pub fn parse(source: &str) -> Result<RegisterMap, Error> {
    let mut fields = Vec::new();
    let mut register: Option<String> = None;

    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();

        if let Some(name) = header(trimmed) {
            register = Some(name.to_string());
            continue;
        }

        let text = match trimmed.find('#') {
            Some(pos) => trimmed[..pos].trim_end(),
            None => trimmed,
        };
        if text.is_empty() {
            continue;
        }

        let field = parse_field(text, register.clone())
            .map_err(|kind| Error::Syntax { line, kind })?;
        log::trace!(
            "line {}: {} @ {:#04x}[{}:{}]",
            line,
            field.name,
            field.address,
            field.bits.low,
            field.bits.high
        );
        fields.push(Field { line, ..field });
    }

    let map = RegisterMap::new(fields)?;
    log::debug!(
        "parsed {} fields across {} registers",
        map.fields().len(),
        map.addresses().len()
    );
    Ok(map)
}

/// `## NAME` register header.
fn header(line: &str) -> Option<&str> {
    let name = line.strip_prefix("##")?.trim();
    is_ident(name).then_some(name)
}

fn parse_field(text: &str, register: Option<String>) -> Result<Field, SyntaxError> {
    let mut tokens = text.split_whitespace();
    let (Some(name), Some(location), Some(default)) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(SyntaxError::MissingColumns);
    };

    if !is_ident(name) {
        return Err(SyntaxError::InvalidName(name.to_string()));
    }

    let (address, bits) = parse_location(location)?;

    let default = match parse_number(default) {
        Some(value) => DefaultValue::Number(value),
        None if is_ident(default) => DefaultValue::Variant(default.to_string()),
        None => return Err(SyntaxError::InvalidNumber(default.to_string())),
    };

    let rest = tokens.collect::<Vec<_>>().join(" ");
    let variants = if rest.is_empty() {
        Vec::new()
    } else {
        parse_variants(&rest)?
    };

    Ok(Field {
        name: name.to_string(),
        register,
        address,
        bits,
        default,
        variants,
        line: 0,
    })
}

/// `ADDR[BITS]`
fn parse_location(location: &str) -> Result<(u16, BitRange), SyntaxError> {
    let invalid = || SyntaxError::InvalidBitRange(location.to_string());

    let (address, rest) = location.split_once('[').ok_or_else(invalid)?;
    let bits = rest.strip_suffix(']').ok_or_else(invalid)?;

    let address = parse_number(address)
        .and_then(|a| u16::try_from(a).ok())
        .ok_or_else(|| SyntaxError::InvalidAddress(address.to_string()))?;

    let bit = |s: &str| -> Result<u8, SyntaxError> {
        let bit = parse_number(s.trim()).ok_or_else(invalid)?;
        if bit >= REGISTER_BITS as u32 {
            return Err(SyntaxError::BitOutOfRange(bit));
        }
        Ok(bit as u8)
    };

    let bits = match bits.split_once(':') {
        Some((a, b)) => BitRange::new(bit(a)?, bit(b)?),
        None => {
            let b = bit(bits)?;
            BitRange::new(b, b)
        }
    };

    Ok((address, bits))
}

/// `name, name=value, ...`
fn parse_variants(text: &str) -> Result<Vec<EnumVariant>, SyntaxError> {
    text.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(index, entry)| {
            let (name, value) = match entry.split_once('=') {
                Some((name, value)) => {
                    let value = parse_number(value.trim())
                        .ok_or_else(|| SyntaxError::InvalidEnum(entry.to_string()))?;
                    (name.trim(), value)
                }
                None => (entry, index as u32),
            };
            if !is_ident(name) {
                return Err(SyntaxError::InvalidEnum(entry.to_string()));
            }
            Ok(EnumVariant {
                name: name.to_string(),
                value,
            })
        })
        .collect()
}

/// Decimal, `0x` hex or `0b` binary.
pub fn parse_number(text: &str) -> Option<u32> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2).ok()
    } else if text.starts_with(|c: char| c.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}
