use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Errors raised while parsing, validating or rendering a register table.
#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: {kind}")]
    Syntax { line: usize, kind: SyntaxError },

    #[error("line {line}: field `{name}` is already defined on line {first_line}")]
    DuplicateField {
        name: String,
        line: usize,
        first_line: usize,
    },

    #[error("line {line}: field `{name}` overlaps `{other}` in register {address:#04x}")]
    Overlap {
        name: String,
        other: String,
        address: u16,
        line: usize,
    },

    #[error("line {line}: default {default:#x} of `{name}` does not fit in {width} bit(s)")]
    DefaultOverflow {
        name: String,
        default: u32,
        width: u8,
        line: usize,
    },

    #[error("line {line}: field `{name}`: {kind}")]
    Enum {
        name: String,
        kind: EnumError,
        line: usize,
    },

    #[error("line {line}: register `{register}` already names address {first:#04x}")]
    DuplicateRegister {
        register: String,
        first: u16,
        line: usize,
    },

    #[error("line {line}: register {address:#04x} is already named `{first}`, not `{register}`")]
    RegisterConflict {
        register: String,
        first: String,
        address: u16,
        line: usize,
    },

    #[error("field `{name}` address {address:#x} exceeds the maximum address {max:#x}")]
    AddressRange { name: String, address: u16, max: u16 },

    #[error("the table defines no fields")]
    EmptyTable,

    #[error("invalid generator config: {0}")]
    Config(&'static str),

    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Format(#[from] fmt::Error),
}

/// The ways a single table line can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected `NAME ADDR[BITS] DEFAULT`")]
    MissingColumns,
    #[error("invalid field name `{0}`")]
    InvalidName(String),
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    #[error("invalid bit range `{0}`")]
    InvalidBitRange(String),
    #[error("bit {0} is outside the register byte")]
    BitOutOfRange(u32),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("invalid enum entry `{0}`")]
    InvalidEnum(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumError {
    #[error("variant `{0}` is listed twice")]
    DuplicateVariant(String),
    #[error("variant `{variant}` reuses value {value:#x} of `{other}`")]
    DuplicateValue {
        variant: String,
        other: String,
        value: u32,
    },
    #[error("variant `{variant}` value {value:#x} does not fit in {width} bit(s)")]
    ValueOverflow { variant: String, value: u32, width: u8 },
    #[error("default `{0}` is not one of the listed variants")]
    UnknownDefault(String),
    #[error("default {0:#x} matches no listed variant")]
    UnmatchedDefault(u32),
}

impl Error {
    /// The 1-based table line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Syntax { line, .. }
            | Error::DuplicateField { line, .. }
            | Error::Overlap { line, .. }
            | Error::DefaultOverflow { line, .. }
            | Error::Enum { line, .. }
            | Error::DuplicateRegister { line, .. }
            | Error::RegisterConflict { line, .. } => Some(*line),
            _ => None,
        }
    }
}
