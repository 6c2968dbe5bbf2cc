//! The AD9142A register map, generated from `regs/ad9142a.regs` at build time.
//!
//! [`Ad9142aRegs`] is a shadow copy of every register field. Fields are changed in
//! memory and then packed per address with [`Ad9142aRegs::get_reg`].

include!(concat!(env!("OUT_DIR"), "/ad9142a_regs.rs"));
