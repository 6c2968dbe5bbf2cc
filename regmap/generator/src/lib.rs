//! Register map generator.
//!
//! Turns a plain-text table of register bit-fields into Rust source holding a
//! shadow struct of the register map, byte packing/unpacking per address, and the
//! SPI word helpers used to write and read a register.
//!
//! ```
//! use regmap_gen::{generate, GeneratorConfig};
//!
//! let table = "\
//! ## PD_CONTROL
//! PD_IDAC     0x01[7]     1
//! PD_QDAC     0x01[6]     1
//! ";
//! let code = generate(table, &GeneratorConfig::new("dac_regs")).unwrap();
//! assert!(code.contains("pub struct DacRegs {"));
//! assert!(code.contains("reg |= (self.pd_idac & 0x01) << 7;"));
//! ```
//!
//! Build scripts normally call [`generate_file`] and `include!` the result:
//!
//! ```no_run
//! use std::{env, path::PathBuf};
//! use regmap_gen::{generate_file, GeneratorConfig};
//!
//! let out = PathBuf::from(env::var_os("OUT_DIR").unwrap()).join("dac_regs.rs");
//! generate_file("regs/dac.regs".as_ref(), &out, &GeneratorConfig::new("dac_regs")).unwrap();
//! ```

use std::{fs, path::Path};

mod config;
mod error;
mod render;
mod table;
mod util;
mod validate;

pub use config::GeneratorConfig;
pub use error::{EnumError, Error, SyntaxError};
pub use render::{check, render};
pub use table::{parse, BitRange, DefaultValue, EnumVariant, Field, RegisterMap, REGISTER_BITS};

/// Parse `source` and render it with `config`.
pub fn generate(source: &str, config: &GeneratorConfig) -> Result<String, Error> {
    let map = parse(source)?;
    render(&map, config)
}

/// Generate `output` from the table at `input`.
///
/// The output file is left untouched when its contents would not change.
pub fn generate_file(input: &Path, output: &Path, config: &GeneratorConfig) -> Result<(), Error> {
    let source = fs::read_to_string(input).map_err(|source| Error::Io {
        path: input.to_path_buf(),
        source,
    })?;
    let code = generate(&source, config)?;

    if fs::read_to_string(output).is_ok_and(|existing| existing == code) {
        log::debug!("{} is up to date", output.display());
        return Ok(());
    }

    fs::write(output, &code).map_err(|source| Error::Io {
        path: output.to_path_buf(),
        source,
    })?;
    log::info!(
        "generated {} from {}",
        output.display(),
        input.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    const TABLE: &str = "## PD_CONTROL\nPD_IDAC 0x01[7] 1\nPD_QDAC 0x01[6] 1\n";

    #[test]
    fn generate_reports_parse_errors() {
        let err = generate("PD_IDAC 0x01[9] 1", &GeneratorConfig::new("regs")).unwrap_err();
        assert_eq!(Some(1), err.line());
        assert_eq!("line 1: bit 9 is outside the register byte", err.to_string());
    }

    #[test]
    fn generate_file_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dac.regs");
        let output = dir.path().join("dac_regs.rs");
        fs::write(&input, TABLE).unwrap();

        generate_file(&input, &output, &GeneratorConfig::new("dac_regs")).unwrap();

        let code = fs::read_to_string(&output).unwrap();
        assert!(code.contains("pub struct DacRegs {"));
        assert!(code.contains("pub const PD_CONTROL: u16 = 0x01;"));
    }

    #[test]
    fn generate_file_skips_unchanged_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("dac.regs");
        let output = dir.path().join("dac_regs.rs");
        fs::write(&input, TABLE).unwrap();

        let config = GeneratorConfig::new("dac_regs");
        generate_file(&input, &output, &config).unwrap();
        let first: SystemTime = fs::metadata(&output).unwrap().modified().unwrap();

        generate_file(&input, &output, &config).unwrap();
        let second: SystemTime = fs::metadata(&output).unwrap().modified().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn generate_file_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.regs");
        let output = dir.path().join("out.rs");

        let err = generate_file(&input, &output, &GeneratorConfig::new("regs")).unwrap_err();
        match err {
            Error::Io { path, .. } => assert_eq!(input, path),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!output.exists());
    }
}
