use std::{env, path::PathBuf};

use regmap_gen::{generate_file, GeneratorConfig};

const TABLE: &str = "regs/ad9142a.regs";

fn main() {
    println!("cargo:rerun-if-changed={TABLE}");

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let config = GeneratorConfig::new("ad9142a_regs").with_source_name("ad9142a.regs");

    if let Err(err) = generate_file(TABLE.as_ref(), &out_dir.join("ad9142a_regs.rs"), &config) {
        panic!("{TABLE}: {err}");
    }
}
