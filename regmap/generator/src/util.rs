//! Identifier and literal helpers for the rendered source.

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "do", "dyn", "else",
    "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro",
    "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return", "self", "static",
    "struct", "super", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

/// `true` for names usable as table identifiers: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Struct field name for a table field, e.g. `DATA_CNTR_1_Reserved` -> `data_cntr_1_reserved`.
pub fn snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 1);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        result.push('_');
    }
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
        } else if !result.ends_with('_') {
            result.push('_');
        }
    }
    tweak_keyword(result)
}

/// Type or variant name, e.g. `INTERPOLATION_MODE` -> `InterpolationMode`, `fifo_and_nco` -> `FifoAndNco`.
pub fn camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        result.push('_');
    }
    let mut upper_next = true;
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            upper_next = true;
        } else if upper_next {
            result.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            result.push(c.to_ascii_lowercase());
        }
    }
    tweak_keyword(result)
}

/// Constant name, e.g. `pll_ctrl0` -> `PLL_CTRL0`.
pub fn const_case(name: &str) -> String {
    snake_case(name).trim_end_matches('_').to_ascii_uppercase()
}

fn tweak_keyword(name: String) -> String {
    if KEYWORDS.contains(&name.as_str()) || name == "Self" {
        name + "_"
    } else {
        name
    }
}

/// Two-digit hex literal for register addresses and byte values.
pub fn hex_u8(value: impl Into<u32>) -> String {
    format!("{:#04x}", value.into())
}
