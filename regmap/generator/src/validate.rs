use std::collections::HashMap;

use crate::{
    error::{EnumError, Error},
    table::{DefaultValue, Field, RegisterMap},
    util::{camel_case, const_case, snake_case},
};

impl RegisterMap {
    /// Check the table for conflicts a code generator cannot resolve.
    ///
    /// Names are compared by the identifier they render to, so `PD_IDAC` and
    /// `pd__idac` collide.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        let mut members: HashMap<String, usize> = HashMap::new();
        let mut enums: HashMap<String, usize> = HashMap::new();
        let mut registers: HashMap<String, u16> = HashMap::new();
        let mut names_by_address: HashMap<u16, &str> = HashMap::new();

        for (index, field) in self.fields().iter().enumerate() {
            if let Some(&first_line) = members.get(&snake_case(&field.name)) {
                return Err(Error::DuplicateField {
                    name: field.name.clone(),
                    line: field.line,
                    first_line,
                });
            }
            members.insert(snake_case(&field.name), field.line);

            if field.has_enum() {
                if let Some(&first_line) = enums.get(&camel_case(&field.name)) {
                    return Err(Error::DuplicateField {
                        name: field.name.clone(),
                        line: field.line,
                        first_line,
                    });
                }
                enums.insert(camel_case(&field.name), field.line);
            }

            if let Some(other) = self.fields()[..index]
                .iter()
                .find(|other| other.address == field.address && other.bits.overlaps(&field.bits))
            {
                return Err(Error::Overlap {
                    name: field.name.clone(),
                    other: other.name.clone(),
                    address: field.address,
                    line: field.line,
                });
            }

            if let Some(register) = field.register.as_deref() {
                let first = *registers
                    .entry(const_case(register))
                    .or_insert(field.address);
                if first != field.address {
                    return Err(Error::DuplicateRegister {
                        register: register.to_string(),
                        first,
                        line: field.line,
                    });
                }

                let named = *names_by_address.entry(field.address).or_insert(register);
                if named != register {
                    return Err(Error::RegisterConflict {
                        register: register.to_string(),
                        first: named.to_string(),
                        address: field.address,
                        line: field.line,
                    });
                }
            }

            if field.has_enum() {
                validate_variants(field)?;
            } else {
                validate_default(field)?;
            }
        }

        Ok(())
    }
}

fn validate_default(field: &Field) -> Result<(), Error> {
    match &field.default {
        DefaultValue::Number(default) if *default > u32::from(field.mask()) => {
            Err(Error::DefaultOverflow {
                name: field.name.clone(),
                default: *default,
                width: field.width(),
                line: field.line,
            })
        }
        DefaultValue::Number(_) => Ok(()),
        DefaultValue::Variant(name) => Err(enum_error(
            field,
            EnumError::UnknownDefault(name.clone()),
        )),
    }
}

fn validate_variants(field: &Field) -> Result<(), Error> {
    for (index, variant) in field.variants.iter().enumerate() {
        let earlier = &field.variants[..index];
        if earlier
            .iter()
            .any(|v| camel_case(&v.name) == camel_case(&variant.name))
        {
            return Err(enum_error(
                field,
                EnumError::DuplicateVariant(variant.name.clone()),
            ));
        }
        if let Some(other) = earlier.iter().find(|v| v.value == variant.value) {
            return Err(enum_error(
                field,
                EnumError::DuplicateValue {
                    variant: variant.name.clone(),
                    other: other.name.clone(),
                    value: variant.value,
                },
            ));
        }
        if variant.value > u32::from(field.mask()) {
            return Err(enum_error(
                field,
                EnumError::ValueOverflow {
                    variant: variant.name.clone(),
                    value: variant.value,
                    width: field.width(),
                },
            ));
        }
    }

    if field.default_variant().is_none() {
        let kind = match &field.default {
            DefaultValue::Number(value) => EnumError::UnmatchedDefault(*value),
            DefaultValue::Variant(name) => EnumError::UnknownDefault(name.clone()),
        };
        return Err(enum_error(field, kind));
    }

    Ok(())
}

fn enum_error(field: &Field, kind: EnumError) -> Error {
    Error::Enum {
        name: field.name.clone(),
        kind,
        line: field.line,
    }
}

#[cfg(test)]
mod tests {
    use crate::table::parse;

    use super::*;

    #[test]
    fn rejects_overlapping_bits() {
        let err = parse("A 0x0A[7] 0\nB 0x0A[0:3] 0\nC 0x0A[3:5] 0").unwrap_err();
        match err {
            Error::Overlap {
                name,
                other,
                address,
                line,
            } => {
                assert_eq!("C", name);
                assert_eq!("B", other);
                assert_eq!(0x0A, address);
                assert_eq!(3, line);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn same_bits_at_other_address_is_fine() {
        parse("SED_PATT_L_I0 0x61[0:7] 0\nSED_PATT_L_I1 0x65[0:7] 0").unwrap();
    }

    #[test]
    fn rejects_the_duplicated_sed_pattern_address() {
        let err = parse("SED_PATT_L_I0 0x61[0:7] 0\nSED_PATT_L_I1 0x61[0:7] 0").unwrap_err();
        assert!(matches!(err, Error::Overlap { address: 0x61, .. }));
        assert_eq!(Some(2), err.line());
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = parse("PD_IDAC 0x01[7] 0\npd_idac 0x02[7] 0").unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateField {
                line: 2,
                first_line: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_wide_defaults() {
        let err = parse("PLL_LOOP_BW 0x14[5:7] 0x8").unwrap_err();
        assert!(matches!(
            err,
            Error::DefaultOverflow {
                default: 8,
                width: 3,
                ..
            }
        ));

        parse("PLL_LOOP_BW 0x14[5:7] 0x7").unwrap();
        parse("NCO_FTW0 0x31[0:7] 0xFF").unwrap();
    }

    #[test]
    fn rejects_bad_variants() {
        let kind = |table: &str| match parse(table) {
            Err(Error::Enum { kind, .. }) => kind,
            other => panic!("expected enum error, got {other:?}"),
        };

        assert_eq!(
            EnumError::DuplicateVariant("x2".to_string()),
            kind("MODE 0x28[0:1] x2 x2, x2")
        );
        assert_eq!(
            EnumError::ValueOverflow {
                variant: "x16".to_string(),
                value: 4,
                width: 2
            },
            kind("MODE 0x28[0:1] x2 x2, x4, x8, x1, x16")
        );
        assert_eq!(
            EnumError::UnknownDefault("x1".to_string()),
            kind("MODE 0x28[0:1] x1 x2, x4, x8")
        );
        assert_eq!(
            EnumError::UnmatchedDefault(3),
            kind("MODE 0x28[0:1] 3 x2, x4, x8")
        );
        assert_eq!(
            EnumError::UnknownDefault("x2".to_string()),
            kind("MODE 0x28[0:1] x2")
        );
    }

    #[test]
    fn rejects_register_names_on_two_addresses() {
        let err = parse("## PLL_CTRL0\nPLL_ENABLE 0x12[7] 0\nPLL_LOOP_BW 0x14[5:7] 7").unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateRegister {
                first: 0x12,
                line: 3,
                ..
            }
        ));
    }

    #[test]
    fn rejects_names_that_render_alike() {
        let err = parse("A_B 0x01[0] 0\nA__B 0x01[1] 0").unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateField {
                line: 2,
                first_line: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_enum_types_that_render_alike() {
        let err = parse("MODE_X_2 0x28[0:1] a a, b\nMODE_X2 0x29[0:1] a a, b").unwrap_err();
        assert!(matches!(err, Error::DuplicateField { line: 2, .. }));

        // only enum fields become types
        parse("MODE_X_2 0x28[0:1] 0\nMODE_X2 0x29[0:1] a a, b").unwrap();
    }

    #[test]
    fn rejects_variants_that_render_alike() {
        let err = parse("MODE 0x28[0:1] x2 x2, X2").unwrap_err();
        assert!(matches!(
            err,
            Error::Enum {
                kind: EnumError::DuplicateVariant(ref name),
                ..
            } if name == "X2"
        ));
    }

    #[test]
    fn rejects_shared_variant_values() {
        let err = parse("MODE 0x28[0:1] a a=0, b=0").unwrap_err();
        match err {
            Error::Enum { kind, line, .. } => {
                assert_eq!(1, line);
                assert_eq!(
                    EnumError::DuplicateValue {
                        variant: "b".to_string(),
                        other: "a".to_string(),
                        value: 0
                    },
                    kind
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_register_names_that_render_alike() {
        let err =
            parse("## PLL_CTRL0\nPLL_ENABLE 0x12[7] 0\n## pll_ctrl0\nPLL_LOOP_BW 0x14[5:7] 7")
                .unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateRegister {
                first: 0x12,
                line: 4,
                ..
            }
        ));
    }

    #[test]
    fn rejects_two_names_for_one_register() {
        let err = parse("## PLL_CTRL0\nPLL_ENABLE 0x12[7] 0\n## PLL_MAIN\nPLL_RESET 0x12[6] 0")
            .unwrap_err();
        match err {
            Error::RegisterConflict {
                register,
                first,
                address,
                line,
            } => {
                assert_eq!("PLL_MAIN", register);
                assert_eq!("PLL_CTRL0", first);
                assert_eq!(0x12, address);
                assert_eq!(4, line);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
