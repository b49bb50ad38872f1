//! Classes and singletons supplied by the C runtime.
//!
//! Method names here are the names the runtime header declares, so user code
//! that overrides `STRING` or calls `PLUS` lands on the same slot.

pub const OBJ: &str = "Obj";
pub const STRING: &str = "String";
pub const INT: &str = "Int";
pub const BOOLEAN: &str = "Boolean";
pub const NOTHING: &str = "Nothing";

/// Extern object for the Boolean `true`.
pub const LIT_TRUE: &str = "lit_true";
/// Extern object for the Boolean `false`.
pub const LIT_FALSE: &str = "lit_false";
/// Extern object for the unique `none` value.
pub const NOTHING_VALUE: &str = "nothing";
/// Runtime constructor boxing a C integer.
pub const INT_LITERAL: &str = "int_literal";
/// Runtime constructor boxing a C string.
pub const STR_LITERAL: &str = "str_literal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinMethod {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub returns: &'static str,
}

/// A runtime class and the methods it introduces or overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinClass {
    pub name: &'static str,
    pub superclass: Option<&'static str>,
    pub methods: &'static [BuiltinMethod],
}

const fn method(
    name: &'static str,
    params: &'static [&'static str],
    returns: &'static str,
) -> BuiltinMethod {
    BuiltinMethod {
        name,
        params,
        returns,
    }
}

/// Parents come before children.
pub const BUILTINS: &[BuiltinClass] = &[
    BuiltinClass {
        name: OBJ,
        superclass: None,
        methods: &[
            method("STRING", &[], STRING),
            method("PRINT", &[], OBJ),
            method("EQUALS", &[OBJ], BOOLEAN),
        ],
    },
    BuiltinClass {
        name: STRING,
        superclass: Some(OBJ),
        methods: &[
            method("STRING", &[], STRING),
            method("PRINT", &[], STRING),
            method("EQUALS", &[OBJ], BOOLEAN),
            method("LESS", &[STRING], BOOLEAN),
        ],
    },
    BuiltinClass {
        name: BOOLEAN,
        superclass: Some(OBJ),
        methods: &[method("STRING", &[], STRING)],
    },
    BuiltinClass {
        name: NOTHING,
        superclass: Some(OBJ),
        methods: &[method("STRING", &[], STRING)],
    },
    BuiltinClass {
        name: INT,
        superclass: Some(OBJ),
        methods: &[
            method("STRING", &[], STRING),
            method("EQUALS", &[OBJ], BOOLEAN),
            method("LESS", &[INT], BOOLEAN),
            method("PLUS", &[INT], INT),
        ],
    },
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.iter().any(|class| class.name == name)
}

pub fn builtin(name: &str) -> Option<&'static BuiltinClass> {
    BUILTINS.iter().find(|class| class.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_precede_children() {
        for (index, class) in BUILTINS.iter().enumerate() {
            if let Some(parent) = class.superclass {
                let parent_index = BUILTINS.iter().position(|c| c.name == parent).unwrap();
                assert!(parent_index < index, "{} before {}", parent, class.name);
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert!(is_builtin("Int"));
        assert!(!is_builtin("Pt"));
        assert_eq!(builtin("Boolean").unwrap().superclass, Some(OBJ));
    }
}
