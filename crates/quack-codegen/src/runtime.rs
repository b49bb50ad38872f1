//! C names for the runtime object model.
//!
//! Every class `X` is a pair of struct references: `obj_X` points at an
//! instance (class pointer first, then fields) and `class_X` at its method
//! table. `the_class_X` is the single statically allocated table.
//!
//! Locals, formals and fields are written as `q_<name>`. No runtime symbol,
//! generated temporary or C keyword starts with `q_`, so a Quack name can
//! never capture one of them.

use std::fmt::Write;

use quack_ir::Handle;

pub(crate) fn obj_type(class: &str) -> String {
    format!("obj_{}", class)
}

/// C identifier of a Quack local, formal parameter or field.
pub(crate) fn user_ident(name: &str) -> String {
    format!("q_{}", name)
}

/// C expression naming a handle.
pub(crate) fn handle(value: &Handle) -> String {
    match value {
        Handle::Local(name) => user_ident(name),
        other => other.to_string(),
    }
}

pub(crate) fn class_type(class: &str) -> String {
    format!("class_{}", class)
}

pub(crate) fn obj_struct(class: &str) -> String {
    format!("obj_{}_struct", class)
}

pub(crate) fn class_struct(class: &str) -> String {
    format!("class_{}_struct", class)
}

pub(crate) fn class_singleton(class: &str) -> String {
    format!("the_class_{}", class)
}

pub(crate) fn method_symbol(class: &str, method: &str) -> String {
    format!("{}_method_{}", class, method)
}

pub(crate) fn constructor_symbol(class: &str) -> String {
    format!("new_{}", class)
}

/// Comma-separated parameter types, `void` when there are none.
pub(crate) fn param_types<'t>(types: impl IntoIterator<Item = &'t str>) -> String {
    let types: Vec<_> = types.into_iter().map(obj_type).collect();
    if types.is_empty() {
        "void".to_string()
    } else {
        types.join(", ")
    }
}

/// A double-quoted C string literal.
pub(crate) fn c_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
