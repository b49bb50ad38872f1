//! Checked-program descriptors handed over by the type checker.
//!
//! These are consumed, never built or mutated, by the back end. The checker has
//! already verified the class hierarchy and method signatures.

use std::path::PathBuf;

use indexmap::IndexMap;
use quack_ast::{Node, NodeKind, TreeError};
use serde::{Deserialize, Serialize};

use crate::builtins;

/// Names to declared or inferred types, in declaration order.
pub type SymbolTable = IndexMap<String, String>;

/// A named, typed formal parameter or field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formal {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl Formal {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

fn nothing_type() -> String {
    builtins::NOTHING.to_string()
}

fn obj_type() -> String {
    builtins::OBJ.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub formals: Vec<Formal>,
    #[serde(default = "nothing_type")]
    pub returns: String,
    #[serde(default)]
    pub locals: SymbolTable,
    pub body: Node,
}

/// Explicit constructor. The receiver `this` is implicit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDescriptor {
    #[serde(default)]
    pub formals: Vec<Formal>,
    #[serde(default)]
    pub locals: SymbolTable,
    pub body: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(rename = "super", default = "obj_type")]
    pub superclass: String,
    /// Fields this class declares, in declaration order
    #[serde(default)]
    pub fields: Vec<Formal>,
    /// `None` when the source has no explicit constructor
    #[serde(default)]
    pub constructor: Option<ConstructorDescriptor>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

/// The program's top-level statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainDescriptor {
    #[serde(default)]
    pub locals: SymbolTable,
    pub body: Node,
}

/// Everything the back end needs for one compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckedProgram {
    /// Path of the Quack source the tree came from, for diagnostics
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
    pub main: MainDescriptor,
}

impl CheckedProgram {
    /// Reassembles the whole program as one `program` tree.
    pub fn to_tree(&self) -> Result<Node, TreeError> {
        let mut classes = Node::new(NodeKind::Classes)?;
        for class in &self.classes {
            classes.insert(class.to_tree()?)?;
        }
        Node::new(NodeKind::Program)?
            .with_child(classes)?
            .with_child(self.main.body.clone())
    }
}

impl ClassDescriptor {
    /// The first `formal_args` child lists the fields. A second one, followed
    /// by a block, is the explicit constructor.
    fn to_tree(&self) -> Result<Node, TreeError> {
        let mut class = Node::new(NodeKind::Class)?
            .with_child(Node::ident(&self.name))?
            .with_child(Node::ident(&self.superclass))?
            .with_child(formal_args(&self.fields)?)?;
        if let Some(constructor) = &self.constructor {
            class.insert(formal_args(&constructor.formals)?)?;
            class.insert(constructor.body.clone())?;
        }

        let mut methods = Node::new(NodeKind::Methods)?;
        for method in &self.methods {
            let node = Node::new(NodeKind::Method)?
                .with_child(Node::ident(&method.name))?
                .with_child(Node::ident(&method.returns))?
                .with_child(formal_args(&method.formals)?)?
                .with_child(method.body.clone())?;
            methods.insert(node)?;
        }
        class.with_child(methods)
    }
}

fn formal_args(formals: &[Formal]) -> Result<Node, TreeError> {
    let mut list = Node::new(NodeKind::FormalArgs)?;
    for formal in formals {
        let node = Node::new(NodeKind::Formal)?
            .with_child(Node::ident(&formal.name))?
            .with_child(Node::ident(&formal.ty))?;
        list.insert(node)?;
    }
    Ok(list)
}

/// Name-keyed view over the declared classes, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ClassTable<'a> {
    classes: IndexMap<&'a str, &'a ClassDescriptor>,
}

impl<'a> ClassTable<'a> {
    pub fn new(classes: &'a [ClassDescriptor]) -> Self {
        Self {
            classes: classes.iter().map(|c| (c.name.as_str(), c)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a ClassDescriptor> {
        self.classes.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ClassDescriptor> + '_ {
        self.classes.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = r#"{
        "classes": [{
            "name": "Pt",
            "fields": [{ "name": "x", "type": "Int" }],
            "methods": [{
                "name": "GETX",
                "returns": "Int",
                "body": { "kind": "block" }
            }]
        }],
        "main": {
            "locals": { "p": "Pt" },
            "body": { "kind": "block" }
        }
    }"#;

    #[test]
    fn test_defaults_when_decoding() {
        let program: CheckedProgram = serde_json::from_str(PROGRAM).unwrap();
        let class = &program.classes[0];
        assert_eq!(class.superclass, "Obj");
        assert!(class.constructor.is_none());
        assert_eq!(class.methods[0].returns, "Int");
        assert!(class.methods[0].formals.is_empty());
        assert_eq!(program.main.locals.get("p").map(String::as_str), Some("Pt"));
        assert!(program.source.is_none());
    }

    #[test]
    fn test_class_table_keeps_declaration_order() {
        let classes = vec![
            ClassDescriptor {
                name: "B".into(),
                superclass: "A".into(),
                fields: vec![],
                constructor: None,
                methods: vec![],
            },
            ClassDescriptor {
                name: "A".into(),
                superclass: "Obj".into(),
                fields: vec![],
                constructor: None,
                methods: vec![],
            },
        ];
        let table = ClassTable::new(&classes);
        let names: Vec<_> = table.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(table.contains("A"));
        assert!(table.get("C").is_none());
    }

    #[test]
    fn test_program_tree() {
        let program: CheckedProgram = serde_json::from_str(PROGRAM).unwrap();
        let tree = program.to_tree().unwrap();
        let class = tree
            .get(NodeKind::Classes)
            .and_then(|c| c.get(NodeKind::Class))
            .unwrap();
        let names: Vec<_> = class
            .get_all(NodeKind::Ident)
            .iter()
            .filter_map(Node::text)
            .collect();
        assert_eq!(names, vec!["Pt", "Obj"]);

        let lists = class.get_all(NodeKind::FormalArgs);
        assert_eq!(lists.len(), 1);
        let field = lists[0].get(NodeKind::Formal).unwrap();
        let parts: Vec<_> = field
            .get_all(NodeKind::Ident)
            .iter()
            .filter_map(Node::text)
            .collect();
        assert_eq!(parts, vec!["x", "Int"]);
        assert!(class.get(NodeKind::Block).is_none());

        let method = class.get(NodeKind::Methods).unwrap().get(NodeKind::Method).unwrap();
        assert_eq!(method.ident_name(), Some("GETX"));
        assert!(tree.get(NodeKind::Block).is_some());
    }
}
