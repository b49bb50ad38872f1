//! Object layouts and method-table slots.
//!
//! A subclass table starts as a copy of its parent's: an override replaces
//! the inherited entry in place and a new method is appended. Slot indices are
//! therefore fixed once per method name along an inheritance chain, which is
//! what lets a dispatch through a supertype-typed handle reach the override.

use indexmap::IndexMap;
use quack_ast::NodeKind;

use crate::builtins::{self, BUILTINS};
use crate::descriptor::{ClassDescriptor, ClassTable, Formal};
use crate::error::{GenError, Phase};

/// One method-table entry after the constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    /// Class whose body fills the slot, which is also its receiver type
    pub implementor: String,
    pub params: Vec<String>,
    pub returns: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLayout {
    pub name: String,
    pub superclass: Option<String>,
    pub builtin: bool,
    /// Fields after the class pointer; the parent's block comes first
    pub fields: Vec<Formal>,
    /// How many of `fields` come from the superclass
    pub inherited_fields: usize,
    /// Formals of the constructor in table slot 0
    pub constructor: Vec<Formal>,
    pub methods: Vec<Slot>,
}

impl ClassLayout {
    pub fn field_type(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.ty.as_str())
    }

    /// Table index of `name` (the constructor is index 0) and its slot.
    pub fn slot(&self, name: &str) -> Option<(usize, &Slot)> {
        self.methods
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.name == name)
            .map(|(index, slot)| (index + 1, slot))
    }

    fn derive(
        name: &str,
        parent: Option<&ClassLayout>,
        own_fields: &[Formal],
        own_methods: impl IntoIterator<Item = Slot>,
    ) -> ClassLayout {
        let mut fields = parent.map(|p| p.fields.clone()).unwrap_or_default();
        let inherited_fields = fields.len();
        for field in own_fields {
            if !fields.iter().any(|f| f.name == field.name) {
                fields.push(field.clone());
            }
        }

        let mut methods = parent.map(|p| p.methods.clone()).unwrap_or_default();
        for slot in own_methods {
            match methods.iter_mut().find(|s| s.name == slot.name) {
                Some(inherited) => *inherited = slot,
                None => methods.push(slot),
            }
        }

        ClassLayout {
            name: name.to_string(),
            superclass: parent.map(|p| p.name.clone()),
            builtin: false,
            fields,
            inherited_fields,
            constructor: Vec::new(),
            methods,
        }
    }
}

/// Every class layout, runtime classes first, then user classes parents-first.
#[derive(Debug, Clone, Default)]
pub struct Layouts {
    layouts: IndexMap<String, ClassLayout>,
}

impl Layouts {
    pub fn generate(table: &ClassTable<'_>) -> Result<Self, GenError> {
        let mut layouts = Layouts::default();
        for class in BUILTINS {
            let parent = class.superclass.and_then(|p| layouts.get(p));
            let slots = class.methods.iter().map(|m| Slot {
                name: m.name.to_string(),
                implementor: class.name.to_string(),
                params: m.params.iter().map(|p| p.to_string()).collect(),
                returns: m.returns.to_string(),
            });
            let mut layout = ClassLayout::derive(class.name, parent, &[], slots);
            layout.builtin = true;
            layouts.insert(layout);
        }

        for class in table.iter() {
            if builtins::is_builtin(&class.name) {
                return Err(layout_error(
                    &class.name,
                    "redefines a runtime class".to_string(),
                ));
            }
            // Slot 0 of every method table is named `constructor`.
            if class.methods.iter().any(|m| m.name == "constructor") {
                return Err(layout_error(
                    &class.name,
                    "declares a method named `constructor`".to_string(),
                ));
            }
        }

        let mut pending: Vec<&ClassDescriptor> = table.iter().collect();
        while !pending.is_empty() {
            let before = pending.len();
            let mut waiting = Vec::new();
            for class in pending {
                let layout = layouts
                    .get(&class.superclass)
                    .map(|parent| Self::user_layout(class, parent));
                match layout {
                    Some(layout) => layouts.insert(layout),
                    None => waiting.push(class),
                }
            }
            if waiting.len() == before {
                let stuck = waiting[0];
                if !table.contains(&stuck.superclass) {
                    return Err(GenError::unresolved("superclass", &stuck.superclass, None)
                        .in_phase(Phase::Layout));
                }
                return Err(layout_error(
                    &stuck.name,
                    "inheritance chain never reaches Obj".to_string(),
                ));
            }
            pending = waiting;
        }
        Ok(layouts)
    }

    fn user_layout(class: &ClassDescriptor, parent: &ClassLayout) -> ClassLayout {
        let slots = class.methods.iter().map(|m| Slot {
            name: m.name.clone(),
            implementor: class.name.clone(),
            params: m.formals.iter().map(|f| f.ty.clone()).collect(),
            returns: m.returns.clone(),
        });
        let mut layout = ClassLayout::derive(&class.name, Some(parent), &class.fields, slots);
        layout.constructor = match &class.constructor {
            Some(constructor) => constructor.formals.clone(),
            None => layout.fields.clone(),
        };
        layout
    }

    fn insert(&mut self, layout: ClassLayout) {
        self.layouts.insert(layout.name.clone(), layout);
    }

    pub fn get(&self, name: &str) -> Option<&ClassLayout> {
        self.layouts.get(name)
    }

    /// Declared classes in emission order.
    pub fn user_classes(&self) -> impl Iterator<Item = &ClassLayout> + '_ {
        self.layouts.values().filter(|layout| !layout.builtin)
    }

}

fn layout_error(class: &str, message: String) -> GenError {
    GenError::Structural {
        phase: Phase::Layout,
        kind: NodeKind::Class,
        message: format!("class `{}` {}", class, message),
        span: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::MethodDescriptor;
    use quack_ast::Node;

    fn method(name: &str, formals: &[(&str, &str)], returns: &str) -> MethodDescriptor {
        MethodDescriptor {
            name: name.to_string(),
            formals: formals.iter().map(|(n, t)| Formal::new(*n, *t)).collect(),
            returns: returns.to_string(),
            locals: Default::default(),
            body: Node::new(NodeKind::Block).unwrap(),
        }
    }

    fn class(
        name: &str,
        superclass: &str,
        fields: &[(&str, &str)],
        methods: Vec<MethodDescriptor>,
    ) -> ClassDescriptor {
        ClassDescriptor {
            name: name.to_string(),
            superclass: superclass.to_string(),
            fields: fields.iter().map(|(n, t)| Formal::new(*n, *t)).collect(),
            constructor: None,
            methods,
        }
    }

    #[test]
    fn test_builtin_tables_match_runtime() {
        let table = ClassTable::default();
        let layouts = Layouts::generate(&table).unwrap();

        let int = layouts.get("Int").unwrap();
        let names: Vec<_> = int.methods.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["STRING", "PRINT", "EQUALS", "LESS", "PLUS"]);
        let implementors: Vec<_> = int.methods.iter().map(|s| s.implementor.as_str()).collect();
        assert_eq!(implementors, vec!["Int", "Obj", "Int", "Int", "Int"]);

        let string = layouts.get("String").unwrap();
        assert_eq!(string.slot("PRINT").unwrap().1.returns, "String");
        assert_eq!(string.slot("LESS").unwrap().0, 4);
        assert_eq!(layouts.user_classes().count(), 0);
    }

    #[test]
    fn test_override_keeps_slot_down_the_chain() {
        let classes = vec![
            class("C", "B", &[], vec![method("SPEAK", &[], "String")]),
            class(
                "A",
                "Obj",
                &[("x", "Int")],
                vec![method("SPEAK", &[], "String"), method("MOVE", &[("d", "Int")], "A")],
            ),
            class(
                "B",
                "A",
                &[("y", "Int"), ("x", "Int")],
                vec![method("JUMP", &[], "Nothing"), method("STRING", &[], "String")],
            ),
        ];
        let table = ClassTable::new(&classes);
        let layouts = Layouts::generate(&table).unwrap();

        let order: Vec<_> = layouts.user_classes().map(|l| l.name.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C"]);

        let a = layouts.get("A").unwrap();
        let b = layouts.get("B").unwrap();
        let c = layouts.get("C").unwrap();
        for name in ["STRING", "PRINT", "EQUALS", "SPEAK", "MOVE"] {
            let index = a.slot(name).unwrap().0;
            assert_eq!(b.slot(name).unwrap().0, index, "{} in B", name);
            assert_eq!(c.slot(name).unwrap().0, index, "{} in C", name);
        }
        assert_eq!(c.slot("JUMP").unwrap().0, b.slot("JUMP").unwrap().0);

        // The most-derived body fills each slot.
        assert_eq!(c.slot("SPEAK").unwrap().1.implementor, "C");
        assert_eq!(c.slot("STRING").unwrap().1.implementor, "B");
        assert_eq!(c.slot("MOVE").unwrap().1.implementor, "A");
        assert_eq!(c.slot("PRINT").unwrap().1.implementor, "Obj");

        // Re-declared `x` denotes the inherited field.
        let fields: Vec<_> = b.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["x", "y"]);
        assert_eq!(b.inherited_fields, 1);
        assert_eq!(c.fields, b.fields);
        assert_eq!(c.constructor, c.fields);
    }

    #[test]
    fn test_unknown_superclass() {
        let classes = vec![class("A", "Ghost", &[], vec![])];
        let err = Layouts::generate(&ClassTable::new(&classes)).unwrap_err();
        assert!(matches!(
            err,
            GenError::UnresolvedSymbol { phase: Phase::Layout, ref name, .. } if name == "Ghost"
        ));
    }

    #[test]
    fn test_cycle_terminates() {
        let classes = vec![class("A", "B", &[], vec![]), class("B", "A", &[], vec![])];
        let err = Layouts::generate(&ClassTable::new(&classes)).unwrap_err();
        assert!(matches!(err, GenError::Structural { phase: Phase::Layout, .. }));
    }

    #[test]
    fn test_runtime_class_redefinition() {
        let classes = vec![class("Int", "Obj", &[], vec![])];
        assert!(Layouts::generate(&ClassTable::new(&classes)).is_err());
    }

    #[test]
    fn test_method_cannot_take_constructor_slot_name() {
        let classes = vec![class("A", "Obj", &[], vec![method("constructor", &[], "A")])];
        let err = Layouts::generate(&ClassTable::new(&classes)).unwrap_err();
        assert!(matches!(err, GenError::Structural { phase: Phase::Layout, .. }));
        assert!(err.to_string().contains("`constructor`"));
    }
}
