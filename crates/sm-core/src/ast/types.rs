use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

crate::arena_id! {
    /// Index of a variable declaration in a [`Tree`](super::Tree).
    pub struct VarId("v");
}

/// A (possibly generic) class type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<TypeRef>,
    /// `new ArrayList<>()` style inferred arguments.
    #[serde(default)]
    pub diamond: bool,
}

impl TypeRef {
    pub fn simple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            diamond: false,
        }
    }

    pub fn generic(name: impl Into<String>, args: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().collect(),
            diamond: false,
        }
    }

    pub fn diamond(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            diamond: true,
        }
    }

    /// The type with its arguments erased.
    pub fn raw(&self) -> TypeRef {
        TypeRef::simple(self.name.clone())
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if self.diamond {
            write!(f, "<>")?;
        } else if !self.args.is_empty() {
            write!(f, "<{}>", self.args.iter().join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    Local,
    Parameter,
    Field { is_static: bool },
    LoopParameter,
    LambdaParameter,
    CatchParameter,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: TypeRef,
    pub kind: VarKind,
    /// Declared with the `final` modifier.
    pub is_final: bool,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef, kind: VarKind) -> Self {
        Self {
            name: name.into(),
            ty,
            kind,
            is_final: false,
        }
    }
}

/// Where the analysed method body lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeContext {
    pub enclosing_class: Option<String>,
    /// The body belongs to a static member, so there is no implicit receiver.
    pub is_static: bool,
    /// Source language level, e.g. `8` for Java 8.
    pub language_level: u32,
}

impl ScopeContext {
    pub fn instance(class: impl Into<String>) -> Self {
        Self {
            enclosing_class: Some(class.into()),
            is_static: false,
            language_level: 8,
        }
    }

    pub fn static_in(class: impl Into<String>) -> Self {
        Self {
            enclosing_class: Some(class.into()),
            is_static: true,
            language_level: 8,
        }
    }

    pub fn with_language_level(mut self, level: u32) -> Self {
        self.language_level = level;
        self
    }
}

impl Default for ScopeContext {
    fn default() -> Self {
        Self {
            enclosing_class: None,
            is_static: true,
            language_level: 8,
        }
    }
}
