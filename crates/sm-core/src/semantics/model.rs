use super::{CodeFormatter, MethodSig, ReferenceSearch, SymbolResolver};
use crate::ast::{ExprKind, Literal, MethodId, NodeId, Tree, TypeRef, VarId};
use std::collections::{HashMap, HashSet, VecDeque};

/// In-memory class hierarchy and method table.
#[derive(Debug, Clone, Default)]
pub struct SemanticModel {
    supertypes: HashMap<String, Vec<String>>,
    methods: Vec<MethodSig>,
    ambiguous_sinks: HashSet<String>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slice of `java.lang` and `java.util` the engine reasons about.
    pub fn with_java_prelude() -> Self {
        let mut model = Self::new();
        model
            .add_class("Object", &[])
            .add_class("String", &["Object"])
            .add_class("Iterable", &["Object"])
            .add_class("Collection", &["Iterable"])
            .add_class("List", &["Collection"])
            .add_class("Set", &["Collection"])
            .add_class("ArrayList", &["List"])
            .add_class("LinkedList", &["List"])
            .add_class("HashSet", &["Set"])
            .add_class("TreeSet", &["Set"])
            .add_class("Throwable", &["Object"])
            .add_class("Exception", &["Throwable"])
            .add_class("Error", &["Throwable"])
            .add_class("RuntimeException", &["Exception"])
            .add_class("IllegalArgumentException", &["RuntimeException"])
            .add_class("IOException", &["Exception"]);
        model
    }

    pub fn add_class(&mut self, name: &str, supertypes: &[&str]) -> &mut Self {
        self.supertypes.insert(
            name.to_string(),
            supertypes.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn add_method(&mut self, sig: MethodSig) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(sig);
        id
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.supertypes.contains_key(name)
    }

    /// Calls to `method` accept several functional interfaces, so a terse
    /// function literal passed to them has no target type.
    pub fn mark_ambiguous_sink(&mut self, method: &str) -> &mut Self {
        self.ambiguous_sinks.insert(method.to_string());
        self
    }

    fn call_target(&self, tree: &Tree, call: NodeId) -> Option<MethodId> {
        match tree.expr(call)? {
            ExprKind::Call(call) => call.target,
            ExprKind::New(new) => new.target,
            _ => None,
        }
    }
}

impl SymbolResolver for SemanticModel {
    fn resolve_variable(&self, tree: &Tree, expr: NodeId) -> Option<VarId> {
        match tree.expr(tree.skip_parens(expr))? {
            ExprKind::Name(name) => name.var,
            ExprKind::Field(field) => field.var,
            _ => None,
        }
    }

    fn resolve_method(&self, tree: &Tree, call: NodeId) -> Option<MethodSig> {
        self.call_target(tree, call).and_then(|id| self.method(id))
    }

    fn method(&self, id: MethodId) -> Option<MethodSig> {
        self.methods.get(id.index()).cloned()
    }

    fn type_of(&self, tree: &Tree, expr: NodeId) -> Option<TypeRef> {
        match tree.expr(expr)? {
            ExprKind::Name(_) | ExprKind::Field(_) => self
                .resolve_variable(tree, expr)
                .map(|var| tree.var(var).ty.clone()),
            ExprKind::Literal(Literal::Str(_)) => Some(TypeRef::simple("String")),
            ExprKind::This => tree.context().enclosing_class.clone().map(TypeRef::simple),
            ExprKind::New(new) => Some(new.class.clone()),
            ExprKind::Call(_) => self.resolve_method(tree, expr)?.returns,
            ExprKind::Paren(inner) => self.type_of(tree, *inner),
            _ => None,
        }
    }

    fn is_subtype(&self, class: &str, ancestor: &str) -> bool {
        if !self.has_class(class) {
            return false;
        }
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([class]);
        while let Some(current) = queue.pop_front() {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(parents) = self.supertypes.get(current) {
                queue.extend(parents.iter().map(String::as_str));
            }
        }
        false
    }

    fn is_unchecked_exception(&self, class: &str) -> bool {
        self.is_subtype(class, "RuntimeException") || self.is_subtype(class, "Error")
    }

    fn is_lambda_target_inferable(&self, tree: &Tree, call: NodeId, _arg_index: usize) -> bool {
        match tree.expr(call).and_then(ExprKind::as_call) {
            Some(call) => !self.ambiguous_sinks.contains(&call.method),
            None => false,
        }
    }
}

impl ReferenceSearch for SemanticModel {
    fn references_in(&self, tree: &Tree, var: VarId, scope: NodeId) -> Vec<NodeId> {
        tree.descendants(scope)
            .into_iter()
            .filter(|id| match tree.expr(*id) {
                Some(ExprKind::Name(name)) => name.var == Some(var),
                Some(ExprKind::Field(field)) => field.var == Some(var),
                _ => false,
            })
            .collect()
    }
}

impl CodeFormatter for SemanticModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ScopeContext, TreeBuilder, VarKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn subtyping_is_transitive_and_closed_world() {
        let model = SemanticModel::with_java_prelude();
        assert!(model.is_subtype("ArrayList", "Collection"));
        assert!(model.is_subtype("List", "List"));
        assert!(!model.is_subtype("String", "Collection"));
        assert!(!model.is_subtype("Mystery", "Object"));
    }

    #[test]
    fn exception_kinds() {
        let model = SemanticModel::with_java_prelude();
        assert!(model.is_unchecked_exception("IllegalArgumentException"));
        assert!(model.is_unchecked_exception("Error"));
        assert!(!model.is_unchecked_exception("IOException"));
        assert!(!model.is_unchecked_exception("UnknownFailure"));
    }

    #[test]
    fn types_flow_from_declarations_and_signatures() {
        let mut model = SemanticModel::with_java_prelude();
        let size = model.add_method(
            MethodSig::new("List", "size", vec![]).returning(TypeRef::simple("int")),
        );
        let mut b = TreeBuilder::new(ScopeContext::instance("Owner"));
        let list = b.declare("items", TypeRef::generic("List", [TypeRef::simple("String")]), VarKind::Parameter);
        let items = b.name(list);
        let call = b.call(Some(items), "size", vec![], Some(size));
        let root = b.expr_stmt(call);
        let tree = b.finish(root);

        assert_eq!(model.type_of(&tree, items).map(|ty| ty.to_string()), Some("List<String>".to_string()));
        assert_eq!(model.type_of(&tree, call), Some(TypeRef::simple("int")));
        assert_eq!(model.references_in(&tree, list, root), vec![items]);
    }
}
