use sm_core::ast::*;
use sm_core::semantics::{FlowAnalysis, InMemoryHost, MethodSig, SemanticModel};
use sm_migrate::{CollectorStyle, MigrationOptions, StreamMigrationPass};
use std::sync::Arc;

/// A method body under construction together with the symbols it uses.
///
/// Every loop starts from `for (Elem x : source)` where `source` is a
/// `List<Elem>` parameter of the enclosing method.
pub struct Fixture {
    pub b: TreeBuilder,
    pub model: SemanticModel,
    pub flow: FlowAnalysis,
    pub source: VarId,
    pub x: VarId,
    add: Option<MethodId>,
}

impl Fixture {
    /// Instance method of `Sample` iterating over `List<elem>`.
    pub fn new(elem: &str) -> Self {
        Self::in_context(ScopeContext::instance("Sample"), elem)
    }

    pub fn in_context(context: ScopeContext, elem: &str) -> Self {
        let mut model = SemanticModel::with_java_prelude();
        model.add_class("Sample", &["Object"]).add_class("Item", &["Object"]);
        let mut b = TreeBuilder::new(context);
        let source = b.declare("source", list_of(elem), VarKind::Parameter);
        let x = b.declare("x", TypeRef::simple(elem), VarKind::LoopParameter);
        Self {
            b,
            model,
            flow: FlowAnalysis::new(),
            source,
            x,
            add: None,
        }
    }

    pub fn method(&mut self, sig: MethodSig) -> MethodId {
        self.model.add_method(sig)
    }

    /// `Collection.add(Object)`, registered on first use.
    pub fn add_method(&mut self) -> MethodId {
        if let Some(id) = self.add {
            return id;
        }
        let id = self.model.add_method(
            MethodSig::new("Collection", "add", vec![TypeRef::simple("Object")])
                .returning(TypeRef::simple("boolean")),
        );
        self.add = Some(id);
        id
    }

    pub fn local(&mut self, name: &str, ty: TypeRef) -> VarId {
        self.b.declare(name, ty, VarKind::Local)
    }

    pub fn x(&mut self) -> NodeId {
        self.b.name(self.x)
    }

    /// `target.add(value)`
    pub fn add_to(&mut self, target: VarId, value: NodeId) -> NodeId {
        let add = self.add_method();
        let receiver = self.b.name(target);
        let call = self.b.call(Some(receiver), "add", vec![value], Some(add));
        self.b.expr_stmt(call)
    }

    /// `name(x)` resolved against `target`.
    pub fn call_with_x(&mut self, name: &str, target: MethodId) -> NodeId {
        let x = self.x();
        let call = self.b.call(None, name, vec![x], Some(target));
        self.b.expr_stmt(call)
    }

    /// `x <op> value`
    pub fn compare_x(&mut self, op: BinaryOp, value: i64) -> NodeId {
        let x = self.x();
        let value = self.b.int(value);
        self.b.binary(op, x, value)
    }

    /// `T name = new Class<>();`
    pub fn new_collection(&mut self, var: VarId, class: &str) -> NodeId {
        let init = self.b.new_object(TypeRef::diamond(class), vec![], None);
        self.b.local(var, Some(init))
    }

    /// `for (Elem x : source) body`
    pub fn for_each(&mut self, body: NodeId) -> NodeId {
        let source = self.b.name(self.source);
        self.b.for_each(self.x, source, body)
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.b.block(stmts)
    }

    pub fn finish(self, root: NodeId) -> (Tree, Arc<InMemoryHost>) {
        let tree = self.b.finish(root);
        (tree, Arc::new(InMemoryHost::new(self.model, self.flow)))
    }
}

pub fn list_of(elem: &str) -> TypeRef {
    TypeRef::generic("List", [TypeRef::simple(elem)])
}

pub fn pass(host: Arc<InMemoryHost>) -> StreamMigrationPass {
    StreamMigrationPass::new(host, MigrationOptions::default())
}

pub fn pass_with(host: Arc<InMemoryHost>, options: MigrationOptions) -> StreamMigrationPass {
    StreamMigrationPass::new(host, options)
}

/// `collect(toList())` spelling with method references kept.
pub fn static_collectors() -> MigrationOptions {
    MigrationOptions {
        collector_style: CollectorStyle::StaticImport,
        ..MigrationOptions::default()
    }
}

/// Lambdas everywhere, `Collectors.` qualified.
pub fn lambdas_only() -> MigrationOptions {
    MigrationOptions {
        prefer_method_refs: false,
        ..MigrationOptions::default()
    }
}
