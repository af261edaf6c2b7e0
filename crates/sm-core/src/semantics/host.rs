use super::*;

/// A [`Host`] assembled from the in-memory model and flow analysis.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    pub model: SemanticModel,
    pub flow: FlowAnalysis,
}

impl InMemoryHost {
    pub fn new(model: SemanticModel, flow: FlowAnalysis) -> Self {
        Self { model, flow }
    }
}

impl ControlFlowService for InMemoryHost {
    fn exit_points(&self, tree: &Tree, body: NodeId) -> AnalysisResult<Vec<(NodeId, ExitKind)>> {
        self.flow.exit_points(tree, body)
    }

    fn used_variables(&self, tree: &Tree, body: NodeId) -> AnalysisResult<BTreeSet<VarId>> {
        self.flow.used_variables(tree, body)
    }

    fn written_variables(&self, tree: &Tree, body: NodeId) -> AnalysisResult<BTreeSet<VarId>> {
        self.flow.written_variables(tree, body)
    }

    fn is_effectively_final(&self, tree: &Tree, var: VarId, body: NodeId) -> AnalysisResult<bool> {
        self.flow.is_effectively_final(tree, var, body)
    }
}

impl SymbolResolver for InMemoryHost {
    fn resolve_variable(&self, tree: &Tree, expr: NodeId) -> Option<VarId> {
        self.model.resolve_variable(tree, expr)
    }

    fn resolve_method(&self, tree: &Tree, call: NodeId) -> Option<MethodSig> {
        self.model.resolve_method(tree, call)
    }

    fn method(&self, id: MethodId) -> Option<MethodSig> {
        self.model.method(id)
    }

    fn type_of(&self, tree: &Tree, expr: NodeId) -> Option<TypeRef> {
        self.model.type_of(tree, expr)
    }

    fn is_subtype(&self, class: &str, ancestor: &str) -> bool {
        self.model.is_subtype(class, ancestor)
    }

    fn is_unchecked_exception(&self, class: &str) -> bool {
        self.model.is_unchecked_exception(class)
    }

    fn is_lambda_target_inferable(&self, tree: &Tree, call: NodeId, arg_index: usize) -> bool {
        self.model.is_lambda_target_inferable(tree, call, arg_index)
    }
}

impl ReferenceSearch for InMemoryHost {
    fn references_in(&self, tree: &Tree, var: VarId, scope: NodeId) -> Vec<NodeId> {
        self.model.references_in(tree, var, scope)
    }
}

impl CodeFormatter for InMemoryHost {}
