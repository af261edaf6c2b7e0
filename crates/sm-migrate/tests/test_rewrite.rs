mod support;

use pretty_assertions::assert_eq;
use sm_core::ast::*;
use sm_core::semantics::{InMemoryHost, MethodSig};
use sm_core::{Result, SourcePrinter};
use sm_migrate::*;
use std::sync::Arc;
use support::assertions::{expect_finding, rewrite};
use support::fixture::{lambdas_only, list_of, pass, pass_with, static_collectors, Fixture};

fn is_valid(f: &mut Fixture) -> NodeId {
    let sig = f.method(MethodSig::new("Item", "isValid", vec![]).returning(TypeRef::simple("boolean")));
    let x = f.x();
    f.b.call(Some(x), "isValid", vec![], Some(sig))
}

fn process(f: &mut Fixture) -> NodeId {
    let sig = f.method(MethodSig::new("Sample", "process", vec![TypeRef::simple("Item")]).static_());
    f.call_with_x("process", sig)
}

fn log(f: &mut Fixture) -> NodeId {
    let sig = f.method(MethodSig::new("Sample", "log", vec![TypeRef::simple("Item")]).static_());
    f.call_with_x("log", sig)
}

/// `for (Item x : source) { if (x.isValid()) { process(x); } }`
fn filtered_process(f: &mut Fixture) -> NodeId {
    let cond = is_valid(f);
    let action = process(f);
    let then_block = f.block(vec![action]);
    let guard = f.b.if_then(cond, then_block);
    let body = f.block(vec![guard]);
    f.for_each(body)
}

#[test]
fn filtered_accumulation_folds_into_the_declaration() -> Result<()> {
    // List<Integer> list = new ArrayList<>();
    // for (Integer x : source) { if (x > 0) { list.add(x); } }
    support::init_tracing();
    let mut f = Fixture::new("Integer");
    let list = f.local("list", list_of("Integer"));
    let decl = f.new_collection(list, "ArrayList");
    let cond = f.compare_x(BinaryOp::Gt, 0);
    let x = f.x();
    let add = f.add_to(list, x);
    let then_block = f.block(vec![add]);
    let guard = f.b.if_then(cond, then_block);
    let body = f.block(vec![guard]);
    let loop_stmt = f.for_each(body);
    let root = f.block(vec![decl, loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let pass = pass_with(host, static_collectors());
    let finding = expect_finding(pass.inspect(&tree, loop_stmt)?);
    assert_eq!(finding.kind, FindingKind::Accumulation);
    assert_eq!(finding.message, "Can be replaced with collect call");
    assert_eq!(finding.fix_name, "Replace with collect");

    let outcome = pass.apply(&mut tree, &finding)?;
    assert!(outcome.folded);
    assert_eq!(outcome.replacement, decl);
    assert_eq!(
        tree.text(tree.root()),
        "{ List<Integer> list = source.stream().filter(x -> x > 0).collect(toList()); }"
    );
    Ok(())
}

/// `List<String> results = new ArrayList<>(); log("start");` followed by
/// `for (String x : source) { results.add(transform(x)); }`
fn append_after_other_statement(f: &mut Fixture) -> (NodeId, NodeId) {
    let results = f.local("results", list_of("String"));
    let decl = f.new_collection(results, "ArrayList");
    let start = f.b.string("start");
    let log = f.b.call(None, "log", vec![start], None);
    let log = f.b.expr_stmt(log);
    let transform = f.method(
        MethodSig::new("Sample", "transform", vec![TypeRef::simple("String")])
            .returning(TypeRef::simple("String")),
    );
    let x = f.x();
    let value = f.b.call(None, "transform", vec![x], Some(transform));
    let add = f.add_to(results, value);
    let body = f.block(vec![add]);
    let loop_stmt = f.for_each(body);
    (f.block(vec![decl, log, loop_stmt]), loop_stmt)
}

#[test]
fn accumulation_away_from_its_declaration_appends_with_add_all() -> Result<()> {
    let mut f = Fixture::new("String");
    let (root, loop_stmt) = append_after_other_statement(&mut f);
    let (mut tree, host) = f.finish(root);

    let options = MigrationOptions {
        prefer_method_refs: false,
        collector_style: CollectorStyle::StaticImport,
        analysis_budget: None,
    };
    let text = rewrite(&pass_with(host, options), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ List<String> results = new ArrayList<>(); log(\"start\"); \
         results.addAll(source.stream().map(x -> transform(x)).collect(toList())); }"
    );
    Ok(())
}

#[test]
fn forwarding_mapper_becomes_a_bound_method_reference() -> Result<()> {
    let mut f = Fixture::new("String");
    let (root, loop_stmt) = append_after_other_statement(&mut f);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ List<String> results = new ArrayList<>(); log(\"start\"); \
         results.addAll(source.stream().map(this::transform).collect(Collectors.toList())); }"
    );
    Ok(())
}

#[test]
fn filtered_action_becomes_filter_and_for_each() -> Result<()> {
    let mut f = Fixture::new("Item");
    let loop_stmt = filtered_process(&mut f);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let pass = pass(host);
    let finding = expect_finding(pass.inspect(&tree, loop_stmt)?);
    assert_eq!(finding.kind, FindingKind::GeneralAction);
    assert_eq!(finding.fix_name, "Replace with forEach");

    let outcome = pass.apply(&mut tree, &finding)?;
    assert!(!outcome.folded);
    assert!(!outcome.explicit_lambda);
    assert_eq!(
        tree.text(tree.root()),
        "{ source.stream().filter(x -> x.isValid()).forEach(Sample::process); }"
    );
    Ok(())
}

#[test]
fn method_references_can_be_turned_off() -> Result<()> {
    let mut f = Fixture::new("Item");
    let loop_stmt = filtered_process(&mut f);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass_with(host, lambdas_only()), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ source.stream().filter(x -> x.isValid()).forEach(x -> process(x)); }"
    );
    Ok(())
}

#[test]
fn nested_guards_become_filters_in_order() -> Result<()> {
    let mut f = Fixture::new("Integer");
    let outer_cond = f.compare_x(BinaryOp::Gt, 0);
    let inner_cond = f.compare_x(BinaryOp::Lt, 10);
    let action = process(&mut f);
    let inner_then = f.block(vec![action]);
    let inner = f.b.if_then(inner_cond, inner_then);
    let outer_then = f.block(vec![inner]);
    let outer = f.b.if_then(outer_cond, outer_then);
    let loop_stmt = f.for_each(outer);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ source.stream().filter(x -> x > 0).filter(x -> x < 10).forEach(Sample::process); }"
    );
    Ok(())
}

#[test]
fn unguarded_block_body_calls_for_each_on_the_source() -> Result<()> {
    let mut f = Fixture::new("Item");
    let first = log(&mut f);
    let second = process(&mut f);
    let body = f.block(vec![first, second]);
    let loop_stmt = f.for_each(body);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(text, "{ source.forEach(x -> { log(x); process(x); }); }");
    Ok(())
}

#[test]
fn other_statements_are_wrapped_in_a_block_body() -> Result<()> {
    // if (x > 0) { if (x < 10) process(x); else log(x); }
    let mut f = Fixture::new("Integer");
    let outer_cond = f.compare_x(BinaryOp::Gt, 0);
    let inner_cond = f.compare_x(BinaryOp::Lt, 10);
    let small = process(&mut f);
    let large = log(&mut f);
    let branch = f.b.if_else(inner_cond, small, large);
    let outer_then = f.block(vec![branch]);
    let outer = f.b.if_then(outer_cond, outer_then);
    let loop_stmt = f.for_each(outer);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ source.stream().filter(x -> x > 0).forEach(x -> { if (x < 10) process(x); else log(x); }); }"
    );
    Ok(())
}

fn fold_into(class: &str, declared: TypeRef) -> Result<String> {
    let mut f = Fixture::new("Integer");
    let target = f.local("kept", declared);
    let decl = f.new_collection(target, class);
    let x = f.x();
    let add = f.add_to(target, x);
    let loop_stmt = f.for_each(add);
    let root = f.block(vec![decl, loop_stmt]);
    let (mut tree, host) = f.finish(root);
    rewrite(&pass(host), &mut tree, loop_stmt)
}

#[test]
fn folded_collector_follows_the_constructed_class() -> Result<()> {
    assert_eq!(
        fold_into("HashSet", TypeRef::generic("Set", [TypeRef::simple("Integer")]))?,
        "{ Set<Integer> kept = source.stream().collect(Collectors.toSet()); }"
    );
    assert_eq!(
        fold_into("LinkedList", list_of("Integer"))?,
        "{ List<Integer> kept = source.stream().collect(Collectors.toCollection(() -> new LinkedList<>())); }"
    );
    Ok(())
}

#[test]
fn receiver_and_constructor_mappers_become_method_references() -> Result<()> {
    let mut f = Fixture::new("Item");
    f.model.add_class("Wrapper", &["Object"]);
    let get_name = f.method(MethodSig::new("Item", "getName", vec![]).returning(TypeRef::simple("String")));
    let wrap = f.method(MethodSig::constructor("Wrapper", vec![TypeRef::simple("Item")]));

    let names = f.local("names", list_of("String"));
    let names_decl = f.new_collection(names, "ArrayList");
    let x = f.x();
    let name = f.b.call(Some(x), "getName", vec![], Some(get_name));
    let add = f.add_to(names, name);
    let names_loop = f.for_each(add);

    let wrappers = f.local("wrappers", list_of("Wrapper"));
    let wrappers_decl = f.new_collection(wrappers, "ArrayList");
    let x = f.x();
    let wrapped = f.b.new_object(TypeRef::simple("Wrapper"), vec![x], Some(wrap));
    let add = f.add_to(wrappers, wrapped);
    let wrappers_loop = f.for_each(add);

    let root = f.block(vec![names_decl, names_loop, wrappers_decl, wrappers_loop]);
    let (mut tree, host) = f.finish(root);
    let pass = pass(host);

    rewrite(&pass, &mut tree, names_loop)?;
    let text = rewrite(&pass, &mut tree, wrappers_loop)?;
    assert_eq!(
        text,
        "{ List<String> names = source.stream().map(Item::getName).collect(Collectors.toList()); \
         List<Wrapper> wrappers = source.stream().map(Wrapper::new).collect(Collectors.toList()); }"
    );
    Ok(())
}

#[test]
fn field_targets_are_appended_to_in_place() -> Result<()> {
    let mut f = Fixture::new("Integer");
    let items = f.b.declare("items", list_of("Integer"), VarKind::Field { is_static: false });
    let cond = f.compare_x(BinaryOp::Gt, 0);
    let add = f.add_method();
    let this = f.b.this();
    let field = f.b.field(this, items);
    let x = f.x();
    let call = f.b.call(Some(field), "add", vec![x], Some(add));
    let action = f.b.expr_stmt(call);
    let guard = f.b.if_then(cond, action);
    let loop_stmt = f.for_each(guard);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ this.items.addAll(source.stream().filter(x -> x > 0).collect(Collectors.toList())); }"
    );
    Ok(())
}

/// A `Bag extends ArrayList` method adding to itself.
fn implicit_receiver_loop(guarded_by_call: bool) -> (Tree, Arc<InMemoryHost>, NodeId) {
    let mut f = Fixture::in_context(ScopeContext::instance("Bag"), "Integer");
    f.model.add_class("Bag", &["ArrayList"]);
    let cond = if guarded_by_call {
        let allowed = f.method(
            MethodSig::new("Bag", "isAllowed", vec![TypeRef::simple("Integer")])
                .returning(TypeRef::simple("boolean")),
        );
        let x = f.x();
        f.b.call(None, "isAllowed", vec![x], Some(allowed))
    } else {
        f.compare_x(BinaryOp::Gt, 0)
    };
    let add = f.add_method();
    let x = f.x();
    let call = f.b.call(None, "add", vec![x], Some(add));
    let action = f.b.expr_stmt(call);
    let guard = f.b.if_then(cond, action);
    let loop_stmt = f.for_each(guard);
    let root = f.block(vec![loop_stmt]);
    let (tree, host) = f.finish(root);
    (tree, host, loop_stmt)
}

#[test]
fn implicit_receiver_accumulates_with_unqualified_add_all() -> Result<()> {
    let (mut tree, host, loop_stmt) = implicit_receiver_loop(false);
    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ addAll(source.stream().filter(x -> x > 0).collect(Collectors.toList())); }"
    );
    Ok(())
}

#[test]
fn implicit_receiver_read_by_a_guard_stays_a_for_each() -> Result<()> {
    let (mut tree, host, loop_stmt) = implicit_receiver_loop(true);
    let pass = pass(host);
    let finding = expect_finding(pass.inspect(&tree, loop_stmt)?);
    assert_eq!(finding.kind, FindingKind::GeneralAction);

    pass.apply(&mut tree, &finding)?;
    assert_eq!(
        tree.text(tree.root()),
        "{ source.stream().filter(x -> isAllowed(x)).forEach(this::add); }"
    );
    Ok(())
}

#[test]
fn comments_of_dropped_statements_move_before_the_declaration() -> Result<()> {
    let mut f = Fixture::new("Integer");
    let evens = f.local("evens", list_of("Integer"));
    let decl = f.new_collection(evens, "ArrayList");
    let note = f.b.comment("// keep evens");
    let x = f.x();
    let two = f.b.int(2);
    let rem = f.b.binary(BinaryOp::Rem, x, two);
    let zero = f.b.int(0);
    let cond = f.b.binary(BinaryOp::Eq, rem, zero);
    let x = f.x();
    let add = f.add_to(evens, x);
    let then_block = f.block(vec![add]);
    let guard = f.b.if_then(cond, then_block);
    let body = f.block(vec![note, guard]);
    let loop_stmt = f.for_each(body);
    let root = f.block(vec![decl, loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let pass = pass(host);
    let finding = expect_finding(pass.inspect(&tree, loop_stmt)?);
    pass.apply(&mut tree, &finding)?;
    assert_eq!(
        SourcePrinter::new(&tree).render(tree.root()),
        "{\n    // keep evens\n    List<Integer> evens = source.stream().filter(x -> x % 2 == 0).collect(Collectors.toList());\n}"
    );
    Ok(())
}

#[test]
fn comments_inside_a_reused_block_stay_in_the_lambda() -> Result<()> {
    let mut f = Fixture::new("Item");
    let note = f.b.comment("// trace");
    let first = log(&mut f);
    let second = process(&mut f);
    let body = f.block(vec![note, first, second]);
    let loop_stmt = f.for_each(body);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(text, "{ source.forEach(x -> { // trace log(x); process(x); }); }");
    Ok(())
}

#[test]
fn commented_loop_outside_a_block_is_wrapped_in_one() -> Result<()> {
    // if (enabled) for (Item x : source) { // note
    //     if (x.isValid()) process(x); }
    let mut f = Fixture::new("Item");
    let note = f.b.comment("// note");
    let cond = is_valid(&mut f);
    let action = process(&mut f);
    let guard = f.b.if_then(cond, action);
    let body = f.block(vec![note, guard]);
    let loop_stmt = f.for_each(body);
    let enabled = f.b.unresolved_name("enabled");
    let outer = f.b.if_then(enabled, loop_stmt);
    let root = f.block(vec![outer]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ if (enabled) { // note source.stream().filter(x -> x.isValid()).forEach(Sample::process); } }"
    );
    Ok(())
}

#[test]
fn ambiguous_for_each_gets_an_explicitly_typed_lambda() -> Result<()> {
    let mut f = Fixture::new("Item");
    f.model.mark_ambiguous_sink("forEach");
    let loop_stmt = filtered_process(&mut f);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let pass = pass(host);
    let finding = expect_finding(pass.inspect(&tree, loop_stmt)?);
    let outcome = pass.apply(&mut tree, &finding)?;
    assert!(outcome.explicit_lambda);
    assert_eq!(outcome.revision, tree.revision());
    assert_eq!(
        tree.text(tree.root()),
        "{ source.stream().filter(x -> x.isValid()).forEach((Item x) -> { process(x); }); }"
    );
    Ok(())
}

#[test]
fn rewritten_loop_is_no_longer_reported() -> Result<()> {
    let mut f = Fixture::new("Item");
    let loop_stmt = filtered_process(&mut f);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert!(tree.for_each_loops().is_empty());
    assert!(!tree.is_attached(loop_stmt));
    Ok(())
}

#[test]
fn qualified_forwarding_calls_become_method_references() -> Result<()> {
    let mut f = Fixture::new("Item");
    f.model.add_class("Util", &["Object"]).add_class("Sink", &["Object"]);
    let handle = f.method(MethodSig::new("Base", "handle", vec![TypeRef::simple("Item")]));
    let format = f.method(MethodSig::new("Util", "format", vec![TypeRef::simple("Item")]).static_());
    let accept = f.method(MethodSig::new("Sink", "accept", vec![TypeRef::simple("Item")]));
    let sink = f.b.declare_final("sink", TypeRef::simple("Sink"), VarKind::Parameter);

    let receivers = [
        (f.b.super_(), "handle", handle),
        (f.b.type_name(TypeRef::simple("Util")), "format", format),
        (f.b.name(sink), "accept", accept),
    ];
    let mut loops = Vec::new();
    for (receiver, method, target) in receivers {
        let x = f.x();
        let call = f.b.call(Some(receiver), method, vec![x], Some(target));
        let action = f.b.expr_stmt(call);
        let cond = is_valid(&mut f);
        let guard = f.b.if_then(cond, action);
        loops.push(f.for_each(guard));
    }
    let root = f.block(loops);
    let (mut tree, host) = f.finish(root);

    let outcomes = InspectionRunner::new(Box::new(pass(host))).run_and_apply(&mut tree)?;
    assert_eq!(outcomes.len(), 3);
    assert_eq!(
        tree.text(tree.root()),
        "{ source.stream().filter(x -> x.isValid()).forEach(super::handle); \
         source.stream().filter(x -> x.isValid()).forEach(Util::format); \
         source.stream().filter(x -> x.isValid()).forEach(sink::accept); }"
    );
    Ok(())
}

#[test]
fn parenthesised_source_is_reused_verbatim() -> Result<()> {
    let mut f = Fixture::new("Item");
    let first = log(&mut f);
    let second = process(&mut f);
    let body = f.block(vec![first, second]);
    let source = f.b.name(f.source);
    let iterated = f.b.paren(source);
    let loop_stmt = f.b.for_each(f.x, iterated, body);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(text, "{ (source).forEach(x -> { log(x); process(x); }); }");
    Ok(())
}

#[test]
fn static_scope_has_no_implicit_target() -> Result<()> {
    let mut f = Fixture::in_context(ScopeContext::static_in("Sample"), "Integer");
    let add = f.add_method();
    let x = f.x();
    let call = f.b.call(None, "add", vec![x], Some(add));
    let action = f.b.expr_stmt(call);
    let loop_stmt = f.for_each(action);
    let root = f.block(vec![loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let chain = GuardChain::extract(&tree, action);
    assert_eq!(
        accumulation(host.as_ref(), &tree, &chain),
        Err(IneligibleReason::UnresolvedTarget)
    );
    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(text, "{ source.forEach(x -> add(x)); }");
    Ok(())
}

#[test]
fn parenthesised_loop_variable_is_collected_without_mapping() -> Result<()> {
    // List<Integer> list = new ArrayList<>();
    // for (Integer x : source) if (x > 0) list.add((x));
    let mut f = Fixture::new("Integer");
    let list = f.local("list", list_of("Integer"));
    let decl = f.new_collection(list, "ArrayList");
    let cond = f.compare_x(BinaryOp::Gt, 0);
    let x = f.x();
    let value = f.b.paren(x);
    let add = f.add_to(list, value);
    let guard = f.b.if_then(cond, add);
    let loop_stmt = f.for_each(guard);
    let root = f.block(vec![decl, loop_stmt]);
    let (mut tree, host) = f.finish(root);

    let text = rewrite(&pass(host), &mut tree, loop_stmt)?;
    assert_eq!(
        text,
        "{ List<Integer> list = source.stream().filter(x -> x > 0).collect(Collectors.toList()); }"
    );
    Ok(())
}
