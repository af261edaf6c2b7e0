use pretty_assertions::assert_eq;
use sm_core::ast::{NodeId, Tree};
use sm_core::Result;
use sm_migrate::{Finding, IneligibleReason, Inspection, LoopInspection, StreamMigrationPass};

pub fn expect_finding(inspection: Inspection) -> Finding {
    match inspection {
        Inspection::Finding(finding) => finding,
        Inspection::NoIssue(reason) => panic!("expected a finding, loop was rejected: {}", reason),
    }
}

pub fn assert_rejected(pass: &StreamMigrationPass, tree: &Tree, loop_stmt: NodeId, expected: IneligibleReason) {
    match pass.inspect(tree, loop_stmt) {
        Ok(Inspection::NoIssue(reason)) => assert_eq!(reason, expected),
        Ok(Inspection::Finding(finding)) => panic!("expected {}, got finding {:?}", expected, finding),
        Err(err) => panic!("inspection failed: {}", err),
    }
}

/// Inspect `loop_stmt`, apply its fix and return the source of `root`.
pub fn rewrite(pass: &StreamMigrationPass, tree: &mut Tree, loop_stmt: NodeId) -> Result<String> {
    let finding = expect_finding(pass.inspect(tree, loop_stmt)?);
    pass.apply(tree, &finding)?;
    Ok(tree.text(tree.root()))
}
