//! Concrete nesting scenarios.

use crate::common::*;

// ============================================================================
// Scenario A: flat scope commits
// ============================================================================

#[test]
fn flat_scope_commits_write() {
    let t = TestCoordinator::new();
    let mut ctx = t.coordinator.context();

    t.template("flat")
        .execute(&mut ctx, |ctx| t.write(ctx, "x1"))
        .unwrap();

    assert!(t.store.contains("member", "x1"));
    assert_eq!(t.stats().physical_commits, 1);
    t.assert_single_completion(&ctx);
}

#[test]
fn flat_scope_failure_rolls_back_everything() {
    let t = TestCoordinator::new();
    let mut ctx = t.coordinator.context();

    let err = t
        .template("flat")
        .execute(&mut ctx, |ctx| {
            t.write(ctx, "x1")?;
            t.write(ctx, "trigger")
        })
        .unwrap_err();

    assert!(err.is_record_rejected());
    assert!(t.store.is_empty());
    assert_eq!(t.stats().physical_rollbacks, 1);
    t.assert_single_completion(&ctx);
}

// ============================================================================
// Scenario B: inner failure propagates
// ============================================================================

#[test]
fn inner_failure_propagated_rolls_back_outer() {
    let t = TestCoordinator::new();
    let (outer, inner_a, inner_b) = (t.template("outer"), t.template("a"), t.template("b"));
    let mut ctx = t.coordinator.context();

    let err = outer
        .execute(&mut ctx, |ctx| {
            inner_a.execute(ctx, |ctx| t.write(ctx, "m1"))?;
            inner_b.execute(ctx, |ctx| t.write(ctx, "trigger"))?;
            Ok::<_, Error>(())
        })
        .unwrap_err();

    assert_eq!(
        err,
        Error::RecordRejected {
            value: "trigger".into()
        }
    );
    assert!(!t.store.contains("member", "m1"));
    assert!(!t.store.contains("member", "trigger"));
    assert_eq!(t.stats().physical_rollbacks, 1);
    assert_eq!(t.stats().physical_commits, 0);
    t.assert_single_completion(&ctx);
}

// ============================================================================
// Scenario C: inner failure caught
// ============================================================================

#[test]
fn caught_inner_failure_still_rolls_back() {
    let t = TestCoordinator::new();
    let (outer, inner_a, inner_b) = (t.template("outer"), t.template("a"), t.template("b"));
    let mut ctx = t.coordinator.context();

    let err = outer
        .execute(&mut ctx, |ctx| {
            inner_a.execute(ctx, |ctx| t.write(ctx, "m1"))?;
            let inner = inner_b.execute(ctx, |ctx| t.write(ctx, "trigger"));
            assert!(inner.unwrap_err().is_record_rejected());
            assert!(ctx.is_rollback_only(), "catching must not clear the marker");
            Ok::<_, Error>(())
        })
        .unwrap_err();

    assert_eq!(
        err,
        Error::UnexpectedRollback {
            transaction: "outer".into()
        }
    );
    assert!(t.store.is_empty());
    assert_eq!(t.stats().physical_commits, 0);
    t.assert_single_completion(&ctx);
}

#[test]
fn caught_failure_at_middle_level_still_rolls_back() {
    let t = TestCoordinator::new();
    let (outer, middle, inner) = (t.template("outer"), t.template("middle"), t.template("inner"));
    let mut ctx = t.coordinator.context();

    let err = outer
        .execute(&mut ctx, |ctx| {
            t.write(ctx, "o1")?;
            middle.execute(ctx, |ctx| {
                t.write(ctx, "m1")?;
                let _ = inner.execute(ctx, |ctx| t.write(ctx, "trigger"));
                Ok::<_, Error>(())
            })?;
            t.write(ctx, "o2")?;
            Ok::<_, Error>(())
        })
        .unwrap_err();

    assert!(err.is_unexpected_rollback());
    assert!(t.store.is_empty());
    t.assert_single_completion(&ctx);
}

// ============================================================================
// Deep nesting without failure
// ============================================================================

#[test]
fn deep_nesting_commits_once() {
    let t = TestCoordinator::new();
    let template = t.template("level");
    let mut ctx = t.coordinator.context();

    fn nest(
        t: &TestCoordinator,
        template: &TransactionTemplate,
        ctx: &mut TransactionContext,
        level: usize,
    ) -> Result<()> {
        template.execute(ctx, |ctx| {
            assert_eq!(ctx.depth(), level);
            t.write(ctx, &format!("level-{}", level))?;
            if level < 5 {
                nest(t, template, ctx, level + 1)?;
            }
            Ok(())
        })
    }

    nest(&t, &template, &mut ctx, 1).unwrap();

    assert_eq!(t.store.len(), 5);
    assert_eq!(t.stats().connections_acquired, 1);
    assert_eq!(t.stats().physical_commits, 1);
    t.assert_single_completion(&ctx);
}

// ============================================================================
// Manual use of the manager
// ============================================================================

#[test]
fn manager_rejects_double_completion() {
    let t = TestCoordinator::new();
    let manager = t.coordinator.manager();
    let mut ctx = t.coordinator.context();

    let mut status = manager
        .begin_or_join(&mut ctx, &TransactionDefinition::named("manual"))
        .unwrap();
    t.write(&ctx, "x1").unwrap();
    manager.commit(&mut ctx, &mut status).unwrap();
    assert_eq!(status.state(), ScopeState::Committed);

    let err = manager.rollback(&mut ctx, &mut status).unwrap_err();
    assert!(err.is_illegal_state());
    assert!(t.store.contains("member", "x1"), "illegal rollback must not undo the commit");
    t.assert_single_completion(&ctx);
}

#[test]
fn manager_rejects_out_of_order_completion() {
    let t = TestCoordinator::new();
    let manager = t.coordinator.manager();
    let mut ctx = t.coordinator.context();

    let mut outer = manager
        .begin_or_join(&mut ctx, &TransactionDefinition::named("outer"))
        .unwrap();
    let mut inner = manager
        .begin_or_join(&mut ctx, &TransactionDefinition::named("inner"))
        .unwrap();

    assert!(manager.rollback(&mut ctx, &mut outer).unwrap_err().is_illegal_state());
    assert!(ctx.is_active());

    manager.commit(&mut ctx, &mut inner).unwrap();
    manager.commit(&mut ctx, &mut outer).unwrap();
    t.assert_single_completion(&ctx);
}
