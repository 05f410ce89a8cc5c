//! Isolation between concurrent call chains.

use crate::common::*;

#[test]
fn concurrent_chains_use_separate_connections() {
    let t = TestCoordinator::new();
    let template = t.template("worker");

    std::thread::scope(|s| {
        for worker in 0..8 {
            let template = template.clone();
            let store = t.store.clone();
            s.spawn(move || {
                let mut ctx = TransactionContext::new();
                let result = template.execute(&mut ctx, |ctx| {
                    store.write(ctx, Record::new("member", format!("w{}-a", worker)))?;
                    store.write(ctx, Record::new("member", format!("w{}-b", worker)))?;
                    if worker % 2 == 1 {
                        store.write(ctx, Record::new("member", "trigger"))?;
                    }
                    Ok::<_, Error>(())
                });
                assert_eq!(result.is_ok(), worker % 2 == 0);
                assert!(!ctx.is_active());
            });
        }
    });

    // Only even workers committed, and each committed both of its writes
    assert_eq!(t.store.len(), 8);
    for worker in 0..8 {
        let expected = worker % 2 == 0;
        assert_eq!(t.store.contains("member", &format!("w{}-a", worker)), expected);
        assert_eq!(t.store.contains("member", &format!("w{}-b", worker)), expected);
    }

    let stats = t.stats();
    assert_eq!(stats.connections_acquired, 8);
    assert_eq!(stats.physical_commits, 4);
    assert_eq!(stats.physical_rollbacks, 4);
    assert_eq!(stats.open_connections(), 0);
}

#[test]
fn rollback_only_marker_is_per_chain() {
    let t = TestCoordinator::new();
    let (outer, inner) = (t.template("outer"), t.template("inner"));
    let mut poisoned = t.coordinator.context();
    let mut healthy = t.coordinator.context();

    let manager = t.coordinator.manager();
    let mut poisoned_status = manager
        .begin_or_join(&mut poisoned, &TransactionDefinition::named("poisoned"))
        .unwrap();
    let _ = inner.execute(&mut poisoned, |ctx| t.write(ctx, "trigger"));
    assert!(poisoned.is_rollback_only());

    outer
        .execute(&mut healthy, |ctx| {
            assert!(!ctx.is_rollback_only());
            t.write(ctx, "h1")
        })
        .unwrap();
    assert!(t.store.contains("member", "h1"));

    let err = manager.commit(&mut poisoned, &mut poisoned_status).unwrap_err();
    assert!(err.is_unexpected_rollback());
}

#[test]
fn auto_commit_write_outside_scope_is_not_affected_by_other_chain() {
    let t = TestCoordinator::new();
    let manager = t.coordinator.manager();
    let mut chain = t.coordinator.context();
    let outside = t.coordinator.context();

    let mut status = manager
        .begin_or_join(&mut chain, &TransactionDefinition::named("chain"))
        .unwrap();
    t.write(&chain, "staged").unwrap();
    t.write(&outside, "immediate").unwrap();

    assert!(t.store.contains("member", "immediate"));
    assert!(!t.store.contains("member", "staged"));

    manager.rollback(&mut chain, &mut status).unwrap();
    assert!(t.store.contains("member", "immediate"));
    assert!(!t.store.contains("member", "staged"));
}
