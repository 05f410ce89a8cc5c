//! Member sign-up flows through MemberService.

use crate::common::*;

#[test]
fn join_v1_commits_member_and_log_together() {
    let t = TestCoordinator::new();
    let service = t.coordinator.member_service();
    let mut ctx = t.coordinator.context();

    service.join_v1(&mut ctx, "alice", "alice joined").unwrap();

    assert!(t.store.contains("member", "alice"));
    assert!(t.store.contains("log", "alice joined"));
    assert_eq!(t.stats().connections_acquired, 1);
    t.assert_single_completion(&ctx);
}

#[test]
fn join_v1_log_failure_surfaces_record_rejected() {
    let t = TestCoordinator::new();
    let service = t.coordinator.member_service();
    let mut ctx = t.coordinator.context();

    let err = service.join_v1(&mut ctx, "alice", "trigger").unwrap_err();

    assert!(err.is_record_rejected());
    assert!(service.members().find(&ctx, "alice").unwrap().is_none());
    assert!(service.logs().find(&ctx, "trigger").unwrap().is_none());
    t.assert_single_completion(&ctx);
}

#[test]
fn join_v2_recovered_log_failure_is_unexpected_rollback() {
    let t = TestCoordinator::new();
    let service = t.coordinator.member_service();
    let mut ctx = t.coordinator.context();

    let err = service.join_v2(&mut ctx, "alice", "trigger").unwrap_err();

    assert!(err.is_unexpected_rollback());
    assert!(t.store.is_empty());
    t.assert_single_completion(&ctx);
}

#[test]
fn join_unscoped_commits_member_independently() {
    let t = TestCoordinator::new();
    let service = t.coordinator.member_service();
    let mut ctx = t.coordinator.context();

    let err = service.join_unscoped(&mut ctx, "alice", "trigger").unwrap_err();

    assert!(err.is_record_rejected());
    assert!(t.store.contains("member", "alice"));
    assert!(!t.store.contains("log", "trigger"));

    let stats = t.stats();
    assert_eq!(stats.connections_acquired, 2, "each save runs its own transaction");
    assert_eq!(stats.physical_commits, 1);
    assert_eq!(stats.physical_rollbacks, 1);
}

#[test]
fn service_called_inside_caller_transaction_joins_it() {
    let t = TestCoordinator::new();
    let service = t.coordinator.member_service();
    let mut ctx = t.coordinator.context();

    t.template("controller")
        .execute(&mut ctx, |ctx| {
            service.join_v1(ctx, "alice", "first")?;
            service.join_v1(ctx, "bob", "second")?;
            assert!(!t.store.contains("member", "alice"), "nothing visible before outer commit");
            Ok::<_, Error>(())
        })
        .unwrap();

    assert_eq!(t.store.len(), 4);
    assert_eq!(t.stats().connections_acquired, 1);
    t.assert_single_completion(&ctx);
}

#[test]
fn reads_inside_transaction_see_own_writes() {
    let t = TestCoordinator::new();
    let service = t.coordinator.member_service();
    let mut ctx = t.coordinator.context();

    t.template("controller")
        .execute(&mut ctx, |ctx| {
            service.members().save(ctx, "alice")?;
            assert!(service.members().find(ctx, "alice")?.is_some());
            Ok::<_, Error>(())
        })
        .unwrap();
}
