//! Property tests over random nesting trees.
//!
//! A tree is a list of steps run inside one outermost scope. Each nested
//! scope either propagates or swallows the failures of its children. The
//! expected outcome is computed by a small model and compared with what the
//! coordinator actually did.

use crate::common::*;
use proptest::prelude::*;
use std::cell::Cell;

#[derive(Debug, Clone)]
enum Step {
    /// Plain write that always succeeds
    Write,
    /// Scoped write of the trigger value
    Fail,
    /// Nested scope; `true` swallows failures of its children
    Scope(Vec<Step>, bool),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    let leaf = prop_oneof![3 => Just(Step::Write), 1 => Just(Step::Fail)];
    leaf.prop_recursive(4, 32, 4, |inner| {
        (prop::collection::vec(inner, 0..4), any::<bool>())
            .prop_map(|(children, catch)| Step::Scope(children, catch))
    })
}

#[derive(Debug, Default)]
struct Expected {
    writes: usize,
    failures: usize,
    escaped: bool,
}

fn model(steps: &[Step], catch: bool, out: &mut Expected) {
    for step in steps {
        match step {
            Step::Write => out.writes += 1,
            Step::Fail => {
                out.failures += 1;
                if !catch {
                    out.escaped = true;
                    return;
                }
            }
            Step::Scope(children, child_catch) => {
                let mut inner = Expected::default();
                model(children, *child_catch, &mut inner);
                out.writes += inner.writes;
                out.failures += inner.failures;
                if inner.escaped && !catch {
                    out.escaped = true;
                    return;
                }
            }
        }
    }
}

fn run_steps(
    ctx: &mut TransactionContext,
    t: &TestCoordinator,
    template: &TransactionTemplate,
    steps: &[Step],
    catch: bool,
    counter: &Cell<usize>,
) -> Result<()> {
    for step in steps {
        let result = match step {
            Step::Write => {
                let n = counter.get();
                counter.set(n + 1);
                t.write(ctx, &format!("w{}", n)).map(|_| ())
            }
            Step::Fail => template.execute(ctx, |ctx| t.write(ctx, "trigger").map(|_| ())),
            Step::Scope(children, child_catch) => template.execute(ctx, |ctx| {
                run_steps(ctx, t, template, children, *child_catch, counter)
            }),
        };
        if let Err(e) = result {
            if !catch {
                return Err(e);
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn nested_chain_is_all_or_nothing(
        steps in prop::collection::vec(step_strategy(), 0..5),
        catch in any::<bool>(),
    ) {
        let t = TestCoordinator::new();
        let template = t.template("property");
        let mut ctx = t.coordinator.context();
        let counter = Cell::new(0);

        let result = template.execute(&mut ctx, |ctx| {
            run_steps(ctx, &t, &template, &steps, catch, &counter)
        });

        let mut expected = Expected::default();
        model(&steps, catch, &mut expected);

        // Exactly one physical outcome per chain
        let stats = t.stats();
        prop_assert_eq!(stats.physical_completions(), 1);
        prop_assert_eq!(stats.connections_acquired, 1);
        prop_assert_eq!(stats.open_connections(), 0);
        prop_assert!(!ctx.is_active());
        prop_assert_eq!(ctx.depth(), 0);

        if expected.failures == 0 {
            prop_assert!(result.is_ok());
            prop_assert_eq!(t.store.len(), expected.writes);
            prop_assert_eq!(stats.physical_commits, 1);
        } else {
            let err = result.unwrap_err();
            if expected.escaped {
                prop_assert!(err.is_record_rejected(), "got {:?}", err);
            } else {
                prop_assert!(err.is_unexpected_rollback(), "got {:?}", err);
            }
            prop_assert!(t.store.is_empty());
            prop_assert_eq!(stats.physical_rollbacks, 1);
        }
    }
}
