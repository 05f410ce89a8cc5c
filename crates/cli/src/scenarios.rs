//! Predefined propagation scenarios.
//!
//! Every run gets a fresh coordinator, so reports never see writes from an
//! earlier run.

use serde::Serialize;
use txscope::prelude::*;
use txscope::CoordinatorConfig;

/// Concrete nesting scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// One flat scope writes `x1`
    A,
    /// Outer scope; inner A writes `m1`, inner B writes the trigger and the
    /// failure propagates
    B,
    /// As B, but the outer operation catches B's failure
    C,
}

impl Scenario {
    /// Short label
    pub fn label(&self) -> &'static str {
        match self {
            Scenario::A => "A",
            Scenario::B => "B",
            Scenario::C => "C",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Scenario::A => "flat scope, no failure",
            Scenario::B => "inner failure propagates to outer scope",
            Scenario::C => "inner failure caught by outer scope",
        }
    }
}

/// How `MemberService` composes its scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMode {
    /// `join_v1`
    Propagate,
    /// `join_v2`
    Catch,
    /// `join_unscoped`
    Unscoped,
}

/// Outcome of one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// What ran
    pub name: String,
    /// Human description
    pub description: String,
    /// Error code, if the run failed
    pub error_code: Option<&'static str>,
    /// Error message, if the run failed
    pub error: Option<String>,
    /// Committed records after the run
    pub visible: Vec<String>,
    /// Physical commits issued by the run
    pub physical_commits: u64,
    /// Physical rollbacks issued by the run
    pub physical_rollbacks: u64,
}

impl Report {
    fn new(name: String, description: String, coordinator: &Coordinator, result: Result<()>) -> Self {
        let stats = coordinator.stats();
        let (error_code, error) = match result {
            Ok(()) => (None, None),
            Err(e) => (Some(e.code()), Some(e.to_string())),
        };
        Self {
            name,
            description,
            error_code,
            error,
            visible: coordinator
                .store()
                .committed_records()
                .iter()
                .map(|r| r.to_string())
                .collect(),
            physical_commits: stats.physical_commits,
            physical_rollbacks: stats.physical_rollbacks,
        }
    }

    /// Whether the run succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run one predefined scenario
pub fn run_scenario(config: &CoordinatorConfig, scenario: Scenario) -> Report {
    let coordinator = Coordinator::from_config(config.clone());
    let store = coordinator.store();
    let outer = coordinator.template_named(format!("scenario-{}", scenario.label()));
    let inner_a = coordinator.template_named("inner-a");
    let inner_b = coordinator.template_named("inner-b");
    let trigger = config.trigger_value.clone();
    let mut ctx = coordinator.context();

    tracing::info!(scenario = scenario.label(), "Running scenario");
    let result = match scenario {
        Scenario::A => outer
            .execute(&mut ctx, |ctx| store.write(ctx, Record::new("member", "x1")))
            .map(|_| ()),
        Scenario::B => outer.execute(&mut ctx, |ctx| {
            inner_a.execute(ctx, |ctx| store.write(ctx, Record::new("member", "m1")))?;
            inner_b.execute(ctx, |ctx| store.write(ctx, Record::new("member", trigger.as_str())))?;
            Ok::<_, Error>(())
        }),
        Scenario::C => outer.execute(&mut ctx, |ctx| {
            inner_a.execute(ctx, |ctx| store.write(ctx, Record::new("member", "m1")))?;
            if let Err(e) =
                inner_b.execute(ctx, |ctx| store.write(ctx, Record::new("member", trigger.as_str())))
            {
                tracing::warn!(error = %e, "Inner scope failed; recovering locally");
            }
            Ok::<_, Error>(())
        }),
    };

    Report::new(
        format!("scenario {}", scenario.label()),
        scenario.description().to_string(),
        &coordinator,
        result,
    )
}

/// Run one sign-up through `MemberService`
pub fn run_join(config: &CoordinatorConfig, username: &str, message: &str, mode: JoinMode) -> Report {
    let coordinator = Coordinator::from_config(config.clone());
    let service = coordinator.member_service();
    let mut ctx = coordinator.context();

    let (name, result) = match mode {
        JoinMode::Propagate => ("join_v1", service.join_v1(&mut ctx, username, message)),
        JoinMode::Catch => ("join_v2", service.join_v2(&mut ctx, username, message)),
        JoinMode::Unscoped => ("join_unscoped", service.join_unscoped(&mut ctx, username, message)),
    };

    Report::new(
        name.to_string(),
        format!("member '{}', log '{}'", username, message),
        &coordinator,
        result,
    )
}
