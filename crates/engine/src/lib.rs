//! Engine layer for txscope
//!
//! This crate composes the store and the transaction manager into the
//! pieces application code uses:
//! - TransactionTemplate: the REQUIRED scope wrapper
//! - CoordinatorConfig: TOML configuration
//! - MemberRepository / LogRepository: transactional repositories
//! - MemberService: sign-up flows showing how nested scopes compose

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod repository;
pub mod service;
pub mod template;

pub use config::{CoordinatorConfig, DEFAULT_TRIGGER_VALUE};
pub use repository::{LogRepository, MemberRepository, LOG_COLLECTION, MEMBER_COLLECTION};
pub use service::MemberService;
pub use template::TransactionTemplate;
