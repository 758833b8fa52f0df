//! Application services: use-case orchestration.
//!
//! Each service module implements one step by composing domain logic with
//! port trait calls; `installer` sequences them into the public operations.
//! Services import only from `crate::domain` and `crate::application::ports`,
//! and never from `crate::infra`, `crate::commands`, or `crate::output`.

pub mod configure;
pub mod exec;
pub mod fetch;
pub mod installer;
pub mod package;
pub mod service_control;

#[cfg(test)]
pub(crate) mod test_support;
