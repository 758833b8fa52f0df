//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod platform;
pub mod render;
pub mod request;
pub mod state;

pub use command::{CommandResult, Privilege, RetryPolicy, split_command};
pub use config::ShipctlConfig;
pub use error::InstallerError;
pub use platform::{HostPlatform, PackageKind, resolve_package};
pub use request::{InstallRequest, RenderedConfig, ResolvedPackage, TemplateSource};
pub use state::RuntimeProperties;

/// Lower-case hex encoding of a byte slice.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
