//! Concrete service managers and the one-time selection between them.

use crate::application::ports::{ServiceAction, ServiceManager, ServiceManagers};

/// `systemctl <verb> <service>`.
pub struct Systemd;

impl ServiceManager for Systemd {
    fn name(&self) -> &'static str {
        "systemd"
    }

    fn command(&self, service: &str, action: ServiceAction) -> Vec<String> {
        vec!["systemctl".into(), action.verb().into(), service.into()]
    }
}

/// SysV-style `service <service> <verb>`.
pub struct SysV;

impl ServiceManager for SysV {
    fn name(&self) -> &'static str {
        "sysv"
    }

    fn command(&self, service: &str, action: ServiceAction) -> Vec<String> {
        vec!["service".into(), service.into(), action.verb().into()]
    }
}

/// Pick the service managers for this host: systemd with a SysV fallback
/// when `systemctl` is on `PATH`, SysV alone otherwise.
#[must_use]
pub fn detect_service_managers() -> ServiceManagers {
    managers_for(which::which("systemctl").is_ok())
}

fn managers_for(has_systemd: bool) -> ServiceManagers {
    if has_systemd {
        tracing::debug!("systemctl found, using systemd with sysv fallback");
        ServiceManagers {
            primary: Box::new(Systemd),
            fallback: Some(Box::new(SysV)),
        }
    } else {
        tracing::debug!("systemctl not found, using sysv");
        ServiceManagers {
            primary: Box::new(SysV),
            fallback: None,
        }
    }
}
