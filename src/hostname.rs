//! Host identity lookup
//!
//! Production code uses `SystemHostname`, which asks the kernel via
//! `gethostname(2)` on every call. Tests inject a fixed or failing resolver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostnameError {
    #[error("gethostname failed: {0}")]
    Lookup(#[from] nix::Error),

    #[error("system host name is empty")]
    Empty,
}

/// Trait for resolving the machine's network name
///
/// Injected via `AppState` so handlers never call the OS directly.
pub trait HostnameResolver: Send + Sync {
    fn hostname(&self) -> Result<String, HostnameError>;
}

/// Resolver backed by `gethostname(2)`
///
/// Not cached: a host rename is visible on the next request.
pub struct SystemHostname;

impl HostnameResolver for SystemHostname {
    fn hostname(&self) -> Result<String, HostnameError> {
        let name = nix::unistd::gethostname()?;
        let name = name.to_string_lossy().into_owned();
        if name.is_empty() {
            return Err(HostnameError::Empty);
        }
        Ok(name)
    }
}

/// Resolver that always returns the same name
#[cfg(test)]
pub struct FixedHostname(pub String);

#[cfg(test)]
impl HostnameResolver for FixedHostname {
    fn hostname(&self) -> Result<String, HostnameError> {
        Ok(self.0.clone())
    }
}

/// Resolver that always fails, for exercising the 500 path
#[cfg(test)]
pub struct FailingHostname;

#[cfg(test)]
impl HostnameResolver for FailingHostname {
    fn hostname(&self) -> Result<String, HostnameError> {
        Err(HostnameError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_hostname_is_not_empty() {
        let name = SystemHostname.hostname().unwrap();
        assert!(!name.is_empty());
    }

    #[test]
    fn test_system_hostname_is_stable_between_calls() {
        let first = SystemHostname.hostname().unwrap();
        let second = SystemHostname.hostname().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fixed_hostname_returns_value() {
        let resolver = FixedHostname("web-01".to_string());
        assert_eq!(resolver.hostname().unwrap(), "web-01");
    }

    #[test]
    fn test_failing_hostname_returns_error() {
        let err = FailingHostname.hostname().unwrap_err();
        assert_eq!(err.to_string(), "system host name is empty");
    }
}
