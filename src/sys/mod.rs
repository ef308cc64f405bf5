//! Platform-specific permission hosts.

#[cfg(target_os = "android")]
mod android;

#[cfg(target_os = "android")]
pub use android::AndroidPermissionHost;

/// Host for platforms without Android-style runtime prompts.
///
/// Every identifier reports granted (install-time grant semantics, the same
/// contract the coordinator applies below the runtime-prompt API level) and
/// prompting is unsupported.
#[cfg(not(target_os = "android"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct StubHost;

#[cfg(not(target_os = "android"))]
impl crate::PermissionHost for StubHost {
    fn api_level(&self) -> u32 {
        0
    }

    fn is_granted(&self, _permission: &str) -> bool {
        true
    }

    fn request(&self, _permissions: &[&str], _request_code: i32) -> Result<(), crate::HostError> {
        Err(crate::HostError::Unsupported)
    }
}
