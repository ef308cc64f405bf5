//! Runtime permission coordination for Android applications.
//!
//! Below API level 23 Android grants every manifest permission at install
//! time; from level 23 on, dangerous permissions are requested at runtime
//! through a system prompt whose outcome arrives asynchronously on the UI
//! thread. This crate wraps that flow behind a single coordinator: it maps a
//! closed set of [`PermissionType`]s to the native permission strings each one
//! bundles, issues prompt requests to the host activity, answers synchronous
//! grant checks, and forwards the asynchronous result to one registered
//! [`PermissionListener`], classifying denials as user-rejected or not with a
//! request-to-result latency heuristic.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use runtime_permission::{PermissionListener, PermissionType};
//!
//! struct CameraGate;
//!
//! impl PermissionListener for CameraGate {
//!     fn on_succeeded(&self, permission: PermissionType) {
//!         // open the camera screen
//!     }
//!
//!     fn on_failed(&self, permission: PermissionType, rejected_by_user: bool) {
//!         if !rejected_by_user {
//!             // permanently denied earlier; point the user at app settings
//!         }
//!     }
//! }
//!
//! let coordinator = runtime_permission::global();
//! coordinator.set_listener(Some(Arc::new(CameraGate)));
//! if !coordinator.is_granted(&host, PermissionType::Camera) {
//!     coordinator.request_permission(&host, PermissionType::Camera);
//! }
//! ```
//!
//! The host activity must forward its `onRequestPermissionsResult` callback to
//! the bridge entry point declared in [`sys`] so results reach the listener.

#![warn(missing_docs)]

mod coordinator;
mod error;
/// Platform-specific host implementations.
pub mod sys;

pub use coordinator::{DEFAULT_USER_REJECT_THRESHOLD, PermissionCoordinator};
pub use error::HostError;

use std::sync::OnceLock;

/// Platform API level that introduced runtime permission prompting
/// (Android 6.0, "M").
pub const RUNTIME_PROMPT_API_LEVEL: u32 = 23;

/// Native identifiers, as declared in `AndroidManifest.xml`.
mod native {
    pub const CAMERA: &str = "android.permission.CAMERA";
    pub const RECORD_AUDIO: &str = "android.permission.RECORD_AUDIO";
    pub const ACCESS_FINE_LOCATION: &str = "android.permission.ACCESS_FINE_LOCATION";
    pub const READ_CONTACTS: &str = "android.permission.READ_CONTACTS";
    pub const READ_EXTERNAL_STORAGE: &str = "android.permission.READ_EXTERNAL_STORAGE";
    pub const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";
    pub const SYSTEM_ALERT_WINDOW: &str = "android.permission.SYSTEM_ALERT_WINDOW";
    pub const SEND_SMS: &str = "android.permission.SEND_SMS";
    pub const CALL_PHONE: &str = "android.permission.CALL_PHONE";
}

/// Kinds of permission the host application can request.
///
/// Each kind carries a stable integer code, reused as the correlation token
/// that ties an asynchronous result back to the request that triggered it.
/// One kind may bundle several native permissions; the bundle is granted only
/// as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PermissionType {
    /// Camera capture. Bundles storage write so captured media can be saved.
    Camera = 100,
    /// Microphone recording. Bundles storage write so recordings can be saved.
    RecordAudio = 101,
    /// Precise (GPS) location.
    FineLocation = 102,
    /// Reading the contact book.
    ReadContacts = 103,
    /// Reading shared external storage.
    ReadExternalStorage = 104,
    /// Writing shared external storage.
    WriteExternalStorage = 105,
    /// Drawing overlay windows on top of other applications.
    SystemAlertWindow = 106,
    /// Sending SMS messages.
    SendSms = 107,
    /// Placing phone calls.
    CallPhone = 108,
}

impl PermissionType {
    /// The integer code used as the host-side correlation token.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Resolve a raw correlation code back to a permission type.
    ///
    /// Returns `None` for codes outside the closed enumeration; callers
    /// holding raw codes (host glue, the JNI bridge) decide whether that is a
    /// programming error or an ignorable stray result.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            100 => Some(Self::Camera),
            101 => Some(Self::RecordAudio),
            102 => Some(Self::FineLocation),
            103 => Some(Self::ReadContacts),
            104 => Some(Self::ReadExternalStorage),
            105 => Some(Self::WriteExternalStorage),
            106 => Some(Self::SystemAlertWindow),
            107 => Some(Self::SendSms),
            108 => Some(Self::CallPhone),
            _ => None,
        }
    }

    /// The native permission identifiers this kind bundles, in request order.
    #[must_use]
    pub const fn native_permissions(self) -> &'static [&'static str] {
        match self {
            Self::Camera => &[native::CAMERA, native::WRITE_EXTERNAL_STORAGE],
            Self::RecordAudio => &[native::RECORD_AUDIO, native::WRITE_EXTERNAL_STORAGE],
            Self::FineLocation => &[native::ACCESS_FINE_LOCATION],
            Self::ReadContacts => &[native::READ_CONTACTS],
            Self::ReadExternalStorage => &[native::READ_EXTERNAL_STORAGE],
            Self::WriteExternalStorage => &[native::WRITE_EXTERNAL_STORAGE],
            Self::SystemAlertWindow => &[native::SYSTEM_ALERT_WINDOW],
            Self::SendSms => &[native::SEND_SMS],
            Self::CallPhone => &[native::CALL_PHONE],
        }
    }

    /// Human-readable label for prompts and rationale dialogs.
    #[must_use]
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::Camera => "Camera & Storage",
            Self::RecordAudio => "Microphone & Storage",
            Self::FineLocation => "Location",
            Self::ReadContacts => "Contacts",
            Self::ReadExternalStorage => "Read Storage",
            Self::WriteExternalStorage => "Storage",
            Self::SystemAlertWindow => "Overlay Window",
            Self::SendSms => "Send SMS",
            Self::CallPhone => "Phone Calls",
        }
    }
}

/// Per-identifier result of a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrantOutcome {
    /// The identifier is granted.
    Granted,
    /// The identifier was refused, or remains ungranted.
    Denied,
}

impl GrantOutcome {
    /// Convert a raw platform grant value.
    ///
    /// `0` (`PackageManager.PERMISSION_GRANTED`) maps to [`Self::Granted`];
    /// every other value is treated as a denial.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Self {
        if raw == 0 { Self::Granted } else { Self::Denied }
    }
}

/// Receives the outcome of an asynchronous permission request.
///
/// At most one listener is registered at a time; registering a new one
/// replaces the previous one. Callbacks run on whichever thread delivers the
/// host result; on Android that is the UI thread.
pub trait PermissionListener: Send + Sync {
    /// Every native identifier bundled by `permission` was granted.
    fn on_succeeded(&self, permission: PermissionType);

    /// At least one bundled identifier was denied.
    ///
    /// `rejected_by_user` reflects the latency heuristic described on
    /// [`PermissionCoordinator::deliver_result`]: `true` when a prompt was
    /// plausibly shown and actively declined, `false` when the platform
    /// answered without prompting (typically a permanent earlier denial).
    fn on_failed(&self, permission: PermissionType, rejected_by_user: bool);
}

/// Host-side surface the coordinator drives.
///
/// On Android this is the application activity (see
/// `sys::AndroidPermissionHost`); tests substitute a recording fake.
pub trait PermissionHost {
    /// Platform API level (`Build.VERSION.SDK_INT` on Android).
    fn api_level(&self) -> u32;

    /// Whether a single native identifier is currently granted.
    fn is_granted(&self, permission: &str) -> bool;

    /// Show the system prompt for `permissions`, tagged with `request_code`.
    ///
    /// Called exactly once per coordinator request; there is no retry.
    ///
    /// # Errors
    /// Returns a [`HostError`] when the platform cannot issue the prompt.
    fn request(&self, permissions: &[&str], request_code: i32) -> Result<(), HostError>;
}

static GLOBAL: OnceLock<PermissionCoordinator> = OnceLock::new();

/// Install `coordinator` as the process-wide instance.
///
/// Call once during application startup, before any result can arrive through
/// the JNI bridge. Later calls, and calls after [`global`] has already
/// installed a default, are rejected.
///
/// # Errors
/// Returns `coordinator` back when a process-wide instance is already
/// installed.
pub fn init(coordinator: PermissionCoordinator) -> Result<(), PermissionCoordinator> {
    GLOBAL.set(coordinator)
}

/// The process-wide coordinator.
///
/// Installs a default-configured [`PermissionCoordinator`] on first access if
/// [`init`] was never called. The JNI bridge routes host results here.
pub fn global() -> &'static PermissionCoordinator {
    GLOBAL.get_or_init(PermissionCoordinator::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PermissionType; 9] = [
        PermissionType::Camera,
        PermissionType::RecordAudio,
        PermissionType::FineLocation,
        PermissionType::ReadContacts,
        PermissionType::ReadExternalStorage,
        PermissionType::WriteExternalStorage,
        PermissionType::SystemAlertWindow,
        PermissionType::SendSms,
        PermissionType::CallPhone,
    ];

    #[test]
    fn every_type_has_identifiers_and_label() {
        for permission in ALL {
            assert!(!permission.native_permissions().is_empty());
            assert!(!permission.display_label().is_empty());
        }
    }

    #[test]
    fn codes_round_trip() {
        for permission in ALL {
            assert_eq!(PermissionType::from_code(permission.code()), Some(permission));
        }
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(PermissionType::Camera.code(), 100);
        assert_eq!(PermissionType::CallPhone.code(), 108);
    }

    #[test]
    fn unknown_codes_resolve_to_none() {
        assert_eq!(PermissionType::from_code(0), None);
        assert_eq!(PermissionType::from_code(99), None);
        assert_eq!(PermissionType::from_code(109), None);
        assert_eq!(PermissionType::from_code(-1), None);
    }

    #[test]
    fn camera_and_audio_bundle_storage_write() {
        assert!(
            PermissionType::Camera
                .native_permissions()
                .contains(&"android.permission.WRITE_EXTERNAL_STORAGE")
        );
        assert!(
            PermissionType::RecordAudio
                .native_permissions()
                .contains(&"android.permission.WRITE_EXTERNAL_STORAGE")
        );
    }

    #[test]
    fn raw_grant_values_map_fail_closed() {
        assert_eq!(GrantOutcome::from_raw(0), GrantOutcome::Granted);
        assert_eq!(GrantOutcome::from_raw(-1), GrantOutcome::Denied);
        assert_eq!(GrantOutcome::from_raw(7), GrantOutcome::Denied);
    }
}
