use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::{
    GrantOutcome, PermissionHost, PermissionListener, PermissionType, RUNTIME_PROMPT_API_LEVEL,
};

/// Default request-to-result latency above which a denial is classified as an
/// active user rejection.
pub const DEFAULT_USER_REJECT_THRESHOLD: Duration = Duration::from_millis(1000);

/// Mediates runtime permission requests between the application and the host
/// platform.
///
/// The coordinator owns exactly two pieces of mutable state: the single
/// registered [`PermissionListener`] and the timestamp of the most recently
/// issued request. There is no per-type request table; if two requests
/// overlap, the timestamp reflects only the later one. Hosts show one
/// permission prompt at a time, so overlapping requests do not occur in
/// practice.
///
/// Construct one with [`new`](Self::new) and hand it to
/// [`init`](crate::init) during application startup, or let
/// [`global`](crate::global) install a default-configured instance on first
/// access.
pub struct PermissionCoordinator {
    listener: Mutex<Option<Arc<dyn PermissionListener>>>,
    last_request: Mutex<Option<Instant>>,
    user_reject_threshold: Duration,
}

impl fmt::Debug for PermissionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionCoordinator")
            .field("user_reject_threshold", &self.user_reject_threshold)
            .finish_non_exhaustive()
    }
}

impl Default for PermissionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionCoordinator {
    /// Create a coordinator with the default one-second reject threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::with_user_reject_threshold(DEFAULT_USER_REJECT_THRESHOLD)
    }

    /// Create a coordinator with a custom reject threshold.
    ///
    /// The threshold tunes the denial classification heuristic described on
    /// [`deliver_result`](Self::deliver_result); slow devices may warrant a
    /// larger value.
    #[must_use]
    pub fn with_user_reject_threshold(threshold: Duration) -> Self {
        Self {
            listener: Mutex::new(None),
            last_request: Mutex::new(None),
            user_reject_threshold: threshold,
        }
    }

    /// The configured reject-classification threshold.
    #[must_use]
    pub const fn user_reject_threshold(&self) -> Duration {
        self.user_reject_threshold
    }

    /// Register the listener that receives request outcomes, replacing any
    /// previous one. `None` clears the slot.
    pub fn set_listener(&self, listener: Option<Arc<dyn PermissionListener>>) {
        *self.listener.lock().expect("listener mutex poisoned") = listener;
    }

    /// Ask the host to prompt for every native identifier `permission`
    /// bundles, tagged with the permission's code.
    ///
    /// Returns immediately; the outcome arrives later through
    /// [`deliver_result`](Self::deliver_result). A host-level failure to show
    /// the prompt is logged and otherwise swallowed; no retry is attempted
    /// and the listener is not notified.
    pub fn request_permission<H: PermissionHost + ?Sized>(
        &self,
        host: &H,
        permission: PermissionType,
    ) {
        let natives = permission.native_permissions();

        *self.last_request.lock().expect("request timestamp mutex poisoned") =
            Some(Instant::now());

        debug!("requesting {natives:?} with code {}", permission.code());
        if let Err(err) = host.request(natives, permission.code()) {
            error!("failed to issue permission request for {permission:?}: {err}");
        }
    }

    /// Whether every native identifier bundled by `permission` is currently
    /// granted.
    ///
    /// On platforms below [`RUNTIME_PROMPT_API_LEVEL`] this is always `true`:
    /// permissions were granted at install time and no runtime check is
    /// meaningful. Otherwise identifiers are checked in order and the first
    /// ungranted one fails the whole bundle.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn is_granted<H: PermissionHost + ?Sized>(
        &self,
        host: &H,
        permission: PermissionType,
    ) -> bool {
        if host.api_level() < RUNTIME_PROMPT_API_LEVEL {
            return true;
        }

        permission
            .native_permissions()
            .iter()
            .all(|native| host.is_granted(native))
    }

    /// Deliver the host's asynchronous grant result for `request_code`.
    ///
    /// The host activity forwards its native permission-result event here
    /// (on Android, via the bridge entry point in [`crate::sys`]). Outcomes
    /// are scanned in order: the first denial notifies the listener's
    /// [`on_failed`](PermissionListener::on_failed) and stops the scan; if
    /// none is found the listener's
    /// [`on_succeeded`](PermissionListener::on_succeeded) fires once.
    ///
    /// `rejected_by_user` is a latency heuristic: a denial arriving within
    /// the configured threshold of the request means no dialog can have been
    /// shown and dismissed that fast, so the denial was answered by the
    /// system (typically a permanent earlier denial) rather than by the user.
    /// Above the threshold a dialog was plausibly shown and actively
    /// declined. Slow devices and instant dismissals both defeat the
    /// heuristic; treat it as a hint, not a guarantee.
    ///
    /// Results are dropped without error when no listener is registered, when
    /// `outcomes` is empty, or when `request_code` does not map back to a
    /// known [`PermissionType`].
    pub fn deliver_result(&self, request_code: i32, outcomes: &[GrantOutcome]) {
        let listener = self.listener.lock().expect("listener mutex poisoned").clone();
        let Some(listener) = listener else {
            debug!("dropping permission result {request_code}: no listener registered");
            return;
        };

        if outcomes.is_empty() {
            debug!("dropping permission result {request_code}: empty outcome array");
            return;
        }

        let Some(permission) = PermissionType::from_code(request_code) else {
            warn!("received permission result for unknown request code {request_code}");
            return;
        };

        for outcome in outcomes {
            if *outcome == GrantOutcome::Denied {
                listener.on_failed(permission, self.rejected_by_user());
                return;
            }
        }

        listener.on_succeeded(permission);
    }

    /// Classify the denial that just arrived: more than the configured
    /// threshold since the request was issued means a prompt was plausibly
    /// shown and the user declined it. With no recorded request the denial
    /// cannot be a fresh user action.
    fn rejected_by_user(&self) -> bool {
        self.last_request
            .lock()
            .expect("request timestamp mutex poisoned")
            .is_some_and(|issued_at| issued_at.elapsed() > self.user_reject_threshold)
    }
}
