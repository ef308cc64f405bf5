//! Android host backed by JNI calls against the application activity.
//!
//! The coordinator side needs no Java helper code: the API level comes from
//! `Build.VERSION.SDK_INT`, grant checks go through
//! `Context#checkSelfPermission`, and prompts through
//! `Activity#requestPermissions`. The only glue the application must supply is
//! a bridge class forwarding the activity's `onRequestPermissionsResult`
//! callback to this crate:
//!
//! ```java
//! package com.runtimepermission;
//!
//! public final class PermissionBridge {
//!     public static native void deliverResult(
//!             int requestCode, String[] permissions, int[] grantResults);
//! }
//! ```

use std::fmt;

use jni::objects::{GlobalRef, JClass, JIntArray, JObject, JObjectArray, JValue};
use jni::sys::{jint, jsize};
use jni::{JNIEnv, JavaVM};
use log::error;

use crate::{GrantOutcome, HostError, PermissionHost};

/// [`PermissionHost`] backed by the host application's `Activity` through JNI.
pub struct AndroidPermissionHost {
    vm: JavaVM,
    activity: GlobalRef,
}

impl fmt::Debug for AndroidPermissionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidPermissionHost").finish_non_exhaustive()
    }
}

impl AndroidPermissionHost {
    /// Capture the host activity for later permission calls.
    ///
    /// # Errors
    /// Returns [`HostError::Platform`] when the JVM handle or the global
    /// activity reference cannot be created.
    pub fn new(env: &JNIEnv<'_>, activity: JObject<'_>) -> Result<Self, HostError> {
        let vm = env.get_java_vm().map_err(map_jni_error)?;
        let activity = env.new_global_ref(activity).map_err(map_jni_error)?;
        Ok(Self { vm, activity })
    }

    fn with_attached_env<T, F>(&self, action: F) -> Result<T, HostError>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<T>,
    {
        let mut env = self.vm.attach_current_thread().map_err(map_jni_error)?;
        let activity = self.activity.as_obj();
        action(&mut env, activity).map_err(map_jni_error)
    }
}

impl PermissionHost for AndroidPermissionHost {
    fn api_level(&self) -> u32 {
        let level = self.with_attached_env(|env, _activity| {
            env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?
                .i()
        });

        match level {
            Ok(level) => u32::try_from(level).unwrap_or(0),
            Err(err) => {
                // Level 0 keeps grant checks on the install-time path.
                error!("failed to read Build.VERSION.SDK_INT: {err}");
                0
            }
        }
    }

    fn is_granted(&self, permission: &str) -> bool {
        let granted = self.with_attached_env(|env, activity| {
            let j_permission = env.new_string(permission)?;
            let j_object = JObject::from(j_permission);
            let args = [JValue::Object(&j_object)];
            let result = env
                .call_method(activity, "checkSelfPermission", "(Ljava/lang/String;)I", &args)?
                .i()?;
            Ok(GrantOutcome::from_raw(result) == GrantOutcome::Granted)
        });

        match granted {
            Ok(granted) => granted,
            Err(err) => {
                error!("checkSelfPermission failed for {permission}: {err}");
                false
            }
        }
    }

    fn request(&self, permissions: &[&str], request_code: i32) -> Result<(), HostError> {
        self.with_attached_env(|env, activity| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let length = permissions.len() as jsize;
            let string_class = env.find_class("java/lang/String")?;
            let array = env.new_object_array(length, string_class, JObject::null())?;
            for (index, permission) in (0..).zip(permissions.iter().copied()) {
                let j_permission = env.new_string(permission)?;
                env.set_object_array_element(&array, index, j_permission)?;
            }

            let args = [JValue::Object(&array), JValue::Int(request_code)];
            env.call_method(
                activity,
                "requestPermissions",
                "([Ljava/lang/String;I)V",
                &args,
            )?;
            Ok(())
        })
    }
}

/// JNI entry point for `PermissionBridge.deliverResult`.
///
/// The host activity calls the bridge from its
/// `onRequestPermissionsResult(int, String[], int[])` override, forwarding
/// the platform arguments verbatim. Outcomes are routed to the process-wide
/// coordinator; the echoed identifier array plays no part in the decision.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_runtimepermission_PermissionBridge_deliverResult(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    request_code: jint,
    _permissions: JObjectArray<'_>,
    grant_results: JIntArray<'_>,
) {
    let outcomes = match read_outcomes(&mut env, &grant_results) {
        Ok(outcomes) => outcomes,
        Err(err) => {
            error!("failed to read grant results for request {request_code}: {err}");
            return;
        }
    };

    crate::global().deliver_result(request_code, &outcomes);
}

fn read_outcomes(
    env: &mut JNIEnv<'_>,
    grant_results: &JIntArray<'_>,
) -> jni::errors::Result<Vec<GrantOutcome>> {
    let length = env.get_array_length(grant_results)?;
    let mut raw = vec![0; usize::try_from(length).unwrap_or(0)];
    env.get_int_array_region(grant_results, 0, &mut raw)?;
    Ok(raw.into_iter().map(GrantOutcome::from_raw).collect())
}

#[allow(clippy::needless_pass_by_value)]
fn map_jni_error(err: jni::errors::Error) -> HostError {
    HostError::Platform(err.to_string())
}
