// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! Process-wide resource ceilings
//!
//! Requested once at startup: an address-space cap and a CPU-time cap. The
//! run is a short batch job, so anything hitting these limits is runaway
//! behavior. Failure to set a limit is logged and non-fatal.

use tracing::{debug, warn};

/// Address-space ceiling: 2 GiB.
const MAX_ADDRESS_SPACE: u64 = 2 * 1024 * 1024 * 1024;
/// CPU-time ceiling: 10 minutes.
const MAX_CPU_SECS: u64 = 600;

/// Apply the address-space and CPU-time ceilings.
#[cfg(unix)]
pub fn apply() {
    let caps = [
        (libc::RLIMIT_AS, MAX_ADDRESS_SPACE, "RLIMIT_AS"),
        (libc::RLIMIT_CPU, MAX_CPU_SECS, "RLIMIT_CPU"),
    ];
    for (resource, limit, name) in caps {
        let rlim = libc::rlimit {
            rlim_cur: limit as libc::rlim_t,
            rlim_max: limit as libc::rlim_t,
        };
        // SAFETY: rlim is a valid, initialized rlimit for the given resource.
        let rc = unsafe { libc::setrlimit(resource, &rlim) };
        if rc == 0 {
            debug!(name, limit, "resource limit set");
        } else {
            let err = std::io::Error::last_os_error();
            warn!(name, limit, error = %err, "failed to set resource limit");
        }
    }
}

/// No resource ceilings available on this platform.
#[cfg(not(unix))]
pub fn apply() {
    debug!("resource limits not supported on this platform");
}
