// SPDX-License-Identifier: Apache-2.0

//! PS_HOLD restart and power-off sequencing.
//!
//! On these SoCs the application processor does not power itself down.
//! It records why it is going away, quiesces the hardware that talks to the
//! PMIC, and then drops the PS_HOLD line; the PMIC does the rest. Getting
//! the order wrong corrupts in-flight SPMI transactions or leaves the board
//! wedged with PS_HOLD still high, so the whole sequence lives in one place,
//! [`PowerSequencer`], as an explicit linear list of steps.
//!
//! The platform integration resolves and maps the two hardware registers,
//! implements the board-side traits ([`SecureMonitor`], [`PowerOnBlock`],
//! [`ArchOps`]) and arms the sequencer once via [`PowerSequencer::probe`].
//! Everything mutable that feeds the sequence (restart mode, panic flag,
//! device lock) is snapshotted at invocation time; once [`restart`] starts
//! running, nothing in this crate ever returns control to the caller.
//!
//! [`restart`]: PowerSequencer::restart

#![cfg_attr(not(test), no_std)]

use core::sync::atomic::{AtomicBool, Ordering};

use kspin::SpinNoIrq;
use lazyinit::LazyInit;
use log::warn;

mod mmio;
mod pon;
mod scm;
mod sequencer;

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "aarch64", target_os = "none"))] {
        mod smc;
        pub use smc::QcomScm;
    }
}

pub use mmio::MmioResetRegs;
pub use pon::PowerOnBlock;
pub use reset_reason::{
    Classification, PonRestartReason, RebootPolicy, ResetType, RestartMode, RestartReason,
};
pub use scm::{ScmCaps, ScmError, SecureMonitor};
pub use sequencer::{ArchOps, Board, InitError, PowerSequencer, ProbeParams, ResetRegs};

static RESTART_MODE: SpinNoIrq<RestartMode> = SpinNoIrq::new(RestartMode::Normal);
static IN_PANIC: AtomicBool = AtomicBool::new(false);
static DEVICE_LOCKED: LazyInit<bool> = LazyInit::new();

/// Sets the process-wide restart mode.
///
/// May be called at any time by a trusted caller; the value is read once
/// when a restart sequence starts.
pub fn set_restart_mode(mode: RestartMode) {
    *RESTART_MODE.lock() = mode;
}

pub(crate) fn restart_mode() -> RestartMode {
    *RESTART_MODE.lock()
}

/// Latches that the system is going down because of a panic.
///
/// Called from the panic path before the restart is requested. Never
/// cleared: a panicking system does not come back.
pub fn note_panic() {
    IN_PANIC.store(true, Ordering::Release);
}

pub(crate) fn panicking() -> bool {
    IN_PANIC.load(Ordering::Acquire)
}

/// Records the boot-time device lock from its boot-parameter string.
///
/// `"1"` locks the device, anything else leaves it unlocked. Set once at
/// boot; later calls are ignored. A locked device can never be put into
/// emergency download mode.
pub fn set_device_locked(bootarg: &str) {
    if DEVICE_LOCKED.is_inited() {
        warn!("device_locked already set, ignoring update");
        return;
    }
    DEVICE_LOCKED.init_once(bootarg == "1");
}

pub(crate) fn device_locked() -> bool {
    DEVICE_LOCKED.get().copied().unwrap_or(false)
}
