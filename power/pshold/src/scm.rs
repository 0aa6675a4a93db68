// SPDX-License-Identifier: Apache-2.0

//! Secure-monitor seam for the shutdown path.

use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Secure-monitor calls available on this chip revision.
    ///
    /// Probed exactly once while arming the sequencer and never
    /// re-evaluated mid-sequence: the SPMI arbiter halt in particular must
    /// be issued on hardware that supports it, and skipped where it does
    /// not exist.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ScmCaps: u32 {
        /// The monitor can halt the SPMI PMIC arbiter.
        const HALT_PMIC_ARBITER = 1 << 0;
        /// The monitor can deassert PS_HOLD on our behalf.
        const DEASSERT_PS_HOLD = 1 << 1;
    }
}

/// Error code returned by a supported but failing secure-monitor call.
///
/// Only ever logged. The sequence keeps going on failure: halting mid-way
/// is strictly worse than proceeding with a partially disabled safety
/// mechanism.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScmError(pub i32);

impl fmt::Display for ScmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scm error {}", self.0)
    }
}

/// Calls into the higher-privilege execution mode.
///
/// Implemented per platform; [`QcomScm`] covers ARMv8 SMC-based chips.
///
/// [`QcomScm`]: crate::QcomScm
pub trait SecureMonitor {
    /// Reports which of the shutdown-path calls this chip supports.
    fn probe_caps(&self) -> ScmCaps;

    /// Disables the secure watchdog debug bypass.
    ///
    /// Needed to keep some chips from dropping into the debug image across
    /// the reset.
    fn disable_wdog_debug(&mut self) -> Result<(), ScmError>;

    /// Halts the SPMI PMIC arbiter so no further transactions reach the
    /// PMIC before PS_HOLD drops.
    fn halt_pmic_arbiter(&mut self) -> Result<(), ScmError>;

    /// Asks the monitor to deassert PS_HOLD.
    ///
    /// The caller must not rely on this cutting power; the direct register
    /// write still follows regardless of the outcome.
    fn deassert_ps_hold(&mut self) -> Result<(), ScmError>;
}
