// SPDX-License-Identifier: Apache-2.0

//! Direct register access to PS_HOLD and the restart reason register.

use crate::sequencer::{InitError, ProbeParams, ResetRegs};

/// The two memory-mapped registers the sequencer writes directly.
///
/// Built from already-mapped addresses supplied by the platform
/// integration; see [`MmioResetRegs::map`]. Exclusively owned by the
/// sequencer once armed.
pub struct MmioResetRegs {
    ps_hold: *mut u32,
    restart_reason: *mut u32,
}

// Only one thread of control ever reaches the shutdown path.
unsafe impl Send for MmioResetRegs {}

impl MmioResetRegs {
    /// Validates the probe parameters and takes ownership of the registers.
    ///
    /// Both addresses are required: without PS_HOLD there is nothing to
    /// deassert, and without the reason register the direct persistence
    /// path is gone. Either one missing aborts the probe.
    pub fn map(params: &ProbeParams) -> Result<Self, InitError> {
        let ps_hold = params.ps_hold_base.ok_or(InitError::MissingPsHold)?;
        let restart_reason = params
            .restart_reason_base
            .ok_or(InitError::MissingReasonRegister)?;
        Ok(Self {
            ps_hold: ps_hold.as_mut_ptr() as *mut u32,
            restart_reason: restart_reason.as_mut_ptr() as *mut u32,
        })
    }
}

impl ResetRegs for MmioResetRegs {
    fn write_reason(&mut self, magic: u32) {
        unsafe { self.restart_reason.write_volatile(magic) };
    }

    fn deassert_ps_hold(&mut self) {
        unsafe { self.ps_hold.write_volatile(0) };
    }
}
