// SPDX-License-Identifier: Apache-2.0

//! ARMv8 SMC implementation of the secure-monitor seam.
//!
//! Function identifiers follow the chip vendor's SIP service encoding:
//! owner SIP (0x02) in the top byte, service in bits 15:8, command in the
//! low byte. All calls here are atomic (no buffers, value arguments only).

use core::arch::asm;

use crate::scm::{ScmCaps, ScmError, SecureMonitor};

const SCM_SVC_BOOT: u32 = 0x01;
const SCM_SVC_INFO: u32 = 0x06;
const SCM_SVC_PWR: u32 = 0x09;

const SCM_IS_CALL_AVAIL_CMD: u32 = 0x01;
const SCM_WDOG_DEBUG_BOOT_PART: u32 = 0x09;
const SCM_IO_DISABLE_PMIC_ARBITER: u32 = 0x01;
const SCM_IO_DEASSERT_PS_HOLD: u32 = 0x02;

const fn sip_fnid(svc: u32, cmd: u32) -> u32 {
    0x0200_0000 | ((svc & 0xff) << 8) | (cmd & 0xff)
}

/// Argument descriptor: `n` value arguments, no buffers.
const fn scm_args(n: u32) -> u32 {
    n
}

fn smc_atomic(fnid: u32, arginfo: u32, arg0: u64, arg1: u64) -> i32 {
    let ret: u64;
    unsafe {
        asm!(
            "smc #0",
            inlateout("x0") fnid as u64 => ret,
            in("x1") arginfo as u64,
            in("x2") arg0,
            in("x3") arg1,
            lateout("x4") _,
            lateout("x5") _,
            lateout("x6") _,
            options(nostack),
        );
    }
    ret as i32
}

/// Secure-monitor access on SMC-based chips.
#[derive(Default)]
pub struct QcomScm;

impl QcomScm {
    pub const fn new() -> Self {
        Self
    }

    fn is_call_available(svc: u32, cmd: u32) -> bool {
        let fnid = sip_fnid(SCM_SVC_INFO, SCM_IS_CALL_AVAIL_CMD);
        smc_atomic(fnid, scm_args(1), sip_fnid(svc, cmd) as u64, 0) > 0
    }

    fn call(fnid: u32, arginfo: u32, arg0: u64, arg1: u64) -> Result<(), ScmError> {
        match smc_atomic(fnid, arginfo, arg0, arg1) {
            0 => Ok(()),
            err => Err(ScmError(err)),
        }
    }
}

impl SecureMonitor for QcomScm {
    fn probe_caps(&self) -> ScmCaps {
        let mut caps = ScmCaps::empty();
        if Self::is_call_available(SCM_SVC_PWR, SCM_IO_DISABLE_PMIC_ARBITER) {
            caps |= ScmCaps::HALT_PMIC_ARBITER;
        }
        if Self::is_call_available(SCM_SVC_PWR, SCM_IO_DEASSERT_PS_HOLD) {
            caps |= ScmCaps::DEASSERT_PS_HOLD;
        }
        caps
    }

    fn disable_wdog_debug(&mut self) -> Result<(), ScmError> {
        let fnid = sip_fnid(SCM_SVC_BOOT, SCM_WDOG_DEBUG_BOOT_PART);
        Self::call(fnid, scm_args(2), 1, 0)
    }

    fn halt_pmic_arbiter(&mut self) -> Result<(), ScmError> {
        let fnid = sip_fnid(SCM_SVC_PWR, SCM_IO_DISABLE_PMIC_ARBITER);
        Self::call(fnid, scm_args(1), 0, 0)
    }

    fn deassert_ps_hold(&mut self) -> Result<(), ScmError> {
        let fnid = sip_fnid(SCM_SVC_PWR, SCM_IO_DEASSERT_PS_HOLD);
        Self::call(fnid, scm_args(1), 0, 0)
    }
}
