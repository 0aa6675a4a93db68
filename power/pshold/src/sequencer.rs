// SPDX-License-Identifier: Apache-2.0

//! The ordered shutdown/restart sequence.

use core::fmt;

use log::{error, info, warn};
use memory_addr::VirtAddr;
use reset_reason::{RebootPolicy, classify};

use crate::mmio::MmioResetRegs;
use crate::pon::PowerOnBlock;
use crate::scm::{ScmCaps, SecureMonitor};

/// How long to give the PMIC after PS_HOLD drops before declaring the
/// hardware unrecoverable.
pub(crate) const PMIC_WAIT_MS: u64 = 10_000;

/// Architecture-side operations the sequence needs.
pub trait ArchOps {
    /// Flushes all processor caches so the reason writes are durable
    /// before power is cut.
    fn flush_caches(&mut self);

    /// Tries a watchdog-initiated reset. Best-effort: if the watchdog is
    /// unavailable or the bite does not land, control simply comes back
    /// and the normal sequence continues.
    fn trigger_watchdog_bite(&mut self);

    /// Busy-waits for the given number of milliseconds.
    fn spin_delay_ms(&mut self, ms: u64);
}

/// Everything the board must supply to drive a shutdown.
pub trait Board: SecureMonitor + PowerOnBlock + ArchOps {}
impl<T: SecureMonitor + PowerOnBlock + ArchOps> Board for T {}

/// Writes to the two registers the sequencer owns directly.
///
/// [`MmioResetRegs`] is the hardware implementation.
pub trait ResetRegs {
    /// Writes a reason magic to the hardware restart-reason register.
    fn write_reason(&mut self, magic: u32);

    /// Drives PS_HOLD to zero. The final hardware action of the sequence.
    fn deassert_ps_hold(&mut self);
}

/// Register addresses resolved by the platform integration.
///
/// Addresses are post-mapping (virtual); resolving and mapping the physical
/// resources is the collaborator's job.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProbeParams {
    /// Base of the PS_HOLD control register.
    pub ps_hold_base: Option<VirtAddr>,
    /// Base of the restart-reason register.
    pub restart_reason_base: Option<VirtAddr>,
}

/// Fatal probe-time error: the sequencer is not armed and no restart
/// capability exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitError {
    /// No PS_HOLD register address was supplied.
    MissingPsHold,
    /// No restart-reason register address was supplied.
    MissingReasonRegister,
}

impl InitError {
    /// Returns the error description.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingPsHold => "PS_HOLD register not mapped",
            Self::MissingReasonRegister => "restart reason register not mapped",
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of the shutdown sequence.
///
/// Armed once at startup via [`PowerSequencer::probe`]; from then on the
/// only public operations are [`restart`] and [`power_off`], neither of
/// which returns.
///
/// [`restart`]: PowerSequencer::restart
/// [`power_off`]: PowerSequencer::power_off
pub struct PowerSequencer<B, R = MmioResetRegs> {
    board: B,
    regs: R,
    caps: ScmCaps,
    wdog_bite_on_panic: bool,
}

impl<B: Board> PowerSequencer<B, MmioResetRegs> {
    /// Arms the sequencer: validates the register mapping and probes the
    /// secure-monitor capabilities, once.
    ///
    /// A missing register is fatal; the subsystem must not come up without
    /// a working hand-off path.
    pub fn probe(board: B, params: ProbeParams) -> Result<Self, InitError> {
        let regs = MmioResetRegs::map(&params)?;
        let caps = board.probe_caps();
        info!("restart sequencer armed, scm caps: {caps:?}");
        Ok(Self {
            board,
            regs,
            caps,
            wdog_bite_on_panic: cfg!(feature = "wdog-bite-on-panic"),
        })
    }
}

impl<B: Board, R: ResetRegs> PowerSequencer<B, R> {
    #[cfg(test)]
    pub(crate) fn from_parts(board: B, regs: R, caps: ScmCaps, wdog_bite_on_panic: bool) -> Self {
        Self {
            board,
            regs,
            caps,
            wdog_bite_on_panic,
        }
    }

    /// Restarts the system. Never returns.
    ///
    /// Snapshots the administrative state, classifies `cmd` and runs the
    /// quiescence sequence. If the PMIC has not acted by the end of the
    /// wait window the hardware is unrecoverable and we spin forever.
    pub fn restart(&mut self, cmd: Option<&str>) -> ! {
        let policy = RebootPolicy {
            in_panic: crate::panicking(),
            restart_mode: crate::restart_mode(),
            device_locked: crate::device_locked(),
            hard_reset_latched: self.board.hard_reset_latched(),
            download_allowed: cfg!(feature = "download-mode"),
            preserve_mem: cfg!(feature = "preserve-mem"),
        };
        self.run(cmd, &policy);
        loop {
            core::hint::spin_loop();
        }
    }

    /// Powers the system off. Never returns.
    ///
    /// Shares the restart path with no command: the PMIC sees the same
    /// hand-off either way. Kept identical to the reference behavior on
    /// purpose; a genuinely distinct poweroff would need a PON power-off
    /// type this hardware generation never uses.
    pub fn power_off(&mut self) -> ! {
        self.restart(None)
    }

    /// The ordered sequence body. Linear; the only branch back is the
    /// watchdog bite falling through into the normal path.
    pub(crate) fn run(&mut self, cmd: Option<&str>, policy: &RebootPolicy) {
        info!("Going down for restart now");

        let decision = classify(cmd, policy);

        if policy.download_allowed {
            self.board.set_download_mode(decision.arm_download);
        }

        let reset_type = decision.reset_type();
        info!(
            "requesting PMIC {} power-off",
            <&'static str>::from(reset_type)
        );
        self.board.system_power_off(reset_type);

        // Dual-path persistence: the structured PON reason where one
        // exists, and the raw magic straight into the hardware register.
        if let Some(reason) = decision.pon_reason() {
            self.board.store_restart_reason(reason);
        }
        if let Some(magic) = decision.magic() {
            self.regs.write_reason(magic);
        }

        if decision.emergency_download() {
            warn!("entering emergency download mode");
            self.board.enter_emergency_download();
        }

        self.board.flush_caches();

        if self.wdog_bite_on_panic && policy.in_panic {
            // If the bite lands the chip resets right here; otherwise the
            // usual path below still runs.
            self.board.trigger_watchdog_bite();
        }

        // Needed to bypass the debug image on some chips.
        if let Err(err) = self.board.disable_wdog_debug() {
            error!("Failed to disable secure wdog debug: {err}");
        }

        // No SPMI transaction may be in flight when PS_HOLD drops; certain
        // PMIC revisions lock up the bus otherwise.
        if self.caps.contains(ScmCaps::HALT_PMIC_ARBITER) {
            info!("Calling secure monitor to halt SPMI PMIC arbiter");
            if let Err(err) = self.board.halt_pmic_arbiter() {
                error!("Failed to halt SPMI PMIC arbiter: {err}");
            }
        }

        self.deassert_ps_hold();

        self.board.spin_delay_ms(PMIC_WAIT_MS);
    }

    /// Signals the PMIC that we are done, via the secure monitor when the
    /// chip supports it, and unconditionally by the direct register write:
    /// the secure call must not "succeed" and leave the line high.
    fn deassert_ps_hold(&mut self) {
        if self.caps.contains(ScmCaps::DEASSERT_PS_HOLD) {
            if let Err(err) = self.board.deassert_ps_hold() {
                error!("scm PS_HOLD deassert failed: {err}");
            }
        }
        self.regs.deassert_ps_hold();
    }
}
