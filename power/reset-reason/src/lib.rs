// SPDX-License-Identifier: Apache-2.0

//! Restart reason classification for the SoC reset/power-off path.
//!
//! The bootloader on these SoCs decides how to boot by inspecting state that
//! survives a reset: a 32-bit magic value in a dedicated hardware register
//! and a named reason stored through the PMIC power-on (PON) block. This
//! crate maps the free-form reboot command string onto that persisted state
//! and decides whether the PMIC should perform a warm or a hard reset.
//!
//! Classification is pure. It reads nothing but its arguments and touches no
//! hardware; the sequencer snapshots every mutable input (restart mode,
//! panic flag, PON latch state, build-time policy) into a [`RebootPolicy`]
//! before calling [`classify`].

#![cfg_attr(not(test), no_std)]

use strum::IntoStaticStr;

/// Magic written for a plain or unrecognized reboot request.
pub const MAGIC_GENERIC: u32 = 0x7766_5501;
/// Magic asking the bootloader to stay in fastboot.
pub const MAGIC_BOOTLOADER: u32 = 0x7766_5500;
/// Magic asking the bootloader to enter recovery.
pub const MAGIC_RECOVERY: u32 = 0x7766_5502;
/// Magic recording an RTC-alarm triggered restart.
pub const MAGIC_RTC: u32 = 0x7766_5503;
/// Magic selecting the factory test image (fastmmi).
pub const MAGIC_FACTORY_TEST: u32 = 0x7766_5505;
/// Magic recording that dm-verity found the device corrupted.
pub const MAGIC_DMVERITY_CORRUPTED: u32 = 0x7766_5508;
/// Magic recording a switch of dm-verity into enforcing mode.
pub const MAGIC_DMVERITY_ENFORCE: u32 = 0x7766_5509;
/// Magic recording a verified-boot key-clear request.
pub const MAGIC_KEYS_CLEAR: u32 = 0x7766_550a;
/// Fixed prefix for OEM-defined reason codes; the low byte carries the code.
pub const MAGIC_OEM_PREFIX: u32 = 0x6f65_6d00;

/// Process-wide restart mode, set by a trusted administrative caller.
///
/// Selects whether a panic-triggered restart should arm the download-mode
/// latch so RAM contents can be pulled off the device after reboot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestartMode {
    /// Plain restart, no crash-dump collection requested.
    #[default]
    Normal,
    /// Request download-mode persistence on the next restart.
    Download,
}

/// PMIC power-off type requested right before PS_HOLD is dropped.
///
/// Discriminants follow the PON register encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
#[repr(u8)]
pub enum ResetType {
    /// Preserve the diagnostic memory region across the reset.
    WarmReset = 0x01,
    /// Full power cycle, memory contents are lost.
    HardReset = 0x07,
}

/// Named restart reasons understood by the PON block's structured reason
/// API. Values follow the PON spare-register encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
#[repr(u8)]
pub enum PonRestartReason {
    Recovery = 0x01,
    Bootloader = 0x02,
    Rtc = 0x03,
    DmVerityCorrupted = 0x04,
    DmVerityEnforce = 0x05,
    KeysClear = 0x06,
}

/// Why the system is restarting, as derived from the reboot command string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum RestartReason {
    /// No command string was supplied at all.
    Unclassified,
    /// A command was supplied but matched no known request.
    Normal,
    Bootloader,
    Recovery,
    Rtc,
    DmVerityCorrupted,
    DmVerityEnforce,
    KeysClear,
    /// Factory test image request; persisted as a raw magic only, the PON
    /// reason API is deliberately bypassed for this one.
    FactoryTest,
    /// OEM-defined reason, the payload byte lands in the low bits of
    /// [`MAGIC_OEM_PREFIX`]. Raw magic only.
    Oem(u8),
    /// Emergency-download request; nothing is written to the reason
    /// register, the PON block is told to enter EDL instead.
    EmergencyDownload,
}

impl RestartReason {
    /// Derives the reason from a non-empty reboot command.
    ///
    /// Matching is case-sensitive and first-match-wins, in the same order
    /// the boot chain expects. A locked device never yields
    /// [`RestartReason::EmergencyDownload`]; the command falls through to
    /// [`RestartReason::Normal`] instead.
    ///
    /// Returns `None` for a malformed `oem-` payload: nothing is persisted
    /// for those. This mirrors the reference behavior; see the tests pinning
    /// it before "fixing" anything here.
    pub fn from_command(cmd: &str, device_locked: bool) -> Option<Self> {
        let reason = if cmd.starts_with("bootloader") {
            Self::Bootloader
        } else if cmd.starts_with("recovery") {
            Self::Recovery
        } else if cmd == "rtc" {
            Self::Rtc
        } else if cmd == "dm-verity device corrupted" {
            Self::DmVerityCorrupted
        } else if cmd == "dm-verity enforcing" {
            Self::DmVerityEnforce
        } else if cmd == "keys clear" {
            Self::KeysClear
        } else if cmd.starts_with("fastmmi") {
            Self::FactoryTest
        } else if let Some(code) = cmd.strip_prefix("oem-") {
            match u32::from_str_radix(code, 16) {
                Ok(value) => Self::Oem((value & 0xff) as u8),
                Err(_) => return None,
            }
        } else if cmd.starts_with("edl") && !device_locked {
            Self::EmergencyDownload
        } else {
            Self::Normal
        };
        Some(reason)
    }

    /// The 32-bit magic persisted for this reason, if any.
    pub fn magic(self) -> Option<u32> {
        match self {
            Self::Unclassified | Self::Normal => Some(MAGIC_GENERIC),
            Self::Bootloader => Some(MAGIC_BOOTLOADER),
            Self::Recovery => Some(MAGIC_RECOVERY),
            Self::Rtc => Some(MAGIC_RTC),
            Self::DmVerityCorrupted => Some(MAGIC_DMVERITY_CORRUPTED),
            Self::DmVerityEnforce => Some(MAGIC_DMVERITY_ENFORCE),
            Self::KeysClear => Some(MAGIC_KEYS_CLEAR),
            Self::FactoryTest => Some(MAGIC_FACTORY_TEST),
            Self::Oem(code) => Some(MAGIC_OEM_PREFIX | code as u32),
            Self::EmergencyDownload => None,
        }
    }

    /// The named reason for the PON structured reason API, if this reason
    /// uses it. Factory-test and OEM codes intentionally do not.
    pub fn pon_reason(self) -> Option<PonRestartReason> {
        match self {
            Self::Bootloader => Some(PonRestartReason::Bootloader),
            Self::Recovery => Some(PonRestartReason::Recovery),
            Self::Rtc => Some(PonRestartReason::Rtc),
            Self::DmVerityCorrupted => Some(PonRestartReason::DmVerityCorrupted),
            Self::DmVerityEnforce => Some(PonRestartReason::DmVerityEnforce),
            Self::KeysClear => Some(PonRestartReason::KeysClear),
            _ => None,
        }
    }
}

/// Snapshot of every mutable or build-time input the classifier consults.
///
/// The sequencer fills this in exactly once per invocation; nothing in here
/// changes while the shutdown sequence runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RebootPolicy {
    /// The kernel is going down because of a panic.
    pub in_panic: bool,
    /// Administrative restart mode at the time the sequence started.
    pub restart_mode: RestartMode,
    /// Boot-time device lock; forbids emergency download when set.
    pub device_locked: bool,
    /// The PON block reports a hard-reset condition already latched from a
    /// previous power-off.
    pub hard_reset_latched: bool,
    /// Download-mode support was compiled in.
    pub download_allowed: bool,
    /// Build-time memory-preservation mode: every reset is warm.
    pub preserve_mem: bool,
}

/// Full classification outcome handed to the power sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    /// What to persist, or `None` when nothing may be written (malformed
    /// OEM payload).
    pub reason: Option<RestartReason>,
    /// Whether the PMIC should warm- rather than hard-reset.
    pub warm_reset: bool,
    /// Whether the download-mode latch must be armed before reset.
    pub arm_download: bool,
}

impl Classification {
    /// Raw magic to write to the reason register, if any.
    pub fn magic(&self) -> Option<u32> {
        self.reason.and_then(RestartReason::magic)
    }

    /// Structured PON reason to store, if any.
    pub fn pon_reason(&self) -> Option<PonRestartReason> {
        self.reason.and_then(RestartReason::pon_reason)
    }

    /// Whether emergency-download mode was requested and permitted.
    pub fn emergency_download(&self) -> bool {
        self.reason == Some(RestartReason::EmergencyDownload)
    }

    /// The PMIC power-off type matching the warm/hard decision.
    pub fn reset_type(&self) -> ResetType {
        if self.warm_reset {
            ResetType::WarmReset
        } else {
            ResetType::HardReset
        }
    }
}

/// Classifies one restart request.
///
/// Pure function of its arguments: the same `(cmd, policy)` pair always
/// yields the same [`Classification`].
pub fn classify(cmd: Option<&str>, policy: &RebootPolicy) -> Classification {
    let cmd = cmd.filter(|c| !c.is_empty());

    let reason = match cmd {
        None => Some(RestartReason::Unclassified),
        Some(cmd) => RestartReason::from_command(cmd, policy.device_locked),
    };

    // Arm the download latch when we are panicking or the administrative
    // mode asks for it, and the build allows download mode at all. The
    // warm-reset rules below observe the armed state, not the raw inputs.
    let arm_download = policy.download_allowed
        && (policy.in_panic || policy.restart_mode == RestartMode::Download);

    let warm_reset = if policy.preserve_mem {
        true
    } else if policy.hard_reset_latched {
        arm_download || cmd == Some("edl")
    } else {
        arm_download || cmd.is_some_and(|c| c != "userrequested")
    };

    Classification {
        reason,
        warm_reset,
        arm_download,
    }
}

#[cfg(test)]
mod tests;
