// SPDX-License-Identifier: Apache-2.0

//! PMIC power-on (PON) block seam.

use reset_reason::{PonRestartReason, ResetType};

/// Operations against the PMIC's power-on block.
///
/// The PON block owns state that survives the reset: the structured restart
/// reason, the power-off type and the download-mode latch. Implemented by
/// the platform's PMIC driver.
pub trait PowerOnBlock {
    /// Whether a hard-reset condition is already latched from a previous
    /// power-off. Feeds the warm/hard decision.
    fn hard_reset_latched(&self) -> bool;

    /// Configures the power-off type the PMIC performs once PS_HOLD drops.
    fn system_power_off(&mut self, reset: ResetType);

    /// Stores a named restart reason through the structured reason API.
    fn store_restart_reason(&mut self, reason: PonRestartReason);

    /// Arms or clears the download-mode latch read by the next boot stage.
    fn set_download_mode(&mut self, enable: bool);

    /// Requests emergency download mode instead of a normal boot.
    fn enter_emergency_download(&mut self);
}
