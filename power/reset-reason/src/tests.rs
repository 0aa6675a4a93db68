//! Test suite for restart reason classification.

use super::*;

fn policy() -> RebootPolicy {
    RebootPolicy::default()
}

fn classify_cmd(cmd: &str) -> Classification {
    classify(Some(cmd), &policy())
}

#[test]
fn known_commands_map_to_documented_magics() {
    let cases = [
        ("bootloader", MAGIC_BOOTLOADER),
        ("recovery", MAGIC_RECOVERY),
        ("rtc", MAGIC_RTC),
        ("dm-verity device corrupted", MAGIC_DMVERITY_CORRUPTED),
        ("dm-verity enforcing", MAGIC_DMVERITY_ENFORCE),
        ("keys clear", MAGIC_KEYS_CLEAR),
        ("fastmmi", MAGIC_FACTORY_TEST),
        ("reboot", MAGIC_GENERIC),
    ];
    for (cmd, magic) in cases {
        assert_eq!(classify_cmd(cmd).magic(), Some(magic), "cmd = {cmd:?}");
    }
}

#[test]
fn prefix_matches_accept_suffixes() {
    assert_eq!(
        classify_cmd("bootloader,anything").reason,
        Some(RestartReason::Bootloader)
    );
    assert_eq!(
        classify_cmd("recovery--wipe_data").reason,
        Some(RestartReason::Recovery)
    );
    assert_eq!(
        classify_cmd("fastmmi-full").reason,
        Some(RestartReason::FactoryTest)
    );
}

#[test]
fn exact_matches_reject_suffixes() {
    // "rtc", the dm-verity strings and "keys clear" match exactly; anything
    // longer is an ordinary unrecognized command.
    for cmd in ["rtcx", "dm-verity enforcing!", "keys clear2"] {
        assert_eq!(classify_cmd(cmd).reason, Some(RestartReason::Normal));
    }
}

#[test]
fn classifier_is_pure() {
    let p = RebootPolicy {
        in_panic: true,
        download_allowed: true,
        ..policy()
    };
    let first = classify(Some("recovery"), &p);
    for _ in 0..8 {
        assert_eq!(classify(Some("recovery"), &p), first);
    }
}

#[test]
fn absent_or_empty_command_is_unclassified() {
    assert_eq!(
        classify(None, &policy()).reason,
        Some(RestartReason::Unclassified)
    );
    assert_eq!(
        classify(Some(""), &policy()).reason,
        Some(RestartReason::Unclassified)
    );
    assert_eq!(classify(None, &policy()).magic(), Some(MAGIC_GENERIC));
}

#[test]
fn oem_payload_lands_in_low_byte() {
    assert_eq!(classify_cmd("oem-1a").magic(), Some(MAGIC_OEM_PREFIX | 0x1a));
    assert_eq!(classify_cmd("oem-0").magic(), Some(MAGIC_OEM_PREFIX));
    // Only the low byte of a wider payload survives.
    assert_eq!(
        classify_cmd("oem-4ff").magic(),
        Some(MAGIC_OEM_PREFIX | 0xff)
    );
}

#[test]
fn malformed_oem_payload_writes_nothing() {
    // Reference behavior: a bad hex payload is silently dropped, no magic
    // and no PON reason are persisted. Pinned here on purpose.
    for cmd in ["oem-zz", "oem-", "oem-0x", "oem-123456789abcdef0"] {
        let c = classify_cmd(cmd);
        assert_eq!(c.reason, None, "cmd = {cmd:?}");
        assert_eq!(c.magic(), None);
        assert_eq!(c.pon_reason(), None);
    }
}

#[test]
fn edl_requires_unlocked_device() {
    let unlocked = classify(Some("edl"), &policy());
    assert!(unlocked.emergency_download());
    assert_eq!(unlocked.magic(), None);

    let locked = classify(
        Some("edl"),
        &RebootPolicy {
            device_locked: true,
            ..policy()
        },
    );
    assert!(!locked.emergency_download());
    // Falls through to the generic magic like any unrecognized command.
    assert_eq!(locked.magic(), Some(MAGIC_GENERIC));
}

#[test]
fn structured_pon_reason_only_for_named_requests() {
    assert_eq!(
        classify_cmd("bootloader").pon_reason(),
        Some(PonRestartReason::Bootloader)
    );
    assert_eq!(
        classify_cmd("keys clear").pon_reason(),
        Some(PonRestartReason::KeysClear)
    );
    // fastmmi and oem bypass the structured API.
    assert_eq!(classify_cmd("fastmmi").pon_reason(), None);
    assert_eq!(classify_cmd("oem-1a").pon_reason(), None);
    assert_eq!(classify_cmd("reboot").pon_reason(), None);
}

#[test]
fn warm_reset_with_hard_reset_latched() {
    let latched = RebootPolicy {
        hard_reset_latched: true,
        ..policy()
    };
    // Only "edl" (exactly) or an armed download latch warm-reset here.
    assert!(classify(Some("edl"), &latched).warm_reset);
    assert!(!classify(Some("recovery"), &latched).warm_reset);
    assert!(!classify(None, &latched).warm_reset);

    let download = RebootPolicy {
        download_allowed: true,
        restart_mode: RestartMode::Download,
        ..latched
    };
    assert!(classify(None, &download).warm_reset);
}

#[test]
fn warm_reset_without_latch() {
    // Any present command except "userrequested" means warm.
    assert!(classify(Some("reboot"), &policy()).warm_reset);
    assert!(classify(Some("bootloader"), &policy()).warm_reset);
    assert!(!classify(Some("userrequested"), &policy()).warm_reset);
    assert!(!classify(None, &policy()).warm_reset);
}

#[test]
fn preserve_mem_forces_warm_reset() {
    let p = RebootPolicy {
        preserve_mem: true,
        hard_reset_latched: true,
        ..policy()
    };
    assert!(classify(Some("userrequested"), &p).warm_reset);
    assert!(classify(None, &p).warm_reset);
}

#[test]
fn download_latch_arming() {
    let base = RebootPolicy {
        download_allowed: true,
        ..policy()
    };
    assert!(!classify(None, &base).arm_download);
    assert!(
        classify(
            None,
            &RebootPolicy {
                in_panic: true,
                ..base
            }
        )
        .arm_download
    );
    assert!(
        classify(
            None,
            &RebootPolicy {
                restart_mode: RestartMode::Download,
                ..base
            }
        )
        .arm_download
    );
    // Not compiled in: never armed, even while panicking.
    assert!(
        !classify(
            None,
            &RebootPolicy {
                in_panic: true,
                ..policy()
            }
        )
        .arm_download
    );
}

#[test]
fn reset_type_matches_decision() {
    assert_eq!(
        classify(Some("reboot"), &policy()).reset_type(),
        ResetType::WarmReset
    );
    assert_eq!(
        classify(Some("userrequested"), &policy()).reset_type(),
        ResetType::HardReset
    );
}
