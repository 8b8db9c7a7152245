// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Inkstone Labs

//! Constant-time shared-secret comparison.
//!
//! Bearer secrets for scheduled-job and admin routes are attacker-guessable
//! strings, so equality must not leak where the first differing byte sits.
//! The comparison is delegated to `ring::constant_time`, which runs in time
//! independent of content for equal-length inputs.
//!
//! Length mismatch gets special handling: `verify_slices_are_equal` bails
//! out immediately when lengths differ, which would make a wrong-length
//! guess measurably faster than a wrong-content guess. When lengths differ
//! we burn an equal-cost dummy comparison of the configured secret against
//! itself before returning false, so the two rejection paths fall in the
//! same time class.

use ring::constant_time::verify_slices_are_equal;

/// Compare a provided secret against the configured one in constant time.
///
/// Returns `true` iff the byte sequences are equal. Never panics; any error
/// from the underlying primitive is treated as a rejection.
pub fn compare(provided: &[u8], configured: &[u8]) -> bool {
    if provided.len() != configured.len() {
        // Equal-cost dummy pass over the configured secret. The result is
        // intentionally discarded; only the timing matters.
        let _ = verify_slices_are_equal(configured, configured);
        return false;
    }

    verify_slices_are_equal(provided, configured).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_secrets_match() {
        assert!(compare(b"abc123", b"abc123"));
        assert!(compare(b"", b""));
        assert!(compare("sch\u{00e9}dule".as_bytes(), "sch\u{00e9}dule".as_bytes()));
    }

    #[test]
    fn unequal_secrets_reject() {
        assert!(!compare(b"abc123", b"abc124"));
        assert!(!compare(b"abc123", b"xbc123"));
        assert!(!compare(b"abc123", b"abcxyz"));
    }

    #[test]
    fn length_mismatch_rejects() {
        assert!(!compare(b"abc", b"abc123"));
        assert!(!compare(b"abc123", b"abc"));
        assert!(!compare(b"", b"a"));
        assert!(!compare(b"a", b""));
    }

    #[test]
    fn arbitrary_bytes_are_handled() {
        let noise = [0u8, 255, 13, 10, 0, 128];
        assert!(compare(&noise, &noise));
        assert!(!compare(&noise, &[0u8, 255, 13, 10, 0, 129]));
    }

    /// Statistical timing check: the rejection time for equal-length inputs
    /// must not correlate with the position of the first differing byte.
    /// Wall-clock measurements are noisy under CI load, so this runs only
    /// on demand (`cargo test -- --ignored`).
    #[test]
    #[ignore]
    fn mismatch_position_does_not_skew_timing() {
        use std::time::Instant;

        const LEN: usize = 4096;
        const ROUNDS: u32 = 2000;

        let configured = vec![0xA5u8; LEN];

        let time_for_position = |pos: usize| -> f64 {
            let mut provided = configured.clone();
            provided[pos] ^= 0xFF;
            let start = Instant::now();
            for _ in 0..ROUNDS {
                assert!(!compare(&provided, &configured));
            }
            start.elapsed().as_secs_f64()
        };

        let early = time_for_position(0);
        let late = time_for_position(LEN - 1);

        // An early-exit comparison would finish the first-byte case orders
        // of magnitude faster. Allow generous scheduling noise.
        let ratio = late / early;
        assert!(
            (0.5..2.0).contains(&ratio),
            "timing ratio {ratio} suggests position-dependent comparison"
        );
    }

    /// The wrong-length path must not be a fast path.
    #[test]
    #[ignore]
    fn length_mismatch_is_not_faster_than_content_mismatch() {
        use std::time::Instant;

        const LEN: usize = 4096;
        const ROUNDS: u32 = 2000;

        let configured = vec![0x5Au8; LEN];
        let mut wrong_content = configured.clone();
        wrong_content[0] ^= 0xFF;
        let wrong_length = vec![0x5Au8; 8];

        let start = Instant::now();
        for _ in 0..ROUNDS {
            assert!(!compare(&wrong_content, &configured));
        }
        let content_time = start.elapsed().as_secs_f64();

        let start = Instant::now();
        for _ in 0..ROUNDS {
            assert!(!compare(&wrong_length, &configured));
        }
        let length_time = start.elapsed().as_secs_f64();

        assert!(
            length_time >= content_time * 0.5,
            "length mismatch ({length_time}s) much faster than content mismatch ({content_time}s)"
        );
    }
}
