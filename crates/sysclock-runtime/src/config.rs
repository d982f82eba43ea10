//! Compiled-in platform tunables for [`crate::wait::WaitConfig`] (§9).
//!
//! Values come from `build.rs`'s config-merge pass: a per-platform
//! default, optionally overridden at build time by a file named via
//! `SYSCLOCK_CONFIG_RS` (see §12 of the design doc).

include!(concat!(env!("OUT_DIR"), "/sysclock_merged_config.rs"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_sane() {
        assert!(CLOCK_MIN_WAIT_TIME_NS > 0);
        assert!(CLOCK_NANOSLEEP_CEILING_NS < CLOCK_COARSE_WAIT_SWITCH_NS);
        assert!(CLOCK_OVERSHOOT_REDUCTION_NS <= CLOCK_COARSE_WAIT_SWITCH_NS);
    }
}
