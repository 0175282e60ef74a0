//! Classification naming schemes.
//!
//! Both trackers run the same state machine. They differ only in what the helper-thread
//! outcomes are called, which shows up in logs and stat keys.

use std::fmt;

use super::fsm::{HtRequestQuality, HtRequestState};

/// Names of the helper-thread states and outcome counters.
pub trait ClassificationScheme: fmt::Debug + Default + Send + Sync + 'static {
    /// Scheme identifier.
    const NAME: &'static str;

    /// Display name of `state`.
    fn state_name(state: HtRequestState) -> &'static str;

    /// Stat name of the counter for `quality`, without the `.confirmed` suffix.
    fn counter_name(quality: HtRequestQuality) -> &'static str;
}

/// good / bad / ugly / unused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GoodBadUgly;

impl ClassificationScheme for GoodBadUgly {
    const NAME: &'static str = "goodBadUgly";

    fn state_name(state: HtRequestState) -> &'static str {
        state.name()
    }

    fn counter_name(quality: HtRequestQuality) -> &'static str {
        match quality {
            HtRequestQuality::Good => "goodHtRequests",
            HtRequestQuality::Bad => "badHtRequests",
            HtRequestQuality::Ugly => "uglyHtRequests",
            HtRequestQuality::Unused => "unusedHtRequests",
        }
    }
}

/// used / polluting / usedPolluting / unused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsedPolluting;

impl ClassificationScheme for UsedPolluting {
    const NAME: &'static str = "usedPolluting";

    fn state_name(state: HtRequestState) -> &'static str {
        match state {
            HtRequestState::GoodHt => "USED_HT",
            HtRequestState::BadHt => "POLLUTING_HT",
            HtRequestState::UglyHt => "USED_POLLUTING_HT",
            other => other.name(),
        }
    }

    fn counter_name(quality: HtRequestQuality) -> &'static str {
        match quality {
            HtRequestQuality::Good => "usedHtRequests",
            HtRequestQuality::Bad => "pollutingHtRequests",
            HtRequestQuality::Ugly => "usedPollutingHtRequests",
            HtRequestQuality::Unused => "unusedHtRequests",
        }
    }
}
