use core::time::Duration;

use crate::constants::{
    IDENTIFY_RESPONSE_WAIT, IEEE_RESPONSE_WAIT, NETWORK_ACCESS_ATTEMPTS,
    NETWORK_BUSY_RETRY_DELAY, NETWORK_FORM_RETRY_DELAY, PERMIT_JOIN_DURATION, RESPONSE_INBOX_LEN,
};

/// Timeouts and limits of a commissioning engine.
///
/// The defaults are the compile-time values in [`crate::constants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissioningConfig {
    /// Sent in the permit-join broadcast once the network is joined
    pub permit_join_duration: Duration,
    /// Backoff while the stack is joining or leaving a network
    pub network_busy_retry_delay: Duration,
    /// Delay after forming or searching for a network
    pub network_form_retry_delay: Duration,
    /// How long identify query responses are collected
    pub identify_response_wait: Duration,
    /// How long an extended address response is awaited
    pub ieee_response_wait: Duration,
    /// Form or join attempts before the session fails
    pub network_access_attempts: u8,
    /// Capacity of the response inbox
    pub inbox_capacity: usize,
}

impl Default for CommissioningConfig {
    fn default() -> Self {
        Self {
            permit_join_duration: PERMIT_JOIN_DURATION,
            network_busy_retry_delay: NETWORK_BUSY_RETRY_DELAY,
            network_form_retry_delay: NETWORK_FORM_RETRY_DELAY,
            identify_response_wait: IDENTIFY_RESPONSE_WAIT,
            ieee_response_wait: IEEE_RESPONSE_WAIT,
            network_access_attempts: NETWORK_ACCESS_ATTEMPTS,
            inbox_capacity: RESPONSE_INBOX_LEN,
        }
    }
}

impl CommissioningConfig {
    pub fn with_identify_response_wait(mut self, wait: Duration) -> Self {
        self.identify_response_wait = wait;
        self
    }

    pub fn with_network_access_attempts(mut self, attempts: u8) -> Self {
        self.network_access_attempts = attempts;
        self
    }
}
