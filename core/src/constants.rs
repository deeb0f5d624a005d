//! All the constants used by the commissioning initiator.
//! Timeouts can be overridden at runtime through
//! [`CommissioningConfig`](crate::CommissioningConfig).

use core::time::Duration;

use crate::util::time::quarter_seconds;

/// How long other devices may join the network after it is confirmed joined
pub const PERMIT_JOIN_DURATION: Duration = Duration::from_secs(180);
/// Delay before checking the network again while it is joining or leaving
pub const NETWORK_BUSY_RETRY_DELAY: Duration = quarter_seconds(40);
/// Delay after a form or join attempt before the network is checked again
pub const NETWORK_FORM_RETRY_DELAY: Duration = quarter_seconds(20);
/// Window in which identify query responses are collected
pub const IDENTIFY_RESPONSE_WAIT: Duration = Duration::from_millis(1000);
/// Window in which an extended address response is awaited
pub const IEEE_RESPONSE_WAIT: Duration = Duration::from_millis(1000);
/// Consecutive form or join attempts before commissioning gives up
pub const NETWORK_ACCESS_ATTEMPTS: u8 = 3;

/// Widest remote cluster list that can be masked
pub const MAX_SKIP_MASK_WIDTH: usize = 16;
/// Supported clusters retained for each remote candidate
pub const CANDIDATE_CLUSTER_LIST_LEN: usize = 8;
/// Remote candidates that can wait for processing
pub const REMOTE_QUEUE_LEN: usize = 4;
/// Network responses that can be posted before the next tick drains them
pub const RESPONSE_INBOX_LEN: usize = 8;
