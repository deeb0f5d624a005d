use core::time::Duration;

/// Mesh stacks commonly express event delays in quarter seconds
pub const fn quarter_seconds(quarters: u64) -> Duration {
    Duration::from_millis(quarters * 250)
}
