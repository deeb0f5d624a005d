//! Addressing primitives shared by the network and binding layers

use core::fmt;

pub type EndpointId = u8;
pub type NetworkIndex = u8;

/// Endpoint addressed by broadcasts
pub const BROADCAST_ENDPOINT: EndpointId = 0xFF;

/// Network-assigned 16-bit node address. It can change when a node rejoins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ShortAddress(pub u16);

impl ShortAddress {
    /// All nodes, including sleepy end devices
    pub const SLEEPY_BROADCAST: Self = Self(0xFFFF);
    /// All nodes with their receiver on when idle
    pub const RX_ON_WHEN_IDLE_BROADCAST: Self = Self(0xFFFD);
    pub const COORDINATOR: Self = Self(0x0000);

    pub const fn is_broadcast(&self) -> bool {
        self.0 >= 0xFFF8
    }
}

impl fmt::Display for ShortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// Stable IEEE 802.15.4 extended address, stored little endian as on the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Eui64(pub [u8; 8]);

impl Eui64 {
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl From<[u8; 8]> for Eui64 {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

/// Printed most significant byte first, the way addresses appear on labels
impl fmt::Display for Eui64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.0;
        bytes.reverse();
        f.write_str(&hex::encode_upper(bytes))
    }
}
