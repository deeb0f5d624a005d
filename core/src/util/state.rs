//! States and events of the commissioning state machine

/// Where the commissioning state machine currently is.
///
/// `Unknown` is the error sink, any transition out of it lands on `Stop`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive)]
pub enum CommissioningState {
    /// Commissioning inactive
    #[default]
    Stop = 0,
    /// Bringing the network up
    Start = 1,
    /// Identify query sent, collecting responses
    WaitIdentifyResponse = 2,
    /// Cluster discovery of the front candidate in flight
    Discover = 3,
    /// Resolving the front candidate's extended address
    Match = 4,
    /// Writing bindings and draining the candidate queue
    Bind = 5,
    Unknown = 255,
}

/// What the state machine should do when it next runs.
///
/// `Unknown` doubles as the pending marker left behind while an asynchronous
/// request is in flight.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromPrimitive)]
pub enum CommissioningEvent {
    #[default]
    Idle = 0,
    CheckNetwork = 1,
    FormJoinNetwork = 2,
    BroadcastIdentifyQuery = 3,
    NetworkFailed = 4,
    Timeout = 5,
    CheckClusters = 6,
    BadDiscover = 7,
    NotMatched = 8,
    AwaitIdentity = 9,
    Bind = 10,
    CheckQueue = 11,
    BindingDone = 12,
    QueueEmpty = 13,
    Unknown = 255,
}

impl CommissioningState {
    /// Decode a state from its diagnostic code
    pub fn from_code(code: u8) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(code)
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl CommissioningEvent {
    /// Decode an event from its diagnostic code
    pub fn from_code(code: u8) -> Option<Self> {
        num_traits::FromPrimitive::from_u8(code)
    }

    pub const fn code(self) -> u8 {
        self as u8
    }
}
