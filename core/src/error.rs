use thiserror::Error;

use crate::{binding::BindingError, network::NetworkError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Commissioning was requested without any clusters to bind.
    #[error("no clusters were requested for commissioning")]
    BadArgument,

    /// A commissioning session is already running.
    #[error("a commissioning session is already active")]
    Busy,

    /// The response inbox has no free slot.
    #[error("response inbox is full")]
    InboxFull,

    /// A discovery status byte outside the known range.
    #[error("unrecognised discovery status {0:#04x}")]
    UnknownDiscoveryStatus(u8),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("binding table error: {0}")]
    Binding(#[from] BindingError),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
