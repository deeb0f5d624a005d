use core::fmt;
use std::sync::Arc;

use thingbuf::{Recycle, ThingBuf};

use crate::{
    error::{Error, Result},
    network::NetworkResponse,
    scheduler::Wakeup,
};

/// Slots are handed back empty so a consumed response is dropped right away
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySlot;

impl Recycle<Option<NetworkResponse>> for EmptySlot {
    fn new_element(&self) -> Option<NetworkResponse> {
        None
    }

    fn recycle(&self, element: &mut Option<NetworkResponse>) {
        *element = None;
    }
}

/// Handle the network layer uses to post responses to an engine.
///
/// Responses are consumed in order on the engine's next tick, and posting one
/// raises the engine's [`Wakeup`]. Clones share the same inbox.
#[derive(Clone)]
pub struct Responder {
    inbox: Arc<ThingBuf<Option<NetworkResponse>, EmptySlot>>,
    wakeup: Wakeup,
}

impl Responder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inbox: Arc::new(ThingBuf::with_recycle(capacity, EmptySlot)),
            wakeup: Wakeup::new(),
        }
    }

    pub fn post(&self, response: impl Into<NetworkResponse>) -> Result<()> {
        self.inbox
            .push(Some(response.into()))
            .map_err(|_| Error::InboxFull)?;
        self.wakeup.raise();
        Ok(())
    }

    pub(crate) fn take(&self) -> Option<NetworkResponse> {
        self.inbox.pop().flatten()
    }

    pub(crate) fn wakeup(&self) -> Wakeup {
        self.wakeup.clone()
    }

    pub fn len(&self) -> usize {
        self.inbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inbox.is_empty()
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("pending", &self.inbox.len())
            .field("woken", &self.wakeup.is_raised())
            .field("capacity", &self.inbox.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data_model::ShortAddress, network::IeeeAddressResult};

    #[test]
    fn test_post_and_take_in_order() {
        let responder = Responder::with_capacity(2);
        let other = responder.clone();
        assert!(!responder.wakeup().is_raised());
        responder
            .post(IeeeAddressResult::timed_out(ShortAddress(1)))
            .unwrap();
        other
            .post(IeeeAddressResult::timed_out(ShortAddress(2)))
            .unwrap();
        assert_eq!(
            responder.post(IeeeAddressResult::timed_out(ShortAddress(3))),
            Err(Error::InboxFull)
        );
        assert_eq!(responder.len(), 2);
        assert!(responder.wakeup().clear());

        assert_eq!(
            responder.take(),
            Some(IeeeAddressResult::timed_out(ShortAddress(1)).into())
        );
        assert_eq!(
            other.take(),
            Some(IeeeAddressResult::timed_out(ShortAddress(2)).into())
        );
        assert_eq!(responder.take(), None);
        assert!(responder.is_empty());
    }

    #[test]
    fn test_rejected_post_does_not_wake() {
        let responder = Responder::with_capacity(1);
        responder
            .post(IeeeAddressResult::timed_out(ShortAddress(1)))
            .unwrap();
        responder.wakeup().clear();

        assert_eq!(
            responder.post(IeeeAddressResult::timed_out(ShortAddress(2))),
            Err(Error::InboxFull)
        );
        assert!(!responder.wakeup().is_raised());
    }
}
