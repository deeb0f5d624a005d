//! Arming of the commissioning tick.
//!
//! The engine never sleeps. Handlers arm the scheduler and return, the host
//! calls [`CommissioningEngine::tick`](crate::CommissioningEngine::tick) once
//! the arming is due.

use core::time::Duration;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Raised whenever a response is posted to the engine
#[derive(Debug, Clone, Default)]
pub struct Wakeup {
    raised: Arc<AtomicBool>,
}

impl Wakeup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Lower the flag, returning whether it was raised
    pub fn clear(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }
}

pub trait Scheduler {
    /// Run the tick as soon as possible
    fn schedule_now(&mut self);

    /// Run the tick once `delay` has elapsed
    fn schedule_after(&mut self, delay: Duration);

    /// Drop the pending arming, if any
    fn cancel(&mut self);

    /// Hand over the flag raised by posted responses. Schedulers woken some
    /// other way ignore it.
    fn watch(&mut self, _wakeup: Wakeup) {}

    /// Whether the running tick is the armed one. A tick run only because
    /// responses were posted is not due, and does not advance the state
    /// machine unless a response does.
    fn is_due(&self) -> bool {
        true
    }
}

impl<S> Scheduler for &mut S
where
    S: Scheduler,
{
    fn schedule_now(&mut self) {
        (**self).schedule_now()
    }

    fn schedule_after(&mut self, delay: Duration) {
        (**self).schedule_after(delay)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn watch(&mut self, wakeup: Wakeup) {
        (**self).watch(wakeup)
    }

    fn is_due(&self) -> bool {
        (**self).is_due()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arming {
    Now,
    After(Duration),
}

/// A polled event control. Only one arming is kept, arming again replaces it.
///
/// Posted responses show up as an arming to run now. Taking it leaves a
/// delayed arming in place, so the response window keeps running.
#[derive(Debug, Default, Clone)]
pub struct EventControl {
    armed: Option<Arming>,
    wakeup: Option<Wakeup>,
    woken: bool,
}

impl EventControl {
    pub const fn new() -> Self {
        Self {
            armed: None,
            wakeup: None,
            woken: false,
        }
    }

    pub fn armed(&self) -> Option<Arming> {
        if self.wakeup.as_ref().map_or(false, Wakeup::is_raised) {
            Some(Arming::Now)
        } else {
            self.armed
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed().is_some()
    }

    /// Consume the pending arming, the caller is expected to run the tick
    pub fn take(&mut self) -> Option<Arming> {
        let raised = self.wakeup.as_ref().map_or(false, Wakeup::clear);
        match self.armed {
            Some(Arming::Now) => {
                self.woken = false;
                self.armed.take()
            }
            _ if raised => {
                self.woken = true;
                Some(Arming::Now)
            }
            _ => {
                self.woken = false;
                self.armed.take()
            }
        }
    }
}

impl Scheduler for EventControl {
    fn schedule_now(&mut self) {
        self.armed = Some(Arming::Now);
    }

    fn schedule_after(&mut self, delay: Duration) {
        self.armed = Some(Arming::After(delay));
    }

    fn cancel(&mut self) {
        self.armed = None;
    }

    fn watch(&mut self, wakeup: Wakeup) {
        self.wakeup = Some(wakeup);
    }

    fn is_due(&self) -> bool {
        !self.woken
    }
}
