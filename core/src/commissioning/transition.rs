//! The transition table of the commissioning state machine.
//!
//! Rows are scanned in order and the first row matching both the current state
//! and event wins, so wildcard rows must come after the rows they fall back
//! for.

use crate::util::state::{CommissioningEvent as Event, CommissioningState as State};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern<T> {
    Exactly(T),
    Any,
}

impl<T: PartialEq> Pattern<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::Exactly(expected) => expected == value,
            Self::Any => true,
        }
    }
}

/// The handler bound to a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartCommissioning,
    CheckNetwork,
    FormJoinNetwork,
    BroadcastIdentifyQuery,
    StopCommissioning,
    CheckClusters,
    MatchingCheck,
    SetBinding,
    BindingDone,
    CheckQueue,
    UnknownState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub state: Pattern<State>,
    pub event: Pattern<Event>,
    pub action: Action,
}

const fn rule(state: State, event: Event, action: Action) -> TransitionRule {
    TransitionRule {
        state: Pattern::Exactly(state),
        event: Pattern::Exactly(event),
        action,
    }
}

pub const TRANSITION_TABLE: [TransitionRule; 15] = [
    rule(State::Stop, Event::Idle, Action::StartCommissioning),
    rule(State::Start, Event::CheckNetwork, Action::CheckNetwork),
    rule(State::Start, Event::BroadcastIdentifyQuery, Action::BroadcastIdentifyQuery),
    rule(State::Start, Event::FormJoinNetwork, Action::FormJoinNetwork),
    rule(State::Start, Event::NetworkFailed, Action::StopCommissioning),
    rule(State::WaitIdentifyResponse, Event::Timeout, Action::StopCommissioning),
    rule(State::Discover, Event::CheckClusters, Action::CheckClusters),
    rule(State::Discover, Event::BadDiscover, Action::StopCommissioning),
    rule(State::Match, Event::CheckClusters, Action::MatchingCheck),
    rule(State::Match, Event::NotMatched, Action::StopCommissioning),
    rule(State::Bind, Event::Bind, Action::SetBinding),
    rule(State::Bind, Event::CheckQueue, Action::CheckQueue),
    rule(State::Bind, Event::BindingDone, Action::BindingDone),
    rule(State::Bind, Event::QueueEmpty, Action::StopCommissioning),
    TransitionRule {
        state: Pattern::Any,
        event: Pattern::Any,
        action: Action::UnknownState,
    },
];

/// The action of the first row matching `state` and `event`
pub fn lookup(state: State, event: Event) -> Action {
    TRANSITION_TABLE
        .iter()
        .find(|rule| rule.state.matches(&state) && rule.event.matches(&event))
        .map(|rule| rule.action)
        .unwrap_or(Action::UnknownState)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_rows() {
        assert_eq!(lookup(State::Stop, Event::Idle), Action::StartCommissioning);
        assert_eq!(lookup(State::Discover, Event::CheckClusters), Action::CheckClusters);
        assert_eq!(lookup(State::Match, Event::CheckClusters), Action::MatchingCheck);
        assert_eq!(lookup(State::Bind, Event::QueueEmpty), Action::StopCommissioning);
        assert_eq!(
            lookup(State::WaitIdentifyResponse, Event::Timeout),
            Action::StopCommissioning
        );
    }

    #[test]
    fn test_unmatched_pairs_fall_to_unknown() {
        assert_eq!(lookup(State::Start, Event::Unknown), Action::UnknownState);
        assert_eq!(lookup(State::Bind, Event::AwaitIdentity), Action::UnknownState);
        assert_eq!(lookup(State::Unknown, Event::Idle), Action::UnknownState);
        assert_eq!(
            lookup(State::WaitIdentifyResponse, Event::CheckClusters),
            Action::UnknownState
        );
    }

    #[test]
    fn test_wildcard_row_is_last() {
        let (last, specific) = TRANSITION_TABLE.split_last().unwrap();
        assert_eq!(last.state, Pattern::Any);
        assert_eq!(last.event, Pattern::Any);
        assert!(specific
            .iter()
            .all(|rule| rule.state != Pattern::Any && rule.event != Pattern::Any));
    }
}
