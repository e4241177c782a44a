use crate::games::types::{BetId, RequestId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const REQUEST_DOMAIN_TAG: &[u8] = b"roulette-ledger/randomness-request";

/// Outbound request handed to the randomness oracle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RandomnessRequest {
    pub request_id: RequestId,
    pub bet_id: BetId,
}

/// Correlation entry for one issued request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestEntry {
    pub bet_id: BetId,
    pub resolved: bool,
}

/// Request handle -> bet id, each handle resolving at most once
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RandomnessRequestTracker {
    requests: BTreeMap<RequestId, RequestEntry>,
    /// Monotonic counter mixed into every handle
    nonce: u64,
}

impl RandomnessRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh handle for `bet_id` and record the mapping
    pub fn issue(&mut self, bet_id: BetId) -> RequestId {
        loop {
            let request_id = Self::derive_handle(self.nonce, bet_id);
            self.nonce += 1;
            if !self.requests.contains_key(&request_id) {
                self.requests.insert(request_id, RequestEntry { bet_id, resolved: false });
                return request_id;
            }
        }
    }

    fn derive_handle(nonce: u64, bet_id: BetId) -> RequestId {
        let mut hasher = Sha256::new();
        hasher.update(REQUEST_DOMAIN_TAG);
        hasher.update(nonce.to_be_bytes());
        hasher.update(bet_id.to_be_bytes());
        RequestId::new(hasher.finalize().into())
    }

    /// Bet waiting on `request_id`, if the handle is known and still open
    pub fn pending_bet(&self, request_id: &RequestId) -> Option<BetId> {
        self.requests
            .get(request_id)
            .filter(|entry| !entry.resolved)
            .map(|entry| entry.bet_id)
    }

    /// Close the handle; returns the bet id on the first call only
    pub fn resolve(&mut self, request_id: &RequestId) -> Option<BetId> {
        let entry = self.requests.get_mut(request_id)?;
        if entry.resolved {
            return None;
        }
        entry.resolved = true;
        Some(entry.bet_id)
    }

    pub fn get(&self, request_id: &RequestId) -> Option<&RequestEntry> {
        self.requests.get(request_id)
    }

    /// Check if a request is still waiting for its callback
    pub fn is_pending(&self, request_id: &RequestId) -> bool {
        self.pending_bet(request_id).is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.requests.values().filter(|entry| !entry.resolved).count()
    }

    /// Open requests, ordered by bet id
    pub fn pending_requests(&self) -> Vec<RandomnessRequest> {
        let mut pending: Vec<_> = self
            .requests
            .iter()
            .filter(|(_, entry)| !entry.resolved)
            .map(|(request_id, entry)| RandomnessRequest {
                request_id: *request_id,
                bet_id: entry.bet_id,
            })
            .collect();
        pending.sort_by_key(|request| request.bet_id);
        pending
    }

    pub(crate) fn len(&self) -> usize {
        self.requests.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_resolve() {
        let mut tracker = RandomnessRequestTracker::new();
        let request_id = tracker.issue(1);

        assert_eq!(tracker.pending_count(), 1);
        assert!(tracker.is_pending(&request_id));
        assert_eq!(tracker.pending_bet(&request_id), Some(1));

        assert_eq!(tracker.resolve(&request_id), Some(1));
        assert_eq!(tracker.pending_count(), 0);
        assert!(!tracker.is_pending(&request_id));
        assert_eq!(tracker.get(&request_id).map(|e| e.resolved), Some(true));
    }

    #[test]
    fn test_resolve_only_once() {
        let mut tracker = RandomnessRequestTracker::new();
        let request_id = tracker.issue(7);

        assert_eq!(tracker.resolve(&request_id), Some(7));
        assert_eq!(tracker.resolve(&request_id), None);
        assert_eq!(tracker.resolve(&RequestId::new([0u8; 32])), None);
    }

    #[test]
    fn test_handles_are_unique() {
        let mut tracker = RandomnessRequestTracker::new();
        let a = tracker.issue(1);
        let b = tracker.issue(2);
        let c = tracker.issue(2);
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(tracker.len(), 3);
    }

    #[test]
    fn test_pending_requests_skip_resolved() {
        let mut tracker = RandomnessRequestTracker::new();
        let first = tracker.issue(1);
        let second = tracker.issue(2);
        tracker.resolve(&first);

        let pending = tracker.pending_requests();
        assert_eq!(pending, vec![RandomnessRequest { request_id: second, bet_id: 2 }]);
    }
}
