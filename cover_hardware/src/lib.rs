pub mod error;

use cover_traits::Transport;
use error::HwError;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct SimState {
    sent: Vec<Vec<u8>>,
    available: bool,
    fail_next: usize,
}

/// Simulated IR/RF blaster.
///
/// Clones share one device, so every cover configured on the same blaster
/// can hold its own handle and the log of sent packets stays in one place.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    state: Rc<RefCell<SimState>>,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTransport {
    pub fn new() -> Self {
        SimulatedTransport {
            state: Rc::new(RefCell::new(SimState {
                sent: Vec::new(),
                available: true,
                fail_next: 0,
            })),
        }
    }

    /// Mark the simulated device reachable or not; sends fail while unreachable.
    pub fn set_available(&self, available: bool) {
        self.state.borrow_mut().available = available;
    }

    /// Make the next `n` sends time out.
    pub fn fail_next(&self, n: usize) {
        self.state.borrow_mut().fail_next = n;
    }

    /// Packets accepted so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.borrow().sent.clone()
    }
}

impl Transport for SimulatedTransport {
    fn send(&mut self, packet: &[u8]) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut state = self.state.borrow_mut();
        if !state.available {
            return Err(Box::new(HwError::Unreachable(
                "simulated device offline".into(),
            )));
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            tracing::warn!(bytes = packet.len(), "simulated send timeout");
            return Err(Box::new(HwError::Timeout));
        }
        tracing::debug!(bytes = packet.len(), "packet sent (simulated)");
        state.sent.push(packet.to_vec());
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.state.borrow().available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_send_records_packet() {
        let mut tx = SimulatedTransport::new();
        tx.send(&[1, 2, 3]).unwrap();
        assert_eq!(tx.sent(), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_clones_share_device() {
        let tx = SimulatedTransport::new();
        let mut other = tx.clone();
        other.send(&[9]).unwrap();
        assert_eq!(tx.sent().len(), 1);
        tx.set_available(false);
        assert!(!other.is_available());
    }
}
