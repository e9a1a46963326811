//! Transaction context
//!
//! Every entry point receives the signer and the ledger clock of the
//! transaction it runs in. Deadlines are checked against this clock, never
//! against the host's wall time.

use launchpad_core::{Address, LaunchpadError, LaunchpadResult};

/// Signer and ledger time of the executing transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub sender: Address,
    pub timestamp_ms: u64,
}

impl TxContext {
    pub fn new(sender: Address, timestamp_ms: u64) -> Self {
        Self { sender, timestamp_ms }
    }

    /// Reject once ledger time has passed the caller's deadline
    pub fn check_deadline(&self, deadline_ms: u64) -> LaunchpadResult<()> {
        if self.timestamp_ms > deadline_ms {
            return Err(LaunchpadError::DeadlineExpired {
                deadline_ms,
                now_ms: self.timestamp_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_is_inclusive() {
        let ctx = TxContext::new(Address::from_low_u64(1), 1_000);
        assert!(ctx.check_deadline(1_000).is_ok());
        assert!(ctx.check_deadline(5_000).is_ok());
        assert_eq!(
            ctx.check_deadline(999),
            Err(LaunchpadError::DeadlineExpired { deadline_ms: 999, now_ms: 1_000 })
        );
    }
}
