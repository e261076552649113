//! Call/put-spread replication settings for digital payoffs.

use conundrum_core::{ensure, errors::Result, Real};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where the call or put spread sits around the digital strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Replication {
    /// Spread placed so that the replicating portfolio is worth less than
    /// the digital position.
    Sub,
    /// Spread centred on the strike.
    #[default]
    Central,
    /// Spread placed so that the replicating portfolio is worth more than
    /// the digital position.
    Super,
}

/// Replication type and spread width.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DigitalReplication {
    replication: Replication,
    gap: Real,
}

impl DigitalReplication {
    /// Fails unless `gap` is positive.
    pub fn new(replication: Replication, gap: Real) -> Result<Self> {
        ensure!(gap > 0.0, "non-positive replication gap ({gap}) not allowed");
        Ok(Self { replication, gap })
    }

    /// The replication type.
    pub fn replication(&self) -> Replication {
        self.replication
    }

    /// Width of the call or put spread.
    pub fn gap(&self) -> Real {
        self.gap
    }
}

impl Default for DigitalReplication {
    fn default() -> Self {
        Self {
            replication: Replication::Central,
            gap: 1e-4,
        }
    }
}
