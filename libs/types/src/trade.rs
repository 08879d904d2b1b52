//! Trade records emitted to the tracker after execution.

use crate::{Amount, OpId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an executed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeDirection {
    XForY,
    YForX,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::XForY => write!(f, "X->Y"),
            TradeDirection::YForX => write!(f, "Y->X"),
        }
    }
}

/// Observability record for one executed trade.
///
/// `delta_in` is the post-fee input credited to reserves (positive),
/// `delta_out` the reserve outflow paid to the trader (negative). This is a
/// notification for external trackers, not a financial operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub op: OpId,
    pub direction: TradeDirection,
    pub delta_in: Amount,
    pub delta_out: Amount,
}

impl TradeRecord {
    /// Realized price paid by the trader, as output units per input unit.
    ///
    /// Uses floating point for display only; settlement math is integer.
    pub fn realized_rate(&self) -> f64 {
        if self.delta_in == 0 {
            return 0.0;
        }
        (-self.delta_out) as f64 / self.delta_in as f64
    }
}
