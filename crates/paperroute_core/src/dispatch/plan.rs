//! Quota arithmetic for one distribution run.

use serde::{Deserialize, Serialize};

/// How many deliveries each carrier takes in the primary pass and how many
/// are left over for the remainder pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPlan {
    pub per_carrier: usize,
    pub remaining: usize,
}

impl DistributionPlan {
    /// Splits `total_deliveries` over `total_carriers`.
    ///
    /// - More deliveries than carriers: `per_carrier = d / c`, `remaining = d % c`.
    /// - Otherwise every carrier is offered one delivery and nothing remains.
    /// - Returns `None` when there are no carriers to split over.
    pub fn split(total_deliveries: usize, total_carriers: usize) -> Option<Self> {
        if total_carriers == 0 {
            return None;
        }

        if total_deliveries > total_carriers {
            Some(Self {
                per_carrier: total_deliveries / total_carriers,
                remaining: total_deliveries % total_carriers,
            })
        } else {
            Some(Self {
                per_carrier: 1,
                remaining: 0,
            })
        }
    }
}
