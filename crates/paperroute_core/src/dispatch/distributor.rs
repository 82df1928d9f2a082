//! Greedy nearest-neighbor work distributor.
//!
//! Two passes over an explicit pool of unassigned deliveries:
//!
//! 1. Primary: each carrier, in input order, takes its `per_carrier` nearest
//!    deliveries from whatever is still in the pool. Earlier carriers get
//!    first choice; nothing is revisited.
//! 2. Remainder: leftovers are handed out in pool order, without ranking,
//!    according to [`RemainderPolicy`].

use super::distance::euclidean_distance;
use crate::model::carrier::Carrier;
use crate::model::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Anything with a position the distributor can measure from or to.
pub trait Positioned {
    fn position(&self) -> Coordinate;
}

impl Positioned for Coordinate {
    fn position(&self) -> Coordinate {
        *self
    }
}

impl Positioned for Carrier {
    fn position(&self) -> Coordinate {
        self.position
    }
}

/// Which pass produced an allotment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllotmentPass {
    Primary,
    Remainder,
}

/// Policy for handing out deliveries left after the primary pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Every carrier, in order, takes up to `remaining` more deliveries and
    /// gets a second allotment even when the pool is already empty.
    ///
    /// Because the slice size is applied once per carrier rather than once in
    /// total, early carriers can absorb more than the arithmetic remainder.
    /// This is the long-standing agency behavior and stays the default until
    /// dispatch staff sign off on [`RemainderPolicy::FirstCarriers`].
    #[default]
    PerCarrier,
    /// The first `remaining` carriers take one leftover delivery each.
    FirstCarriers,
}

impl RemainderPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PerCarrier => "per_carrier",
            Self::FirstCarriers => "first_carriers",
        }
    }
}

impl FromStr for RemainderPolicy {
    type Err = String;

    /// Accepts snake_case and kebab-case spellings.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_carrier" => Ok(Self::PerCarrier),
            "first_carriers" => Ok(Self::FirstCarriers),
            other => Err(format!(
                "unknown remainder policy `{other}`; expected per_carrier|first_carriers"
            )),
        }
    }
}

/// One carrier's share of a distribution run.
#[derive(Debug, Clone, PartialEq)]
pub struct Allotment<C, D> {
    pub carrier: C,
    /// Primary allotments are ordered nearest first; remainder allotments
    /// keep pool order.
    pub deliveries: Vec<D>,
    pub pass: AllotmentPass,
}

/// Distributes deliveries with the default [`RemainderPolicy::PerCarrier`].
pub fn distribute<D, C>(
    deliveries: &[D],
    carriers: &[C],
    per_carrier: usize,
    remaining: usize,
) -> Vec<Allotment<C, D>>
where
    D: Positioned + Clone,
    C: Positioned + Clone,
{
    distribute_with_policy(
        deliveries,
        carriers,
        per_carrier,
        remaining,
        RemainderPolicy::PerCarrier,
    )
}

/// Distributes deliveries among carriers.
///
/// Returns every primary allotment in carrier order, followed by the
/// remainder allotments. Empty inputs are not an error: no carriers yields
/// no allotments, no deliveries yields empty allotments.
pub fn distribute_with_policy<D, C>(
    deliveries: &[D],
    carriers: &[C],
    per_carrier: usize,
    remaining: usize,
    policy: RemainderPolicy,
) -> Vec<Allotment<C, D>>
where
    D: Positioned + Clone,
    C: Positioned + Clone,
{
    let mut pool: Vec<D> = deliveries.to_vec();
    let mut allotments = Vec::with_capacity(carriers.len() * 2);

    for carrier in carriers {
        let nearest = take_nearest(&mut pool, carrier.position(), per_carrier);
        allotments.push(Allotment {
            carrier: carrier.clone(),
            deliveries: nearest,
            pass: AllotmentPass::Primary,
        });
    }

    if remaining > 0 {
        let (recipients, slice_len) = match policy {
            RemainderPolicy::PerCarrier => (carriers.len(), remaining),
            RemainderPolicy::FirstCarriers => (remaining.min(carriers.len()), 1),
        };

        for carrier in carriers.iter().take(recipients) {
            let take = slice_len.min(pool.len());
            allotments.push(Allotment {
                carrier: carrier.clone(),
                deliveries: pool.drain(..take).collect(),
                pass: AllotmentPass::Remainder,
            });
        }
    }

    allotments
}

/// Removes and returns the `count` deliveries closest to `origin`.
///
/// Ties keep pool order (stable sort). The pool keeps its relative order.
fn take_nearest<D>(pool: &mut Vec<D>, origin: Coordinate, count: usize) -> Vec<D>
where
    D: Positioned + Clone,
{
    let mut ranked: Vec<(f64, usize)> = pool
        .iter()
        .enumerate()
        .map(|(index, delivery)| (euclidean_distance(delivery.position(), origin), index))
        .collect();
    ranked.sort_by(|left, right| left.0.total_cmp(&right.0));
    ranked.truncate(count);

    let nearest = ranked
        .iter()
        .map(|&(_, index)| pool[index].clone())
        .collect();

    let mut taken: Vec<usize> = ranked.into_iter().map(|(_, index)| index).collect();
    taken.sort_unstable();
    let mut index = 0;
    pool.retain(|_| {
        let keep = taken.binary_search(&index).is_err();
        index += 1;
        keep
    });

    nearest
}

#[cfg(test)]
mod tests {
    use super::{distribute, distribute_with_policy, AllotmentPass, Positioned, RemainderPolicy};
    use crate::model::coordinate::Coordinate;
    use std::collections::HashSet;

    #[derive(Debug, Clone, PartialEq)]
    struct Stop(u32, Coordinate);

    impl Positioned for Stop {
        fn position(&self) -> Coordinate {
            self.1
        }
    }

    fn stops(points: &[(f64, f64)]) -> Vec<Stop> {
        points
            .iter()
            .enumerate()
            .map(|(index, &point)| Stop(index as u32, point.into()))
            .collect()
    }

    fn ids(stops: &[Stop]) -> Vec<u32> {
        stops.iter().map(|stop| stop.0).collect()
    }

    #[test]
    fn ties_are_broken_by_input_order() {
        let deliveries = stops(&[(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0)]);
        let carriers = [Coordinate::ORIGIN];

        let result = distribute(&deliveries, &carriers, 2, 0);
        assert_eq!(ids(&result[0].deliveries), vec![0, 1]);
    }

    #[test]
    fn primary_allotment_is_nearest_first() {
        let deliveries = stops(&[(5.0, 0.0), (1.0, 0.0), (3.0, 0.0)]);
        let carriers = [Coordinate::ORIGIN];

        let result = distribute(&deliveries, &carriers, 3, 0);
        assert_eq!(ids(&result[0].deliveries), vec![1, 2, 0]);
    }

    #[test]
    fn earlier_carrier_takes_contested_delivery() {
        let deliveries = stops(&[(0.0, 1.0), (0.0, 9.0)]);
        let carriers = [Coordinate::new(0.0, 10.0), Coordinate::new(0.0, 0.0)];

        let result = distribute(&deliveries, &carriers, 1, 0);
        assert_eq!(ids(&result[0].deliveries), vec![1]);
        assert_eq!(ids(&result[1].deliveries), vec![0]);
    }

    #[test]
    fn quota_is_capped_by_pool_size() {
        let deliveries = stops(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let carriers = [Coordinate::ORIGIN, Coordinate::ORIGIN];

        let result = distribute(&deliveries, &carriers, 2, 0);
        assert_eq!(result[0].deliveries.len(), 2);
        assert_eq!(result[1].deliveries.len(), 1);
    }

    #[test]
    fn primary_pass_never_duplicates() {
        let deliveries = stops(&[
            (0.1, 0.1),
            (0.2, 0.1),
            (5.0, 5.0),
            (5.1, 5.0),
            (9.0, 1.0),
            (0.1, 0.2),
            (4.9, 5.2),
        ]);
        let carriers = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(5.0, 5.0),
            Coordinate::new(0.0, 0.0),
        ];

        let result = distribute(&deliveries, &carriers, 2, 1);
        let mut seen = HashSet::new();
        for allotment in result.iter().filter(|a| a.pass == AllotmentPass::Primary) {
            for stop in &allotment.deliveries {
                assert!(seen.insert(stop.0), "delivery {} assigned twice", stop.0);
            }
        }
    }

    #[test]
    fn remainder_pass_slices_pool_order_per_carrier() {
        let deliveries = stops(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (50.0, 50.0),
            (60.0, 60.0),
            (70.0, 70.0),
        ]);
        let carriers = [Coordinate::new(0.0, 0.0)];

        let result = distribute(&deliveries, &carriers, 2, 2);
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].pass, AllotmentPass::Remainder);
        assert_eq!(ids(&result[1].deliveries), vec![2, 3]);
    }

    #[test]
    fn first_carriers_policy_gives_one_leftover_each() {
        let deliveries = stops(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
        let carriers = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(4.0, 0.0),
            Coordinate::new(2.0, 0.0),
        ];

        let per_carrier =
            distribute_with_policy(&deliveries, &carriers, 1, 2, RemainderPolicy::PerCarrier);
        let first_carriers =
            distribute_with_policy(&deliveries, &carriers, 1, 2, RemainderPolicy::FirstCarriers);

        let remainder = |result: &[super::Allotment<Coordinate, Stop>]| -> Vec<Vec<u32>> {
            result
                .iter()
                .filter(|a| a.pass == AllotmentPass::Remainder)
                .map(|a| ids(&a.deliveries))
                .collect()
        };
        assert_eq!(remainder(&per_carrier), vec![vec![1, 3], vec![], vec![]]);
        assert_eq!(remainder(&first_carriers), vec![vec![1], vec![3]]);
    }

    #[test]
    fn zero_remaining_skips_remainder_pass() {
        let deliveries = stops(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let carriers = [Coordinate::ORIGIN];

        let result = distribute(&deliveries, &carriers, 1, 0);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn empty_inputs_are_not_errors() {
        let none: Vec<Stop> = Vec::new();
        let carriers = [Coordinate::ORIGIN, Coordinate::ORIGIN];

        let result = distribute(&none, &carriers, 1, 0);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|a| a.deliveries.is_empty()));

        let no_carriers: [Coordinate; 0] = [];
        assert!(distribute(&stops(&[(1.0, 1.0)]), &no_carriers, 1, 1).is_empty());
    }

    #[test]
    fn remainder_policy_parses_both_spellings() {
        assert_eq!(
            "per_carrier".parse::<RemainderPolicy>(),
            Ok(RemainderPolicy::PerCarrier)
        );
        assert_eq!(
            " First-Carriers ".parse::<RemainderPolicy>(),
            Ok(RemainderPolicy::FirstCarriers)
        );
        assert!("round_robin".parse::<RemainderPolicy>().is_err());
        assert_eq!(RemainderPolicy::default().as_str(), "per_carrier");
    }
}
