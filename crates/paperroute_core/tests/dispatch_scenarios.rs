use paperroute_core::{
    distribute, distribute_with_policy, euclidean_distance, Allotment, AllotmentPass, Coordinate,
    DistributionPlan, Positioned, RemainderPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Stop {
    id: u32,
    at: Coordinate,
}

impl Positioned for Stop {
    fn position(&self) -> Coordinate {
        self.at
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rider {
    name: &'static str,
    at: Coordinate,
}

impl Positioned for Rider {
    fn position(&self) -> Coordinate {
        self.at
    }
}

fn stops(points: &[(u32, f64, f64)]) -> Vec<Stop> {
    points
        .iter()
        .map(|&(id, latitude, longitude)| Stop {
            id,
            at: Coordinate::new(latitude, longitude),
        })
        .collect()
}

type Summary = Vec<(&'static str, AllotmentPass, Vec<u32>)>;

fn summary(allotments: &[Allotment<Rider, Stop>]) -> Summary {
    allotments
        .iter()
        .map(|allotment| {
            (
                allotment.carrier.name,
                allotment.pass,
                allotment.deliveries.iter().map(|stop| stop.id).collect(),
            )
        })
        .collect()
}

fn run(deliveries: &[Stop], riders: &[Rider]) -> Vec<Allotment<Rider, Stop>> {
    let plan = DistributionPlan::split(deliveries.len(), riders.len()).unwrap();
    distribute(deliveries, riders, plan.per_carrier, plan.remaining)
}

#[test]
fn distance_is_planar_euclidean() {
    assert_eq!(
        euclidean_distance(Coordinate::new(0.0, 0.0), Coordinate::new(3.0, 4.0)),
        5.0
    );
}

#[test]
fn even_split_sends_each_end_carrier_its_half() {
    let deliveries = stops(&[(1, 10.0, 1.0), (2, 10.0, 2.0), (3, 10.0, 3.0), (4, 10.0, 4.0)]);
    let riders = [
        Rider {
            name: "west",
            at: Coordinate::new(10.0, 0.0),
        },
        Rider {
            name: "east",
            at: Coordinate::new(10.0, 5.0),
        },
    ];

    assert_eq!(
        DistributionPlan::split(4, 2),
        Some(DistributionPlan {
            per_carrier: 2,
            remaining: 0
        })
    );
    assert_eq!(
        summary(&run(&deliveries, &riders)),
        vec![
            ("west", AllotmentPass::Primary, vec![1, 2]),
            ("east", AllotmentPass::Primary, vec![4, 3]),
        ]
    );
}

#[test]
fn remainder_goes_to_first_carrier_and_second_gets_empty_slice() {
    let deliveries = stops(&[
        (1, 0.0, 1.0),
        (2, 0.0, 2.0),
        (3, 0.0, 50.0),
        (4, 0.0, 98.0),
        (5, 0.0, 99.0),
    ]);
    let riders = [
        Rider {
            name: "first",
            at: Coordinate::new(0.0, 0.0),
        },
        Rider {
            name: "second",
            at: Coordinate::new(0.0, 100.0),
        },
    ];

    assert_eq!(
        DistributionPlan::split(5, 2),
        Some(DistributionPlan {
            per_carrier: 2,
            remaining: 1
        })
    );
    assert_eq!(
        summary(&run(&deliveries, &riders)),
        vec![
            ("first", AllotmentPass::Primary, vec![1, 2]),
            ("second", AllotmentPass::Primary, vec![5, 4]),
            ("first", AllotmentPass::Remainder, vec![3]),
            ("second", AllotmentPass::Remainder, vec![]),
        ]
    );
}

#[test]
fn single_delivery_goes_to_first_carrier_in_order() {
    let deliveries = stops(&[(7, 5.0, 5.0)]);
    let riders = [
        Rider {
            name: "far",
            at: Coordinate::new(40.0, 40.0),
        },
        Rider {
            name: "near",
            at: Coordinate::new(5.0, 5.0),
        },
        Rider {
            name: "mid",
            at: Coordinate::new(10.0, 10.0),
        },
    ];

    assert_eq!(
        DistributionPlan::split(1, 3),
        Some(DistributionPlan {
            per_carrier: 1,
            remaining: 0
        })
    );
    assert_eq!(
        summary(&run(&deliveries, &riders)),
        vec![
            ("far", AllotmentPass::Primary, vec![7]),
            ("near", AllotmentPass::Primary, vec![]),
            ("mid", AllotmentPass::Primary, vec![]),
        ]
    );
}

#[test]
fn identical_inputs_give_identical_output() {
    let deliveries = stops(&[
        (1, 3.0, 3.0),
        (2, 1.0, 1.0),
        (3, 1.0, 1.0),
        (4, 7.0, 2.0),
        (5, 2.0, 6.0),
        (6, 9.0, 9.0),
        (7, 0.5, 8.0),
    ]);
    let riders = [
        Rider {
            name: "a",
            at: Coordinate::new(1.0, 1.0),
        },
        Rider {
            name: "b",
            at: Coordinate::new(8.0, 8.0),
        },
        Rider {
            name: "c",
            at: Coordinate::new(0.0, 7.0),
        },
    ];

    let first = run(&deliveries, &riders);
    let second = run(&deliveries, &riders);
    assert_eq!(first, second);
}

#[test]
fn corrected_policy_spreads_leftovers_one_each() {
    let deliveries = stops(&[
        (1, 0.0, 1.0),
        (2, 0.0, 2.0),
        (3, 0.0, 3.0),
        (4, 0.0, 4.0),
        (5, 0.0, 5.0),
        (6, 0.0, 6.0),
        (7, 0.0, 7.0),
        (8, 0.0, 8.0),
    ]);
    let riders = [
        Rider {
            name: "a",
            at: Coordinate::new(0.0, 0.0),
        },
        Rider {
            name: "b",
            at: Coordinate::new(0.0, 0.0),
        },
        Rider {
            name: "c",
            at: Coordinate::new(0.0, 0.0),
        },
    ];
    let plan = DistributionPlan::split(deliveries.len(), riders.len()).unwrap();
    assert_eq!((plan.per_carrier, plan.remaining), (2, 2));

    let literal = distribute(&deliveries, &riders, plan.per_carrier, plan.remaining);
    assert_eq!(
        summary(&literal)[3..],
        [
            ("a", AllotmentPass::Remainder, vec![7, 8]),
            ("b", AllotmentPass::Remainder, vec![]),
            ("c", AllotmentPass::Remainder, vec![]),
        ]
    );

    let corrected = distribute_with_policy(
        &deliveries,
        &riders,
        plan.per_carrier,
        plan.remaining,
        RemainderPolicy::FirstCarriers,
    );
    assert_eq!(
        summary(&corrected)[3..],
        [
            ("a", AllotmentPass::Remainder, vec![7]),
            ("b", AllotmentPass::Remainder, vec![8]),
        ]
    );
}
