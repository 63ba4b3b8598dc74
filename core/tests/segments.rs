//! Fixed-threshold segment assignment.

use shopfunnel_core::segment::Segment;

#[test]
fn reference_customers_land_in_expected_segments() {
    assert_eq!(Segment::classify(10, 5, 500.0), Segment::Champions);
    assert_eq!(Segment::classify(200, 1, 10.0), Segment::Lost);
    assert_eq!(Segment::classify(45, 2, 50.0), Segment::LoyalCustomers);
    assert_eq!(Segment::classify(45, 2, 50.0).label(), "Loyal Customers");
}

#[test]
fn thresholds_are_inclusive() {
    assert_eq!(Segment::classify(30, 3, 200.0), Segment::Champions);
    assert_eq!(Segment::classify(60, 2, 0.0), Segment::LoyalCustomers);
    assert_eq!(Segment::classify(90, 1, 0.0), Segment::AtRisk);
    assert_eq!(Segment::classify(91, 10, 10_000.0), Segment::Lost);
}

/// The first matching rule wins even when a later rule also matches.
#[test]
fn priority_order_decides_overlaps() {
    // Misses Champions on monetary alone; falls to Loyal, not At Risk.
    assert_eq!(Segment::classify(5, 5, 199.99), Segment::LoyalCustomers);
    // Misses Champions and Loyal on recency; At Risk still matches.
    assert_eq!(Segment::classify(61, 9, 900.0), Segment::AtRisk);
    // Recent but a one-off buyer.
    assert_eq!(Segment::classify(1, 1, 5_000.0), Segment::AtRisk);
}

#[test]
fn classification_is_deterministic() {
    for r in [0, 30, 31, 60, 61, 90, 91, 365] {
        for f in [1, 2, 3, 8] {
            for m in [0.0, 199.0, 200.0, 1_000.0] {
                assert_eq!(Segment::classify(r, f, m), Segment::classify(r, f, m));
            }
        }
    }
}

#[test]
fn labels_parse_back() {
    for seg in Segment::ALL {
        assert_eq!(seg.label().parse::<Segment>().unwrap(), seg);
        assert_eq!(seg.to_string(), seg.label());
    }
    assert!("Big Spenders".parse::<Segment>().is_err());
}
