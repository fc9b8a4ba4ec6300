//! Property tests for booking generation and the finding log

use bookercheck_core::data::{PRICE_MAX, PRICE_MIN, generate_booking};
use bookercheck_core::{FindingLog, Severity};
use chrono::NaiveDate;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Info),
        Just(Severity::Warning),
        Just(Severity::Critical),
    ]
}

proptest! {
    #[test]
    fn booking_dates_ordered_and_price_in_range(
        seed in any::<u64>(),
        day_offset in 0u64..20_000,
    ) {
        let base = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let today = base + chrono::Days::new(day_offset);
        let booking = generate_booking(&mut SmallRng::seed_from_u64(seed), today);

        let dates = booking.bookingdates;
        prop_assert!(dates.checkin < dates.checkout);
        prop_assert!(dates.checkin >= today);
        prop_assert!((dates.checkin - today).num_days() < 30);
        prop_assert!((1..=14).contains(&booking.nights()));
        prop_assert!((PRICE_MIN..=PRICE_MAX).contains(&booking.totalprice));
    }

    #[test]
    fn summary_counts_reconcile(severities in proptest::collection::vec(severity(), 0..64)) {
        let log = FindingLog::new().with_context("prop");
        for (i, s) in severities.iter().enumerate() {
            log.log(*s, format!("finding {i}"));
        }

        let summary = log.summary();
        prop_assert_eq!(summary.total, severities.len());
        prop_assert_eq!(summary.total, summary.critical + summary.warnings + summary.info);
        prop_assert_eq!(summary.details.critical.len(), summary.critical);
        for s in Severity::ALL {
            let expected = severities.iter().filter(|x| **x == s).count();
            prop_assert_eq!(log.by_severity(s).len(), expected);
        }

        log.clear();
        prop_assert_eq!(log.summary().total, 0);
    }
}
