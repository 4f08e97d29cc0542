//! Spend equivalences: what the money burned so far could have bought.
//!
//! A static table sorted by ascending threshold. Lookups are pure and
//! scan the table linearly; it is small enough that nothing smarter pays.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Equivalence {
    pub threshold: f64,
    pub item: &'static str,
    pub emoji: &'static str,
}

const fn eq(threshold: f64, item: &'static str, emoji: &'static str) -> Equivalence {
    Equivalence {
        threshold,
        item,
        emoji,
    }
}

/// Ascending by threshold, thresholds distinct.
pub static EQUIVALENCES: [Equivalence; 16] = [
    eq(5.0, "A Fancy Coffee", "☕"),
    eq(15.0, "Netflix Subscription", "📺"),
    eq(30.0, "Team Lunch", "🍕"),
    eq(75.0, "Software License", "💻"),
    eq(150.0, "Fancy Dinner for Two", "🍽️"),
    eq(300.0, "Roundtrip Flight", "✈️"),
    eq(500.0, "New MacBook Charger", "🔌"),
    eq(800.0, "High-end Office Chair", "🪑"),
    eq(1000.0, "iPhone 15 Pro", "📱"),
    eq(2000.0, "Company Retreat Day", "🏖️"),
    eq(3500.0, "Full Home Office Setup", "🖥️"),
    eq(5000.0, "Used 2018 Honda Civic", "🚗"),
    eq(8000.0, "Luxury Vacation", "🌴"),
    eq(12000.0, "Entry-Level Salary (1 Month)", "💰"),
    eq(20000.0, "Small Business Loan Payment", "🏦"),
    eq(50000.0, "Junior Developer (1 Year)", "👨‍💻"),
];

/// Highest entry whose threshold has been reached, if any.
pub fn current_equivalence(cost: f64) -> Option<&'static Equivalence> {
    EQUIVALENCES
        .iter()
        .take_while(|e| cost >= e.threshold)
        .last()
}

/// First entry still ahead of `cost`, or `None` once past the last milestone.
///
/// NaN compares false against every threshold, so it reports the first
/// entry as next, matching how [`current_equivalence`] treats it as zero.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn next_equivalence(cost: f64) -> Option<&'static Equivalence> {
    EQUIVALENCES.iter().find(|e| !(cost >= e.threshold))
}

/// Percentage (0..=100) of the way from the current milestone to the next.
pub fn progress_to_next(cost: f64) -> f64 {
    let Some(next) = next_equivalence(cost) else {
        return 100.0;
    };
    let floor = current_equivalence(cost).map(|e| e.threshold).unwrap_or(0.0);
    let pct = (cost - floor) / (next.threshold - floor) * 100.0;
    if pct.is_nan() {
        return 0.0;
    }
    pct.clamp(0.0, 100.0)
}

/// Current milestone, upcoming milestone and how far along the gap we are.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub current: Option<&'static Equivalence>,
    pub next: Option<&'static Equivalence>,
    pub percent: f64,
}

impl Progress {
    pub fn at(cost: f64) -> Self {
        Self {
            current: current_equivalence(cost),
            next: next_equivalence(cost),
            percent: progress_to_next(cost),
        }
    }
}
