//! Parameter generation: maps a selectivity value to a concrete range drawn
//! from a fixed domain window.
//!
//! Two domains exist. The date domain is anchored on the configured benchmark
//! run date; the item domain is the fixed TPC-CH item id space. Which domain a
//! query draws from is fixed per query, not chosen by the caller.

use chrono::{Duration, Months, NaiveDateTime};
use log::debug;
use rand::Rng;
use serde_json::{json, Value};

/// Timestamp rendering used for date-range literals.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Item id domain bounds.
const ITEM_START_ID: u32 = 1;
const ITEM_END_ID: u32 = 100_000;

/// The date window ends one day before the run date, backed off by a further
/// 151 days so the window only covers aged data.
const END_OF_DATA_BACKOFF_DAYS: i64 = 1 + 151;

/// Rejection-sampling cap for the date domain. For sigma close to 100 nearly
/// every anchor overshoots the window end, so the loop must be bounded; past
/// the cap we fall back to the one anchor that cannot overshoot.
const MAX_DATE_DRAWS: u32 = 1000;

/// A generated parameter range, ready to substitute into a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamRange {
    Dates(String, String),
    Items(u32, u32),
}

impl ParamRange {
    pub fn v0(&self) -> String {
        match self {
            ParamRange::Dates(v0, _) => v0.clone(),
            ParamRange::Items(v0, _) => v0.to_string(),
        }
    }

    pub fn v1(&self) -> String {
        match self {
            ParamRange::Dates(_, v1) => v1.clone(),
            ParamRange::Items(_, v1) => v1.to_string(),
        }
    }

    /// The `valueRange` object recorded in the result envelope.
    pub fn to_json(&self) -> Value {
        match self {
            ParamRange::Dates(v0, v1) => json!({ "v0": v0, "v1": v1 }),
            ParamRange::Items(v0, v1) => json!({ "v0": v0, "v1": v1 }),
        }
    }
}

/// A selectivity-scaled range generator over one of the two domains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamGenerator {
    /// Delivery-date ranges inside the historical window anchored on the
    /// benchmark run date.
    Dates { run_date: NaiveDateTime },
    /// Item id ranges inside `[1, 100000]`.
    Items,
}

impl ParamGenerator {
    /// Generator name recorded in the result envelope.
    pub fn name(&self) -> &'static str {
        match self {
            ParamGenerator::Dates { .. } => "dates",
            ParamGenerator::Items => "items",
        }
    }

    /// Generate a range spanning `sigma` percent of the domain window.
    pub fn generate<R: Rng + ?Sized>(&self, sigma: f64, rng: &mut R) -> ParamRange {
        match self {
            ParamGenerator::Dates { run_date } => generate_dates(*run_date, sigma, rng),
            ParamGenerator::Items => generate_items(sigma, rng),
        }
    }
}

/// Domain window for the date generator: seven years of history, ending
/// before the end-of-data boundary.
pub fn date_domain(run_date: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = run_date
        .checked_sub_months(Months::new(7 * 12))
        .unwrap_or(run_date);
    let end = run_date - Duration::days(END_OF_DATA_BACKOFF_DAYS);
    (start, end)
}

fn generate_dates<R: Rng + ?Sized>(
    run_date: NaiveDateTime,
    sigma: f64,
    rng: &mut R,
) -> ParamRange {
    let (domain_start, domain_end) = date_domain(run_date);
    let window_secs = (domain_end - domain_start).num_seconds().max(0);
    let span_secs = ((sigma / 100.0) * window_secs as f64).round() as i64;
    let span = Duration::seconds(span_secs);

    // Sample a uniform anchor until the span fits inside the window. The
    // last-resort anchor is the window start itself, clamped to the window
    // end, which covers the sigma = 100 degenerate case.
    let mut start = domain_start;
    let mut end = domain_end;
    for _ in 0..MAX_DATE_DRAWS {
        let offset = rng.gen_range(0..=window_secs);
        let candidate = domain_start + Duration::seconds(offset);
        if candidate + span < domain_end {
            start = candidate;
            end = candidate + span;
            break;
        }
    }
    if end >= domain_end && start == domain_start {
        end = (domain_start + span).min(domain_end);
    }

    debug!("Generated dates: [{start}, {end}]");
    ParamRange::Dates(
        start.format(DATE_FORMAT).to_string(),
        end.format(DATE_FORMAT).to_string(),
    )
}

fn generate_items<R: Rng + ?Sized>(sigma: f64, rng: &mut R) -> ParamRange {
    let span = (sigma / 100.0) * (ITEM_END_ID - ITEM_START_ID) as f64;

    // The sampling interval already excludes overflow, so no rejection loop.
    let start_max = (ITEM_END_ID as f64 - span).ceil() as u32;
    let start = rng.gen_range(ITEM_START_ID..=start_max.max(ITEM_START_ID));
    let end = (start as f64 + span).ceil() as u32;

    debug!("Generated item IDs: [{start}, {end}]");
    ParamRange::Items(start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run_date() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 12, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn parse(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn date_ranges_stay_inside_the_domain() {
        let gen = ParamGenerator::Dates { run_date: run_date() };
        let (domain_start, domain_end) = date_domain(run_date());
        let mut rng = StdRng::seed_from_u64(7);
        for sigma in [0.0, 10.0, 50.0, 99.0] {
            for _ in 0..50 {
                let ParamRange::Dates(v0, v1) = gen.generate(sigma, &mut rng) else {
                    panic!("date generator produced an item range");
                };
                let (start, end) = (parse(&v0), parse(&v1));
                assert!(start >= domain_start);
                assert!(start <= end, "sigma {sigma}: {start} > {end}");
                assert!(end <= domain_end, "sigma {sigma}: {end} past {domain_end}");
            }
        }
    }

    #[test]
    fn date_span_tracks_sigma() {
        let gen = ParamGenerator::Dates { run_date: run_date() };
        let (domain_start, domain_end) = date_domain(run_date());
        let window = (domain_end - domain_start).num_seconds() as f64;
        let mut rng = StdRng::seed_from_u64(11);
        for sigma in [5.0, 25.0, 75.0] {
            let ParamRange::Dates(v0, v1) = gen.generate(sigma, &mut rng) else {
                panic!("date generator produced an item range");
            };
            let actual = (parse(&v1) - parse(&v0)).num_seconds() as f64;
            let expected = (sigma / 100.0) * window;
            assert!(
                (actual - expected).abs() <= 1.0,
                "sigma {sigma}: span {actual} vs expected {expected}"
            );
        }
    }

    #[test]
    fn full_window_sigma_terminates() {
        let gen = ParamGenerator::Dates { run_date: run_date() };
        let (domain_start, domain_end) = date_domain(run_date());
        let mut rng = StdRng::seed_from_u64(13);
        let ParamRange::Dates(v0, v1) = gen.generate(100.0, &mut rng) else {
            panic!("date generator produced an item range");
        };
        assert_eq!(parse(&v0), domain_start);
        assert_eq!(parse(&v1), domain_end);
    }

    #[test]
    fn item_ranges_stay_inside_the_domain() {
        let mut rng = StdRng::seed_from_u64(17);
        for sigma in [0.0, 50.0, 100.0] {
            for _ in 0..50 {
                let ParamRange::Items(start, end) =
                    ParamGenerator::Items.generate(sigma, &mut rng)
                else {
                    panic!("item generator produced a date range");
                };
                assert!((1..=100_000).contains(&start));
                assert!(start <= end);
                assert!(end <= 100_000);
            }
        }
    }

    #[test]
    fn full_item_sigma_spans_the_whole_domain() {
        let mut rng = StdRng::seed_from_u64(19);
        let range = ParamGenerator::Items.generate(100.0, &mut rng);
        assert_eq!(range, ParamRange::Items(1, 100_000));
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let gen = ParamGenerator::Dates { run_date: run_date() };
        let a = gen.generate(30.0, &mut StdRng::seed_from_u64(23));
        let b = gen.generate(30.0, &mut StdRng::seed_from_u64(23));
        assert_eq!(a, b);
    }
}
