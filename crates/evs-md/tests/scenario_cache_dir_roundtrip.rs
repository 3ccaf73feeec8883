//! Scenario: cache directory discovery, loading and quality report
//!
//! GREEN when:
//! - Only `*_daily.csv` files are discovered, mapped to dotted symbols, sorted.
//! - A `date,ret` cache written by the fixture writer loads back to the same series.
//! - A `Date,Close` cache loads with returns derived from closes.
//! - The quality report lists a malformed file as unreadable instead of failing.
//! - A missing data dir is an error naming the path.

use evs_md::{
    build_quality_report, cache_path, discover_symbols, load_events_csv, load_price_csv,
};
use evs_testkit::{
    business_days, monthly_events, seeded_returns, series_from_returns, write_closes_csv,
    write_events_csv, write_returns_csv, ymd,
};

#[test]
fn discover_load_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path();

    let spy = series_from_returns("SPY.US", ymd(2024, 1, 2), &seeded_returns(3, 60, 0.02)).unwrap();
    write_returns_csv(&cache_path(data, "SPY.US"), &spy).unwrap();

    let closes: Vec<_> = business_days(ymd(2024, 1, 2), 4)
        .into_iter()
        .zip([100.0, 101.0, 99.0, 100.0])
        .collect();
    write_closes_csv(&cache_path(data, "GLD.US"), &closes).unwrap();

    std::fs::write(data.join("BAD_daily.csv"), "when,what\n1,2\n").unwrap();
    std::fs::write(data.join("notes.txt"), "ignore me").unwrap();
    write_events_csv(&data.join("events.csv"), &monthly_events("CPI", 2024, 1, 10, 3)).unwrap();

    let syms = discover_symbols(data).unwrap();
    assert_eq!(syms, vec!["BAD", "GLD.US", "SPY.US"]);

    let loaded = load_price_csv(&cache_path(data, "SPY.US"), "SPY.US").unwrap();
    assert_eq!(loaded.len(), spy.len());
    for (a, b) in loaded.observations().iter().zip(spy.observations()) {
        assert_eq!(a.date, b.date);
        assert_eq!(a.ret, b.ret);
    }

    let gld = load_price_csv(&cache_path(data, "GLD.US"), "GLD.US").unwrap();
    assert_eq!(gld.len(), 3);
    assert!((gld.observations()[0].ret - 0.01).abs() < 1e-12);

    let events = load_events_csv(&data.join("events.csv")).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].name, "CPI");

    let report = build_quality_report(data).unwrap();
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.unreadable.len(), 1);
    assert_eq!(report.unreadable[0].0, "BAD");
    assert!(!report.is_clean());
    let text = report.to_string();
    assert!(text.contains("SPY.US rows=60 usable=60 dropped=0"));
    assert!(text.contains("GLD.US rows=4 usable=3 dropped=1"));
}

#[test]
fn missing_data_dir_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = discover_symbols(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("read data dir"));
}
