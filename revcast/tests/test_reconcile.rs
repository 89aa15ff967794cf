use pretty_assertions::assert_eq;
use revcast::forecaster::{ForecastSeries, ForecastStatus, SkipReason};
use revcast::reconcile::{reconcile, rows_to_json, DisplayRow};
use revcast::{Month, MonthlySeries};

fn month(y: i32, m: u32) -> Month {
    Month::new(y, m).unwrap()
}

fn skipped(start: Month, horizon: usize) -> ForecastSeries {
    ForecastSeries::undefined(start, horizon, ForecastStatus::Skipped(SkipReason::ZeroHistory)).unwrap()
}

#[test]
fn test_undefined_forecast_keeps_history_only() {
    let full = MonthlySeries::from_values(month(2024, 1), &[5.0, 0.0, 7.0]).unwrap();
    let forecast = skipped(month(2024, 6), 3);

    let rows = reconcile("A", &full, &forecast, month(2024, 6)).unwrap();

    // Zero-filled historical months still show their actual
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| !r.is_future && r.forecast.is_none()));
    assert_eq!(
        rows.iter().map(|r| r.actual).collect::<Vec<_>>(),
        vec![Some(5.0), Some(0.0), Some(7.0)]
    );
}

#[test]
fn test_future_actual_shown_when_forecast_undefined() {
    // April and May are historical; June already has an actual
    let full = MonthlySeries::from_values(month(2024, 4), &[3.0, 4.0, 9.0]).unwrap();
    let forecast = skipped(month(2024, 6), 6);

    let rows = reconcile("A", &full, &forecast, month(2024, 6)).unwrap();

    assert_eq!(
        rows.last().unwrap(),
        &DisplayRow {
            date: month(2024, 6).first_day(),
            month: month(2024, 6),
            category: "A".to_string(),
            actual: Some(9.0),
            forecast: None,
            is_future: true,
        }
    );
    assert_eq!(rows.len(), 3);
}

#[test]
fn test_zero_future_actual_produces_no_row() {
    let full = MonthlySeries::from_values(month(2024, 5), &[3.0, 0.0, 0.0, 8.0]).unwrap();
    let forecast = skipped(month(2024, 6), 2);

    let rows = reconcile("A", &full, &forecast, month(2024, 6)).unwrap();
    let months: Vec<Month> = rows.iter().map(|r| r.month).collect();

    // June and July are zero, August is beyond the horizon but non-zero
    assert_eq!(months, vec![month(2024, 5), month(2024, 8)]);
}

#[test]
fn test_rows_are_chronological_and_exclusive() {
    let full = MonthlySeries::from_values(month(2023, 11), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let forecast = ForecastSeries::undefined(
        month(2024, 3),
        2,
        ForecastStatus::Skipped(SkipReason::TooFewPoints { found: 0, required: 3 }),
    )
    .unwrap();

    let rows = reconcile("B", &full, &forecast, month(2024, 3)).unwrap();

    assert!(rows.windows(2).all(|w| w[0].month < w[1].month));
    assert!(rows.iter().all(|r| !(r.actual.is_some() && r.forecast.is_some())));
    assert!(rows.iter().all(|r| r.is_future == (r.month >= month(2024, 3))));
    assert!(rows.iter().all(|r| r.date == r.month.first_day()));
}

#[test]
fn test_empty_series_with_empty_forecast() {
    let rows = reconcile("C", &MonthlySeries::new(), &skipped(month(2024, 1), 3), month(2024, 1)).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_rounding() {
    let row = DisplayRow {
        date: month(2024, 1).first_day(),
        month: month(2024, 1),
        category: "A".to_string(),
        actual: Some(10.126),
        forecast: None,
        is_future: false,
    }
    .rounded(2);

    assert_eq!(row.actual, Some(10.13));
    assert_eq!(row.forecast, None);
}

#[test]
fn test_json_rendering() {
    let full = MonthlySeries::from_values(month(2024, 1), &[5.0]).unwrap();
    let rows = reconcile("A", &full, &skipped(month(2024, 2), 1), month(2024, 2)).unwrap();

    let json = rows_to_json(&rows).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value[0]["date"], "2024-01-01");
    assert_eq!(value[0]["month"], "2024-01");
    assert_eq!(value[0]["category"], "A");
    assert_eq!(value[0]["actual"], 5.0);
    assert!(value[0]["forecast"].is_null());
    assert_eq!(value[0]["is_future"], false);
}

#[test]
fn test_rounding_keeps_values_too_large_to_scale() {
    let row = DisplayRow {
        date: month(2024, 1).first_day(),
        month: month(2024, 1),
        category: "Big".to_string(),
        actual: Some(1e307),
        forecast: Some(-1e307),
        is_future: false,
    }
    .rounded(2);

    assert_eq!(row.actual, Some(1e307));
    assert_eq!(row.forecast, Some(-1e307));
}

#[test]
fn test_huge_actual_survives_rendering() {
    let full = MonthlySeries::from_values(month(2024, 1), &[1e307]).unwrap();
    let rows: Vec<DisplayRow> = reconcile("Big", &full, &skipped(month(2024, 6), 1), month(2024, 6))
        .unwrap()
        .into_iter()
        .map(|row| row.rounded(2))
        .collect();

    let json = rows_to_json(&rows).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["actual"], 1e307);
}
