use revcast::error::ForecastError;
use series_math::MathError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(ForecastError::from(io_error), ForecastError::IoError(_)));

    let math_error = MathError::NotConverged { iterations: 10 };
    assert!(matches!(
        ForecastError::from(math_error),
        ForecastError::MathError(MathError::NotConverged { iterations: 10 })
    ));

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::SerializationError(_)
    ));
}

#[test]
fn test_csv_error_conversion() {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader("a,b\nc\n".as_bytes());
    let error = reader
        .records()
        .find_map(|r| r.err())
        .expect("ragged record should fail");

    let converted = ForecastError::from(error);
    assert!(matches!(converted, ForecastError::CsvError(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("horizon must be at least 1".to_string());
    assert_eq!(error.to_string(), "Invalid parameter: horizon must be at least 1");

    let error = ForecastError::UnknownDimension("channel".to_string());
    assert!(error.to_string().contains("channel"));

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error = ForecastError::from(io_error);
    let error_string = error.to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}
