use crate::error::Error;
use crate::models::EventQuery;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_LIMIT: usize = 10;
const EVENTS_PER_DAY: i64 = 3;
const DETECTIONS_PER_DAY: i64 = 5;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date pattern"));

/// Build the events filter from raw query pairs.
///
/// `types` may repeat. An explicit `limit` wins; otherwise a date range
/// scales the limit with the number of days covered.
pub fn event_query(params: &[(String, String)]) -> Result<EventQuery, Error> {
    let (from, to) = date_range(params)?;
    let types = params
        .iter()
        .filter(|(key, value)| key == "types" && !value.is_empty())
        .map(|(_, value)| value.clone())
        .collect();

    let limit = match param(params, "limit") {
        Some(limit) => limit
            .parse()
            .map_err(|_| Error::Validation(format!("Invalid limit: {}", limit)))?,
        None => scaled_limit(from, to, EVENTS_PER_DAY),
    };

    Ok(EventQuery {
        from,
        to,
        types,
        limit,
    })
}

/// Number of recent detections to request for the given range.
pub fn detection_count(params: &[(String, String)]) -> Result<usize, Error> {
    let (from, to) = date_range(params)?;
    Ok(scaled_limit(from, to, DETECTIONS_PER_DAY))
}

fn scaled_limit(from: Option<NaiveDate>, to: Option<NaiveDate>, per_day: i64) -> usize {
    match (from, to) {
        (Some(from), Some(to)) => {
            let days = (to - from).num_days();
            (days * per_day).max(DEFAULT_LIMIT as i64) as usize
        }
        _ => DEFAULT_LIMIT,
    }
}

fn date_range(params: &[(String, String)]) -> Result<(Option<NaiveDate>, Option<NaiveDate>), Error> {
    let from = param(params, "from").map(|v| parse_date("from", v)).transpose()?;
    let to = param(params, "to").map(|v| parse_date("to", v)).transpose()?;
    Ok((from, to))
}

fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, v)| k == key && !v.is_empty())
        .map(|(_, v)| v.as_str())
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate, Error> {
    if !DATE_PATTERN.is_match(value) {
        return Err(Error::Validation(format!(
            "'{}' must be a YYYY-MM-DD date: {}",
            name, value
        )));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("'{}' is not a valid date: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_limit() {
        let query = event_query(&[]).unwrap();
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert!(query.types.is_empty());
        assert!(query.from.is_none());
    }

    #[test]
    fn test_limit_scales_with_range() {
        let query = event_query(&pairs(&[("from", "2023-04-01"), ("to", "2023-04-08")])).unwrap();
        assert_eq!(query.limit, 21);

        // Short ranges keep the floor.
        let query = event_query(&pairs(&[("from", "2023-04-06"), ("to", "2023-04-07")])).unwrap();
        assert_eq!(query.limit, DEFAULT_LIMIT);

        // Only one bound: no scaling.
        let query = event_query(&pairs(&[("from", "2023-01-01")])).unwrap();
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_explicit_limit_and_types() {
        let query = event_query(&pairs(&[
            ("from", "2023-04-01"),
            ("to", "2023-04-30"),
            ("types", "error"),
            ("types", "config"),
            ("limit", "4"),
        ]))
        .unwrap();
        assert_eq!(query.limit, 4);
        assert_eq!(query.types, vec!["error", "config"]);

        assert!(event_query(&pairs(&[("limit", "many")])).is_err());
    }

    #[test]
    fn test_rejects_malformed_dates() {
        for value in ["2023-4-1", "04/01/2023", "2023-02-30", "yesterday"] {
            let err = event_query(&pairs(&[("from", value)])).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{}", value);
        }
    }

    #[test]
    fn test_detection_count() {
        assert_eq!(detection_count(&[]).unwrap(), DEFAULT_LIMIT);
        assert_eq!(
            detection_count(&pairs(&[("from", "2023-04-01"), ("to", "2023-04-08")])).unwrap(),
            35
        );
    }
}
