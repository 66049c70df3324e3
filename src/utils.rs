/// Utility functions
use chrono::Utc;
use rand::Rng;
use serde_json::Value;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Extract number from JSON value
pub fn num(v: &Value) -> Option<f64> {
    if let Some(x) = v.as_f64() {
        return Some(x);
    }
    if let Some(s) = v.as_str() {
        return s.trim().parse::<f64>().ok();
    }
    None
}

/// Pick string value from JSON by trying multiple keys
pub fn s_pick(v: &Value, keys: &[&str]) -> Option<String> {
    for k in keys {
        if let Some(x) = v.get(*k) {
            if let Some(s) = x.as_str() {
                if !s.is_empty() {
                    return Some(s.to_string());
                }
            } else if x.is_number() {
                return Some(x.to_string());
            }
        }
    }
    None
}

/// Pick a finite number from JSON by trying multiple keys
pub fn n_pick(v: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|k| v.get(*k))
        .filter_map(num)
        .find(|n| n.is_finite())
}

/// Pick boolean value from JSON by trying multiple keys
pub fn b_pick(v: &Value, keys: &[&str]) -> Option<bool> {
    for k in keys {
        match v.get(*k) {
            Some(Value::Bool(b)) => return Some(*b),
            Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "true" => return Some(true),
                "false" => return Some(false),
                _ => {}
            },
            _ => {}
        }
    }
    None
}

/// Pick any non-null JSON value by trying multiple keys
pub fn v_pick(v: &Value, keys: &[&str]) -> Option<Value> {
    keys.iter()
        .filter_map(|k| v.get(*k))
        .find(|x| !x.is_null())
        .cloned()
}

/// Correlation id threaded through logs and outbound payloads
pub fn generate_request_id() -> String {
    format!(
        "req_{}_{}",
        Utc::now().timestamp_millis(),
        random_suffix(9, BASE36)
    )
}

/// Ticket id handed back for contact submissions
pub fn generate_ticket_id() -> String {
    format!(
        "TG-{}-{}",
        Utc::now().timestamp_millis(),
        random_suffix(6, BASE36).to_ascii_uppercase()
    )
}

fn random_suffix(len: usize, charset: &[u8]) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_num_from_float() {
        let json = serde_json::json!(42.5);
        assert_eq!(num(&json), Some(42.5));
    }

    #[test]
    fn test_num_from_string() {
        let json = serde_json::json!("0.75");
        assert_eq!(num(&json), Some(0.75));
    }

    #[test]
    fn test_num_from_invalid() {
        let json = serde_json::json!("invalid");
        assert_eq!(num(&json), None);
    }

    #[test]
    fn test_s_pick_finds_first() {
        let json = serde_json::json!({"prediction": "fake", "result": "real"});
        assert_eq!(
            s_pick(&json, &["prediction", "result"]),
            Some("fake".to_string())
        );
    }

    #[test]
    fn test_s_pick_skips_empty_string() {
        let json = serde_json::json!({"prediction": "", "result": "real"});
        assert_eq!(
            s_pick(&json, &["prediction", "result"]),
            Some("real".to_string())
        );
    }

    #[test]
    fn test_s_pick_not_found() {
        let json = serde_json::json!({"other": "value"});
        assert_eq!(s_pick(&json, &["prediction", "result"]), None);
    }

    #[test]
    fn test_n_pick_falls_back_to_second_key() {
        let json = serde_json::json!({"confidence": null, "score": 0.4});
        assert_eq!(n_pick(&json, &["confidence", "score"]), Some(0.4));
    }

    #[test]
    fn test_b_pick_accepts_string_booleans() {
        let json = serde_json::json!({"isFake": "TRUE"});
        assert_eq!(b_pick(&json, &["is_fake", "isFake"]), Some(true));
    }

    #[test]
    fn test_b_pick_keeps_explicit_false() {
        let json = serde_json::json!({"is_fake": false, "isFake": true});
        assert_eq!(b_pick(&json, &["is_fake", "isFake"]), Some(false));
    }

    #[test]
    fn test_request_id_format() {
        let id = generate_request_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "req");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn test_request_ids_are_distinct() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_request_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_ticket_id_is_uppercase() {
        let id = generate_ticket_id();
        assert!(id.starts_with("TG-"));
        let suffix = id.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 6);
        assert_eq!(suffix, suffix.to_ascii_uppercase());
    }
}
