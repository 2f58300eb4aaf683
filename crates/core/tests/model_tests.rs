use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;

use trading_dashboard_core::api::rest::decode_operations;
use trading_dashboard_core::errors::CoreError;
use trading_dashboard_core::models::chart::BarDirection;
use trading_dashboard_core::models::filter::{FilterCriteria, Selection, ViewerTimezone};
use trading_dashboard_core::models::instance::{Instance, InstanceStatus};
use trading_dashboard_core::models::operation::{parse_timestamp, Operation, Side};
use trading_dashboard_core::models::settings::Settings;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Operation
// ═══════════════════════════════════════════════════════════════════

mod operation {
    use super::*;

    #[test]
    fn deserializes_backend_payload() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "side": "buy",
            "size": 1000.0,
            "execution_price": 50000.0,
            "date": "2025-01-15T10:30:00Z",
            "instance_id": 7,
            "fee": 0.1
        }"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.symbol, "BTCUSDT");
        assert_eq!(op.side, Side::Buy);
        assert_eq!(op.size, Some(1000.0));
        assert_eq!(op.execution_price, Some(50000.0));
        assert_eq!(op.date, Some(Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap()));
        assert_eq!(op.instance_id, 7);
    }

    #[test]
    fn missing_numeric_fields_become_none() {
        let json = r#"{"symbol": "ETHUSDT", "side": "sell", "instance_id": 1}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.size, None);
        assert_eq!(op.execution_price, None);
        assert_eq!(op.date, None);
        assert!(op.contribution().is_none());
    }

    #[test]
    fn null_fields_become_none() {
        let json = r#"{"symbol": "X", "side": "buy", "size": null, "execution_price": 1.0,
                       "date": "2025-01-01T00:00:00Z", "instance_id": 1}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.size, None);
    }

    #[test]
    fn decimal_strings_are_accepted() {
        let json = r#"{"symbol": "BTCUSDT", "side": "buy", "size": "100.5",
                       "execution_price": " 50000 ", "date": "2025-01-01T00:00:00Z",
                       "instance_id": 1}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.size, Some(100.5));
        assert_eq!(op.execution_price, Some(50000.0));
        assert!(op.contribution().is_some());
    }

    #[test]
    fn unparseable_decimal_becomes_none() {
        let json = r#"{"symbol": "X", "side": "sell", "size": "n/a",
                       "execution_price": true, "instance_id": 1}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.size, None);
        assert_eq!(op.execution_price, None);
    }

    #[test]
    fn naive_timestamp_is_read_as_utc() {
        let json = r#"{"symbol": "X", "side": "sell", "size": 1.0, "execution_price": 2.0,
                       "date": "2025-01-02T10:00:00", "instance_id": 1}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.date, Some(Utc.with_ymd_and_hms(2025, 1, 2, 10, 0, 0).unwrap()));
    }

    #[test]
    fn unparseable_timestamp_becomes_none() {
        let json = r#"{"symbol": "X", "side": "buy", "size": 1.0, "execution_price": 2.0,
                       "date": "yesterday", "instance_id": 1}"#;
        let op: Operation = serde_json::from_str(json).unwrap();
        assert_eq!(op.date, None);
        assert!(op.contribution().is_none());
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-03-04T10:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-03-04 08:00:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-03-04T08:00:00.250"),
            Some(expected + chrono::Duration::milliseconds(250))
        );
        assert_eq!(
            parse_timestamp("2025-03-04"),
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn messy_payload_keeps_every_row() {
        let json = r#"[
            {"symbol": "BTCUSDT", "side": "buy", "size": 1000.0, "execution_price": 50000.0,
             "date": "2025-01-01T10:00:00Z", "instance_id": 1},
            {"symbol": "BTCUSDT", "side": "sell", "size": 0.02, "execution_price": 55000.0,
             "date": "2025-01-02T10:00:00", "instance_id": 1},
            {"symbol": "ETHUSDT", "side": "buy", "size": "100.5", "execution_price": "2500",
             "date": "2025-01-03T10:00:00Z", "instance_id": 2}
        ]"#;
        let ops: Vec<Operation> = serde_json::from_str(json).unwrap();
        assert_eq!(ops.len(), 3);
        assert!(ops.iter().all(|op| op.contribution().is_some()));
    }

    #[test]
    fn unreadable_rows_are_dropped_individually() {
        let rows: Vec<serde_json::Value> = serde_json::from_str(
            r#"[
                {"symbol": "BTCUSDT", "side": "buy", "size": 1000.0, "execution_price": 50000.0,
                 "date": "2025-01-01T10:00:00Z", "instance_id": 1},
                {"symbol": "BTCUSDT", "side": "hold", "instance_id": 1},
                {"side": "sell", "instance_id": 1},
                {"symbol": "BTCUSDT", "side": "sell", "size": "0.02", "execution_price": 55000,
                 "date": "2025-01-02T10:00:00Z", "instance_id": 1}
            ]"#,
        )
        .unwrap();
        let ops = decode_operations(rows);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].side, Side::Buy);
        assert_eq!(ops[1].side, Side::Sell);
        assert_eq!(ops[1].size, Some(0.02));
    }

    #[test]
    fn unknown_side_is_rejected() {
        let json = r#"{"symbol": "X", "side": "hold", "instance_id": 1}"#;
        assert!(serde_json::from_str::<Operation>(json).is_err());
    }

    #[test]
    fn buy_contribution_converts_quote_to_base() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let c = Operation::buy("BTCUSDT", 1000.0, 50000.0, t, 1).contribution().unwrap();
        assert_eq!(c.quote, 1000.0);
        assert!((c.base - 0.02).abs() < 1e-12);
        assert_eq!(c.date, t);
    }

    #[test]
    fn sell_contribution_converts_base_to_quote() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let c = Operation::sell("BTCUSDT", 0.5, 40000.0, t, 1).contribution().unwrap();
        assert_eq!(c.base, 0.5);
        assert_eq!(c.quote, 20000.0);
    }

    #[test]
    fn side_display_and_serde() {
        assert_eq!(Side::Buy.to_string(), "buy");
        assert_eq!(Side::Sell.to_string(), "sell");
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"sell\"");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Selection & FilterCriteria
// ═══════════════════════════════════════════════════════════════════

mod filter {
    use super::*;

    #[test]
    fn parse_all_any_case() {
        assert_eq!("all".parse::<Selection<i64>>().unwrap(), Selection::All);
        assert_eq!(" ALL ".parse::<Selection<String>>().unwrap(), Selection::All);
    }

    #[test]
    fn parse_value() {
        assert_eq!("42".parse::<Selection<i64>>().unwrap(), Selection::Only(42));
        assert_eq!(
            "BTCUSDT".parse::<Selection<String>>().unwrap(),
            Selection::Only("BTCUSDT".to_string())
        );
        assert!("abc".parse::<Selection<i64>>().is_err());
    }

    #[test]
    fn matches() {
        assert!(Selection::<i64>::All.matches(&3));
        assert!(Selection::Only(3).matches(&3));
        assert!(!Selection::Only(3).matches(&4));
    }

    #[test]
    fn from_option() {
        assert_eq!(Selection::from(Some(5)), Selection::Only(5));
        assert_eq!(Selection::<i64>::from(None), Selection::All);
    }

    #[test]
    fn serializes_all_as_string() {
        let criteria = FilterCriteria::all().with_instance(3);
        let json = serde_json::to_value(&criteria).unwrap();
        assert_eq!(json["symbol"], "all");
        assert_eq!(json["instance_id"], 3);
        assert_eq!(json["start_date"], serde_json::Value::Null);
        assert_eq!(json["timezone"], "+00:00");
    }

    #[test]
    fn criteria_round_trip() {
        let criteria = FilterCriteria::all()
            .with_symbol("BTCUSDT")
            .with_instance(3)
            .with_start_date(d(2025, 1, 1))
            .with_timezone(chrono::FixedOffset::east_opt(2 * 3600).unwrap());
        let json = serde_json::to_string(&criteria).unwrap();
        let back: FilterCriteria = serde_json::from_str(&json).unwrap();
        assert_eq!(back, criteria);
    }

    #[test]
    fn criteria_reads_all_and_local() {
        let json = r#"{"symbol": "all", "instance_id": "all", "timezone": "local"}"#;
        let criteria: FilterCriteria = serde_json::from_str(json).unwrap();
        assert_eq!(criteria, FilterCriteria::local());
        assert_eq!(serde_json::to_value(&criteria).unwrap()["timezone"], "local");
    }

    #[test]
    fn timezone_parsing() {
        assert_eq!("LOCAL".parse::<ViewerTimezone>().unwrap(), ViewerTimezone::Local);
        assert_eq!(
            "-05:00".parse::<ViewerTimezone>().unwrap(),
            ViewerTimezone::Fixed(chrono::FixedOffset::west_opt(5 * 3600).unwrap())
        );
        assert!("mars".parse::<ViewerTimezone>().is_err());
        assert_eq!(ViewerTimezone::default(), ViewerTimezone::utc());
    }

    #[test]
    fn day_in_range_inclusive() {
        let criteria = FilterCriteria::all()
            .with_start_date(d(2025, 1, 1))
            .with_end_date(d(2025, 1, 31));
        assert!(criteria.day_in_range(d(2025, 1, 1)));
        assert!(criteria.day_in_range(d(2025, 1, 31)));
        assert!(!criteria.day_in_range(d(2024, 12, 31)));
        assert!(!criteria.day_in_range(d(2025, 2, 1)));
    }

    #[test]
    fn default_has_no_date_range() {
        assert!(!FilterCriteria::default().has_date_range());
        assert!(FilterCriteria::all().with_end_date(d(2025, 1, 1)).has_date_range());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Instance & chart
// ═══════════════════════════════════════════════════════════════════

mod instance {
    use super::*;

    #[test]
    fn deserializes_with_optional_fields() {
        let json = r#"[
            {"id": 1, "name": "Grid BTC", "strategy_id": 4, "symbol": "BTCUSDT", "status": "running"},
            {"id": 2, "name": "DCA", "status": "stopped", "created_at": "2025-01-01"}
        ]"#;
        let instances: Vec<Instance> = serde_json::from_str(json).unwrap();
        assert_eq!(instances.len(), 2);
        assert!(instances[0].is_running());
        assert_eq!(instances[0].strategy_id, Some(4));
        assert_eq!(instances[1].status, InstanceStatus::Stopped);
        assert_eq!(instances[1].symbol, None);
    }

    #[test]
    fn status_display() {
        assert_eq!(InstanceStatus::Error.to_string(), "error");
    }

    #[test]
    fn bar_direction() {
        assert_eq!(BarDirection::from_value(0.0), BarDirection::Gain);
        assert_eq!(BarDirection::from_value(-0.01), BarDirection::Loss);
        assert_ne!(BarDirection::Gain.color(), BarDirection::Loss.color());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.api_prefix, "/api");
        assert_eq!(s.login_path, "/login");
        assert_eq!(s.page_size, 10);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn api_url_joins_with_single_slashes() {
        let s = Settings {
            api_base_url: "https://trade.example.com/".into(),
            ..Settings::default()
        };
        assert_eq!(s.api_url("/operations"), "https://trade.example.com/api/operations");
        assert_eq!(s.api_url("instances/3/start"), "https://trade.example.com/api/instances/3/start");
        assert_eq!(s.login_url(), "https://trade.example.com/login");
    }

    #[test]
    fn empty_prefix() {
        let s = Settings {
            api_prefix: String::new(),
            ..Settings::default()
        };
        assert_eq!(s.api_url("/operations"), "http://localhost:8000/operations");
    }

    #[test]
    fn parses_partial_toml() {
        let s = Settings::from_toml_str("api_base_url = \"https://x.io\"\npage_size = 25\n").unwrap();
        assert_eq!(s.api_base_url, "https://x.io");
        assert_eq!(s.page_size, 25);
        assert_eq!(s.request_timeout_secs, 30);
    }

    #[test]
    fn rejects_zero_page_size() {
        let err = Settings::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = Settings::from_toml_str("page_size = \"ten\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn overrides_apply() {
        let mut vars = HashMap::new();
        vars.insert("TDASH_API_URL".to_string(), "https://prod.io".to_string());
        vars.insert("TDASH_API_TOKEN".to_string(), "secret".to_string());
        vars.insert("TDASH_PAGE_SIZE".to_string(), "50".to_string());
        let s = Settings::default().apply_overrides(&vars).unwrap();
        assert_eq!(s.api_base_url, "https://prod.io");
        assert_eq!(s.auth_token.as_deref(), Some("secret"));
        assert_eq!(s.page_size, 50);
    }

    #[test]
    fn empty_token_override_clears_token() {
        let mut vars = HashMap::new();
        vars.insert("TDASH_API_TOKEN".to_string(), String::new());
        let s = Settings {
            auth_token: Some("old".into()),
            ..Settings::default()
        }
        .apply_overrides(&vars)
        .unwrap();
        assert_eq!(s.auth_token, None);
    }

    #[test]
    fn invalid_override_is_config_error() {
        let mut vars = HashMap::new();
        vars.insert("TDASH_TIMEOUT_SECS".to_string(), "soon".to_string());
        let err = Settings::default().apply_overrides(&vars).unwrap_err();
        assert!(err.to_string().contains("TDASH_TIMEOUT_SECS"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tdash.toml");
        std::fs::write(&path, "login_path = \"/signin\"\n").unwrap();
        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.login_path, "/signin");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Settings::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, CoreError::FileIO(_)));
    }
}
