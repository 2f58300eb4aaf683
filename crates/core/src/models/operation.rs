use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Side of a trade fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// `size` is the quote amount spent (e.g. USDT)
    Buy,
    /// `size` is the base amount sold (e.g. BTC)
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// A single trade fill as returned by `GET /api/operations`.
///
/// Numeric fields and the date are optional at the boundary: the backend
/// occasionally ships rows with missing values, and those must be skipped
/// by the aggregator instead of poisoning sums with NaN.
///
/// Decimals may arrive as JSON numbers or numeric strings. Dates may be
/// RFC 3339, or naive ISO-8601 read as UTC. Anything unparseable becomes
/// `None` rather than failing the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Trading pair, e.g. "BTCUSDT"
    pub symbol: String,

    pub side: Side,

    /// Buy: quote spent. Sell: base sold.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub size: Option<f64>,

    /// Quote currency per unit of base currency
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub execution_price: Option<f64>,

    /// Time of execution
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: Option<DateTime<Utc>>,

    /// Owning strategy instance (filtering only)
    pub instance_id: i64,
}

/// The validated numeric part of an operation, in both currencies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    /// Quote currency moved (spent on a buy, received on a sell)
    pub quote: f64,
    /// Base currency moved (bought or sold)
    pub base: f64,
    pub date: DateTime<Utc>,
}

impl Operation {
    pub fn new(
        symbol: impl Into<String>,
        side: Side,
        size: f64,
        execution_price: f64,
        date: DateTime<Utc>,
        instance_id: i64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            size: Some(size),
            execution_price: Some(execution_price),
            date: Some(date),
            instance_id,
        }
    }

    pub fn buy(
        symbol: impl Into<String>,
        usdt_spent: f64,
        execution_price: f64,
        date: DateTime<Utc>,
        instance_id: i64,
    ) -> Self {
        Self::new(symbol, Side::Buy, usdt_spent, execution_price, date, instance_id)
    }

    pub fn sell(
        symbol: impl Into<String>,
        base_sold: f64,
        execution_price: f64,
        date: DateTime<Utc>,
        instance_id: i64,
    ) -> Self {
        Self::new(symbol, Side::Sell, base_sold, execution_price, date, instance_id)
    }

    /// Validate the operation and convert it into quote/base amounts.
    ///
    /// Returns `None` when `size` or `execution_price` is missing, not finite,
    /// or not strictly positive, or when `date` is missing.
    pub fn contribution(&self) -> Option<Contribution> {
        let size = self.size.filter(|v| v.is_finite() && *v > 0.0)?;
        let price = self.execution_price.filter(|v| v.is_finite() && *v > 0.0)?;
        let date = self.date?;

        let (quote, base) = match self.side {
            Side::Buy => (size, size / price),
            Side::Sell => (size * price, size),
        };

        if !quote.is_finite() || !base.is_finite() {
            return None;
        }

        Some(Contribution { quote, base, date })
    }
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

/// Parse a backend timestamp.
///
/// Tries RFC 3339 first, then a naive `YYYY-MM-DD[T ]HH:MM:SS[.fff]` or a
/// bare `YYYY-MM-DD`, both read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
