use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// A dropdown value: either "all" or one concrete choice.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    /// True if `value` passes this selection.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }
}

impl<T> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T> From<Option<T>> for Selection<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Selection::Only(v),
            None => Selection::All,
        }
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    /// `"all"` (any case, surrounding whitespace ignored) selects everything.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            trimmed.parse().map(Selection::Only)
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::All => write!(f, "all"),
            Selection::Only(v) => write!(f, "{v}"),
        }
    }
}

impl<T: Serialize> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_str("all"),
            Selection::Only(v) => v.serialize(serializer),
        }
    }
}

/// Reads `"all"` back as `All`; any other string goes through `FromStr`,
/// non-string values (e.g. a numeric instance id) through `T`'s own serde.
impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: Deserialize<'de> + FromStr,
    T::Err: std::fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Text(String),
            Value(T),
        }

        match Raw::<T>::deserialize(deserializer)? {
            Raw::Text(s) => s.parse().map_err(D::Error::custom),
            Raw::Value(v) => Ok(Selection::Only(v)),
        }
    }
}

/// The timezone in which an operation's calendar day is taken.
///
/// `Local` resolves the machine's offset per timestamp, so daylight saving
/// time is honored for dates in either half of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerTimezone {
    Fixed(FixedOffset),
    Local,
}

impl ViewerTimezone {
    pub fn utc() -> Self {
        ViewerTimezone::Fixed(Utc.fix())
    }

    /// Calendar day of `date` as the viewer sees it.
    pub fn calendar_day(&self, date: DateTime<Utc>) -> NaiveDate {
        match self {
            ViewerTimezone::Fixed(offset) => date.with_timezone(offset).date_naive(),
            ViewerTimezone::Local => date.with_timezone(&Local).date_naive(),
        }
    }
}

impl Default for ViewerTimezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl From<FixedOffset> for ViewerTimezone {
    fn from(offset: FixedOffset) -> Self {
        ViewerTimezone::Fixed(offset)
    }
}

impl std::fmt::Display for ViewerTimezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerTimezone::Fixed(offset) => write!(f, "{offset}"),
            ViewerTimezone::Local => write!(f, "local"),
        }
    }
}

impl FromStr for ViewerTimezone {
    type Err = String;

    /// `"local"` (any case) or an offset such as `"+02:00"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(ViewerTimezone::Local);
        }
        trimmed
            .parse::<FixedOffset>()
            .map(ViewerTimezone::Fixed)
            .map_err(|e| format!("invalid timezone '{trimmed}': {e}"))
    }
}

impl Serialize for ViewerTimezone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ViewerTimezone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Filter selection of the P&L page, as one immutable value.
///
/// Date bounds are inclusive calendar days. The calendar day of an
/// operation is taken in `timezone` (the viewer's timezone).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub symbol: Selection<String>,
    #[serde(default)]
    pub instance_id: Selection<i64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub timezone: ViewerTimezone,
}

impl FilterCriteria {
    /// Everything, in UTC.
    pub fn all() -> Self {
        Self::default()
    }

    /// Everything, with calendar days taken in the machine's local timezone.
    pub fn local() -> Self {
        Self {
            timezone: ViewerTimezone::Local,
            ..Self::default()
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Selection::Only(symbol.into());
        self
    }

    pub fn with_instance(mut self, instance_id: i64) -> Self {
        self.instance_id = Selection::Only(instance_id);
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<ViewerTimezone>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// True when a date bound is active.
    pub fn has_date_range(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Calendar day of `date` in the viewer's timezone.
    pub fn calendar_day(&self, date: DateTime<Utc>) -> NaiveDate {
        self.timezone.calendar_day(date)
    }

    /// True if `day` lies within the inclusive bounds.
    pub fn day_in_range(&self, day: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| day >= start)
            && self.end_date.map_or(true, |end| day <= end)
    }
}
