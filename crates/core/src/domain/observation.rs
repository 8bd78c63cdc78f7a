use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use super::item::{CategoryId, Item, ServiceId, UserId};

/// One raw "user bought service X in category Y" event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(alias = "UserId", deserialize_with = "lenient_id")]
    pub user_id: UserId,
    #[serde(alias = "ServiceId", deserialize_with = "lenient_id")]
    pub service_id: ServiceId,
    #[serde(alias = "CategoryId", deserialize_with = "category_id")]
    pub category_id: CategoryId,
    #[serde(
        default,
        alias = "CreateDate",
        deserialize_with = "lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
}

impl Observation {
    pub fn new(
        user_id: impl Into<UserId>,
        service_id: impl Into<ServiceId>,
        category_id: impl Into<CategoryId>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            service_id: service_id.into(),
            category_id: category_id.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn item(&self) -> Item {
        Item::new(self.service_id.clone(), self.category_id.clone())
    }

    /// Calendar month (1-12) of the purchase, if dated.
    pub fn month(&self) -> Option<u32> {
        self.date.map(|date| date.month())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(i64),
    Unsigned(u64),
}

// Exports routinely carry numeric ids; both shapes map onto the same string id.
fn lenient_id<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let raw = match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value.trim().to_owned(),
        RawId::Integer(value) => value.to_string(),
        RawId::Unsigned(value) => value.to_string(),
    };
    if raw.is_empty() {
        return Err(serde::de::Error::custom("identifier must not be empty"));
    }
    Ok(T::from(raw))
}

// The category is everything after the last `_` of an item, so it cannot hold one.
fn category_id<'de, D>(deserializer: D) -> Result<CategoryId, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: String = lenient_id(deserializer)?;
    if raw.contains('_') {
        return Err(serde::de::Error::custom(format!(
            "category identifier `{raw}` must not contain `_`"
        )));
    }
    Ok(CategoryId::from(raw))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    parse_date(raw).map(Some).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognised date `{raw}` (expected YYYY-MM-DD)"))
    })
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    chrono::DateTime::parse_from_rfc3339(raw).ok().map(|datetime| datetime.date_naive())
}
