use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(UserId);
string_id!(ServiceId);
string_id!(CategoryId);

/// A purchasable unit: one service offered under one category.
///
/// Rendered as `"{service}_{category}"`. Equality, hashing and ordering are
/// defined over the `(service, category)` pair.
///
/// Parsing splits on the last `_`, so only items whose category has no `_`
/// round-trip through their string form. Observations enforce this on load;
/// [`Item::new`] does not.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    service: ServiceId,
    category: CategoryId,
}

impl Item {
    pub fn new(service: impl Into<ServiceId>, category: impl Into<CategoryId>) -> Self {
        Self { service: service.into(), category: category.into() }
    }

    pub fn service(&self) -> &ServiceId {
        &self.service
    }

    pub fn category(&self) -> &CategoryId {
        &self.category
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.service, self.category)
    }
}

impl FromStr for Item {
    type Err = DomainError;

    // Service ids may themselves contain underscores, so the category is
    // whatever follows the last one.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.rsplit_once('_') {
            Some((service, category)) if !service.is_empty() && !category.is_empty() => {
                Ok(Self::new(service, category))
            }
            _ => Err(DomainError::InvalidItem(value.to_owned())),
        }
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
