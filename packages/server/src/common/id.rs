//! Typed integer ids for compile-time type safety.
//!
//! Registry rows are keyed by database serials. `Id<T>` wraps the raw `i64`
//! so a `ModId` can never be passed where a `ModVersionId` was expected,
//! while still encoding as a plain `BIGINT` in Postgres and a plain number
//! in JSON.
//!
//! # Example
//!
//! ```rust
//! use registry_core::common::id::Id;
//!
//! pub struct Mod;
//! pub struct ModVersion;
//!
//! pub type ModId = Id<Mod>;
//! pub type ModVersionId = Id<ModVersion>;
//!
//! let mod_id = ModId::new(7);
//! assert_eq!(mod_id.get(), 7);
//!
//! // This would be a compile error:
//! // let wrong: ModVersionId = mod_id;
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::num::ParseIntError;
use std::str::FromStr;

/// A typed wrapper around a database serial.
///
/// The type parameter `T` is a marker for the entity the id belongs to.
#[repr(transparent)]
pub struct Id<T>(i64, PhantomData<fn() -> T>);

impl<T> Id<T> {
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Self(raw, PhantomData)
    }

    /// Returns the raw serial.
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

// ============================================================================
// Standard trait implementations
// ============================================================================

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = std::any::type_name::<T>();
        let short = type_name.rsplit("::").next().unwrap_or(type_name);
        write!(f, "{}Id({})", short, self.0)
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<T> PartialEq for Id<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialOrd for Id<T> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Id<T> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> Hash for Id<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T> From<i64> for Id<T> {
    #[inline]
    fn from(raw: i64) -> Self {
        Self::new(raw)
    }
}

impl<T> From<Id<T>> for i64 {
    #[inline]
    fn from(id: Id<T>) -> Self {
        id.0
    }
}

impl<T> FromStr for Id<T> {
    type Err = ParseIntError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self::new)
    }
}

// ============================================================================
// Serde support
// ============================================================================

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Self::new)
    }
}

// ============================================================================
// sqlx support
// ============================================================================

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgHasArrayType, PgTypeInfo, PgValueRef, Postgres};
use sqlx::{Decode, Encode, Type};

impl<T> Type<Postgres> for Id<T> {
    fn type_info() -> PgTypeInfo {
        <i64 as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <i64 as Type<Postgres>>::compatible(ty)
    }
}

impl<T> PgHasArrayType for Id<T> {
    fn array_type_info() -> PgTypeInfo {
        <i64 as PgHasArrayType>::array_type_info()
    }
}

impl<T> Encode<'_, Postgres> for Id<T> {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        <i64 as Encode<Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<T> Decode<'_, Postgres> for Id<T> {
    fn decode(value: PgValueRef<'_>) -> Result<Self, BoxDynError> {
        <i64 as Decode<Postgres>>::decode(value).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    type WidgetId = Id<Widget>;

    #[test]
    fn test_parse_and_display_roundtrip() {
        let id = WidgetId::new(42);
        let parsed: WidgetId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&WidgetId::new(999)).unwrap();
        assert_eq!(json, "999");

        let ids: Vec<WidgetId> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(ids, vec![WidgetId::new(1), WidgetId::new(2), WidgetId::new(3)]);
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!("abc".parse::<WidgetId>().is_err());
        assert!(serde_json::from_str::<WidgetId>("\"7\"").is_err());
    }

    #[test]
    fn test_debug_includes_type_name() {
        let debug = format!("{:?}", WidgetId::new(3));
        assert_eq!(debug, "WidgetId(3)");
    }
}
