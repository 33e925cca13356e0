//! Identifiers and timestamps shared by the domain models.
//!
//! Catalog and order identifiers are 12-byte object ids, rendered as
//! 24 hexadecimal characters on the wire. User identifiers are opaque
//! strings handed over by the identity collaborator.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use super::DomainError;

/// Length of the hexadecimal rendering of an object id.
pub const OBJECT_ID_HEX_LENGTH: usize = 24;

/// Parses a 24-character hexadecimal string into an [`ObjectId`].
///
/// Upper- and lower-case digits are both accepted.
///
/// # Errors
///
/// Returns `DomainError::InvalidIdentifier` if the input is not exactly
/// 24 hexadecimal characters.
pub fn parse_object_id(kind: &'static str, value: &str) -> Result<ObjectId, DomainError> {
    let well_formed = value.len() == OBJECT_ID_HEX_LENGTH
        && value.chars().all(|character| character.is_ascii_hexdigit());

    if !well_formed {
        return Err(DomainError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        });
    }

    ObjectId::parse_str(value).map_err(|_| DomainError::InvalidIdentifier {
        kind,
        value: value.to_string(),
    })
}

// =============================================================================
// ProductId
// =============================================================================

/// Unique identifier for a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(ObjectId);

impl ProductId {
    /// Wraps an existing object id.
    #[must_use]
    pub const fn from_object_id(object_id: ObjectId) -> Self {
        Self(object_id)
    }

    /// Returns the inner object id.
    #[must_use]
    pub const fn as_object_id(&self) -> &ObjectId {
        &self.0
    }

    /// Generates a fresh identifier.
    ///
    /// **Note**: This is an impure function (clock + process counter).
    #[must_use]
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parses a product identifier from its hexadecimal form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidIdentifier` for malformed input.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        parse_object_id("product", value).map(Self)
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.to_hex())
    }
}

// =============================================================================
// OrderId
// =============================================================================

/// Unique identifier for a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(ObjectId);

impl OrderId {
    /// Wraps an existing object id.
    #[must_use]
    pub const fn from_object_id(object_id: ObjectId) -> Self {
        Self(object_id)
    }

    /// Returns the inner object id.
    #[must_use]
    pub const fn as_object_id(&self) -> &ObjectId {
        &self.0
    }

    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(ObjectId::new())
    }

    /// Parses an order identifier from its hexadecimal form.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidIdentifier` for malformed input.
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        parse_object_id("order", value).map(Self)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.to_hex())
    }
}

// =============================================================================
// UserId
// =============================================================================

/// Identity of a caller, as established by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from any string-like value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

// =============================================================================
// Timestamp
// =============================================================================

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time.
    ///
    /// **Note**: This is an impure function (side effect: system clock).
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn timestamp_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Rebuilds a timestamp from milliseconds since the Unix epoch.
    ///
    /// Returns `None` when the value is out of range.
    #[must_use]
    pub fn from_timestamp_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// RFC 3339 rendering with millisecond precision, as used on the wire.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("64b7f0c2a1b2c3d4e5f60718")]
    #[case("64B7F0C2A1B2C3D4E5F60718")]
    #[case("000000000000000000000000")]
    fn parse_accepts_24_hex_characters(#[case] input: &str) {
        let product_id = ProductId::parse(input).unwrap();
        assert_eq!(product_id.to_string(), input.to_lowercase());
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("64b7f0c2a1b2c3d4e5f6071")]
    #[case("64b7f0c2a1b2c3d4e5f607189")]
    #[case("64b7f0c2a1b2c3d4e5f6071z")]
    #[case(" 4b7f0c2a1b2c3d4e5f60718")]
    fn parse_rejects_malformed_identifiers(#[case] input: &str) {
        let result = ProductId::parse(input);
        assert!(matches!(
            result,
            Err(DomainError::InvalidIdentifier { kind: "product", .. })
        ));
    }

    #[rstest]
    fn order_id_round_trips_through_display() {
        let order_id = OrderId::generate();
        let parsed = OrderId::parse(&order_id.to_string()).unwrap();
        assert_eq!(parsed, order_id);
    }

    #[rstest]
    fn generated_ids_are_distinct() {
        assert_ne!(ProductId::generate(), ProductId::generate());
    }

    #[rstest]
    fn timestamp_millis_round_trip() {
        let timestamp = Timestamp::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(timestamp.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(timestamp.to_rfc3339(), "2023-11-14T22:13:20.123Z");
    }
}
