pub mod account;
pub mod course;
pub mod order;
pub mod purchase;

pub use account::*;
pub use course::*;
pub use order::*;
pub use purchase::*;

use chrono::{DateTime, Utc};
use mongodb::bson::DateTime as BsonDateTime;

/// Converts a stored BSON timestamp for API responses.
pub fn to_utc(value: BsonDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// "19 Oct 2026"
pub fn format_date(value: BsonDateTime) -> String {
    to_utc(value).format("%d %b %Y").to_string()
}

/// "04:05 PM"
pub fn format_time(value: BsonDateTime) -> String {
    to_utc(value).format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_stored_timestamps() {
        // 2024-03-09T16:05:00Z
        let stamp = BsonDateTime::from_millis(1_710_000_300_000);

        assert_eq!(format_date(stamp), "09 Mar 2024");
        assert_eq!(format_time(stamp), "04:05 PM");
        assert_eq!(to_utc(stamp).timestamp(), 1_710_000_300);
    }
}
