//! Typed resource records and their table-level SQL

pub mod review;
pub mod tour;
pub mod user;

pub use review::Review;
pub use tour::Tour;
pub use user::User;

use uuid::Uuid;

pub(crate) fn parse_uuid(text: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn invalid_column(msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, msg.into())
}
