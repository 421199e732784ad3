use std::borrow::Cow;

/// A specialized [`CourseError`] enum of this crate.
#[lyceum_derive::lyceum_error]
pub enum CourseError {
    /// The course file asks not to be shown in the web application.
    #[error("Course is not displayable{}: {message}", format_context(.context))]
    NotDisplayable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Required settings are missing or malformed.
    #[error("Invalid course description{}: {message}", format_context(.context))]
    InvalidDescription { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The registration access-control method is not a known one.
    #[error("Invalid access-control value{}: {message}", format_context(.context))]
    InvalidAccessControl { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An accessibility or registration window could not be parsed.
    #[error("Invalid time window{}: {message}", format_context(.context))]
    InvalidWindow { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Opening the database failed.
    #[cfg(feature = "server")]
    #[error("Database error{}: {source}", format_context(.context))]
    Database { source: lyceum_database::DatabaseError, context: Option<Cow<'static, str>> },

    /// A store query failed.
    #[cfg(feature = "server")]
    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal { source: surrealdb::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal course error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
