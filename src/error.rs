pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Parsing errors
    #[error("{0}")]
    ParsingError(String),
    // Identity resolution invoked without any criteria
    #[error("at least one contact identifier is required")]
    MissingIdentifiers,
    // Storage-layer constraint violations on write
    #[error("{0}")]
    ConstraintViolation(String),
    // Unique-key conflicts on create
    #[error("{0}")]
    Conflict(String),
    // Database errors
    #[error(transparent)]
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_string())
            }
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // SQLSTATE class 22 is data exceptions, class 23 integrity
                // constraint violations
                Some(code) if code.starts_with("22") || code.starts_with("23") => {
                    Self::ConstraintViolation(db.message().to_string())
                }
                _ => Self::DatabaseError(sqlx::Error::Database(db)),
            },
            other => Self::DatabaseError(other),
        }
    }
}
