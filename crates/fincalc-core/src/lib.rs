pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "retirement")]
pub mod retirement;

#[cfg(feature = "dti")]
pub mod dti;

#[cfg(any(feature = "mortgage", feature = "retirement"))]
pub mod summary;

pub use error::CalcError;
pub use types::*;

/// Standard result type for all fincalc operations
pub type CalcResult<T> = Result<T, CalcError>;
