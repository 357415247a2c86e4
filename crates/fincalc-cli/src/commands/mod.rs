pub mod dti;
pub mod mortgage;
pub mod retirement;
