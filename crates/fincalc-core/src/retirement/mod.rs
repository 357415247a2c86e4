pub mod limits;
pub mod projection;
pub mod roth;
