pub mod angle;
pub mod clock;
pub mod config;
pub mod convert;
pub mod date;
pub mod index;
pub mod leapsecs;
pub mod nist;

pub use crate::angle::*;
pub use crate::clock::{current_tai, current_tai_from_utc, TaiClock};
pub use crate::convert::*;
pub use crate::index::IndexGenerator;
pub use crate::leapsecs::*;
