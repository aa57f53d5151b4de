mod client;
mod error;
mod sunrun;

pub use self::{
    error::{ApiError, AuthError},
    sunrun::{Api as Sunrun, Challenge, Session, Verified, models},
};
