//! Type definitions for the risk scoring service

pub mod request;
pub mod result;

pub use request::RiskRequest;
pub use result::{RiskResult, RiskStatus};
