//! Processing related to visual information.
//!
pub mod brightness;
