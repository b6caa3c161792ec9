//! This module contains all the sub-modules of the project.

pub mod define; // Definition module: Contains definitions and constants used throughout the project.
pub mod device; // Device module: Camera control surface and its backends.
pub mod drive; // Drive module: The capture loop.
pub mod error; // Error module: Crate-wide error type.
pub mod pilot; // Pilot module: Day/night mode selection and exposure control.
pub mod record; // Record module: Append-only CSV capture log.
pub mod util; // Utility module: Provides various utility functions and helpers.
pub mod vision; // Vision module: Brightness estimation.
