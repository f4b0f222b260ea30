//! SquadPlan Core - configuration model, XML codec, and work-day arithmetic.
//!
//! This crate has no knowledge of HTTP or sessions. It is used by the
//! server crate to read and write the planning file.
//!
//! # Modules
//!
//! - [`model`]: Squads, projects, and per-category maps
//! - [`codec`]: XML load/save with strict numeric coercion
//! - [`workday`]: Weekend sets and work-day stepping
//! - [`error`]: Error types and Result alias

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod error;
pub mod model;
pub mod workday;

pub use codec::{CategoryPolicy, Loaded};
pub use error::{Error, Result};
pub use model::{CategoryMap, Configuration, Project, Squad};
pub use workday::{WeekendDays, add_work_days, is_work_day};
