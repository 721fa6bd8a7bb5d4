//! # Tasklet Module
//!
//! This module provides ready-made tasklet implementations.
//! Tasklets are single-task operations run by a tasklet step until they report
//! `RepeatStatus::Finished`.

#[cfg(feature = "greeting")]
#[cfg_attr(docsrs, doc(cfg(feature = "greeting")))]
pub mod greeting;
