//! Core systems for Trellis.
//!
//! This crate provides the foundation the grid engine is built on, with no
//! knowledge of grids themselves:
//!
//! - [`Signal`] — type-safe signal/slot change notification
//! - [`TaskScheduler`] / [`SharedTaskScheduler`] — timed-task scheduling with
//!   self-terminating repeating tasks
//! - [`AnimationChannel`] — per-slot interpolation scheduling for short UI
//!   transitions
//! - [`geometry`] — `Point`/`Size`/`Rect`/`Color` value types
//!
//! Nothing here owns a thread or an event loop; hosts drive the scheduler
//! from their own loop and receive change notifications synchronously.

pub mod animation;
pub mod error;
pub mod geometry;
pub mod scheduler;
pub mod signal;

pub use animation::AnimationChannel;
pub use error::{Result, SchedulerError};
pub use geometry::{Color, Point, Rect, Size};
pub use scheduler::{SharedTaskScheduler, TaskControl, TaskId, TaskScheduler};
pub use signal::{ConnectionId, Signal};
