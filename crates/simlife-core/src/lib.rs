//! Core Simlife types and state machines.
//!
//! This crate provides:
//! - The screen-flow state machine (loading, menu, running, paused)
//! - A frame scheduler for deferred one-shot tasks
//! - Controller button/axis event types
//! - Minimal transform math shared by the VR and desktop paths
//!
//! Everything here is pure: no I/O, no clocks, no engine handles. The
//! application layer owns time and feeds it in each frame.

#![forbid(unsafe_code)]

pub mod flow;
pub mod input;
pub mod math;
pub mod schedule;

pub use flow::{FlowEffect, FlowEvent, Presentation, Screen, ScreenFlow};
pub use input::{AxisSample, Button, ButtonEvent, Edge, Hand};
pub use math::{Quat, Transform, Vec3};
pub use schedule::Scheduler;
