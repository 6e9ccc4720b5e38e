//! Skein Motion System
//!
//! Spring physics, rubber-band resistance, and settle scheduling.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs with stiffness, damping, mass
//! - **Rubber Band**: parabolic resistance curve for boundary overscroll
//! - **Settles**: cancellable spring-to-rest tasks with residual-velocity
//!   reporting
//! - **Interruptible**: springs inherit velocity when retargeted; settles
//!   cancelled mid-flight leave their offset at the last computed value

pub mod rubber_band;
pub mod scheduler;
pub mod settle;
pub mod spring;

pub use rubber_band::{MotionError, RubberBand};
pub use scheduler::{MotionScheduler, SettleId};
pub use settle::Settle;
pub use spring::{Spring, SpringConfig};
