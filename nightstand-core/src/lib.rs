//! Board-agnostic core logic for the Nightstand clock
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (display, time source, storage, sensors, alerts)
//! - Input classification (debounce, hold levels, rotary velocity)
//! - Page navigation and the settings edit protocol
//! - Timekeeping (drift-corrected soft clock, calendar, DST, sunrise/sunset)
//! - Alarm scheduler, timer/stopwatch and signal sequencer
//! - Display frame composition
//! - Configuration and persisted settings
//!
//! [`Clock`] ties everything together; board code calls [`Clock::tick`]
//! from a fixed-period loop.

#![no_std]
#![deny(unsafe_code)]

mod fmt;

pub mod alarm;
pub mod config;
pub mod controller;
pub mod display;
pub mod input;
pub mod settings;
pub mod signal;
pub mod state;
pub mod time;
pub mod timer;
pub mod traits;

pub use controller::{Clock, Peripherals};
