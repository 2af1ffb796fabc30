//! # UI Module
//!
//! This module contains all UI components for Galileu's Flute.

pub mod board;
pub mod legend;
pub mod main_display;
