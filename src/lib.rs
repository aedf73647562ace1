// src/lib.rs

//! ShowCal: merges concert listings from local venue sites into one
//! change-gated live feed plus an archive of past shows.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
