//! pointsmart — loyalty-points account service
//!
//! Users register, authenticate, upload purchase order numbers for points
//! accrual and withdraw accrued points against future orders. Point amounts
//! are integer minor units (1/100 of a point) everywhere inside the service
//! and decimal major units at the HTTP boundary.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod luhn;
pub mod model;
pub mod money;
pub mod service;
pub mod state;
pub mod store;
