//! Users: list, show, register, change password, delete.

pub mod controller;
pub mod service;
