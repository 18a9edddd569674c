pub mod client;
pub mod error;
pub mod executable_utils;
pub mod extract;
pub mod handler;
pub mod model;
pub mod validation;
