pub mod controller;
pub mod services;
pub mod time;
pub mod utils;
