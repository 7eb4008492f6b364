//! Handler modules for til-api.
//!
//! `acronyms`, `users`, and `categories` serve the JSON API; `web` serves
//! the server-rendered website including Google login.

pub mod acronyms;
pub mod categories;
pub mod users;
pub mod web;
