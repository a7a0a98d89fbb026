#![forbid(unsafe_code)]

pub mod record;
pub mod repository;
pub mod sqlite;
