#![allow(dead_code)]

pub mod app;
pub mod live;
pub mod party;
