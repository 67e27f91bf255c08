pub mod arena;
pub mod diner;
pub mod engine;
pub mod observer;
pub mod protocol;
