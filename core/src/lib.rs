pub mod achievement;
pub mod cascade;
pub mod clock;
pub mod command;
pub mod company;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod event;
pub mod investor;
pub mod marketing;
pub mod milestone;
pub mod name_generator;
pub mod product;
pub mod random_event;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod store;
pub mod subsystem;
pub mod team;
pub mod types;
