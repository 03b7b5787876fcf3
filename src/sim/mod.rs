pub mod deck;
pub mod effects;
pub mod engine;
pub mod event;
pub mod peer;
pub mod route;
pub mod session;
pub mod wall;
