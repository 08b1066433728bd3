pub mod health;
pub mod state;
