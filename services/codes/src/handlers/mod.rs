pub mod claim;
pub mod code;
pub mod health;
pub mod role;
