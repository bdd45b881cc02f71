pub mod health;
pub mod newsletter;
pub mod search;
pub mod status;
