pub mod health;
pub mod playlist;
pub mod status;
