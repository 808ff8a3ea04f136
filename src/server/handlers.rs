pub mod apdu;
pub mod events;
pub mod health;
pub mod status;
pub mod transcript;
