pub mod auth;
pub mod complaints;
pub mod connections;
pub mod notifications;
pub mod payments;
pub mod upload;
pub mod user_profile;
