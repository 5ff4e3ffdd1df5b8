pub mod complaint;
pub mod connection;
pub mod notification;
pub mod otp;
pub mod payment;
pub mod user;
