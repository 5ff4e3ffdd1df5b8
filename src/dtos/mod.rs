pub mod auth_dtos;
pub mod complaint_dtos;
pub mod connection_dtos;
pub mod payment_dtos;
pub mod profile_dtos;
