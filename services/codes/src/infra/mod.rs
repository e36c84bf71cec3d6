pub mod clock;
pub mod revocation;
pub mod role_gateway;
