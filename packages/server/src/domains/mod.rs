// Business domains
pub mod carts;
pub mod customers;
pub mod feeds;
pub mod marketing;
pub mod notifications;
pub mod orders;
