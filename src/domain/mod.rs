pub mod channel;
pub mod payment;
