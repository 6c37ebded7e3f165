pub mod billing_status;
pub mod health;
