pub mod bill_service;
pub mod billing_service;
pub mod payment;
