//! Pricing domain
pub mod value_objects;
pub mod fee_schedule;
pub mod exchange;
pub mod pricing;
pub mod installments;
