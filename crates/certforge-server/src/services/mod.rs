pub mod batch;
pub mod issuance;
pub mod vault;
