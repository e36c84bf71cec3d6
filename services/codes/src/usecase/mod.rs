pub mod claim;
pub mod issue;
