pub mod policy_validator;
pub mod time;
