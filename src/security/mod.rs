pub mod credential_store;
pub mod input_validation;

pub use credential_store::CredentialStore;
pub use input_validation::InputValidator;
