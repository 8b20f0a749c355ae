pub mod extract;
pub mod password;
pub mod validation;

pub use extract::{ApiPath, ApiQuery};
pub use password::{hash_password, verify_password, Password, PasswordHashString};
pub use validation::ValidatedJson;
