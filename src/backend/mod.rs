//! Reference driver backends: an in-memory storage driver and a
//! login/password authentication driver.

mod mem;
mod password;

pub use mem::MemStorage;
pub use password::PasswordDriver;
