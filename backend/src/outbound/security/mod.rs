//! Security adapters: password hashing.

mod argon2_hasher;

pub use argon2_hasher::Argon2PasswordHasher;
