//! Repositorios
//!
//! Acceso tipado a las tablas conocidas.

pub mod user_repository;

pub use user_repository::UserRepository;
