//! Modelo de User
//!
//! Mapea exactamente la tabla `users`: `id_user`, `class_`, `age`, `nationality`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Fila de la tabla users. Solo `id_user` es obligatorio en el esquema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id_user: i64,
    pub class_: Option<i16>,
    pub age: Option<i16>,
    pub nationality: Option<String>,
}

/// Request para crear un nuevo usuario
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewUser {
    pub id_user: i64,

    #[validate(range(min = 0))]
    pub class_: i16,

    #[validate(range(min = 0))]
    pub age: i16,
}

impl NewUser {
    pub const DEFAULT_CLASS: i16 = 9;
    pub const DEFAULT_AGE: i16 = 16;

    /// Usuario con clase y edad por defecto
    pub fn new(id_user: i64) -> Self {
        Self {
            id_user,
            class_: Self::DEFAULT_CLASS,
            age: Self::DEFAULT_AGE,
        }
    }

    pub fn with_class(mut self, class_: i16) -> Self {
        self.class_ = class_;
        self
    }

    pub fn with_age(mut self, age: i16) -> Self {
        self.age = age;
        self
    }
}
