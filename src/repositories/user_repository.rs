use sqlx::{FromRow, Postgres, Row};
use tracing::info;
use validator::Validate;

use crate::database::Database;
use crate::models::{Condition, NewUser, SqlValue, User};
use crate::utils::errors::{not_found_error, DbResult};

const USERS_TABLE: &str = "users";
const ID_FIELD: &str = "id_user";

/// Helpers de la tabla users sobre una sesión
pub struct UserRepository<'a> {
    db: &'a mut Database,
}

impl Database {
    pub fn users(&mut self) -> UserRepository<'_> {
        UserRepository::new(self)
    }
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        Self { db }
    }

    fn by_id(user_id: i64) -> [Condition; 1] {
        [Condition::eq(ID_FIELD, user_id)]
    }

    pub async fn user_exists(&mut self, user_id: i64) -> DbResult<bool> {
        let rows = self
            .db
            .get_table_data(USERS_TABLE, Some(&[ID_FIELD][..]), &Self::by_id(user_id))
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn add_user(&mut self, user_id: i64, class_: i16, age: i16) -> DbResult<()> {
        self.db
            .fill_table(
                USERS_TABLE,
                &[ID_FIELD, "class_", "age"],
                &[vec![
                    SqlValue::BigInt(user_id),
                    SqlValue::SmallInt(class_),
                    SqlValue::SmallInt(age),
                ]],
            )
            .await?;

        info!("👤 Usuario {} agregado (clase {}, edad {})", user_id, class_, age);
        Ok(())
    }

    /// Igual que `add_user` pero validando el request primero
    pub async fn add_new_user(&mut self, user: &NewUser) -> DbResult<()> {
        user.validate()?;
        self.add_user(user.id_user, user.class_, user.age).await
    }

    pub async fn get_user(&mut self, user_id: i64) -> DbResult<Option<User>> {
        let rows = self
            .db
            .get_table_data::<&str>(USERS_TABLE, None, &Self::by_id(user_id))
            .await?;

        match rows.first() {
            Some(row) => Ok(Some(User::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Todas las columnas salvo `id_user` admiten NULL, por eso los getters
    /// devuelven `Option`. Sin fila el resultado es `NotFound`.
    pub async fn get_user_class(&mut self, user_id: i64) -> DbResult<Option<i16>> {
        self.single_column("class_", user_id).await
    }

    pub async fn get_user_age(&mut self, user_id: i64) -> DbResult<Option<i16>> {
        self.single_column("age", user_id).await
    }

    pub async fn get_user_nationality(&mut self, user_id: i64) -> DbResult<Option<String>> {
        self.single_column("nationality", user_id).await
    }

    pub async fn update_user_nationality(
        &mut self,
        user_id: i64,
        new_nationality: &str,
    ) -> DbResult<u64> {
        self.db
            .update_value(USERS_TABLE, "nationality", new_nationality, &Self::by_id(user_id))
            .await
    }

    pub async fn update_user_age(&mut self, user_id: i64, new_age: i16) -> DbResult<u64> {
        self.db
            .update_value(USERS_TABLE, "age", new_age, &Self::by_id(user_id))
            .await
    }

    pub async fn delete_user(&mut self, user_id: i64) -> DbResult<u64> {
        self.db.delete_value(USERS_TABLE, ID_FIELD, user_id).await
    }

    // Primer valor de la primera fila; sin fila es NotFound, nunca un default
    async fn single_column<T>(&mut self, column: &str, user_id: i64) -> DbResult<T>
    where
        T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    {
        let rows = self
            .db
            .get_table_data(USERS_TABLE, Some(&[column][..]), &Self::by_id(user_id))
            .await?;

        let row = rows
            .first()
            .ok_or_else(|| not_found_error(USERS_TABLE, ID_FIELD, &user_id.to_string()))?;
        Ok(row.try_get::<T, _>(0)?)
    }
}
