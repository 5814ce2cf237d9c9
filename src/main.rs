use anyhow::Result;
use dotenvy::dotenv;
use serde_json::json;
use std::time::Instant;
use tracing::{error, info};

use user_database_manager::{
    users_table, Database, DatabaseConfig, DbResult, EnvironmentConfig, User,
};

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Instant::now();

    // Cargar variables de entorno
    dotenv().ok();
    let env_config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(env_config.log_level)
        .init();

    info!("🗄️ User Database Manager ({})", env_config.environment);
    info!("================================================");

    let db_config = DatabaseConfig::from_env()?;

    let users = match Database::scoped(db_config, |db| Box::pin(run_demo(db))).await {
        Ok(users) => users,
        Err(e) => {
            error!("❌ Error en la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    for user in &users {
        let report = json!({
            "id_user": user.id_user,
            "class": user.class_,
            "age": user.age,
            "nationality": user.nationality,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!("⏱️ Ejecutado en {:.3} segundos", start_time.elapsed().as_secs_f64());
    Ok(())
}

async fn run_demo(db: &mut Database) -> DbResult<Vec<User>> {
    info!("📋 Creando tablas...");
    db.create_tables(&[users_table()]).await?;
    info!("✅ Tablas creadas");

    info!("📥 Llenando la tabla users...");
    let mut users = db.users();
    for (id, class_, age) in [(100, 9, 16), (200, 7, 14)] {
        if !users.user_exists(id).await? {
            users.add_user(id, class_, age).await?;
        }
    }
    users.update_user_nationality(100, "USA").await?;
    users.update_user_nationality(200, "UK").await?;
    users.update_user_age(100, 17).await?;
    users.update_user_age(200, 15).await?;
    info!("✅ Datos agregados");

    info!("🔍 Leyendo los datos de la tabla");
    let mut result = Vec::new();
    for id in [100, 200] {
        result.push(User {
            id_user: id,
            class_: users.get_user_class(id).await?,
            age: users.get_user_age(id).await?,
            nationality: users.get_user_nationality(id).await?,
        });
    }
    Ok(result)
}
