// use sqlx::MySqlPool;
//
// pub async fn init_db(database_url: &str) -> MySqlPool {
//     MySqlPool::connect(database_url)
//         .await
//         .expect("Failed to connect to database")
// }

use sqlx::SqlitePool;

pub async fn init_db(database_url: &str) -> SqlitePool {
    let pool = SqlitePool::connect(database_url)
        .await
        .expect("Failed to connect to database");

    ensure_schema(&pool)
        .await
        .expect("Failed to create database schema");

    pool
}

/// Creates both tables when missing. The store keeps one leave record per
/// (matricula, competencia), enforced by the UNIQUE constraint.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS servidores_ferias (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            nome_servidor TEXT NOT NULL,
            matricula TEXT NOT NULL,
            codigo_lotacao TEXT NOT NULL,
            inicio_das_ferias DATE NOT NULL,
            fim_das_ferias DATE NOT NULL,
            quantidade_dias_ferias INTEGER NOT NULL,
            competencia TEXT NOT NULL,
            UNIQUE (matricula, competencia)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lotacoes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            codigo TEXT NOT NULL UNIQUE,
            nome TEXT,
            ativa BOOLEAN NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
