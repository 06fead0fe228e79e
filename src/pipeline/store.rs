use crate::model::leave::LeaveRecord;
use chrono::NaiveDate;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::BTreeSet;

/// A validated leave entry ready to be persisted.
pub struct NewLeaveRecord<'a> {
    pub nome_servidor: &'a str,
    pub matricula: &'a str,
    pub codigo_lotacao: &'a str,
    pub inicio_das_ferias: NaiveDate,
    pub fim_das_ferias: NaiveDate,
    pub quantidade_dias_ferias: i64,
}

pub async fn active_unit_codes(pool: &SqlitePool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT codigo FROM lotacoes WHERE ativa = 1 ORDER BY codigo")
        .fetch_all(pool)
        .await
}

pub async fn delete_for_period(
    tx: &mut Transaction<'_, Sqlite>,
    competencia: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM servidores_ferias WHERE competencia = ?")
        .bind(competencia)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

pub async fn upsert_record(
    tx: &mut Transaction<'_, Sqlite>,
    competencia: &str,
    record: &NewLeaveRecord<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO servidores_ferias
            (nome_servidor, matricula, codigo_lotacao, inicio_das_ferias,
             fim_das_ferias, quantidade_dias_ferias, competencia)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (matricula, competencia) DO UPDATE SET
            nome_servidor = excluded.nome_servidor,
            codigo_lotacao = excluded.codigo_lotacao,
            inicio_das_ferias = excluded.inicio_das_ferias,
            fim_das_ferias = excluded.fim_das_ferias,
            quantidade_dias_ferias = excluded.quantidade_dias_ferias
        "#,
    )
    .bind(record.nome_servidor)
    .bind(record.matricula)
    .bind(record.codigo_lotacao)
    .bind(record.inicio_das_ferias)
    .bind(record.fim_das_ferias)
    .bind(record.quantidade_dias_ferias)
    .bind(competencia)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub async fn records_for_units(
    pool: &SqlitePool,
    competencia: &str,
    codigos: &BTreeSet<String>,
) -> Result<Vec<LeaveRecord>, sqlx::Error> {
    if codigos.is_empty() {
        return Ok(Vec::new());
    }

    // One placeholder per codigo, bound in a loop
    let placeholders = vec!["?"; codigos.len()].join(", ");
    let sql = format!(
        r#"
        SELECT id, nome_servidor, matricula, codigo_lotacao, inicio_das_ferias,
               fim_das_ferias, quantidade_dias_ferias, competencia
        FROM servidores_ferias
        WHERE competencia = ? AND codigo_lotacao IN ({placeholders})
        ORDER BY codigo_lotacao, nome_servidor
        "#
    );

    let mut query = sqlx::query_as::<_, LeaveRecord>(&sql).bind(competencia);
    for codigo in codigos {
        query = query.bind(codigo);
    }

    query.fetch_all(pool).await
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // Single connection so the in-memory database is shared by every query
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    crate::db::ensure_schema(&pool).await.unwrap();
    pool
}
