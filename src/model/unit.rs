use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lotação registered for the férias notice. Only rows with `ativa` set are
/// considered by the pipeline.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Lotacao {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "10087")]
    pub codigo: String,

    #[schema(example = "Diretoria de Tecnologia", nullable = true)]
    pub nome: Option<String>,

    #[schema(example = true)]
    pub ativa: bool,
}
