use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "nome_servidor": "Maria da Silva",
        "matricula": "12345",
        "codigo_lotacao": "10087",
        "inicio_das_ferias": "2025-08-01",
        "fim_das_ferias": "2025-08-15",
        "quantidade_dias_ferias": 15,
        "competencia": "2025-08"
    })
)]
pub struct LeaveRecord {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Maria da Silva")]
    pub nome_servidor: String,

    #[schema(example = "12345")]
    pub matricula: String,

    #[schema(example = "10087")]
    pub codigo_lotacao: String,

    #[schema(example = "2025-08-01", value_type = String, format = "date")]
    pub inicio_das_ferias: NaiveDate,

    #[schema(example = "2025-08-15", value_type = String, format = "date")]
    pub fim_das_ferias: NaiveDate,

    #[schema(example = 15)]
    pub quantidade_dias_ferias: i64,

    #[schema(example = "2025-08")]
    pub competencia: String,
}
