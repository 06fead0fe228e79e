use crate::config::Config;
use crate::error::RunError;
use crate::mailer::SmtpMailer;
use crate::pipeline::NotifyPipeline;
use crate::sarh::SarhClient;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct TriggerRequest {
    /// Mês/ano da competência para consulta (formato YYYY-MM)
    #[schema(example = "2025-08")]
    pub competencia: Option<String>,
}

/* =========================
Trigger endpoint, called by the Kubernetes cronjob
========================= */
#[utoipa::path(
    post,
    path = "/api/aviso-ferias",
    request_body(
        content = TriggerRequest,
        description = "Competência a processar",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Rotina executada com sucesso",
         body = Object,
         example = json!({
            "status": "success",
            "message": "Rotina de aviso de férias executada com sucesso.",
            "summary": {
                "competencia": "2025-08",
                "imported": 3,
                "skipped_entries": 0,
                "notified": 2,
                "failed_sends": 0,
                "skipped_units": 0
            }
         })
        ),
        (status = 400, description = "Corpo inválido ou competência malformada", body = Object, example = json!({
            "status": "error",
            "message": "Parâmetro \"competencia\" é obrigatório."
        })),
        (status = 405, description = "Método não permitido"),
        (status = 500, description = "Erro na rotina de férias")
    ),
    tag = "Aviso de Férias"
)]
pub async fn aviso_ferias(
    pool: web::Data<sqlx::SqlitePool>,
    config: web::Data<Config>,
    gateway: web::Data<SarhClient>,
    mailer: web::Data<SmtpMailer>,
    body: web::Bytes,
) -> impl Responder {
    // 1️⃣ the body must be valid JSON
    let payload: TriggerRequest = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "invalid JSON body on aviso-ferias trigger");
            return HttpResponse::BadRequest().json(serde_json::json!({
                "status": "error",
                "message": "Corpo da requisição deve ser um JSON válido."
            }));
        }
    };

    // 2️⃣ competencia is required
    let Some(competencia) = payload.competencia else {
        tracing::error!("aviso-ferias trigger without competencia");
        return HttpResponse::BadRequest().json(serde_json::json!({
            "status": "error",
            "message": "Parâmetro \"competencia\" é obrigatório."
        }));
    };

    // 3️⃣ run the pipeline synchronously, every failure is mapped here
    let pipeline = NotifyPipeline::new(
        pool.get_ref(),
        gateway.get_ref(),
        mailer.get_ref(),
        config.allow_synthetic_fallback,
    );

    match pipeline.run(&competencia).await {
        Ok(summary) => HttpResponse::Ok().json(serde_json::json!({
            "status": "success",
            "message": "Rotina de aviso de férias executada com sucesso.",
            "summary": summary,
        })),
        Err(e @ RunError::InvalidPeriod(_)) => {
            tracing::error!(error = %e, %competencia, "aviso-ferias run rejected");
            HttpResponse::BadRequest().json(serde_json::json!({
                "status": "error",
                "message": e.to_string(),
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, %competencia, "aviso-ferias run failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "status": "error",
                "message": format!("Erro na rotina de férias: {e}"),
            }))
        }
    }
}

/// JSON 405 for anything other than POST on the trigger resource
pub async fn method_not_allowed() -> impl Responder {
    HttpResponse::MethodNotAllowed().json(serde_json::json!({
        "status": "error",
        "message": "Método não permitido."
    }))
}
