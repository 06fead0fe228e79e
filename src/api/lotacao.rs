use crate::model::unit::Lotacao;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLotacao {
    #[schema(example = "10087")]
    pub codigo: String,
    #[schema(example = "Diretoria de Tecnologia")]
    pub nome: Option<String>,
    /// Defaults to true when omitted
    #[schema(example = true)]
    pub ativa: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLotacao {
    pub nome: Option<String>,
    pub ativa: Option<bool>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LotacaoFilter {
    /// Filter by active flag
    pub ativa: Option<bool>,
}

/* =========================
List lotações
========================= */
#[utoipa::path(
    get,
    path = "/api/lotacoes",
    params(LotacaoFilter),
    responses(
        (status = 200, description = "Registered lotações", body = [Lotacao])
    ),
    tag = "Lotações"
)]
pub async fn list_lotacoes(
    pool: web::Data<SqlitePool>,
    query: web::Query<LotacaoFilter>,
) -> actix_web::Result<impl Responder> {
    let lotacoes = match query.ativa {
        Some(ativa) => {
            sqlx::query_as::<_, Lotacao>(
                "SELECT id, codigo, nome, ativa FROM lotacoes WHERE ativa = ? ORDER BY codigo",
            )
            .bind(ativa)
            .fetch_all(pool.get_ref())
            .await
        }
        None => {
            sqlx::query_as::<_, Lotacao>(
                "SELECT id, codigo, nome, ativa FROM lotacoes ORDER BY codigo",
            )
            .fetch_all(pool.get_ref())
            .await
        }
    }
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to list lotações");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(lotacoes))
}

/* =========================
Register lotação for the férias notice
========================= */
#[utoipa::path(
    post,
    path = "/api/lotacoes",
    request_body = CreateLotacao,
    responses(
        (status = 200, description = "Lotação registered", body = Object, example = json!({
            "message": "Lotação registered"
        })),
        (status = 400, description = "Codigo already registered", body = Object, example = json!({
            "message": "Lotação already registered"
        }))
    ),
    tag = "Lotações"
)]
pub async fn create_lotacao(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateLotacao>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query("INSERT INTO lotacoes (codigo, nome, ativa) VALUES (?, ?, ?)")
        .bind(&payload.codigo)
        .bind(&payload.nome)
        .bind(payload.ativa.unwrap_or(true))
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Lotação registered"
        }))),

        Err(e) => {
            // UNIQUE constraint on codigo
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("2067") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Lotação already registered"
                    })));
                }
            }

            tracing::error!(error = %e, codigo = %payload.codigo, "Failed to create lotação");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/* =========================
Update lotação (nome / ativa)
========================= */
#[utoipa::path(
    put,
    path = "/api/lotacoes/{codigo}",
    params(
        ("codigo" = String, Path, description = "Codigo of the lotação to update")
    ),
    request_body = UpdateLotacao,
    responses(
        (status = 200, description = "Lotação updated", body = Object, example = json!({
            "message": "Lotação updated"
        })),
        (status = 404, description = "Lotação not found")
    ),
    tag = "Lotações"
)]
pub async fn update_lotacao(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<UpdateLotacao>,
) -> actix_web::Result<impl Responder> {
    let codigo = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE lotacoes
        SET nome = COALESCE(?, nome),
            ativa = COALESCE(?, ativa)
        WHERE codigo = ?
        "#,
    )
    .bind(&payload.nome)
    .bind(payload.ativa)
    .bind(&codigo)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, %codigo, "Failed to update lotação");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Lotação not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Lotação updated"
    })))
}

/* =========================
Remove lotação from the notice list
========================= */
#[utoipa::path(
    delete,
    path = "/api/lotacoes/{codigo}",
    params(
        ("codigo" = String, Path, description = "Codigo of the lotação to delete")
    ),
    responses(
        (status = 200, description = "Lotação removed", body = Object, example = json!({
            "message": "Lotação removed"
        })),
        (status = 404, description = "Lotação not found")
    ),
    tag = "Lotações"
)]
pub async fn delete_lotacao(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let codigo = path.into_inner();

    let result = sqlx::query("DELETE FROM lotacoes WHERE codigo = ?")
        .bind(&codigo)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %codigo, "Failed to delete lotação");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Lotação not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Lotação removed"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::store::test_pool;
    use actix_web::{App, test};

    macro_rules! test_app {
        () => {{
            let pool = test_pool().await;

            test::init_service(
                App::new().app_data(web::Data::new(pool)).service(
                    web::scope("/api/lotacoes")
                        .service(
                            web::resource("")
                                .route(web::get().to(list_lotacoes))
                                .route(web::post().to(create_lotacao)),
                        )
                        .service(
                            web::resource("/{codigo}")
                                .route(web::put().to(update_lotacao))
                                .route(web::delete().to(delete_lotacao)),
                        ),
                ),
            )
            .await
        }};
    }

    #[actix_web::test]
    async fn create_then_list() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/lotacoes")
            .set_json(serde_json::json!({ "codigo": "10087", "nome": "TI" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get().uri("/api/lotacoes").to_request();
        let body: serde_json::Value =
            test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["codigo"], "10087");
        assert_eq!(body[0]["ativa"], true);
    }

    #[actix_web::test]
    async fn duplicate_codigo_is_rejected() {
        let app = test_app!();

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/lotacoes")
                .set_json(serde_json::json!({ "codigo": "10087" }))
                .to_request();
            let resp = test::call_service(&app, req).await;

            if resp.status() != 200 {
                assert_eq!(resp.status(), 400);
                return;
            }
        }

        panic!("second insert with the same codigo was accepted");
    }

    #[actix_web::test]
    async fn list_filters_by_ativa() {
        let app = test_app!();

        for (codigo, ativa) in [("10087", true), ("10091", false)] {
            let req = test::TestRequest::post()
                .uri("/api/lotacoes")
                .set_json(serde_json::json!({ "codigo": codigo, "ativa": ativa }))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/lotacoes?ativa=true")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["codigo"], "10087");
    }

    #[actix_web::test]
    async fn update_toggles_ativa() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/lotacoes")
            .set_json(serde_json::json!({ "codigo": "10087" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/lotacoes/10087")
            .set_json(serde_json::json!({ "ativa": false }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get().uri("/api/lotacoes").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[0]["ativa"], false);
    }

    #[actix_web::test]
    async fn update_and_delete_missing_codigo_return_404() {
        let app = test_app!();

        let req = test::TestRequest::put()
            .uri("/api/lotacoes/99999")
            .set_json(serde_json::json!({ "ativa": false }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        let req = test::TestRequest::delete()
            .uri("/api/lotacoes/99999")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn delete_removes_the_row() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/lotacoes")
            .set_json(serde_json::json!({ "codigo": "10087" }))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::delete()
            .uri("/api/lotacoes/10087")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get().uri("/api/lotacoes").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body.as_array().unwrap().is_empty());
    }
}
