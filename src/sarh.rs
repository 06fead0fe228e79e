use crate::error::GatewayError;
use crate::model::competencia::Competencia;
use crate::model::manager::ManagerInfo;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

/// One leave entry as the SARH webservice returns it. Dates stay raw strings
/// here, reconciliation validates them before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveEntry {
    pub nome_servidor: String,
    pub matricula: String,
    pub codigo_lotacao: String,
    pub inicio_das_ferias: String,
    pub fim_das_ferias: String,
    pub quantidade_dias_ferias: i64,
}

/// The two SARH queries the pipeline needs. Split behind a trait so the
/// pipeline can run against a fake in tests.
pub trait HrGateway {
    async fn fetch_leave(
        &self,
        ano: i32,
        mes: u32,
        codigos: &[String],
    ) -> Result<Vec<LeaveEntry>, GatewayError>;

    async fn fetch_managers(&self, codigos: &[String]) -> Result<Vec<ManagerInfo>, GatewayError>;
}

#[derive(Clone)]
pub struct SarhClient {
    client: Client,
    base_url: String,
}

impl SarhClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, GatewayError> {
        debug!(url, "querying SARH");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Payload(e.to_string()))
    }
}

// The endpoint accepts multiple 'codigos=' parameters, e.g.
// /json/buscarFeriasFuncionarios/2025/8?codigos=10087&codigos=10091
fn codigos_query(codigos: &[String]) -> String {
    codigos
        .iter()
        .map(|c| format!("codigos={c}"))
        .collect::<Vec<_>>()
        .join("&")
}

impl HrGateway for SarhClient {
    async fn fetch_leave(
        &self,
        ano: i32,
        mes: u32,
        codigos: &[String],
    ) -> Result<Vec<LeaveEntry>, GatewayError> {
        let url = format!(
            "{}/json/buscarFeriasFuncionarios/{}/{}?{}",
            self.base_url,
            ano,
            mes,
            codigos_query(codigos)
        );
        self.get_json(&url).await
    }

    async fn fetch_managers(&self, codigos: &[String]) -> Result<Vec<ManagerInfo>, GatewayError> {
        let url = format!(
            "{}/json/buscarLotacoesComChefia?{}",
            self.base_url,
            codigos_query(codigos)
        );
        self.get_json(&url).await
    }
}

/// Fixed dataset substituted for the leave query when SARH is unreachable
/// and the synthetic fallback is enabled. Windows are derived from the
/// requested competência so the records land in the period being processed.
pub fn synthetic_leave(competencia: &Competencia) -> Vec<LeaveEntry> {
    let day = |d: u32| format!("{competencia}-{d:02}");

    vec![
        LeaveEntry {
            nome_servidor: "Servidor Teste 1".to_string(),
            matricula: "12345".to_string(),
            codigo_lotacao: "10087".to_string(),
            inicio_das_ferias: day(1),
            fim_das_ferias: day(15),
            quantidade_dias_ferias: 15,
        },
        LeaveEntry {
            nome_servidor: "Servidor Teste 2".to_string(),
            matricula: "67890".to_string(),
            codigo_lotacao: "10087".to_string(),
            inicio_das_ferias: day(10),
            fim_das_ferias: day(20),
            quantidade_dias_ferias: 10,
        },
        LeaveEntry {
            nome_servidor: "Servidor Teste 3".to_string(),
            matricula: "11223".to_string(),
            codigo_lotacao: "10091".to_string(),
            inicio_das_ferias: day(5),
            fim_das_ferias: day(25),
            quantidade_dias_ferias: 20,
        },
    ]
}

/// Placeholder chefia substituted for the manager query under the same flag.
pub fn synthetic_managers(codigos: &BTreeSet<String>) -> Vec<ManagerInfo> {
    codigos
        .iter()
        .map(|codigo| ManagerInfo {
            codigo_lotacao: codigo.clone(),
            nome_chefe: format!("Chefe da Lotação {codigo}"),
            email_chefe: Some(format!("chefe.{codigo}@exemplo.com")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[actix_web::test]
    async fn fetch_leave_decodes_entries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json/buscarFeriasFuncionarios/2025/8"))
            .and(query_param("codigos", "10087"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "nome_servidor": "Maria da Silva",
                    "matricula": "12345",
                    "codigo_lotacao": "10087",
                    "inicio_das_ferias": "2025-08-01",
                    "fim_das_ferias": "2025-08-15",
                    "quantidade_dias_ferias": 15
                }
            ])))
            .mount(&server)
            .await;

        let client = SarhClient::new(server.uri());
        let entries = client
            .fetch_leave(2025, 8, &["10087".to_string()])
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].matricula, "12345");
        assert_eq!(entries[0].quantidade_dias_ferias, 15);
    }

    #[actix_web::test]
    async fn fetch_managers_decodes_missing_optional_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json/buscarLotacoesComChefia"))
            .and(query_param("codigos", "10087"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "codigo_lotacao": "10087" }
            ])))
            .mount(&server)
            .await;

        let client = SarhClient::new(server.uri());
        let managers = client.fetch_managers(&["10087".to_string()]).await.unwrap();

        assert_eq!(managers.len(), 1);
        assert_eq!(managers[0].nome_chefe, "Chefe da Lotação");
        assert!(managers[0].email_chefe.is_none());
    }

    #[actix_web::test]
    async fn non_success_status_is_a_gateway_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = SarhClient::new(server.uri());
        let err = client
            .fetch_leave(2025, 8, &["10087".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Status(s) if s.as_u16() == 503));
    }

    #[actix_web::test]
    async fn undecodable_payload_is_a_gateway_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = SarhClient::new(server.uri());
        let err = client.fetch_managers(&["10087".to_string()]).await.unwrap_err();

        assert!(matches!(err, GatewayError::Payload(_)));
    }

    #[test]
    fn codigos_query_joins_repeated_params() {
        let q = codigos_query(&["10087".to_string(), "10091".to_string()]);
        assert_eq!(q, "codigos=10087&codigos=10091");
    }

    #[test]
    fn synthetic_leave_follows_requested_period() {
        let competencia: Competencia = "2026-02".parse().unwrap();
        let entries = synthetic_leave(&competencia);

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.inicio_das_ferias.starts_with("2026-02")));
    }
}
