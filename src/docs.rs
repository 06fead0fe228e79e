use crate::api::lotacao::{CreateLotacao, LotacaoFilter, UpdateLotacao};
use crate::api::notify::TriggerRequest;
use crate::model::leave::LeaveRecord;
use crate::model::unit::Lotacao;
use crate::pipeline::RunSummary;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aviso de Férias API",
        version = "1.0.0",
        description = r#"
## Aviso de Férias

Notifies the chefe of each lotação about servidores on leave for a given
competência (YYYY-MM).

### 🔹 How it works
- **Trigger**
  - A Kubernetes cronjob POSTs the competência to `/api/aviso-ferias`
- **Pipeline**
  - Leave and chefia data come from the SARH webservice
  - Leave records are reconciled locally, one row per (matrícula, competência)
  - One HTML e-mail is sent per lotação with servidores on leave
- **Lotações**
  - Which lotações receive the notice is managed through `/api/lotacoes`

### 📦 Response Format
- JSON-based responses with a `status`/`message` envelope on the trigger

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::notify::aviso_ferias,

        crate::api::lotacao::list_lotacoes,
        crate::api::lotacao::create_lotacao,
        crate::api::lotacao::update_lotacao,
        crate::api::lotacao::delete_lotacao,
    ),
    components(schemas(
        TriggerRequest,
        RunSummary,
        LeaveRecord,
        Lotacao,
        CreateLotacao,
        UpdateLotacao,
        LotacaoFilter,
    )),
    tags(
        (name = "Aviso de Férias", description = "Pipeline trigger"),
        (name = "Lotações", description = "Lotações registered for the notice")
    )
)]
pub struct ApiDoc;
