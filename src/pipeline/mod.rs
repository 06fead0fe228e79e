use crate::error::RunError;
use crate::mailer::{self, Mailer};
use crate::model::competencia::Competencia;
use crate::model::leave::LeaveRecord;
use crate::model::manager::ManagerInfo;
use crate::sarh::{self, HrGateway};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use utoipa::ToSchema;

pub mod store;

// Overlapping runs for the same competência would race on the
// delete-then-insert reconciliation, so runs are serialized per period.
static RUN_LOCKS: Lazy<StdMutex<HashMap<String, Arc<Mutex<()>>>>> =
    Lazy::new(|| StdMutex::new(HashMap::new()));

fn run_lock(competencia: &Competencia) -> Arc<Mutex<()>> {
    let mut locks = RUN_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    locks.entry(competencia.to_string()).or_default().clone()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RunSummary {
    #[schema(example = "2025-08")]
    pub competencia: String,
    /// Leave records imported/updated from SARH
    #[schema(example = 3)]
    pub imported: usize,
    /// Entries dropped because their dates did not parse
    #[schema(example = 0)]
    pub skipped_entries: usize,
    /// Lotações whose chefe received an e-mail
    #[schema(example = 2)]
    pub notified: usize,
    /// Lotações where delivery failed
    #[schema(example = 0)]
    pub failed_sends: usize,
    /// Lotações skipped for missing chefe or e-mail address
    #[schema(example = 0)]
    pub skipped_units: usize,
}

impl RunSummary {
    fn empty(competencia: String) -> Self {
        Self {
            competencia,
            imported: 0,
            skipped_entries: 0,
            notified: 0,
            failed_sends: 0,
            skipped_units: 0,
        }
    }
}

pub struct NotifyPipeline<'a, G, M> {
    pool: &'a SqlitePool,
    gateway: &'a G,
    mailer: &'a M,
    allow_synthetic_fallback: bool,
}

impl<'a, G: HrGateway, M: Mailer> NotifyPipeline<'a, G, M> {
    pub fn new(
        pool: &'a SqlitePool,
        gateway: &'a G,
        mailer: &'a M,
        allow_synthetic_fallback: bool,
    ) -> Self {
        Self {
            pool,
            gateway,
            mailer,
            allow_synthetic_fallback,
        }
    }

    /// Runs the whole routine for one competência: resolve active lotações,
    /// fetch leave from SARH, reconcile the local store, fetch chefia and
    /// send one notice per lotação.
    pub async fn run(&self, competencia: &str) -> Result<RunSummary, RunError> {
        let periodo: Competencia = competencia.parse()?;
        let periodo_str = periodo.to_string();

        let lock = run_lock(&periodo);
        let _guard = lock.lock().await;

        info!(competencia = %periodo_str, "starting férias notification run");

        // 1. Lotações configured for the notice
        let lotacoes_configuradas = store::active_unit_codes(self.pool).await?;
        if lotacoes_configuradas.is_empty() {
            info!("no active lotações configured, nothing to do");
            return Ok(RunSummary::empty(periodo_str));
        }

        // 2. Leave entries from SARH
        let entries = match self
            .gateway
            .fetch_leave(periodo.ano, periodo.mes, &lotacoes_configuradas)
            .await
        {
            Ok(entries) => {
                info!(count = entries.len(), "leave entries received from SARH");
                entries
            }
            Err(e) if self.allow_synthetic_fallback => {
                warn!(error = %e, "SARH leave query failed, using synthetic dataset");
                sarh::synthetic_leave(&periodo)
            }
            Err(e) => return Err(e.into()),
        };

        // 3. Reconcile the local store, full replace for this competência
        let mut imported = 0usize;
        let mut skipped_entries = 0usize;
        let mut lotacoes_com_ferias: BTreeSet<String> = BTreeSet::new();

        let mut tx = self.pool.begin().await?;
        let removed = store::delete_for_period(&mut tx, &periodo_str).await?;
        debug!(removed, "previous records cleared for this competência");

        for entry in &entries {
            let datas = NaiveDate::parse_from_str(&entry.inicio_das_ferias, "%Y-%m-%d").and_then(
                |inicio| {
                    NaiveDate::parse_from_str(&entry.fim_das_ferias, "%Y-%m-%d")
                        .map(|fim| (inicio, fim))
                },
            );

            let (inicio, fim) = match datas {
                Ok(datas) => datas,
                Err(e) => {
                    warn!(
                        matricula = %entry.matricula,
                        error = %e,
                        "skipping entry with invalid dates"
                    );
                    skipped_entries += 1;
                    continue;
                }
            };

            store::upsert_record(
                &mut tx,
                &periodo_str,
                &store::NewLeaveRecord {
                    nome_servidor: &entry.nome_servidor,
                    matricula: &entry.matricula,
                    codigo_lotacao: &entry.codigo_lotacao,
                    inicio_das_ferias: inicio,
                    fim_das_ferias: fim,
                    quantidade_dias_ferias: entry.quantidade_dias_ferias,
                },
            )
            .await?;

            lotacoes_com_ferias.insert(entry.codigo_lotacao.clone());
            imported += 1;
        }
        tx.commit().await?;

        info!(imported, skipped_entries, "leave records reconciled");

        // 4. Nothing on leave for the configured lotações this month
        if lotacoes_com_ferias.is_empty() {
            info!("no servidor on leave for the configured lotações, nothing to notify");
            return Ok(RunSummary {
                imported,
                skipped_entries,
                ..RunSummary::empty(periodo_str)
            });
        }

        // 5. Chefia for the lotações that actually have leave
        let codigos: Vec<String> = lotacoes_com_ferias.iter().cloned().collect();
        let chefes = match self.gateway.fetch_managers(&codigos).await {
            Ok(chefes) => {
                info!(count = chefes.len(), "chefia entries received from SARH");
                chefes
            }
            Err(e) if self.allow_synthetic_fallback => {
                warn!(error = %e, "SARH chefia query failed, using synthetic chefia");
                sarh::synthetic_managers(&lotacoes_com_ferias)
            }
            Err(e) => return Err(e.into()),
        };

        let chefes_por_lotacao: HashMap<String, ManagerInfo> = chefes
            .into_iter()
            .map(|chefe| (chefe.codigo_lotacao.clone(), chefe))
            .collect();

        // 6. Group records per lotação and send one notice per chefe
        let records = store::records_for_units(self.pool, &periodo_str, &lotacoes_com_ferias).await?;

        let mut por_lotacao: BTreeMap<String, Vec<LeaveRecord>> = BTreeMap::new();
        for record in records {
            por_lotacao
                .entry(record.codigo_lotacao.clone())
                .or_default()
                .push(record);
        }

        let mut notified = 0usize;
        let mut failed_sends = 0usize;
        let mut skipped_units = 0usize;

        for (codigo_lotacao, servidores) in &por_lotacao {
            let Some(chefe) = chefes_por_lotacao.get(codigo_lotacao) else {
                warn!(%codigo_lotacao, "no chefia info for lotação, notice skipped");
                skipped_units += 1;
                continue;
            };

            let Some(email_chefe) = chefe.email_chefe.as_deref().filter(|e| !e.is_empty()) else {
                warn!(%codigo_lotacao, "chefe has no e-mail address, notice skipped");
                skipped_units += 1;
                continue;
            };

            let html = match mailer::render_aviso(
                &chefe.nome_chefe,
                codigo_lotacao,
                &periodo_str,
                servidores,
            ) {
                Ok(html) => html,
                Err(e) => {
                    error!(error = %e, %codigo_lotacao, "failed to render notice");
                    failed_sends += 1;
                    continue;
                }
            };

            let subject = format!(
                "Aviso de Férias para Lotação {codigo_lotacao} - Competência {periodo_str}"
            );

            match self.mailer.send_html(email_chefe, &subject, html).await {
                Ok(()) => {
                    info!(%codigo_lotacao, chefe = %chefe.nome_chefe, "notice sent");
                    notified += 1;
                }
                Err(e) => {
                    error!(error = %e, %codigo_lotacao, "failed to send notice");
                    failed_sends += 1;
                }
            }
        }

        info!(
            imported,
            notified, failed_sends, skipped_units, "férias notification run finished"
        );

        Ok(RunSummary {
            competencia: periodo_str,
            imported,
            skipped_entries,
            notified,
            failed_sends,
            skipped_units,
        })
    }
}
