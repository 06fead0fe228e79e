use crate::{
    api::{lotacao, notify},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    // The trigger is meant for a cronjob, a handful of calls per minute is plenty
    let trigger_limiter = build_limiter(config.rate_trigger_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::resource("/aviso-ferias")
                    .wrap(trigger_limiter)
                    .route(web::post().to(notify::aviso_ferias))
                    // anything other than POST gets the JSON 405
                    .route(web::route().to(notify::method_not_allowed)),
            )
            .service(
                web::scope("/lotacoes")
                    // /lotacoes
                    .service(
                        web::resource("")
                            .route(web::get().to(lotacao::list_lotacoes))
                            .route(web::post().to(lotacao::create_lotacao)),
                    )
                    // /lotacoes/{codigo}
                    .service(
                        web::resource("/{codigo}")
                            .route(web::put().to(lotacao::update_lotacao))
                            .route(web::delete().to(lotacao::delete_lotacao)),
                    ),
            ),
    );
}

// CRONJOB (Kubernetes)
//  └─ POST /api/aviso-ferias {"competencia": "YYYY-MM"}
//       ├─ consulta SARH (férias + chefia)
//       ├─ reconcilia servidores_ferias
//       └─ envia um e-mail por lotação
