//! Single binary web server exposing the bracket engine over REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! POLL_INTERVAL_MS and POLL_ATTEMPTS.

use actix_web::{
    get, post,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer,
};
use bracket_progression::{
    force_advance, mark_live, override_winner, poll_round, request_force_advance, seed_bracket,
    start_tournament, submit_result, BracketError, Engine, MemoryAuditLog, MemoryStore, PlayerId,
    ServerConfig, StoreError, Submission, TournamentId, TournamentSettings,
};
use serde::Deserialize;
use std::sync::Arc;

/// Shared handles for every request.
struct AppData {
    engine: Engine,
    audit: Arc<MemoryAuditLog>,
    config: ServerConfig,
}

type AppState = Data<AppData>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    players: Vec<PlayerId>,
    #[serde(default)]
    settings: TournamentSettings,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverrideBody {
    winner: PlayerId,
    admin_id: String,
    #[serde(default)]
    reason: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForceAdvanceBody {
    round: Option<u32>,
    admin_id: String,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and match id
#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: String,
}

/// Path segments: tournament id and round number
#[derive(Deserialize)]
struct RoundPath {
    id: TournamentId,
    round: u32,
}

fn error_response(err: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        BracketError::Store(StoreError::TournamentNotFound(_) | StoreError::MatchNotFound { .. }) => {
            HttpResponse::NotFound().json(body)
        }
        BracketError::Store(StoreError::Conflict(_) | StoreError::AlreadyExists(_))
        | BracketError::RoundAlreadyProgressed { .. } => HttpResponse::Conflict().json(body),
        BracketError::Store(StoreError::Lock) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-progression",
    })
}

/// Seed a new bracket (returns the tournament with its id).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> HttpResponse {
    let body = body.into_inner();
    match seed_bracket(state.engine.store.as_ref(), body.players, body.settings).await {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.engine.store.get_tournament(path.id).await {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&BracketError::from(e)),
    }
}

/// Setup -> Live.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match start_tournament(state.engine.store.as_ref(), path.id).await {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/rounds/{round}")]
async fn api_get_round(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    match state.engine.store.round_matches(path.id, path.round).await {
        Ok(m) => HttpResponse::Ok().json(m),
        Err(e) => error_response(&BracketError::from(e)),
    }
}

/// Wait (bounded) for a round to be generated. 404 if it never shows up.
#[get("/api/tournaments/{id}/rounds/{round}/await")]
async fn api_await_round(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    let cfg = &state.config;
    let polled = poll_round(
        state.engine.store.as_ref(),
        path.id,
        path.round,
        cfg.poll_interval,
        cfg.poll_attempts,
    )
    .await;
    match polled {
        Ok(Some(m)) => HttpResponse::Ok().json(m),
        Ok(None) => HttpResponse::NotFound()
            .json(serde_json::json!({ "error": format!("round {} not generated yet", path.round) })),
        Err(e) => error_response(&BracketError::from(e)),
    }
}

#[post("/api/tournaments/{id}/matches/{match_id}/live")]
async fn api_mark_live(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    match mark_live(state.engine.store.as_ref(), path.id, &path.match_id).await {
        Ok((_, after)) => HttpResponse::Ok().json(after),
        Err(e) => error_response(&e),
    }
}

/// Report a result. `winner` may be omitted on a level score; the engine then
/// resolves it. Progression runs in the background; the response does not wait for it.
#[post("/api/tournaments/{id}/matches/{match_id}/submit")]
async fn api_submit_result(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<Submission>,
) -> HttpResponse {
    let written = submit_result(
        state.engine.store.as_ref(),
        path.id,
        &path.match_id,
        body.into_inner(),
    )
    .await;
    match written {
        Ok((before, after)) => {
            state.engine.spawn_trigger(Some(before), after.clone());
            HttpResponse::Ok().json(after)
        }
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournaments/{id}/matches/{match_id}/override")]
async fn api_override_winner(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<OverrideBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let written = override_winner(
        &state.engine,
        path.id,
        &path.match_id,
        body.winner,
        &body.admin_id,
        &body.reason,
    )
    .await;
    match written {
        Ok((before, after)) => {
            state.engine.spawn_trigger(Some(before), after.clone());
            HttpResponse::Ok().json(after)
        }
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournaments/{id}/force-advance/request")]
async fn api_request_force_advance(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match request_force_advance(&state.engine, path.id).await {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&e),
    }
}

/// Force the given round (default: the current round) through, then return the tournament.
#[post("/api/tournaments/{id}/force-advance")]
async fn api_force_advance(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<ForceAdvanceBody>,
) -> HttpResponse {
    let store = state.engine.store.as_ref();
    let round = match body.round {
        Some(r) => r,
        None => match store.get_tournament(path.id).await {
            Ok(t) => t.current_round,
            Err(e) => return error_response(&BracketError::from(e)),
        },
    };
    if let Err(e) = force_advance(&state.engine, path.id, round, &body.admin_id).await {
        return error_response(&e);
    }
    match store.get_tournament(path.id).await {
        Ok(t) => HttpResponse::Ok().json(t),
        Err(e) => error_response(&BracketError::from(e)),
    }
}

/// Audit timeline (advisory).
#[get("/api/events")]
async fn api_events(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.audit.entries())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let audit = Arc::new(MemoryAuditLog::new());
    let engine = Engine::new(Arc::new(MemoryStore::new()), audit.clone());
    let state = Data::new(AppData {
        engine,
        audit,
        config,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_start_tournament)
            .service(api_get_round)
            .service(api_await_round)
            .service(api_mark_live)
            .service(api_submit_result)
            .service(api_override_winner)
            .service(api_request_force_advance)
            .service(api_force_advance)
            .service(api_events)
    })
    .bind(bind)?
    .run()
    .await
}
