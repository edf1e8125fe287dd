use axum::{
  Json, Router,
  routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::utils::AppState;

mod consolidate;
mod entities;
mod explain;
mod memories;
mod patterns;
mod process_turn;

pub use consolidate::{ConsolidateRequest, ConsolidateResponse, ConsolidateScopeDto};
pub use entities::{EntityEnvelope, GetEntitiesRequest, GetEntitiesResponse};
pub use explain::{ExplainRequest, ExplainResponse};
pub use memories::{GetMemoriesRequest, GetMemoriesResponse, MemoryEnvelope};
pub use patterns::{DetectPatternsRequest, DetectPatternsResponse, ProceduralPatternDto};
pub use process_turn::ProcessTurnRequest;

#[derive(OpenApi)]
#[openapi(
  info(
    title = "Mnemosyne API",
    version = "0.0.1",
    description = "Ontology-aware conversational memory engine: per-turn ingestion, entity resolution, semantic fact extraction, and multi-signal retrieval"
  ),
  paths(
    process_turn::process_turn,
    memories::get_memories,
    entities::get_entities,
    consolidate::consolidate,
    patterns::detect_patterns,
    explain::explain
  ),
  components(schemas(
    ProcessTurnRequest,
    mnemosyne_core::orchestrator::TurnOutput,
    GetMemoriesRequest,
    GetMemoriesResponse,
    MemoryEnvelope,
    GetEntitiesRequest,
    GetEntitiesResponse,
    EntityEnvelope,
    ConsolidateRequest,
    ConsolidateResponse,
    ConsolidateScopeDto,
    DetectPatternsRequest,
    DetectPatternsResponse,
    ProceduralPatternDto,
    ExplainRequest,
    ExplainResponse,
  ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
  Json(ApiDoc::openapi())
}

pub fn app() -> Router<AppState> {
  Router::new()
    .route("/api/v0/process_turn", post(process_turn::process_turn))
    .route("/api/v0/memories", post(memories::get_memories))
    .route("/api/v0/entities", post(entities::get_entities))
    .route("/api/v0/consolidate", post(consolidate::consolidate))
    .route("/api/v0/detect_patterns", post(patterns::detect_patterns))
    .route("/api/v0/explain", post(explain::explain))
    .route("/openapi.json", get(openapi_json))
    .merge(Scalar::with_url("/openapi/", ApiDoc::openapi()))
}
