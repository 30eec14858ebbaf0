//! Game Reference Database API
//!
//! REST API over the entity store: projected reads for everyone, and
//! create/update/delete for holders of an editor token.

mod error;

pub use error::ApiError;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{header, request::Parts, StatusCode},
    routing::get,
    Json, Router,
};
use mhdb::{
    create_entity, delete_entity, update_entity, EntityFilter, EntityId, EntityKind,
    EntityRepository, Normalizer, Payload, Projection, RepoError, SqliteDb,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Largest page a list request may ask for
pub const MAX_LIMIT: usize = 1000;

/// Collection paths and the kind each one serves
pub const COLLECTIONS: &[(&str, EntityKind)] = &[
    ("/ailments", EntityKind::Ailment),
    ("/armor", EntityKind::Armor),
    ("/armor/sets", EntityKind::ArmorSet),
    ("/charms", EntityKind::Charm),
    ("/decorations", EntityKind::Decoration),
    ("/items", EntityKind::Item),
    ("/locations", EntityKind::Location),
    ("/monsters", EntityKind::Monster),
    ("/motion-values", EntityKind::MotionValue),
    ("/skills", EntityKind::Skill),
    ("/weapons", EntityKind::Weapon),
];

// =============================================================================
// App State
// =============================================================================

pub struct AppState {
    db: Mutex<SqliteDb>,
    editor_tokens: HashSet<String>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: SqliteDb, editor_tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            db: Mutex::new(db),
            editor_tokens: editor_tokens
                .into_iter()
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty())
                .collect(),
        }
    }

    fn db(&self) -> Result<MutexGuard<'_, SqliteDb>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("Database lock poisoned".to_string()))
    }
}

// =============================================================================
// Editor role
// =============================================================================

/// Extractor that only succeeds for a request carrying a known editor token
pub struct Editor;

impl FromRequestParts<SharedState> for Editor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or(ApiError::Unauthorized)?;

        if state.editor_tokens.contains(token) {
            Ok(Editor)
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Projection as a JSON object of dotted paths to booleans
    pub p: Option<String>,
    /// Comma-separated included paths, used when `p` is absent
    pub fields: Option<String>,
    /// JSON object of field to value equality filters
    pub q: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListQuery {
    fn projection(&self) -> Result<Projection, ApiError> {
        match (&self.p, &self.fields) {
            (Some(raw), _) => Ok(Projection::from_json(raw)?),
            (None, Some(fields)) => Ok(Projection::from_fields(fields)),
            (None, None) => Ok(Projection::all()),
        }
    }

    fn filter(&self) -> Result<EntityFilter, ApiError> {
        let mut filter = EntityFilter::new();

        if let Some(raw) = &self.q {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| ApiError::BadRequest(format!("Invalid query: {}", e)))?;
            let Value::Object(conditions) = value else {
                return Err(ApiError::BadRequest(
                    "Query must be an object of field values".to_string(),
                ));
            };
            for (field, value) in conditions {
                filter = filter.with(field, value);
            }
        }

        if let Some(limit) = self.limit {
            filter = filter.limit(limit.min(MAX_LIMIT));
        }
        if let Some(offset) = self.offset {
            filter = filter.offset(offset);
        }

        Ok(filter)
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_entities(
    kind: EntityKind,
    state: SharedState,
    query: ListQuery,
) -> Result<Json<Vec<Value>>, ApiError> {
    let projection = query.projection()?;
    let filter = query.filter()?;

    let db = state.db()?;
    let records = db.list(kind, &filter)?;
    let documents = Normalizer::new(&*db, &projection).normalize_many(&records)?;

    Ok(Json(documents))
}

async fn read_entity(
    kind: EntityKind,
    state: SharedState,
    id: EntityId,
    query: ListQuery,
) -> Result<Json<Value>, ApiError> {
    let projection = query.projection()?;

    let db = state.db()?;
    let record = db.get(kind, id)?.ok_or(RepoError::NotFound { kind, id })?;
    let document = Normalizer::new(&*db, &projection).normalize(&record)?;

    Ok(Json(document))
}

async fn create(
    kind: EntityKind,
    state: SharedState,
    body: Value,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = Payload::try_from(body)?;

    let db = state.db()?;
    let record = create_entity(&*db, kind, &payload)?;
    let document = Normalizer::new(&*db, &Projection::all()).normalize(&record)?;

    Ok((StatusCode::CREATED, Json(document)))
}

async fn update(
    kind: EntityKind,
    state: SharedState,
    id: EntityId,
    body: Value,
) -> Result<Json<Value>, ApiError> {
    let payload = Payload::try_from(body)?;

    let db = state.db()?;
    let record = update_entity(&*db, kind, id, &payload)?;
    let document = Normalizer::new(&*db, &Projection::all()).normalize(&record)?;

    Ok(Json(document))
}

async fn delete(kind: EntityKind, state: SharedState, id: EntityId) -> Result<StatusCode, ApiError> {
    let db = state.db()?;
    delete_entity(&*db, kind, id)?;
    tracing::info!("Deleted {} {}", kind, id);

    Ok(StatusCode::NO_CONTENT)
}

/// Routes for one collection: `GET`/`PUT` on the collection, and
/// `GET`/`PATCH`/`DELETE` on `<path>/{id}`
fn collection(router: Router<SharedState>, path: &str, kind: EntityKind) -> Router<SharedState> {
    router
        .route(
            path,
            get(
                move |State(state): State<SharedState>, Query(query): Query<ListQuery>| {
                    list_entities(kind, state, query)
                },
            )
            .put(
                move |State(state): State<SharedState>, _: Editor, Json(body): Json<Value>| {
                    create(kind, state, body)
                },
            ),
        )
        .route(
            &format!("{}/{{id}}", path),
            get(
                move |State(state): State<SharedState>,
                      Path(id): Path<EntityId>,
                      Query(query): Query<ListQuery>| {
                    read_entity(kind, state, id, query)
                },
            )
            .patch(
                move |State(state): State<SharedState>,
                      Path(id): Path<EntityId>,
                      _: Editor,
                      Json(body): Json<Value>| { update(kind, state, id, body) },
            )
            .delete(
                move |State(state): State<SharedState>, Path(id): Path<EntityId>, _: Editor| {
                    delete(kind, state, id)
                },
            ),
        )
}

/// Build the application router
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = COLLECTIONS
        .iter()
        .fold(Router::new().route("/health", get(health)), |router, (path, kind)| {
            collection(router, path, *kind)
        });

    routes
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
