// crates/safety-forms-server/src/api.rs
// ============================================================================
// Module: Safety Forms HTTP API
// Description: Routes, handlers, and error-to-status mapping.
// Purpose: Translate HTTP requests into form service calls.
// Dependencies: axum, serde, serde_json, tokio, tracing, safety-forms-core
// ============================================================================

//! ## Overview
//! Every write, login, and company endpoint reports errors as
//! `{"message": ...}`; the filtered read reports them as `{"mensaje": ...}`.
//! Bodies are read as bytes under the configured size limit and parsed with
//! `serde_json`. An empty body reads as `{}`. Driver messages never reach
//! the client; they are logged by the service.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::body::Body;
use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::extract::rejection::QueryRejection;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header;
use axum::middleware;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use safety_forms_core::AccidenteSubmission;
use safety_forms_core::BotiquinSubmission;
use safety_forms_core::CompanyRecord;
use safety_forms_core::ControlOperacionalSubmission;
use safety_forms_core::FilterQuery;
use safety_forms_core::FormError;
use safety_forms_core::FormKind;
use safety_forms_core::FormRow;
use safety_forms_core::FormService;
use safety_forms_core::FormSubmission;
use safety_forms_core::Ntp330Submission;
use safety_forms_core::Operation;
use safety_forms_core::RecordId;
use safety_forms_core::SharedFormStore;
use safety_forms_core::UserRecord;
use safety_forms_core::lenient_text;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Write succeeded and the submission carried items.
const SAVED_WITH_ITEMS: &str = "Datos guardados correctamente (con items).";
/// Write succeeded without items.
const SAVED_WITHOUT_ITEMS: &str = "Datos guardados correctamente (sin items).";
/// Company registered.
const COMPANY_CREATED: &str = "Empresa agregada correctamente";
/// Generic server failure.
const INTERNAL_ERROR: &str = "Error interno del servidor";
/// Master insert failure.
const MASTER_INSERT_FAILED: &str = "Error al guardar los datos en la tabla maestra.";
/// Items insert failure.
const ITEMS_INSERT_FAILED: &str = "Error al guardar los datos en la tabla de items.";
/// Login input missing.
const LOGIN_MISSING: &str = "Faltan datos: nombre o password";
/// Login mismatch.
const LOGIN_REJECTED: &str = "Usuario o contraseña incorrectos";
/// Company name missing.
const COMPANY_NAME_MISSING: &str = "El nombre de la empresa es obligatorio";
/// Filter parameters missing.
const FILTER_MISSING: &str = "Debe proporcionar empresa, fecha y tipo de formulario";
/// Filter query string could not be parsed.
const FILTER_INVALID: &str = "Parámetros de consulta no válidos";
/// Counter totals do not fit the stored integer type.
const COUNTER_OVERFLOW: &str = "Los contadores exceden el valor máximo permitido.";
/// Submission carried more items than one insert accepts.
const TOO_MANY_ITEMS: &str = "El formulario contiene demasiados items.";
/// Filter matched nothing.
const FILTER_EMPTY: &str = "No se encontraron datos para los filtros aplicados";
/// Request body over the configured limit.
const BODY_TOO_LARGE: &str = "El cuerpo de la solicitud excede el límite permitido";
/// Request body is not valid JSON for the endpoint.
const BODY_INVALID: &str = "Cuerpo de la solicitud no es un JSON válido";

/// Returns the required-field message for a form kind.
const fn required_fields_message(kind: FormKind) -> &'static str {
    match kind {
        FormKind::ControlOperacional => "Faltan datos obligatorios.",
        FormKind::Botiquin => "Empresa y fecha son obligatorios.",
        FormKind::Accidente => "Empresa, obra, fecha_accidente, hora y RUT son obligatorios.",
        FormKind::Ntp330 => "Empresa, obra, responsable, fecha, hora y RUT son obligatorios.",
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// JSON key carrying an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    /// `message`, used by writes, login, and companies.
    Message,
    /// `mensaje`, used by the filtered read.
    Mensaje,
}

impl MessageKey {
    /// Returns the JSON key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Mensaje => "mensaje",
        }
    }
}

/// HTTP error response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Response status.
    pub status: StatusCode,
    /// JSON key for the message.
    pub key: MessageKey,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    /// Builds an error response.
    #[must_use]
    pub fn new(status: StatusCode, key: MessageKey, message: impl Into<String>) -> Self {
        Self {
            status,
            key,
            message: message.into(),
        }
    }

    /// Maps a service error onto a status and client-safe message.
    #[must_use]
    pub fn from_form_error(error: &FormError, key: MessageKey) -> Self {
        let (status, message) = match error {
            FormError::MissingFields {
                kind, ..
            } => (StatusCode::BAD_REQUEST, required_fields_message(*kind).to_string()),
            FormError::MissingInput {
                operation, ..
            } => {
                let message = match operation {
                    Operation::Login => LOGIN_MISSING,
                    Operation::RegisterCompany => COMPANY_NAME_MISSING,
                    Operation::Filter => FILTER_MISSING,
                    Operation::AddUser => "Faltan datos obligatorios.",
                };
                (StatusCode::BAD_REQUEST, message.to_string())
            }
            FormError::InvalidSubmission {
                ..
            } => (StatusCode::BAD_REQUEST, COUNTER_OVERFLOW.to_string()),
            FormError::TooManyItems {
                ..
            } => (StatusCode::BAD_REQUEST, TOO_MANY_ITEMS.to_string()),
            FormError::UnknownFormKind(value) => {
                (StatusCode::BAD_REQUEST, format!("Formulario no válido: {value}"))
            }
            FormError::InvalidCredentials => (StatusCode::UNAUTHORIZED, LOGIN_REJECTED.to_string()),
            FormError::NotFound {
                ..
            } => (StatusCode::NOT_FOUND, FILTER_EMPTY.to_string()),
            FormError::MasterInsert {
                ..
            } => (StatusCode::INTERNAL_SERVER_ERROR, MASTER_INSERT_FAILED.to_string()),
            FormError::ItemsInsert {
                ..
            } => (StatusCode::INTERNAL_SERVER_ERROR, ITEMS_INSERT_FAILED.to_string()),
            FormError::Query {
                kind, ..
            } => (StatusCode::INTERNAL_SERVER_ERROR, format!("{INTERNAL_ERROR} ({kind})")),
            FormError::Store {
                ..
            } => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string()),
        };
        Self::new(status, key, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert(self.key.as_str().to_string(), Value::String(self.message));
        (self.status, Json(Value::Object(body))).into_response()
    }
}

// ============================================================================
// SECTION: State and Router
// ============================================================================

/// Shared server state for HTTP handlers.
#[derive(Clone)]
pub(crate) struct ServerState {
    /// Form operations over the configured store.
    pub(crate) service: FormService<SharedFormStore>,
    /// Maximum allowed request body size.
    pub(crate) max_body_bytes: usize,
    /// `Access-Control-Allow-Origin` value when CORS is enabled.
    pub(crate) cors_origin: Option<HeaderValue>,
}

/// Builds the API router.
pub(crate) fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/login", post(handle_login))
        .route(
            "/api/control-operacional",
            post(handle_submit::<ControlOperacionalSubmission>),
        )
        .route("/api/botiquin", post(handle_submit::<BotiquinSubmission>))
        .route("/api/accidente", post(handle_submit::<AccidenteSubmission>))
        .route("/api/ntp330", post(handle_submit::<Ntp330Submission>))
        .route("/api/filtrar", get(handle_filter))
        .route("/api/empresas", post(handle_company))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), apply_cors))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

// ============================================================================
// SECTION: Request and Response Bodies
// ============================================================================

/// Body of `POST /api/login`.
#[derive(Debug, Default, Deserialize)]
struct LoginRequest {
    /// User name.
    #[serde(default, deserialize_with = "lenient_text")]
    nombre: Option<String>,
    /// Plaintext password.
    #[serde(default, deserialize_with = "lenient_text")]
    password: Option<String>,
}

/// Body of `POST /api/empresas`.
#[derive(Debug, Default, Deserialize)]
struct CompanyRequest {
    /// Company name.
    #[serde(default, deserialize_with = "lenient_text")]
    nombre: Option<String>,
}

/// Query string of `GET /api/filtrar`.
#[derive(Debug, Default, Deserialize)]
struct FilterParams {
    /// Company name.
    empresa: Option<String>,
    /// Calendar day.
    fecha: Option<String>,
    /// Form kind selector.
    formulario: Option<String>,
}

/// Successful write response.
#[derive(Debug, Serialize)]
struct WriteResponse {
    /// Outcome message.
    message: &'static str,
    /// Identifier of the new master row.
    id: RecordId,
}

/// Successful company registration response.
#[derive(Debug, Serialize)]
struct CompanyResponse {
    /// Outcome message.
    message: &'static str,
    /// Company identifier.
    id: RecordId,
    /// Company name.
    nombre: String,
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handles the four form write endpoints.
async fn handle_submit<F>(
    State(state): State<Arc<ServerState>>,
    body: Body,
) -> Result<Json<WriteResponse>, ApiError>
where
    F: FormSubmission + Send + 'static,
{
    let submission: F = read_json(&state, body, MessageKey::Message).await?;
    let outcome =
        run_blocking(&state, MessageKey::Message, move |service| service.submit_form(submission))
            .await?;
    let message = if outcome.item_count == 0 { SAVED_WITHOUT_ITEMS } else { SAVED_WITH_ITEMS };
    Ok(Json(WriteResponse {
        message,
        id: outcome.master_id,
    }))
}

/// Handles `POST /api/login`.
async fn handle_login(
    State(state): State<Arc<ServerState>>,
    body: Body,
) -> Result<Json<UserRecord>, ApiError> {
    let request: LoginRequest = read_json(&state, body, MessageKey::Message).await?;
    let user = run_blocking(&state, MessageKey::Message, move |service| {
        service.login(request.nombre.as_deref(), request.password.as_deref())
    })
    .await?;
    Ok(Json(user))
}

/// Handles `GET /api/filtrar`.
async fn handle_filter(
    State(state): State<Arc<ServerState>>,
    params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Vec<FormRow>>, ApiError> {
    let Query(params) = params.map_err(|err| {
        tracing::warn!(error = %err, "filter query string rejected");
        ApiError::new(StatusCode::BAD_REQUEST, MessageKey::Mensaje, FILTER_INVALID)
    })?;
    let query = FilterQuery {
        empresa: params.empresa,
        fecha: params.fecha,
        formulario: params.formulario,
    };
    let rows = run_blocking(&state, MessageKey::Mensaje, move |service| service.filter(&query))
        .await?;
    Ok(Json(rows))
}

/// Handles `POST /api/empresas`.
async fn handle_company(
    State(state): State<Arc<ServerState>>,
    body: Body,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let request: CompanyRequest = read_json(&state, body, MessageKey::Message).await?;
    let CompanyRecord {
        id,
        nombre,
    } = run_blocking(&state, MessageKey::Message, move |service| {
        service.register_company(request.nombre.as_deref())
    })
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(CompanyResponse {
            message: COMPANY_CREATED,
            id,
            nombre,
        }),
    ))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the body under the size limit and parses it as JSON.
async fn read_json<T: DeserializeOwned>(
    state: &ServerState,
    body: Body,
    key: MessageKey,
) -> Result<T, ApiError> {
    let bytes = axum::body::to_bytes(body, state.max_body_bytes).await.map_err(|err| {
        tracing::warn!(error = %err, limit = state.max_body_bytes, "request body rejected");
        ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, key, BODY_TOO_LARGE)
    })?;
    let payload: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) { b"{}" } else { &bytes };
    serde_json::from_slice(payload).map_err(|err| {
        tracing::warn!(error = %err, "request body is not valid json");
        ApiError::new(StatusCode::BAD_REQUEST, key, BODY_INVALID)
    })
}

/// Runs a blocking service call on the blocking pool.
async fn run_blocking<T, F>(state: &ServerState, key: MessageKey, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&FormService<SharedFormStore>) -> Result<T, FormError> + Send + 'static,
{
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || call(&service)).await.map_err(|err| {
        tracing::error!(error = %err, "blocking store task failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, key, INTERNAL_ERROR)
    })?;
    result.map_err(|err| ApiError::from_form_error(&err, key))
}

/// Adds CORS headers and answers preflight requests.
async fn apply_cors(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(origin) = state.cors_origin.clone() else {
        return next.run(request).await;
    };
    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        return response;
    }
    let mut response = next.run(request).await;
    response.headers_mut().insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    response
}

/// Logs method, path, status, and latency of every request.
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request handled"
    );
    response
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use axum::http::StatusCode;
    use safety_forms_core::FormError;
    use safety_forms_core::FormKind;
    use safety_forms_core::Operation;
    use safety_forms_core::RecordId;
    use safety_forms_core::StoreError;
    use safety_forms_core::SubmissionError;

    use super::ApiError;
    use super::MessageKey;

    fn map(error: &FormError) -> ApiError {
        ApiError::from_form_error(error, MessageKey::Message)
    }

    #[test]
    fn client_errors_map_to_bad_request_with_form_message() {
        let error = FormError::MissingFields {
            kind: FormKind::Botiquin,
            fields: vec!["fecha"],
        };
        let mapped = map(&error);
        assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
        assert_eq!(mapped.message, "Empresa y fecha son obligatorios.");

        let mapped = ApiError::from_form_error(
            &FormError::UnknownFormKind("encuesta".to_string()),
            MessageKey::Mensaje,
        );
        assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
        assert_eq!(mapped.key.as_str(), "mensaje");
        assert!(mapped.message.contains("encuesta"));
    }

    #[test]
    fn missing_input_message_follows_operation() {
        let cases = [
            (Operation::Login, "Faltan datos: nombre o password"),
            (Operation::RegisterCompany, "El nombre de la empresa es obligatorio"),
            (Operation::Filter, "Debe proporcionar empresa, fecha y tipo de formulario"),
            (Operation::AddUser, "Faltan datos obligatorios."),
        ];
        for (operation, expected) in cases {
            let mapped = map(&FormError::MissingInput {
                operation,
                fields: vec!["nombre"],
            });
            assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
            assert_eq!(mapped.message, expected, "{operation}");
        }
    }

    #[test]
    fn rejected_submissions_are_client_errors() {
        let mapped = map(&FormError::InvalidSubmission {
            kind: FormKind::ControlOperacional,
            source: SubmissionError::CounterOverflow {
                field: "correctos",
            },
        });
        assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
        assert!(mapped.message.contains("contadores"));

        let mapped = map(&FormError::TooManyItems {
            kind: FormKind::Botiquin,
            count: 5_000,
            limit: 4_000,
        });
        assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
        assert!(mapped.message.contains("demasiados items"));
    }

    #[test]
    fn login_and_not_found_statuses() {
        assert_eq!(map(&FormError::InvalidCredentials).status, StatusCode::UNAUTHORIZED);
        let mapped = map(&FormError::NotFound {
            kind: FormKind::Ntp330,
        });
        assert_eq!(mapped.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_errors_hide_driver_messages() {
        let error = FormError::ItemsInsert {
            kind: FormKind::Accidente,
            master_id: RecordId::new(7),
            source: StoreError::Store("no such table: accidente_items".to_string()),
        };
        let mapped = map(&error);
        assert_eq!(mapped.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!mapped.message.contains("no such table"));

        let error = FormError::Query {
            kind: FormKind::Botiquin,
            source: StoreError::Store("disk I/O error".to_string()),
        };
        let mapped = ApiError::from_form_error(&error, MessageKey::Mensaje);
        assert_eq!(mapped.message, "Error interno del servidor (botiquin)");
    }
}
