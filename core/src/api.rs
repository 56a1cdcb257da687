//! HTTP sandbox over an in-memory ledger.

use std::sync::Arc;

use axum::{
    extract::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use soroban_sdk::xdr::Asset;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::asset::{
    account_from_strkey, account_to_strkey, asset_issuer, asset_to_string, parse_asset, DECIMALS,
};
use crate::balance::load_account;
use crate::codec::{from_base64, to_base64};
use crate::errors::{AdaptorError, AppError};
use crate::host::{AdaptorCall, CallResult, Host};
use crate::identifier::{adaptor_for, resolve, ContractIdentifier, ResolvedTarget};
use crate::ledger::{AccountEntry, LedgerEntry, LedgerStore, TrustLineEntry};
use crate::payment::LedgerPaymentExecutor;
use crate::token::{AssetAdaptor, TokenInterface};

pub struct AppState {
    pub ledger: Mutex<LedgerStore>,
    pub host: Host,
    pub network_passphrase: String,
}

impl AppState {
    pub fn new(network_passphrase: String) -> Self {
        Self {
            ledger: Mutex::new(LedgerStore::new()),
            host: Host::default(),
            network_passphrase,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct AdaptorRequest {
    #[schema(example = "USD:GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAGO6V")]
    pub asset: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AdaptorResponse {
    /// Base64 XDR of the adaptor identifier.
    pub identifier: String,
    #[schema(example = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAD2KM")]
    pub contract_id: String,
    /// Hex form of the 32-byte contract id.
    pub contract_hash: String,
    pub name: String,
    pub symbol: String,
    #[schema(example = 7)]
    pub decimals: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct ResolveRequest {
    pub identifier: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    #[schema(example = "asset_adaptor")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AccountRequest {
    #[schema(example = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAGO6V")]
    pub account: String,
    #[schema(example = 1000000000)]
    pub balance: i64,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct TrustlineRequest {
    pub account: String,
    pub asset: String,
    pub limit: i64,
    #[serde(default)]
    pub balance: i64,
    #[serde(default = "default_authorized")]
    pub authorized: bool,
}

fn default_authorized() -> bool {
    true
}

/// A token call in JSON form, tagged by `fn`.
#[derive(Debug, Deserialize)]
#[serde(tag = "fn", rename_all = "snake_case")]
pub enum CallRequest {
    Name,
    Symbol,
    Decimals,
    BalanceOf { owner: String },
    Transfer { to: String, value: i64 },
    TransferFrom { from: String, to: String, value: i64 },
    Approve { spender: String, value: i64 },
    Allowance { owner: String, spender: String },
}

impl TryFrom<CallRequest> for AdaptorCall {
    type Error = AdaptorError;

    fn try_from(req: CallRequest) -> Result<Self, Self::Error> {
        Ok(match req {
            CallRequest::Name => Self::Name,
            CallRequest::Symbol => Self::Symbol,
            CallRequest::Decimals => Self::Decimals,
            CallRequest::BalanceOf { owner } => Self::BalanceOf {
                owner: account_from_strkey(&owner)?,
            },
            CallRequest::Transfer { to, value } => Self::Transfer {
                to: account_from_strkey(&to)?,
                value,
            },
            CallRequest::TransferFrom { from, to, value } => Self::TransferFrom {
                from: account_from_strkey(&from)?,
                to: account_from_strkey(&to)?,
                value,
            },
            CallRequest::Approve { spender, value } => Self::Approve {
                spender: account_from_strkey(&spender)?,
                value,
            },
            CallRequest::Allowance { owner, spender } => Self::Allowance {
                owner: account_from_strkey(&owner)?,
                spender: account_from_strkey(&spender)?,
            },
        })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct InvokeRequest {
    /// Base64 XDR of the target identifier.
    pub identifier: String,
    pub caller: String,
    #[schema(value_type = Object, example = json!({"fn": "transfer", "to": "G...", "value": 30}))]
    pub call: CallRequest,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct InvokeResponse {
    #[schema(value_type = Object)]
    pub result: serde_json::Value,
}

impl From<CallResult> for InvokeResponse {
    fn from(result: CallResult) -> Self {
        let result = match result {
            CallResult::Text(s) => serde_json::Value::from(s),
            CallResult::U32(n) => serde_json::Value::from(n),
            CallResult::Amount(n) => serde_json::Value::from(n),
            CallResult::Bool(b) => serde_json::Value::from(b),
        };
        Self { result }
    }
}

#[utoipa::path(
    post,
    path = "/adaptors",
    request_body = AdaptorRequest,
    responses(
        (status = 200, description = "Adaptor identifier for the asset", body = AdaptorResponse),
        (status = 400, description = "Malformed asset")
    ),
    tag = "Adaptors"
)]
pub async fn adaptor_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<AdaptorRequest>,
) -> Result<Json<AdaptorResponse>, AppError> {
    let asset = parse_asset(&payload.asset)?;
    let identifier = adaptor_for(&asset);
    let token = AssetAdaptor::new(asset, LedgerPaymentExecutor)?;

    Ok(Json(AdaptorResponse {
        identifier: to_base64(&identifier)?,
        contract_id: identifier.contract_strkey(&state.network_passphrase)?,
        contract_hash: hex::encode(identifier.contract_id(&state.network_passphrase)?),
        name: token.name(),
        symbol: token.symbol(),
        decimals: DECIMALS,
    }))
}

#[utoipa::path(
    post,
    path = "/resolve",
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Resolved target", body = ResolveResponse),
        (status = 400, description = "Malformed identifier")
    ),
    tag = "Adaptors"
)]
pub async fn resolve_handler(
    Json(payload): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, AppError> {
    let identifier = decode_identifier(&payload.identifier)?;
    let response = match resolve(&identifier)? {
        ResolvedTarget::Contract(handle) => ResolveResponse {
            kind: "contract".to_string(),
            handle: Some(handle),
            asset: None,
        },
        ResolvedTarget::AssetAdaptor(asset) => ResolveResponse {
            kind: "asset_adaptor".to_string(),
            handle: None,
            asset: Some(asset_to_string(&asset)),
        },
    };
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/accounts",
    request_body = AccountRequest,
    responses(
        (status = 200, description = "Account stored", body = AccountRequest),
        (status = 400, description = "Invalid account or balance")
    ),
    tag = "Sandbox"
)]
pub async fn account_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<AccountRequest>,
) -> Result<Json<AccountRequest>, AppError> {
    let account_id = account_from_strkey(&payload.account)?;
    if payload.balance < 0 {
        return Err(AppError::BadRequest("balance must be non-negative".to_string()));
    }

    let mut ledger = state.ledger.lock().await;
    ledger.transact(|ltx| {
        ltx.put(LedgerEntry::Account(AccountEntry {
            account_id,
            balance: payload.balance,
        }));
        Ok::<_, AppError>(())
    })?;
    tracing::info!("Funded {} with {}", payload.account, payload.balance);
    Ok(Json(payload))
}

#[utoipa::path(
    post,
    path = "/trustlines",
    request_body = TrustlineRequest,
    responses(
        (status = 200, description = "Trustline stored", body = TrustlineRequest),
        (status = 400, description = "Invalid trustline"),
        (status = 404, description = "Account does not exist")
    ),
    tag = "Sandbox"
)]
pub async fn trustline_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<TrustlineRequest>,
) -> Result<Json<TrustlineRequest>, AppError> {
    let account_id = account_from_strkey(&payload.account)?;
    let asset = parse_asset(&payload.asset)?;
    if matches!(asset, Asset::Native) {
        return Err(AppError::BadRequest("native asset needs no trustline".to_string()));
    }
    if asset_issuer(&asset) == Some(&account_id) {
        return Err(AppError::BadRequest("issuer cannot trust its own asset".to_string()));
    }
    if payload.limit <= 0 || payload.balance < 0 || payload.balance > payload.limit {
        return Err(AppError::BadRequest(
            "expected 0 <= balance <= limit and limit > 0".to_string(),
        ));
    }

    let mut ledger = state.ledger.lock().await;
    ledger.transact(|ltx| {
        if load_account(ltx, &account_id).is_none() {
            return Err(AppError::NotFound(format!("account {}", payload.account)));
        }
        ltx.put(LedgerEntry::Trustline(TrustLineEntry {
            account_id: account_id.clone(),
            asset: asset.clone(),
            balance: payload.balance,
            limit: payload.limit,
            authorized: payload.authorized,
        }));
        Ok(())
    })?;
    tracing::info!("Opened {} trustline for {}", payload.asset, payload.account);
    Ok(Json(payload))
}

#[utoipa::path(
    post,
    path = "/invoke",
    request_body = InvokeRequest,
    responses(
        (status = 200, description = "Call result", body = InvokeResponse),
        (status = 400, description = "Malformed identifier or argument"),
        (status = 404, description = "No runtime for contract handle")
    ),
    tag = "Adaptors"
)]
pub async fn invoke_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<InvokeRequest>,
) -> Result<Json<InvokeResponse>, AppError> {
    let identifier = decode_identifier(&payload.identifier)?;
    let caller = account_from_strkey(&payload.caller)?;
    let call = AdaptorCall::try_from(payload.call)?;

    let mut ledger = state.ledger.lock().await;
    let result = ledger.transact(|ltx| state.host.invoke(ltx, &identifier, &caller, &call))?;
    tracing::info!(
        "Invoked {:?} as {}: {:?}",
        call,
        account_to_strkey(&caller),
        result
    );
    Ok(Json(result.into()))
}

fn decode_identifier(encoded: &str) -> Result<ContractIdentifier, AdaptorError> {
    from_base64(encoded).map_err(|e| AdaptorError::MalformedIdentifier(e.to_string()))
}

async fn health_check() -> &'static str {
    "OK"
}

#[derive(OpenApi)]
#[openapi(
    paths(adaptor_handler, resolve_handler, account_handler, trustline_handler, invoke_handler),
    components(schemas(
        AdaptorRequest, AdaptorResponse,
        ResolveRequest, ResolveResponse,
        AccountRequest, TrustlineRequest,
        InvokeRequest, InvokeResponse
    )),
    tags(
        (name = "Adaptors", description = "Asset adaptor identifiers and token calls"),
        (name = "Sandbox", description = "In-memory ledger setup")
    ),
    info(
        title = "Asset Adaptor Sandbox API",
        version = "0.1.0",
        description = "ERC-20 style access to ledger assets over an in-memory ledger"
    )
)]
pub struct ApiDoc;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health_check))
        .route("/adaptors", post(adaptor_handler))
        .route("/resolve", post(resolve_handler))
        .route("/accounts", post(account_handler))
        .route("/trustlines", post(trustline_handler))
        .route("/invoke", post(invoke_handler))
        .layer(Extension(state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
