//! JSON-RPC request decoding and method dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use suncoin_network::Gateway;
use suncoin_types::{Address, Output, OutputHash};

use crate::error::ErrorObject;

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    pub id: Value,
}

impl JsonRpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    fn failure(id: Value, error: ErrorObject) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            result: None,
            error: Some(error),
            id,
        }
    }
}

#[derive(Serialize)]
pub struct ReservedAddressesResponse {
    pub locked: Vec<Address>,
    pub unlocked: Vec<Address>,
}

#[derive(Deserialize)]
pub struct TransactionLockedRequest {
    /// Owners of the outputs the transaction spends.
    pub addresses: Vec<String>,
}

#[derive(Serialize)]
pub struct TransactionLockedResponse {
    pub locked: bool,
}

/// Decode one request body and answer it against `gateway`.
pub fn handle_request(gateway: &Gateway, body: &[u8]) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_slice(body) {
        Ok(req) => req,
        Err(e) if e.is_data() => {
            return JsonRpcResponse::failure(Value::Null, ErrorObject::invalid_request(e))
        }
        Err(e) => return JsonRpcResponse::failure(Value::Null, ErrorObject::parse_error(e)),
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return JsonRpcResponse::failure(
            request.id,
            ErrorObject::invalid_request(format!("unsupported jsonrpc version {:?}", request.jsonrpc)),
        );
    }

    tracing::debug!(method = %request.method, "rpc request");
    match dispatch(gateway, &request.method, request.params) {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(error) => JsonRpcResponse::failure(request.id, error),
    }
}

fn dispatch(gateway: &Gateway, method: &str, params: Value) -> Result<Value, ErrorObject> {
    match method {
        "get_status" => to_value(gateway.status()),
        "get_reserved_addresses" => {
            let policy = gateway.emission_policy();
            to_value(ReservedAddressesResponse {
                locked: policy.locked_addresses().to_vec(),
                unlocked: policy.unlocked_addresses().to_vec(),
            })
        }
        "is_transaction_locked" => {
            let req: TransactionLockedRequest =
                serde_json::from_value(params).map_err(ErrorObject::invalid_params)?;
            let spent = req
                .addresses
                .iter()
                .map(|s| {
                    s.parse::<Address>()
                        .map(|address| Output::new(OutputHash::ZERO, address, 0, 0))
                        .map_err(|e| ErrorObject::invalid_params(format!("{s}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            to_value(TransactionLockedResponse {
                locked: gateway.is_spend_locked(&spent),
            })
        }
        other => Err(ErrorObject::method_not_found(other)),
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ErrorObject> {
    serde_json::to_value(value).map_err(ErrorObject::internal)
}
