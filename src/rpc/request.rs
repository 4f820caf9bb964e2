//! Request and reply wire types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{truncated, Error, Result, RpcError};

/// One decoded request line.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Invoke a controller method.
    Call {
        /// Method name.
        method: String,
        /// Arguments.
        params: Params,
    },
    /// Shut the controller down and stop the server.
    Terminate,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    kwargs: Map<String, Value>,
}

impl Request {
    /// Decode a request line.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::Malformed` if the line is not a request object.
    pub fn parse(line: &str) -> Result<Self> {
        let raw: RawRequest = serde_json::from_str(line)
            .map_err(|e| Error::Rpc(RpcError::Malformed(truncated(&e.to_string()))))?;

        match (raw.action.as_deref(), raw.method) {
            (Some("terminate"), _) => Ok(Request::Terminate),
            (Some("call") | None, Some(method)) => Ok(Request::Call {
                method,
                params: Params {
                    args: raw.args,
                    kwargs: raw.kwargs,
                },
            }),
            (Some(other), _) if other != "call" => Err(Error::Rpc(RpcError::Malformed(
                truncated(&format!("unknown action '{}'", other)),
            ))),
            _ => Err(Error::Rpc(RpcError::Malformed(truncated("missing 'method'")))),
        }
    }
}

/// Positional and keyword arguments of a call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    /// Positional arguments.
    pub args: Vec<Value>,
    /// Keyword arguments.
    pub kwargs: Map<String, Value>,
}

impl Params {
    /// Build from positional arguments only.
    pub fn positional(args: Vec<Value>) -> Self {
        Self {
            args,
            kwargs: Map::new(),
        }
    }

    /// Argument at `index`, or the keyword argument `name`.
    pub fn get(&self, index: usize, name: &str) -> Option<&Value> {
        self.args.get(index).or_else(|| self.kwargs.get(name))
    }

    /// Required integer argument. Floats with no fractional part (`3.0`)
    /// are accepted.
    pub fn int(&self, index: usize, name: &'static str) -> Result<i64> {
        self.get(index, name)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().and_then(integral)))
            .ok_or(Error::Rpc(RpcError::BadArgument(name)))
    }

    /// Required name argument. Numbers and booleans are coerced to text.
    pub fn name(&self, index: usize, name: &'static str) -> Result<String> {
        match self.get(index, name) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
            _ => Err(Error::Rpc(RpcError::BadArgument(name))),
        }
    }

    /// Optional pulse delay in seconds. `null` counts as absent.
    pub fn delay(&self, index: usize, name: &'static str) -> Result<Option<Duration>> {
        match self.get(index, name) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => v
                .as_f64()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .map(Some)
                .ok_or(Error::Rpc(RpcError::BadArgument(name))),
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    // 2^63 is exact in f64; i64 covers [-2^63, 2^63)
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value)).then(|| value as i64)
}

/// Reply to one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Reply {
    /// Call succeeded.
    Ok {
        /// Return value (`null` for commands).
        ret: Value,
    },
    /// Call failed.
    Failed {
        /// Error kind, e.g. `InvalidModeError`.
        error: &'static str,
        /// Human-readable description.
        message: String,
    },
}

impl Reply {
    /// Wrap a call result.
    pub fn from_result(result: Result<Value>) -> Self {
        match result {
            Ok(ret) => Reply::Ok { ret },
            Err(e) => Reply::Failed {
                error: e.kind(),
                message: e.to_string(),
            },
        }
    }

    /// Encode as a single JSON line (without the newline).
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"status":"failed","error":"RequestError","message":"reply encoding failed"}"#.to_string()
        })
    }
}
