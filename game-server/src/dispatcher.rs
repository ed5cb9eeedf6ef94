//! The command dispatcher. Every handler registers once with an explicit
//! parameter schema; dispatch parses the inbound envelope, binds and
//! type-checks the declared parameters, and invokes the handler. This is
//! the only place that inspects untyped client input — past the binding
//! step, all code operates on typed values.

use crate::server::Server;
use engine::Connection;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// An error addressed to the command's originator. Handlers bubble these
/// up with `?`; the dispatcher turns them into a single `show_error` frame.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{0}")]
pub struct UserError(pub String);

impl UserError {
    pub fn new(message: impl Into<String>) -> UserError {
        UserError(message.into())
    }
}

/// The declared type of one command parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamKind {
    Int,
    Str,
    Bool,
    Object,
}

impl ParamKind {
    fn name(self) -> &'static str {
        match self {
            ParamKind::Int => "int",
            ParamKind::Str => "str",
            ParamKind::Bool => "bool",
            ParamKind::Object => "object",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            ParamKind::Int => value.is_i64(),
            ParamKind::Str => value.is_string(),
            ParamKind::Bool => value.is_boolean(),
            ParamKind::Object => value.is_object(),
        }
    }
}

enum ParamValue {
    Int(i64),
    Str(String),
    Bool(bool),
    Object(Map<String, Value>),
}

/// The bound arguments of one dispatch. Presence and types were validated
/// against the schema, so the typed getters only fail on a handler asking
/// for a parameter it never declared.
pub struct Params(HashMap<&'static str, ParamValue>);

impl Params {
    fn get(&self, name: &'static str) -> Result<&ParamValue, UserError> {
        self.0
            .get(name)
            .ok_or_else(|| UserError::new(format!("\"{name}\" parameter not specified.")))
    }

    pub fn str(&self, name: &'static str) -> Result<&str, UserError> {
        match self.get(name)? {
            ParamValue::Str(value) => Ok(value),
            _ => Err(UserError::new(format!(
                "\"{name}\" parameter needs to be of type str."
            ))),
        }
    }

    pub fn int(&self, name: &'static str) -> Result<i64, UserError> {
        match self.get(name)? {
            ParamValue::Int(value) => Ok(*value),
            _ => Err(UserError::new(format!(
                "\"{name}\" parameter needs to be of type int."
            ))),
        }
    }

    pub fn bool(&self, name: &'static str) -> Result<bool, UserError> {
        match self.get(name)? {
            ParamValue::Bool(value) => Ok(*value),
            _ => Err(UserError::new(format!(
                "\"{name}\" parameter needs to be of type bool."
            ))),
        }
    }

    pub fn object(&self, name: &'static str) -> Result<&Map<String, Value>, UserError> {
        match self.get(name)? {
            ParamValue::Object(value) => Ok(value),
            _ => Err(UserError::new(format!(
                "\"{name}\" parameter needs to be of type object."
            ))),
        }
    }
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), UserError>> + Send>>;
pub type Handler = fn(Arc<Server>, Arc<Connection>, Params) -> HandlerFuture;

struct Command {
    handler: Handler,
    parameters: Vec<(&'static str, ParamKind)>,
}

#[derive(Default)]
pub struct Dispatcher {
    commands: HashMap<&'static str, Command>,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        Dispatcher::default()
    }

    pub fn register(
        &mut self,
        name: &'static str,
        parameters: Vec<(&'static str, ParamKind)>,
        handler: Handler,
    ) {
        self.commands.insert(
            name,
            Command {
                handler,
                parameters,
            },
        );
    }

    pub async fn dispatch(&self, server: &Arc<Server>, connection: &Arc<Connection>, raw: &str) {
        let Ok(data) = serde_json::from_str::<Value>(raw) else {
            connection.show_error("Invalid JSON");
            return;
        };

        let Some(command_name) = data.get("command").and_then(Value::as_str) else {
            connection.show_error("Command Not Specified");
            return;
        };

        let Some(command) = self.commands.get(command_name) else {
            connection.show_error("Command Not Found");
            return;
        };

        let supplied = data.get("parameters").and_then(Value::as_object);
        if !command.parameters.is_empty() && supplied.is_none() {
            let names: Vec<&str> = command.parameters.iter().map(|(name, _)| *name).collect();
            connection.show_error(&format!(
                "This command requires the following parameters: {}.",
                names.join(", ")
            ));
            return;
        }

        let empty = Map::new();
        let supplied = supplied.unwrap_or(&empty);

        let mut bound = HashMap::new();
        for (name, kind) in &command.parameters {
            let Some(value) = supplied.get(*name) else {
                connection.show_error(&format!("\"{name}\" parameter not specified."));
                return;
            };
            if !kind.matches(value) {
                connection.show_error(&format!(
                    "\"{name}\" parameter needs to be of type {}.",
                    kind.name()
                ));
                return;
            }

            let value = match kind {
                ParamKind::Int => ParamValue::Int(value.as_i64().unwrap_or_default()),
                ParamKind::Str => {
                    ParamValue::Str(value.as_str().unwrap_or_default().to_string())
                }
                ParamKind::Bool => ParamValue::Bool(value.as_bool().unwrap_or_default()),
                ParamKind::Object => {
                    ParamValue::Object(value.as_object().cloned().unwrap_or_default())
                }
            };
            bound.insert(*name, value);
        }

        if let Err(UserError(message)) =
            (command.handler)(server.clone(), connection.clone(), Params(bound)).await
        {
            connection.show_error(&message);
        }
    }
}
