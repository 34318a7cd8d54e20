//! Parameter-list validation stage
//!
//! RIB parameter lists are `"token" value` pairs. This stage rejects requests
//! whose optional list has an odd length or a key that is not a token.

use crate::rib::error::{Result, RibError};
use crate::rib::pipeline::Stage;
use crate::rib::request::Request;
use crate::rib::values::Value;
use std::any::Any;

#[derive(Debug, Default)]
pub struct ParamListValidator;

impl ParamListValidator {
    pub fn new() -> Self {
        ParamListValidator
    }
}

impl Stage for ParamListValidator {
    fn name(&self) -> &'static str {
        "param-list"
    }

    fn process(&mut self, request: Request) -> Result<Request> {
        if request.optional.len() % 2 != 0 {
            return Err(RibError::BadParamList {
                request: request.name.clone(),
                message: format!(
                    "{} values do not form token/value pairs",
                    request.optional.len()
                ),
            });
        }
        for key in request.optional.iter().step_by(2) {
            if !matches!(key, Value::Token(_) | Value::String(_)) {
                return Err(RibError::BadParamList {
                    request: request.name.clone(),
                    message: format!("expected a token key, found {}", key.type_name()),
                });
            }
        }
        Ok(request)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
