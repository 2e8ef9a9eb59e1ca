//! Interface between actions and the framework that dispatched them.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

use crate::envelope::ResponseRecord;

#[derive(Debug, Error)]
pub enum ArgsError {
	#[error("action requires arguments")]
	Missing,
	#[error("invalid action arguments: {0}")]
	Invalid(#[from] serde_json::Error)
}

#[derive(Debug, Error)]
#[error("could not serialize response: {0}")]
pub struct ResponseError(#[from] serde_json::Error);

/// What a response record stands for.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
	/// One of possibly many result records, such as a search hit.
	Record,
	/// The single record describing the outcome of the whole action.
	Summary
}

/// Services an action gets from the dispatching framework.
///
/// An action either emits its responses or reports one error through [`set_error`](ActionContext::set_error), never both.
pub trait ActionContext {
	/// Parses the typed arguments of the action.
	fn populate_args<T: DeserializeOwned>(&mut self) -> Result<T, ArgsError>;

	/// Emits one response record.
	fn send_response<R: Serialize>(&mut self, record: &R, kind: ResponseKind) -> Result<(), ResponseError>;

	/// Aborts the action with an error message.
	fn set_error(&mut self, message: String);
}

/// Context backed by JSON arguments, collecting responses in memory.
pub struct JsonContext<'a> {
	args: Option<&'a RawValue>,
	responses: Vec<ResponseRecord>,
	error: Option<String>
}
impl<'a> JsonContext<'a> {
	pub fn new(args: Option<&'a RawValue>) -> Self {
		JsonContext {
			args,
			responses: Vec::new(),
			error: None
		}
	}

	pub fn responses(&self) -> &[ResponseRecord] {
		&self.responses
	}

	pub fn error(&self) -> Option<&str> {
		self.error.as_deref()
	}

	/// Returns the collected responses, or the error if one was set.
	pub fn finish(self) -> Result<Vec<ResponseRecord>, String> {
		match self.error {
			Some(error) => Err(error),
			None => Ok(self.responses)
		}
	}
}
impl<'a> ActionContext for JsonContext<'a> {
	fn populate_args<T: DeserializeOwned>(&mut self) -> Result<T, ArgsError> {
		let args = self.args.ok_or(ArgsError::Missing)?;

		Ok(serde_json::from_str(args.get())?)
	}

	fn send_response<R: Serialize>(&mut self, record: &R, kind: ResponseKind) -> Result<(), ResponseError> {
		let record = serde_json::to_value(record)?;
		self.responses.push(ResponseRecord { kind, record });

		Ok(())
	}

	fn set_error(&mut self, message: String) {
		debug_assert!(self.error.is_none(), "error set twice");

		// a failed action must not leave partial output behind
		self.responses.clear();
		self.error = Some(message);
	}
}
