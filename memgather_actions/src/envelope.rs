//! Envelope in which action requests arrive and replies leave.
//!
//! A request names the action, carries its still unparsed arguments and an optional client id:
//! `{"action": "TransferBuffer", "args": {...}, "id": 1}`.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::context::ResponseKind;

/// Client id that is used to match requests and replies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ClientId<'a> {
	String(#[serde(borrow)] Cow<'a, str>),
	Number(isize)
}

#[derive(Deserialize, Debug)]
pub struct Request<'a> {
	/// Name of the action to run.
	pub action: &'a str,
	/// Arguments of the action. To be parsed once the action is known.
	#[serde(borrow, default)]
	pub args: Option<&'a RawValue>,
	/// Client identifier that will be included in the reply.
	#[serde(borrow, default)]
	pub id: Option<ClientId<'a>>
}
impl<'a> Request<'a> {
	pub fn from_json_str(value: &'a str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(value)
	}
}

/// One record emitted by an action.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResponseRecord {
	pub kind: ResponseKind,
	pub record: serde_json::Value
}

/// Everything an action produced, serialized back to the requester.
///
/// Exactly one of `responses` and `error` is meaningful: an action that failed emits no records.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Reply<'a> {
	#[serde(borrow)]
	pub id: Option<ClientId<'a>>,
	pub action: Cow<'a, str>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub responses: Vec<ResponseRecord>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>
}
impl<'a> Reply<'a> {
	pub fn into_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	pub fn is_success(&self) -> bool {
		self.error.is_none()
	}
}

#[cfg(test)]
mod test {
	use super::{ClientId, Request};

	#[test]
	fn test_request_parse() {
		let request =
			Request::from_json_str(r#"{"action": "HashBuffer", "args": {"path": "/x", "length": 5}, "id": "a"}"#)
				.unwrap();

		assert_eq!(request.action, "HashBuffer");
		assert_eq!(request.args.unwrap().get(), r#"{"path": "/x", "length": 5}"#);
		assert_eq!(request.id, Some(ClientId::String("a".into())));
	}

	#[test]
	fn test_request_parse_minimal() {
		let request = Request::from_json_str(r#"{"action": "Find"}"#).unwrap();

		assert!(request.args.is_none());
		assert!(request.id.is_none());
	}
}
