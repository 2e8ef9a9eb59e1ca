use std::borrow::Cow;

use crate::{
	actions::{
		find::Find,
		run_action,
		search::SearchContent,
		transfer::{HashBuffer, TransferBuffer},
		Action
	},
	config::AgentConfig,
	context::JsonContext,
	envelope::{Reply, Request}
};

/// Names of all actions the dispatcher knows.
pub fn action_names() -> Vec<&'static str> {
	let mut names = vec![SearchContent::NAME, HashBuffer::NAME, TransferBuffer::NAME, Find::NAME];

	#[cfg(target_os = "linux")]
	names.insert(0, crate::actions::dump::DumpProcessMemory::NAME);

	names
}

/// Routes requests to actions configured from an [`AgentConfig`].
pub struct Dispatcher {
	config: AgentConfig
}
impl Dispatcher {
	pub fn new(config: AgentConfig) -> Self {
		Dispatcher { config }
	}

	pub fn config(&self) -> &AgentConfig {
		&self.config
	}

	/// Runs the requested action to completion.
	pub fn dispatch<'a>(&self, request: &Request<'a>) -> Reply<'a> {
		log::debug!("dispatching {}", request.action);

		let mut context = JsonContext::new(request.args);
		let error = if self.run_named(request.action, &mut context) {
			None
		} else {
			Some(format!("unknown action {:?}", request.action))
		};

		let (responses, error) = match (context.finish(), error) {
			(_, Some(error)) => (Vec::new(), Some(error)),
			(Ok(responses), None) => (responses, None),
			(Err(error), None) => (Vec::new(), Some(error))
		};

		Reply {
			id: request.id.clone(),
			action: Cow::Borrowed(request.action),
			responses,
			error
		}
	}

	/// Parses a request, runs it and serializes the reply.
	///
	/// A request that cannot be parsed still gets a reply, without id.
	pub fn dispatch_json(&self, request: &str) -> Result<String, serde_json::Error> {
		match Request::from_json_str(request) {
			Ok(request) => self.dispatch(&request).into_json(),
			Err(err) => {
				log::warn!("malformed request: {}", err);

				Reply {
					id: None,
					action: Cow::Borrowed(""),
					responses: Vec::new(),
					error: Some(format!("malformed request: {}", err))
				}
				.into_json()
			}
		}
	}

	/// Returns whether `name` is a known action.
	fn run_named(&self, name: &str, context: &mut JsonContext) -> bool {
		#[cfg(target_os = "linux")]
		{
			use crate::actions::dump::DumpProcessMemory;

			if name == DumpProcessMemory::NAME {
				let action = DumpProcessMemory {
					config: self.config.dump_config()
				};
				run_action(&action, context);
				return true
			}
		}

		if name == SearchContent::NAME {
			let action = SearchContent {
				config: self.config.search_config()
			};
			run_action(&action, context);
		} else if name == HashBuffer::NAME {
			run_action(&HashBuffer, context);
		} else if name == TransferBuffer::NAME {
			run_action(&TransferBuffer, context);
		} else if name == Find::NAME {
			run_action(&Find, context);
		} else {
			return false
		}

		true
	}
}

#[cfg(test)]
mod test {
	use super::{action_names, Dispatcher};
	use crate::{config::AgentConfig, envelope::Request};

	#[test]
	fn test_unknown_action() {
		let dispatcher = Dispatcher::new(AgentConfig::default());
		let request = Request::from_json_str(r#"{"action": "Reboot", "id": 7}"#).unwrap();

		let reply = dispatcher.dispatch(&request);
		assert!(!reply.is_success());
		assert!(reply.responses.is_empty());
		assert_eq!(reply.error.as_deref(), Some("unknown action \"Reboot\""));
	}

	#[test]
	fn test_malformed_request() {
		let dispatcher = Dispatcher::new(AgentConfig::default());
		let reply = dispatcher.dispatch_json("{\"args\": 1}").unwrap();

		assert!(reply.contains("malformed request"));
	}

	#[test]
	fn test_missing_args() {
		let dispatcher = Dispatcher::new(AgentConfig::default());
		let request = Request::from_json_str(r#"{"action": "HashBuffer"}"#).unwrap();

		let reply = dispatcher.dispatch(&request);
		assert_eq!(reply.error.as_deref(), Some("action requires arguments"));
	}

	#[test]
	fn test_action_names() {
		let names = action_names();

		assert!(names.contains(&"SearchContent"));
		assert!(names.contains(&"Find"));
	}
}
