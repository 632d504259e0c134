use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::RwLock;

use glossa_service::{ApiRequest, Service};

/// Shared handle to the dictionary service. Searches without a session
/// run under the read half; everything else, including sliding-token
/// refreshes, takes the write half.
#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RwLock<Service>>,
}
impl AppState {
	pub fn new(config: glossa_config::Config) -> glossa_service::Result<Self> {
		Ok(Self::of(Service::load(config)?))
	}

	pub fn of(service: Service) -> Self {
		Self { service: Arc::new(RwLock::new(service)) }
	}

	pub async fn dispatch(&self, raw: Value) -> Value {
		let request = match ApiRequest::parse(raw) {
			Ok(request) => request,
			Err(e) => return json!({ "success": false, "error": e.to_string() }),
		};
		// drop the read guard before waiting on the write half
		let request = {
			let service = self.service.read().await;

			match service.try_handle_shared(request) {
				Ok(done) => return done,
				Err(request) => request,
			}
		};

		self.service.write().await.handle(request)
	}
}
