//! Service bindings and the registry the factory resolves them from.
//!
//! A [`ServiceRegistry`] is an explicit object owned by the application and handed
//! to the factory; runtime registration is supported but there is no implicit
//! process-wide table and no silent `"default"` fallback. Callers wanting a
//! default binding register one under the literal `"default"` id and request it
//! explicitly.

// self
use crate::_prelude::*;

/// Authentication kind a service is bound to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
	/// Static username/password credentials.
	#[default]
	Basic,
	/// Three-legged OAuth 1.0a delegated authorization.
	#[serde(rename = "oauth")]
	OAuth,
	/// Catch-all for kinds this crate does not recognize; the factory treats
	/// these as [`AuthKind::Basic`], the historical fallback policy.
	#[serde(other)]
	Unrecognized,
}

/// Endpoint and consumer configuration for an OAuth-bound service.
///
/// Immutable once registered. The registry shares options with strategies by
/// reference counting; strategies never copy or mutate them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthOptions {
	/// Consumer key issued by the service provider.
	pub consumer_key: String,
	/// Consumer secret issued by the service provider.
	pub consumer_secret: String,
	/// Request-token endpoint.
	pub request_url: Url,
	/// User-facing authorization endpoint.
	pub authorization_url: Url,
	/// Access-token endpoint.
	pub access_url: Url,
}

/// Registry entry binding a service id to an authentication kind.
///
/// No shape validation happens at registration time; an OAuth binding without
/// options only surfaces as an error when [`create`](crate::strategy::AuthFactory::create)
/// is called for it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceBinding {
	/// Bound authentication kind.
	pub kind: AuthKind,
	/// OAuth configuration, required only when `kind` is [`AuthKind::OAuth`].
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub oauth: Option<Arc<OAuthOptions>>,
}
impl ServiceBinding {
	/// Creates a Basic binding.
	pub fn basic() -> Self {
		Self { kind: AuthKind::Basic, oauth: None }
	}

	/// Creates an OAuth binding carrying the provided options.
	pub fn oauth(options: OAuthOptions) -> Self {
		Self { kind: AuthKind::OAuth, oauth: Some(Arc::new(options)) }
	}
}

/// Mutable service-to-binding registry consulted by the factory.
///
/// Internally locked, so runtime registration from multiple threads is safe.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
	bindings: RwLock<HashMap<String, ServiceBinding>>,
}
impl ServiceRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a registry preloaded with the provided bindings.
	pub fn with_bindings(
		bindings: impl IntoIterator<Item = (String, ServiceBinding)>,
	) -> Self {
		Self { bindings: RwLock::new(bindings.into_iter().collect()) }
	}

	/// Inserts or overwrites the binding for `service`.
	pub fn register(&self, service: impl Into<String>, binding: ServiceBinding) {
		self.bindings.write().insert(service.into(), binding);
	}

	/// Returns the binding registered for `service`, if any.
	pub fn binding(&self, service: &str) -> Option<ServiceBinding> {
		self.bindings.read().get(service).cloned()
	}

	/// Checks whether `service` has a registered binding.
	pub fn contains(&self, service: &str) -> bool {
		self.bindings.read().contains_key(service)
	}

	/// Returns the registered service ids, sorted.
	pub fn services(&self) -> Vec<String> {
		let mut ids: Vec<_> = self.bindings.read().keys().cloned().collect();

		ids.sort();

		ids
	}
}
