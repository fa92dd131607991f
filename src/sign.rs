//! OAuth 1.0a signing primitives.
//!
//! Everything needed to turn a request into a signed parameter set lives here:
//! RFC 3986 percent-encoding, form decoding, signature base-string assembly,
//! HMAC-SHA1 signing, and `Authorization` header formatting. The strategies call
//! into this module; nothing here performs I/O.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
// self
use crate::_prelude::*;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters survive encoding; everything else is escaped.
const UNRESERVED: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');
const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LEN: usize = 16;

/// Credentials used to key request signatures.
///
/// During the request-token phase only the consumer pair exists; the token side
/// is attached once a request or access token is available.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningCredentials {
	/// Consumer key identifying the client application.
	pub consumer_key: String,
	/// Consumer secret keying the signature.
	pub consumer_secret: String,
	/// Token identifier (request token or access token), when one exists.
	pub token: Option<String>,
	/// Secret paired with [`token`](Self::token).
	pub token_secret: Option<String>,
}
impl SigningCredentials {
	/// Creates consumer-only credentials for the request-token phase.
	pub fn consumer(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { consumer_key: key.into(), consumer_secret: secret.into(), token: None, token_secret: None }
	}

	/// Attaches a token pair (request token during the exchange, access token afterwards).
	pub fn with_token(mut self, token: impl Into<String>, secret: impl Into<String>) -> Self {
		self.token = Some(token.into());
		self.token_secret = Some(secret.into());

		self
	}
}

/// Percent-encodes `value` per RFC 3986 (only `A-Z a-z 0-9 - . _ ~` survive).
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Decodes a form-encoded body (`name=value&…`) into ordered pairs.
///
/// `+` is treated as a space, empty segments are skipped, and a segment without
/// `=` decodes to an empty value.
pub fn decode_form(body: &str) -> Vec<(String, String)> {
	body.split('&')
		.filter(|segment| !segment.is_empty())
		.map(|segment| {
			let (name, value) = segment.split_once('=').unwrap_or((segment, ""));

			(decode_component(name), decode_component(value))
		})
		.collect()
}

/// Returns the first value bound to `name` in decoded form pairs.
pub fn form_value<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
	pairs.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
}

/// Signs a request over a copy of `parameters`.
///
/// The caller's map is never mutated. The returned map carries the original
/// parameters plus the `oauth_*` protocol parameters including `oauth_signature`.
pub fn sign(
	method: &str,
	url: &Url,
	parameters: &BTreeMap<String, String>,
	credentials: &SigningCredentials,
) -> BTreeMap<String, String> {
	sign_at(method, url, parameters, credentials, &nonce(), OffsetDateTime::now_utc().unix_timestamp())
}

/// Deterministic variant of [`sign`] taking an explicit nonce and timestamp.
pub(crate) fn sign_at(
	method: &str,
	url: &Url,
	parameters: &BTreeMap<String, String>,
	credentials: &SigningCredentials,
	nonce: &str,
	timestamp: i64,
) -> BTreeMap<String, String> {
	let mut signed = parameters.clone();

	signed.insert("oauth_consumer_key".into(), credentials.consumer_key.clone());
	signed.insert("oauth_nonce".into(), nonce.to_owned());
	signed.insert("oauth_signature_method".into(), SIGNATURE_METHOD.into());
	signed.insert("oauth_timestamp".into(), timestamp.to_string());
	signed.insert("oauth_version".into(), OAUTH_VERSION.into());

	if let Some(token) = &credentials.token {
		signed.insert("oauth_token".into(), token.clone());
	}

	let base = base_string(method, url, &signed);
	let key = format!(
		"{}&{}",
		percent_encode(&credentials.consumer_secret),
		percent_encode(credentials.token_secret.as_deref().unwrap_or_default()),
	);
	let mut mac =
		HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC-SHA1 accepts keys of any length.");

	mac.update(base.as_bytes());
	signed.insert("oauth_signature".into(), BASE64.encode(mac.finalize().into_bytes()));

	signed
}

/// Formats the realm-scoped `Authorization` header value.
///
/// Only `oauth_`-prefixed parameters are emitted; request parameters stay in the
/// query string or body where they came from.
pub fn authorization_header(realm: &str, signed: &BTreeMap<String, String>) -> String {
	let mut buf = format!("OAuth realm=\"{}\"", percent_encode(realm));

	for (name, value) in signed {
		if name.starts_with("oauth_") {
			buf.push_str(", ");
			buf.push_str(name);
			buf.push_str("=\"");
			buf.push_str(&percent_encode(value));
			buf.push('"');
		}
	}

	buf
}

/// Assembles the signature base string: `METHOD&enc(base-url)&enc(sorted-params)`.
///
/// Query pairs from the URL participate in the normalized parameter set;
/// `oauth_signature` itself never does.
pub(crate) fn base_string(method: &str, url: &Url, parameters: &BTreeMap<String, String>) -> String {
	let mut pairs: Vec<(String, String)> = parameters
		.iter()
		.filter(|(name, _)| name.as_str() != "oauth_signature")
		.map(|(name, value)| (percent_encode(name), percent_encode(value)))
		.collect();

	pairs.extend(url.query_pairs().map(|(name, value)| (percent_encode(&name), percent_encode(&value))));
	pairs.sort();

	let normalized =
		pairs.iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(&base_url(url)),
		percent_encode(&normalized),
	)
}

// Scheme and host arrive lowercased from `Url`; default ports are already elided.
fn base_url(url: &Url) -> String {
	let mut buf = format!("{}://", url.scheme());

	if let Some(host) = url.host_str() {
		buf.push_str(host);
	}
	if let Some(port) = url.port() {
		buf.push(':');
		buf.push_str(&port.to_string());
	}

	buf.push_str(url.path());

	buf
}

fn decode_component(raw: &str) -> String {
	let unplussed = raw.replace('+', " ");

	percent_decode_str(&unplussed).decode_utf8_lossy().into_owned()
}

fn nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse successfully.")
	}

	fn consumer() -> SigningCredentials {
		SigningCredentials::consumer("consumer-key", "consumer-secret")
	}

	#[test]
	fn percent_encoding_keeps_unreserved_and_escapes_the_rest() {
		assert_eq!(percent_encode("abcXYZ012-._~"), "abcXYZ012-._~");
		assert_eq!(percent_encode("a b"), "a%20b");
		assert_eq!(percent_encode("+&="), "%2B%26%3D");
		assert_eq!(percent_encode("caf\u{e9}"), "caf%C3%A9");
	}

	#[test]
	fn form_decoding_handles_plus_and_escapes() {
		let pairs = decode_form("oauth_token=T&oauth_token_secret=S");

		assert_eq!(form_value(&pairs, "oauth_token"), Some("T"));
		assert_eq!(form_value(&pairs, "oauth_token_secret"), Some("S"));
		assert_eq!(form_value(&pairs, "missing"), None);

		let pairs = decode_form("a+b=c%20d&empty=&bare");

		assert_eq!(form_value(&pairs, "a b"), Some("c d"));
		assert_eq!(form_value(&pairs, "empty"), Some(""));
		assert_eq!(form_value(&pairs, "bare"), Some(""));
	}

	#[test]
	fn base_string_sorts_and_merges_query_pairs() {
		let params = BTreeMap::from_iter([("a".to_owned(), "1".to_owned())]);
		let base = base_string("post", &url("http://example.com:8080/req?b=2"), &params);

		assert_eq!(base, "POST&http%3A%2F%2Fexample.com%3A8080%2Freq&a%3D1%26b%3D2");
	}

	#[test]
	fn base_string_excludes_prior_signature_and_default_ports() {
		let params = BTreeMap::from_iter([
			("oauth_signature".to_owned(), "stale".to_owned()),
			("z".to_owned(), "9".to_owned()),
		]);
		let base = base_string("GET", &url("https://example.com:443/resource"), &params);

		assert_eq!(base, "GET&https%3A%2F%2Fexample.com%2Fresource&z%3D9");
	}

	#[test]
	fn hmac_sha1_matches_rfc_2202_vector() {
		let mut mac = HmacSha1::new_from_slice(&[0x0B; 20])
			.expect("HMAC-SHA1 accepts keys of any length.");

		mac.update(b"Hi There");

		let digest = mac.finalize().into_bytes();

		assert_eq!(digest.as_slice(), &[
			0xB6, 0x17, 0x31, 0x86, 0x55, 0x05, 0x72, 0x64, 0xE2, 0x8B, 0xC0, 0xB6, 0xFB, 0x37,
			0x8C, 0x8E, 0xF1, 0x46, 0xBE, 0x00,
		]);
	}

	#[test]
	fn sign_injects_protocol_parameters_without_touching_the_caller() {
		let params = BTreeMap::from_iter([("status".to_owned(), "hello world".to_owned())]);
		let before = params.clone();
		let signed = sign("POST", &url("https://example.com/update"), &params, &consumer());

		assert_eq!(params, before);
		assert_eq!(signed.get("status").map(String::as_str), Some("hello world"));
		assert_eq!(
			signed.get("oauth_consumer_key").map(String::as_str),
			Some("consumer-key")
		);
		assert_eq!(
			signed.get("oauth_signature_method").map(String::as_str),
			Some(SIGNATURE_METHOD)
		);
		assert_eq!(signed.get("oauth_version").map(String::as_str), Some(OAUTH_VERSION));
		assert_eq!(signed.get("oauth_nonce").map(String::len), Some(NONCE_LEN));
		assert!(!signed.contains_key("oauth_token"), "Consumer-only signing must omit oauth_token.");

		// Base64 of a 20-byte HMAC-SHA1 digest is always 28 characters.
		let signature =
			signed.get("oauth_signature").expect("Signed parameters should carry a signature.");

		assert_eq!(signature.len(), 28);
	}

	#[test]
	fn sign_includes_token_when_credentials_carry_one() {
		let credentials = consumer().with_token("token-key", "token-secret");
		let signed = sign("GET", &url("https://example.com/verify"), &BTreeMap::new(), &credentials);

		assert_eq!(signed.get("oauth_token").map(String::as_str), Some("token-key"));
	}

	#[test]
	fn signature_is_stable_for_fixed_nonce_and_timestamp() {
		let params = BTreeMap::from_iter([("q".to_owned(), "rust".to_owned())]);
		let first = sign_at(
			"GET",
			&url("https://example.com/search"),
			&params,
			&consumer(),
			"fixed-nonce",
			1_300_000_000,
		);
		let second = sign_at(
			"GET",
			&url("https://example.com/search"),
			&params,
			&consumer(),
			"fixed-nonce",
			1_300_000_000,
		);

		assert_eq!(first, second);
	}

	#[test]
	fn authorization_header_carries_only_oauth_parameters() {
		let params = BTreeMap::from_iter([("status".to_owned(), "hello".to_owned())]);
		let signed = sign("POST", &url("https://example.com/update"), &params, &consumer());
		let header = authorization_header("example", &signed);

		assert!(header.starts_with("OAuth realm=\"example\""));
		assert!(header.contains("oauth_consumer_key=\"consumer-key\""));
		assert!(header.contains("oauth_signature=\""));
		assert!(!header.contains("status"), "Request parameters must stay out of the header.");
	}
}
