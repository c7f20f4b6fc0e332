//! Bearer token wrapper that keeps the credential out of logs.

// self
use crate::_prelude::*;

/// Access token issued by the FatSecret token endpoint.
///
/// `Debug` and `Display` both print `<redacted>`; the raw value is only reachable through
/// [`TokenSecret::expose`], which the platform client calls when building the
/// `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` when the upstream handed back an empty token.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_hide_the_token() {
		let secret = TokenSecret::new("fatsecret-bearer");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "fatsecret-bearer");
		assert!(!secret.is_empty());
	}
}
