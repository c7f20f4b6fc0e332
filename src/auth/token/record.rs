//! Immutable token records and the builder that applies the expiry safety margin.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Lifecycle status of a cached token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// Token may be sent upstream.
	Active,
	/// Token reached (or passed) its adjusted expiry and must be replaced.
	Expired,
}

/// Errors produced by [`TokenRecordBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenRecordBuilderError {
	/// Issued when the access token is absent or empty.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no lifetime was configured.
	#[error("Token lifetime (expires_in) is required.")]
	MissingExpiry,
	/// Issued when the upstream lifetime is zero or negative.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// Issued when the adjusted expiry falls outside the representable date range.
	#[error("The expires_in value is out of range.")]
	ExpiryOutOfRange,
}

/// Cached access token plus the instant after which it must not be used.
///
/// `expires_at` already has [`TokenRecord::SAFETY_MARGIN`] subtracted, so callers compare it
/// against the current instant directly.
#[derive(Clone)]
pub struct TokenRecord {
	/// Bearer token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Instant the token request was issued.
	pub issued_at: OffsetDateTime,
	/// Adjusted expiry instant.
	pub expires_at: OffsetDateTime,
}
impl TokenRecord {
	/// Amount shaved off the upstream lifetime to absorb clock skew and request latency.
	pub const SAFETY_MARGIN: Duration = Duration::seconds(60);

	/// Returns a builder for a freshly issued token.
	pub fn builder() -> TokenRecordBuilder {
		TokenRecordBuilder::default()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		if instant < self.expires_at { TokenStatus::Active } else { TokenStatus::Expired }
	}

	/// Returns `true` if the token may still be used at `instant`.
	pub fn is_usable_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), TokenStatus::Active)
	}

	/// Time left before the adjusted expiry, clamped at zero.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		let remaining = self.expires_at - instant;

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
impl Debug for TokenRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRecord")
			.field("access_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`TokenRecord`].
#[derive(Clone, Debug, Default)]
pub struct TokenRecordBuilder {
	access_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenRecordBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the instant the token request was issued.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets the lifetime reported by the token endpoint.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`TokenRecord`].
	///
	/// A lifetime shorter than the safety margin yields a record that is already expired; the
	/// next request simply fetches another token.
	pub fn build(self) -> Result<TokenRecord, TokenRecordBuilderError> {
		let access_token = self
			.access_token
			.filter(|token| !token.is_empty())
			.ok_or(TokenRecordBuilderError::MissingAccessToken)?;
		let expires_in = self.expires_in.ok_or(TokenRecordBuilderError::MissingExpiry)?;

		if !expires_in.is_positive() {
			return Err(TokenRecordBuilderError::NonPositiveExpiresIn);
		}

		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);

		let expires_at = issued_at
			.checked_add(expires_in)
			.and_then(|instant| instant.checked_sub(TokenRecord::SAFETY_MARGIN))
			.ok_or(TokenRecordBuilderError::ExpiryOutOfRange)?;

		Ok(TokenRecord { access_token, issued_at, expires_at })
	}
}
