//! Single-slot in-memory token cache.

// self
use crate::{_prelude::*, auth::TokenRecord};

/// Holds at most one [`TokenRecord`].
///
/// The slot is replaced wholesale; readers either see the previous record or the new one,
/// never a mix. The lock is only held for the copy in or out, never across an `.await`.
#[derive(Debug, Default)]
pub struct TokenCache(RwLock<Option<TokenRecord>>);
impl TokenCache {
	/// Returns the cached record if it is still usable at `now`.
	pub fn current(&self, now: OffsetDateTime) -> Option<TokenRecord> {
		self.0.read().as_ref().filter(|record| record.is_usable_at(now)).cloned()
	}

	/// Returns the cached record regardless of expiry.
	pub fn peek(&self) -> Option<TokenRecord> {
		self.0.read().clone()
	}

	/// Stores `record`, discarding whatever was cached before.
	pub fn replace(&self, record: TokenRecord) {
		*self.0.write() = Some(record);
	}

	/// Empties the slot.
	pub fn clear(&self) {
		self.0.write().take();
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn record(token: &str, issued: OffsetDateTime, expires_in: i64) -> TokenRecord {
		TokenRecord::builder()
			.access_token(token)
			.issued_at(issued)
			.expires_in(Duration::seconds(expires_in))
			.build()
			.expect("Token record fixture should build.")
	}

	#[test]
	fn empty_cache_yields_nothing() {
		let cache = TokenCache::default();

		assert!(cache.current(OffsetDateTime::now_utc()).is_none());
		assert!(cache.peek().is_none());
	}

	#[test]
	fn expired_records_are_hidden_but_kept() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let cache = TokenCache::default();

		cache.replace(record("first", issued, 120));

		assert!(cache.current(issued + Duration::seconds(59)).is_some());
		assert!(cache.current(issued + Duration::seconds(61)).is_none());
		assert!(cache.peek().is_some());
	}

	#[test]
	fn replace_overwrites_whole_record() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let cache = TokenCache::default();

		cache.replace(record("first", issued, 3_600));
		cache.replace(record("second", issued + Duration::minutes(5), 120));

		let current = cache.current(issued + Duration::minutes(5)).expect("Record should be live.");

		assert_eq!(current.access_token.expose(), "second");
		assert_eq!(current.expires_at, issued + Duration::minutes(6));

		cache.clear();

		assert!(cache.peek().is_none());
	}
}
