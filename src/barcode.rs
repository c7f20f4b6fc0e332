//! Retail barcode normalization to the GTIN-13 form FatSecret indexes.

// self
use crate::_prelude::*;

/// Barcode symbologies accepted by [`Gtin13::normalize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarcodeKind {
	/// Zero-suppressed UPC-E body (6 digits, number system 0, no check digit).
	UpcE,
	/// EAN-8 (8 digits including check digit).
	Ean8,
	/// UPC-A (12 digits including check digit).
	UpcA,
	/// EAN-13 / GTIN-13 (13 digits including check digit).
	Ean13,
}
impl BarcodeKind {
	/// Detects the symbology from the digit count.
	pub fn from_len(len: usize) -> Option<Self> {
		match len {
			6 => Some(Self::UpcE),
			8 => Some(Self::Ean8),
			12 => Some(Self::UpcA),
			13 => Some(Self::Ean13),
			_ => None,
		}
	}

	/// Returns the conventional label for the symbology.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::UpcE => "UPC-E",
			Self::Ean8 => "EAN-8",
			Self::UpcA => "UPC-A",
			Self::Ean13 => "EAN-13",
		}
	}
}
impl Display for BarcodeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Reasons a barcode cannot be normalized.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum BarcodeError {
	/// Input contained something other than ASCII digits.
	#[error("barcode must contain only digits")]
	NonNumeric,
	/// Digit count matches no supported symbology.
	#[error("unsupported barcode length {0}; expected 6, 8, 12, or 13 digits")]
	UnsupportedLength(usize),
	/// Check digit does not match the payload.
	#[error("{0} check digit is invalid")]
	BadCheckDigit(BarcodeKind),
}

/// Validated 13-digit GTIN.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Gtin13(String);
impl Gtin13 {
	/// Normalizes a scanned barcode into GTIN-13.
	///
	/// Surrounding whitespace is ignored. EAN-8 and UPC-A codes are left-padded with zeros,
	/// UPC-E bodies are expanded to UPC-A first and receive a computed check digit.
	pub fn normalize(raw: &str) -> Result<Self, BarcodeError> {
		let digits = raw.trim();

		if !digits.bytes().all(|b| b.is_ascii_digit()) {
			return Err(BarcodeError::NonNumeric);
		}

		let kind = BarcodeKind::from_len(digits.len())
			.ok_or(BarcodeError::UnsupportedLength(digits.len()))?;
		let padded = match kind {
			BarcodeKind::UpcE => {
				let mut body = format!("00{}", expand_upc_e(digits));

				body.push(check_digit(&body));

				body
			},
			_ => format!("{digits:0>13}"),
		};

		if !has_valid_check_digit(&padded) {
			return Err(BarcodeError::BadCheckDigit(kind));
		}

		Ok(Self(padded))
	}

	/// Returns the 13-digit string.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for Gtin13 {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for Gtin13 {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for Gtin13 {
	type Err = BarcodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::normalize(s)
	}
}

// Expands a 6-digit UPC-E body into the 10 manufacturer + product digits of a UPC-A.
fn expand_upc_e(body: &str) -> String {
	let d = body.as_bytes();
	let s = |range: std::ops::Range<usize>| String::from_utf8_lossy(&d[range]).into_owned();

	match d[5] {
		b'0'..=b'2' => format!("{}{}0000{}", s(0..2), d[5] as char, s(2..5)),
		b'3' => format!("{}00000{}", s(0..3), s(3..5)),
		b'4' => format!("{}00000{}", s(0..4), d[4] as char),
		_ => format!("{}0000{}", s(0..5), d[5] as char),
	}
}

fn digit_values(digits: &str) -> impl Iterator<Item = u32> + '_ {
	digits.bytes().map(|b| u32::from(b - b'0'))
}

// Check digit for a 12-digit GTIN-13 payload (weights 1,3,1,3... from the left).
fn check_digit(payload: &str) -> char {
	let sum: u32 = digit_values(payload)
		.enumerate()
		.map(|(idx, value)| if idx % 2 == 0 { value } else { value * 3 })
		.sum();
	let check = (10 - sum % 10) % 10;

	char::from(b'0' + check as u8)
}

fn has_valid_check_digit(gtin: &str) -> bool {
	gtin.len() == 13 && check_digit(&gtin[..12]) == char::from(gtin.as_bytes()[12])
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn accepts_valid_codes_of_every_kind() {
		let cases = [
			("4006381333931", "4006381333931"),
			("036000291452", "0036000291452"),
			("96385074", "0000096385074"),
			("123456", "0012345000065"),
			(" 036000291452\n", "0036000291452"),
		];

		for (raw, expected) in cases {
			let gtin = Gtin13::normalize(raw)
				.unwrap_or_else(|e| panic!("`{raw}` should normalize but failed: {e}"));

			assert_eq!(gtin.as_str(), expected, "normalizing `{raw}`");
		}
	}

	#[test]
	fn upc_e_expansion_follows_last_digit_rule() {
		assert_eq!(expand_upc_e("123450"), "1200000345");
		assert_eq!(expand_upc_e("123453"), "1230000045");
		assert_eq!(expand_upc_e("123454"), "1234000005");
		assert_eq!(expand_upc_e("123457"), "1234500007");
	}

	#[test]
	fn rejects_bad_input() {
		assert_eq!(
			Gtin13::normalize("4006381333932"),
			Err(BarcodeError::BadCheckDigit(BarcodeKind::Ean13))
		);
		assert_eq!(
			Gtin13::normalize("036000291453"),
			Err(BarcodeError::BadCheckDigit(BarcodeKind::UpcA))
		);
		assert_eq!(Gtin13::normalize("12345"), Err(BarcodeError::UnsupportedLength(5)));
		assert_eq!(Gtin13::normalize("03600029145x"), Err(BarcodeError::NonNumeric));
		assert_eq!(Gtin13::normalize(""), Err(BarcodeError::UnsupportedLength(0)));
	}

	#[test]
	fn parses_via_from_str() {
		let gtin: Gtin13 = "96385074".parse().expect("EAN-8 fixture should parse.");

		assert_eq!(gtin.to_string(), "0000096385074");
	}
}
