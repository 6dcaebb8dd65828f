//! Detection and normalization of user supplied payloads
use base64::{Engine, engine::general_purpose::STANDARD_NO_PAD};
use num_bigint::BigUint;
use serde::Serialize;
use strum::Display;
use tonpeek_ton::Coins;
use url::Url;

use crate::Error;

/// Shape of the raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadFormat {
    /// `ton://transfer/...` deep link
    #[strum(serialize = "ton:// URL")]
    TonUri,
    /// `http(s)` link mentioning tonconnect
    #[strum(serialize = "tonconnect URL")]
    TonConnectUrl,
    /// BoC as hex, `0x` prefix optional
    #[strum(serialize = "hex")]
    Hex,
    /// BoC as standard or URL-safe base64
    #[strum(serialize = "base64")]
    Base64,
}

/// Transfer parameters found in the query of a link
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriDetails {
    /// `boc` or `payload`, still encoded
    pub boc: Option<String>,
    /// `address` or `to`, or the path of `ton://transfer/<address>`
    pub address: Option<String>,
    /// `amount` in nanotons
    pub amount: Option<Coins>,
    /// `text` or `comment`
    pub text: Option<String>,
}

impl UriDetails {
    pub fn parse(uri: &str) -> Result<Self, Error> {
        let url = Url::parse(uri).map_err(|err| Error::InvalidEncoding(format!("URI: {err}")))?;

        let address = param(&url, &["address", "to"]).or_else(|| {
            (url.host_str() == Some("transfer"))
                .then(|| url.path().trim_matches('/'))
                .filter(|path| !path.is_empty())
                .map(str::to_owned)
        });

        Ok(Self {
            // query decoding turns '+' into ' ', which is never valid base64
            boc: param(&url, &["boc", "payload"]).map(|boc| boc.replace(' ', "+")),
            address,
            amount: param(&url, &["amount"])
                .and_then(|amount| amount.parse::<BigUint>().ok())
                .map(Coins::from_nano),
            text: param(&url, &["text", "comment"]),
        })
    }

    /// Whether the link carries anything a record can be built from
    #[inline]
    pub fn has_transfer(&self) -> bool {
        self.address.is_some() || self.amount.is_some()
    }
}

/// First non-empty value of the first key present
fn param(url: &Url, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        url.query_pairs()
            .find(|(k, _)| k == *key)
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    })
}

/// Input normalized to BoC bytes and link parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadInput {
    pub format: PayloadFormat,
    pub boc: Option<Vec<u8>>,
    pub uri: Option<UriDetails>,
}

impl PayloadInput {
    /// Classifies `input`. Hex is checked before base64 since every hex
    /// string also fits the base64 alphabet.
    pub fn detect(input: &str) -> Result<PayloadFormat, Error> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::FormatDetectionFailure("no input provided".into()));
        }
        if input.starts_with("ton://") {
            return Ok(PayloadFormat::TonUri);
        }
        if (input.starts_with("http://") || input.starts_with("https://"))
            && input.contains("tonconnect")
        {
            return Ok(PayloadFormat::TonConnectUrl);
        }
        if is_hex(input) {
            return Ok(PayloadFormat::Hex);
        }
        if is_base64(input) {
            return Ok(PayloadFormat::Base64);
        }
        Err(Error::FormatDetectionFailure(
            "expected BoC as base64 or hex, or a ton:// URL".into(),
        ))
    }

    pub fn parse(input: &str) -> Result<Self, Error> {
        let input = input.trim();
        let format = Self::detect(input)?;
        let (boc, uri) = match format {
            PayloadFormat::TonUri | PayloadFormat::TonConnectUrl => {
                let uri = UriDetails::parse(input)?;
                let boc = uri.boc.as_deref().map(decode_base64).transpose()?;
                (boc, Some(uri))
            }
            PayloadFormat::Hex => (Some(decode_hex(input)?), None),
            PayloadFormat::Base64 => (Some(decode_base64(input)?), None),
        };
        Ok(Self { format, boc, uri })
    }
}

fn is_hex(s: &str) -> bool {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    !digits.is_empty() && digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

fn decode_hex(s: &str) -> Result<Vec<u8>, Error> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
        .map_err(|err| Error::InvalidEncoding(format!("hex: {err}")))
}

/// Drops whitespace and a leading `data:...;base64,`
fn clean_base64(s: &str) -> String {
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    match s.rfind(";base64,") {
        Some(at) if s.starts_with("data:") => s[at + ";base64,".len()..].to_owned(),
        _ => s,
    }
}

fn is_base64(s: &str) -> bool {
    let s = clean_base64(s);
    let body = s.trim_end_matches('=');
    s.len() > 8
        && s.len() - body.len() <= 2
        && !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'-' | b'_'))
}

/// Decodes both alphabets, with or without padding
fn decode_base64(s: &str) -> Result<Vec<u8>, Error> {
    let s: String = clean_base64(s)
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    if s.len() % 4 == 1 {
        return Err(Error::InvalidEncoding("base64: invalid length".into()));
    }
    STANDARD_NO_PAD
        .decode(s)
        .map_err(|err| Error::InvalidEncoding(format!("base64: {err}")))
}
