use core::fmt::{self, Display};

use serde::{Serialize, Serializer};
use tonpeek_boc::BagOfCells;
use tonpeek_ton::{Extraction, MessageRecord, extract};
use tracing::debug;

use crate::{
    Action, ActionFields, Config, Error, HashInfo, PayloadFormat, PayloadInput, Protocol, hash_info,
};

/// How the messages of a [`DecodedPayload`] were obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Link without BoC, single record built from its parameters
    ParsedFromUri,
    Parsed { count: usize },
    /// Valid BoC without any internal message
    NoInternalMessages,
    /// Valid BoC whose internal messages all failed to parse
    Unparsed { skipped: usize, cause: String },
    /// Neither BoC nor transfer parameters
    NoPayload,
}

impl Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParsedFromUri => write!(f, "parsed from ton:// URL parameters"),
            Self::Parsed { count: 1 } => write!(f, "parsed 1 internal message"),
            Self::Parsed { count } => write!(f, "parsed {count} internal messages"),
            Self::NoInternalMessages => write!(f, "parsed but no internal messages found"),
            Self::Unparsed { skipped, cause } => write!(
                f,
                "could not parse {skipped} internal message candidate(s): {cause}"
            ),
            Self::NoPayload => write!(f, "no BoC provided"),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Report on a single payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedPayload {
    pub source: PayloadFormat,
    /// Hash of the first root, `None` without BoC
    pub hash: Option<HashInfo>,
    pub messages: Vec<MessageRecord>,
    /// One per message, or a single placeholder when there are none
    pub actions: Vec<Action>,
    pub reason: Reason,
}

/// Detects the input format, decodes the BoC if any, extracts internal
/// messages and classifies each of them.
///
/// Container errors are returned as is, while messages failing to parse
/// are left out of the report. When none is left the first failure is
/// reported as [`Reason::Unparsed`].
pub fn decode_payload(input: &str, config: &Config) -> Result<DecodedPayload, Error> {
    let input = PayloadInput::parse(input)?;
    debug!(format = %input.format, has_boc = input.boc.is_some(), "payload detected");

    let (hash, messages, reason) = match (&input.boc, &input.uri) {
        (Some(bytes), _) => {
            let boc = BagOfCells::decode(bytes, &config.decoder)?;
            let hash = boc.roots().first().map(|root| hash_info(root));
            let Extraction { records, skipped } = extract(boc.roots(), &config.extractor);
            let reason = match (records.len(), skipped.first()) {
                (0, None) => Reason::NoInternalMessages,
                (0, Some(err)) => Reason::Unparsed {
                    skipped: skipped.len(),
                    cause: err.to_string(),
                },
                (count, _) => Reason::Parsed { count },
            };
            (hash, records, reason)
        }
        (None, Some(uri)) if uri.has_transfer() => {
            let record = MessageRecord {
                to_address: uri.address.clone(),
                value: uri.amount.clone(),
                comment: uri.text.clone(),
                ..Default::default()
            };
            (None, vec![record], Reason::ParsedFromUri)
        }
        _ => (None, Vec::new(), Reason::NoPayload),
    };
    debug!(%reason, "payload decoded");

    let mut actions: Vec<_> = messages
        .iter()
        .map(|record| config.protocols.dispatch(record))
        .collect();
    if actions.is_empty() {
        actions.push(Action {
            protocol: Protocol::Unknown,
            action: "No actionable message".into(),
            fields: ActionFields::default(),
            summary: reason.to_string(),
            notes: Some("verify this payload manually".into()),
        });
    }

    Ok(DecodedPayload {
        source: input.format,
        hash,
        messages,
        actions,
        reason,
    })
}
