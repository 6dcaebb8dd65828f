//! Classification of extracted messages into user facing actions
use serde::{Serialize, Serializer};
use strum::Display;
use tonpeek_ton::{Coins, MessageRecord, MsgAddress};

/// Protocol an [`Action`] is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Protocol {
    Transfer,
    #[strum(serialize = "Nominator Pool")]
    NominatorPool,
    Tonstakers,
    #[strum(serialize = "TON Whales")]
    TonWhales,
    Unknown,
}

impl Serialize for Protocol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Message fields an [`Action`] was decided on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionFields {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub value: Option<Coins>,
    pub op_code: Option<u32>,
    pub comment: Option<String>,
}

impl From<&MessageRecord> for ActionFields {
    fn from(record: &MessageRecord) -> Self {
        Self {
            from_address: record.from_address.clone(),
            to_address: record.to_address.clone(),
            value: record.value.clone(),
            op_code: record.op_code,
            comment: record.comment.clone(),
        }
    }
}

/// Human readable interpretation of one message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub protocol: Protocol,
    pub action: String,
    pub fields: ActionFields,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Action {
    /// Plain TON transfer, possibly with a text comment
    fn transfer(record: &MessageRecord, value: &Coins) -> Self {
        let mut summary = Vec::new();
        if let Some(from) = &record.from_address {
            summary.push(format!("From {from}"));
        }
        if let Some(to) = &record.to_address {
            summary.push(format!("To {to}"));
        }
        summary.push(format!("Amount {value} TON"));

        Self {
            protocol: Protocol::Transfer,
            action: "Simple Transfer".into(),
            fields: record.into(),
            summary: summary.join(" • "),
            notes: record.comment.as_ref().map(|c| format!("Comment: {c}")),
        }
    }

    fn unknown(record: &MessageRecord) -> Self {
        let mut summary = value_and_op(record);
        if let Some(comment) = &record.comment {
            summary.push(format!("Comment: {comment}"));
        }
        Self {
            protocol: Protocol::Unknown,
            action: "Unknown action".into(),
            fields: record.into(),
            summary: summary.join(" | "),
            notes: None,
        }
    }
}

fn value_and_op(record: &MessageRecord) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(value) = &record.value {
        parts.push(format!("Value: {value} TON"));
    }
    if let Some(op) = record.op_code {
        parts.push(format!("Op Code: {op:#x}"));
    }
    parts
}

/// Known addresses and named op codes of one protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolDecoder {
    pub protocol: Protocol,
    pub addresses: Vec<MsgAddress>,
    pub op_codes: Vec<(String, u32)>,
}

impl ProtocolDecoder {
    #[inline]
    pub const fn new(protocol: Protocol) -> Self {
        Self {
            protocol,
            addresses: Vec::new(),
            op_codes: Vec::new(),
        }
    }

    /// Destination is a known address, or op code is a known one
    pub fn identifies(&self, record: &MessageRecord) -> bool {
        let to_known = record
            .to_address
            .as_deref()
            .and_then(|to| to.parse::<MsgAddress>().ok())
            .is_some_and(|to| self.addresses.contains(&to));
        to_known || record.op_code.is_some_and(|op| self.op_name(op).is_some())
    }

    fn op_name(&self, op: u32) -> Option<&str> {
        self.op_codes
            .iter()
            .find(|(_, code)| *code == op)
            .map(|(name, _)| name.as_str())
    }

    pub fn decode(&self, record: &MessageRecord) -> Action {
        let action = record
            .op_code
            .and_then(|op| self.op_name(op))
            .map(capitalize)
            .unwrap_or_else(|| format!("Unknown {} action", self.protocol));

        Action {
            protocol: self.protocol,
            action,
            fields: record.into(),
            summary: value_and_op(record).join(" | "),
            notes: Some("operation fields are not decoded".into()),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

/// Ordered list of [`ProtocolDecoder`]s consulted by [`dispatch`](ProtocolRegistry::dispatch)
///
/// Staking protocols are registered without any address or op code, so
/// until configured every non-transfer message is [`Protocol::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolRegistry {
    decoders: Vec<ProtocolDecoder>,
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self {
            decoders: [
                Protocol::NominatorPool,
                Protocol::Tonstakers,
                Protocol::TonWhales,
            ]
            .into_iter()
            .map(ProtocolDecoder::new)
            .collect(),
        }
    }
}

impl ProtocolRegistry {
    #[inline]
    pub fn decoders(&self) -> &[ProtocolDecoder] {
        &self.decoders
    }

    /// Decoder for `protocol`, appended if not registered yet
    pub fn entry(&mut self, protocol: Protocol) -> &mut ProtocolDecoder {
        let index = match self.decoders.iter().position(|d| d.protocol == protocol) {
            Some(index) => index,
            None => {
                self.decoders.push(ProtocolDecoder::new(protocol));
                self.decoders.len() - 1
            }
        };
        &mut self.decoders[index]
    }

    #[must_use]
    pub fn with_address(mut self, protocol: Protocol, address: MsgAddress) -> Self {
        self.entry(protocol).addresses.push(address);
        self
    }

    #[must_use]
    pub fn with_op_code(mut self, protocol: Protocol, name: impl Into<String>, op: u32) -> Self {
        self.entry(protocol).op_codes.push((name.into(), op));
        self
    }

    /// Simple transfer when there is a value and no op code other than 0,
    /// then the first decoder identifying the message, else unknown
    pub fn dispatch(&self, record: &MessageRecord) -> Action {
        if let Some(value) = &record.value {
            if matches!(record.op_code, None | Some(0)) {
                return Action::transfer(record, value);
            }
        }
        self.decoders
            .iter()
            .find(|d| d.identifies(record))
            .map_or_else(|| Action::unknown(record), |d| d.decode(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: &str = "EQBGXZ9ddZeWypx8EkJieHJX75ct0bpkmu0Y4YoYr3NM0Z9e";
    const POOL_RAW: &str = "0:465d9f5d759796ca9c7c124262787257ef972dd1ba649aed18e18a18af734cd1";

    fn record(op_code: Option<u32>) -> MessageRecord {
        MessageRecord {
            to_address: Some(POOL.into()),
            value: Some(Coins::from_nano(1_500_000_000u64)),
            op_code,
            ..Default::default()
        }
    }

    #[test]
    fn simple_transfer() {
        let action = ProtocolRegistry::default().dispatch(&record(None));

        assert_eq!(action.protocol, Protocol::Transfer);
        assert_eq!(action.action, "Simple Transfer");
        assert_eq!(action.summary, format!("To {POOL} • Amount 1.5 TON"));
        assert_eq!(action.notes, None);
    }

    #[test]
    fn transfer_with_comment() {
        let record = MessageRecord {
            from_address: Some("EQ_from".into()),
            comment: Some("hi".into()),
            ..record(Some(0))
        };

        let action = ProtocolRegistry::default().dispatch(&record);

        assert_eq!(action.protocol, Protocol::Transfer);
        assert_eq!(
            action.summary,
            format!("From EQ_from • To {POOL} • Amount 1.5 TON")
        );
        assert_eq!(action.notes.as_deref(), Some("Comment: hi"));
        assert_eq!(action.fields.comment.as_deref(), Some("hi"));
    }

    #[test]
    fn unknown_op() {
        let action = ProtocolRegistry::default().dispatch(&record(Some(0x0f8a7ea5)));

        assert_eq!(action.protocol, Protocol::Unknown);
        assert_eq!(action.action, "Unknown action");
        assert_eq!(action.summary, "Value: 1.5 TON | Op Code: 0xf8a7ea5");
    }

    #[test]
    fn no_value() {
        let record = MessageRecord {
            value: None,
            comment: Some("memo".into()),
            ..record(None)
        };

        let action = ProtocolRegistry::default().dispatch(&record);

        assert_eq!(action.protocol, Protocol::Unknown);
        assert_eq!(action.summary, "Comment: memo");
    }

    #[test]
    fn known_op_code() {
        let registry =
            ProtocolRegistry::default().with_op_code(Protocol::Tonstakers, "deposit", 0x47d54391);

        let action = registry.dispatch(&record(Some(0x47d54391)));

        assert_eq!(action.protocol, Protocol::Tonstakers);
        assert_eq!(action.action, "Deposit");
        assert_eq!(action.notes.as_deref(), Some("operation fields are not decoded"));
    }

    #[test]
    fn known_address() {
        let registry = ProtocolRegistry::default()
            .with_address(Protocol::NominatorPool, POOL_RAW.parse().unwrap());

        let action = registry.dispatch(&record(Some(0x1234)));

        assert_eq!(action.protocol, Protocol::NominatorPool);
        assert_eq!(action.action, "Unknown Nominator Pool action");
        assert_eq!(action.summary, "Value: 1.5 TON | Op Code: 0x1234");
    }

    #[test]
    fn transfer_first() {
        let registry = ProtocolRegistry::default()
            .with_address(Protocol::TonWhales, POOL.parse().unwrap())
            .with_op_code(Protocol::TonWhales, "deposit", 0);

        assert_eq!(registry.dispatch(&record(Some(0))).protocol, Protocol::Transfer);
    }

    #[test]
    fn registration_order() {
        let registry = ProtocolRegistry::default()
            .with_op_code(Protocol::TonWhales, "withdraw", 7)
            .with_op_code(Protocol::NominatorPool, "withdraw", 7);

        assert_eq!(registry.decoders().len(), 3);
        assert_eq!(registry.dispatch(&record(Some(7))).protocol, Protocol::NominatorPool);
    }

    #[test]
    fn display() {
        assert_eq!(Protocol::TonWhales.to_string(), "TON Whales");
        assert_eq!(Protocol::NominatorPool.to_string(), "Nominator Pool");
    }
}
