use std::{collections::HashSet, sync::Arc};

use tonpeek_boc::Cell;
use tracing::{debug, trace};

use crate::{Coins, InternalMessage, MessageError};

/// Arguments for [`extract`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Records carrying more than this are treated as mis-parses of
    /// non-message cells and dropped
    pub max_plausible_value: Coins,
    /// Keep only records with a destination address
    pub require_destination: bool,
}

impl ExtractorConfig {
    pub const DEFAULT_MAX_PLAUSIBLE_TON: u64 = 1_000_000;
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_plausible_value: Coins::from_ton(Self::DEFAULT_MAX_PLAUSIBLE_TON),
            require_destination: false,
        }
    }
}

/// Internal message found in a cell graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MessageRecord {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub value: Option<Coins>,
    pub op_code: Option<u32>,
    pub comment: Option<String>,
    pub bounce: bool,
    pub created_lt: u64,
    pub created_at: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub body_cell: Option<Arc<Cell>>,
}

impl MessageRecord {
    /// Whether this record carries an address or a comment
    #[inline]
    pub fn is_meaningful(&self) -> bool {
        self.from_address.is_some() || self.to_address.is_some() || self.comment.is_some()
    }
}

impl From<InternalMessage> for MessageRecord {
    fn from(msg: InternalMessage) -> Self {
        Self {
            from_address: msg.src.map(|a| a.to_friendly()),
            to_address: msg.dst.map(|a| a.to_friendly()),
            value: Some(msg.value.grams),
            op_code: msg.body.op_code,
            comment: msg.body.comment,
            bounce: msg.bounce,
            created_lt: msg.created_lt,
            created_at: msg.created_at,
            body_cell: msg.body.cell,
        }
    }
}

/// Result of [`extract`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Records kept by [`postprocess`]
    pub records: Vec<MessageRecord>,
    /// Errors of cells tagged as internal messages that failed to parse,
    /// in visiting order
    pub skipped: Vec<MessageError>,
}

/// Walks every cell reachable from `roots` depth-first, visiting each
/// distinct cell once across all roots, and collects the ones that parse as
/// internal messages.
///
/// A cell failing to parse only drops that candidate, its error is kept in
/// [`Extraction::skipped`]. Records are then passed through [`postprocess`].
pub fn extract<'a>(
    roots: impl IntoIterator<Item = &'a Arc<Cell>>,
    config: &ExtractorConfig,
) -> Extraction {
    let mut visited: HashSet<*const Cell> = HashSet::new();
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for root in roots {
        let mut stack = vec![root];
        while let Some(cell) = stack.pop() {
            if !visited.insert(Arc::as_ptr(cell)) {
                continue;
            }
            match InternalMessage::parse(cell) {
                Ok(msg) => {
                    debug!(
                        src = ?msg.src,
                        dst = ?msg.dst,
                        value = %msg.value.grams,
                        op_code = ?msg.body.op_code,
                        "internal message"
                    );
                    records.push(msg.into());
                }
                Err(MessageError::NotInternal) => {}
                Err(err) => {
                    trace!(%err, "skipping message candidate");
                    skipped.push(err);
                }
            }
            stack.extend(cell.references.iter().rev());
        }
    }

    Extraction {
        records: postprocess(records, config),
        skipped,
    }
}

/// In order: drops repeated `(from, to, value, comment)` tuples keeping the
/// first, records with neither address nor comment, records without
/// destination if required, and records above the plausible value.
pub fn postprocess(records: Vec<MessageRecord>, config: &ExtractorConfig) -> Vec<MessageRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            seen.insert((
                r.from_address.clone(),
                r.to_address.clone(),
                r.value.clone(),
                r.comment.clone(),
            ))
        })
        .filter(MessageRecord::is_meaningful)
        .filter(|r| !config.require_destination || r.to_address.is_some())
        .filter(|r| {
            r.value
                .as_ref()
                .is_none_or(|value| *value <= config.max_plausible_value)
        })
        .collect()
}
