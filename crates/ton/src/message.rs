//! [Internal message](https://docs.ton.org/develop/data-formats/msg-tlb#int_msg_info0)
//! grammar read from a single cell
use std::sync::Arc;

use either::Either;
use tonpeek_bits::{ResultExt, Slice};
use tonpeek_boc::Cell;

use crate::{
    Coins, CurrencyCollection, MessageError, MsgAddress, load_currency_collection, load_grams,
    load_msg_address_int,
};

/// Internal message with its body reduced to op code and text comment
/// ```tlb
/// message$_ {X:Type} info:CommonMsgInfo
///   init:(Maybe (Either StateInit ^StateInit))
///   body:(Either X ^X) = Message X;
///
/// int_msg_info$0 ihr_disabled:Bool bounce:Bool bounced:Bool
///   src:MsgAddressInt dest:MsgAddressInt
///   value:CurrencyCollection ihr_fee:Grams fwd_fee:Grams
///   created_lt:uint64 created_at:uint32 = CommonMsgInfo;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalMessage {
    /// Hyper cube routing flag.
    pub ihr_disabled: bool,
    /// Message should be bounced if there are errors during processing.
    pub bounce: bool,
    /// Message itself is a result of bounce.
    pub bounced: bool,
    pub src: Option<MsgAddress>,
    pub dst: Option<MsgAddress>,
    pub value: CurrencyCollection,
    pub ihr_fee: Coins,
    pub fwd_fee: Coins,
    pub created_lt: u64,
    pub created_at: u32,
    /// Referenced `StateInit`, never decoded
    pub init: Option<Arc<Cell>>,
    pub body: MessageBody,
}

/// `body:(Either X ^X)` reduced to what a reviewer needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBody {
    /// Referenced body cell, `None` for inline bodies
    pub cell: Option<Arc<Cell>>,
    pub op_code: Option<u32>,
    pub comment: Option<String>,
}

impl InternalMessage {
    pub fn parse(cell: &Cell) -> Result<Self, MessageError> {
        let mut parser = cell.parser();

        // int_msg_info$0
        if parser.load_bit().context("tag")? {
            return Err(MessageError::NotInternal);
        }
        let ihr_disabled = parser.load_bit().context("ihr_disabled")?;
        let bounce = parser.load_bit().context("bounce")?;
        let bounced = parser.load_bit().context("bounced")?;
        let src = load_msg_address_int(&mut parser).context("src")?;
        let dst = load_msg_address_int(&mut parser).context("dest")?;
        let value = load_currency_collection(&mut parser).context("value")?;
        let ihr_fee = load_grams(&mut parser).context("ihr_fee")?;
        let fwd_fee = load_grams(&mut parser).context("fwd_fee")?;
        let created_lt = parser.load_u64(64).context("created_lt")?;
        let created_at = parser.load_u64(32).context("created_at")? as u32;

        // init:(Maybe (Either StateInit ^StateInit))
        let init = if parser.load_bit().context("init")? {
            if !parser.load_bit().context("init")? {
                return Err(MessageError::UnsupportedInlineStateInit);
            }
            Some(cell.reference(0).cloned())
        } else {
            None
        };

        // body:(Either X ^X)
        let body = if parser.load_bit().context("body")? {
            Either::Right(cell.reference(usize::from(init.is_some())).cloned())
        } else {
            Either::Left(parser)
        };

        Ok(Self {
            ihr_disabled,
            bounce,
            bounced,
            src,
            dst,
            value,
            ihr_fee,
            fwd_fee,
            created_lt,
            created_at,
            init: init.flatten(),
            body: MessageBody::load(body),
        })
    }
}

impl MessageBody {
    fn load(body: Either<Slice<'_>, Option<Arc<Cell>>>) -> Self {
        match body {
            Either::Left(mut slice) => Self::from_slice(&mut slice, None),
            Either::Right(Some(cell)) => Self::from_slice(&mut cell.parser(), Some(cell.clone())),
            Either::Right(None) => Self::default(),
        }
    }

    fn from_slice(slice: &mut Slice<'_>, cell: Option<Arc<Cell>>) -> Self {
        let op_code = (slice.remaining_bits() >= 32)
            .then(|| {
                let mut peek = *slice;
                peek.load_u64(32).ok()
            })
            .flatten()
            .map(|op| op as u32);
        Self {
            cell,
            op_code,
            comment: load_comment(slice),
        }
    }
}

/// Reads a text comment:
/// ```tlb
/// text_comment#00000000 text:(bits 8*n) = Body;
/// ```
///
/// The text must start on a byte boundary of the cell. On success the
/// whole slice is consumed. When the slice holds no comment it is left
/// untouched.
pub fn load_comment(slice: &mut Slice<'_>) -> Option<String> {
    let checkpoint = slice.checkpoint();
    let comment = read_comment(slice);
    if comment.is_none() {
        slice.rewind(checkpoint);
    }
    comment
}

fn read_comment(slice: &mut Slice<'_>) -> Option<String> {
    if slice.remaining_bits() < 32 || slice.load_u64(32).ok()? != 0 {
        return None;
    }
    let rest = slice.remaining_bits();
    if rest == 0 || rest % 8 != 0 {
        return None;
    }
    let bytes = slice.load_buffer(rest / 8).ok()?;
    let text = String::from_utf8_lossy(&bytes);
    let text = text.trim_end_matches('\0').trim();
    (!text.is_empty()).then(|| text.to_owned())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tonpeek_boc::CellBuilder;

    use crate::tests::{Transfer, body_cell};

    use super::*;

    #[rstest]
    #[case::op_only(&[], false, None)]
    #[case::hello(b"hello", false, Some("hello"))]
    #[case::unaligned(b"hello", true, None)]
    #[case::padded(b"  hi\0\0", false, Some("hi"))]
    #[case::blank(b" \0", false, None)]
    fn comment_boundary(
        #[case] text: &[u8],
        #[case] extra_bit: bool,
        #[case] expected: Option<&str>,
    ) {
        let mut builder = Cell::builder();
        builder.store_uint(0, 32).unwrap().store_bytes(text).unwrap();
        if extra_bit {
            builder.store_bit(true).unwrap();
        }
        let cell = builder.into_cell();
        let mut slice = cell.parser();

        assert_eq!(load_comment(&mut slice).as_deref(), expected);
        if expected.is_none() {
            assert_eq!(slice.position(), 0);
        } else {
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn lossy_utf8() {
        let cell = body_cell(0, b"caf\xC3");
        assert_eq!(load_comment(&mut cell.parser()).as_deref(), Some("caf\u{FFFD}"));
    }

    #[test]
    fn non_zero_op() {
        let cell = body_cell(0x0f8a7ea5, b"hello");
        let body = MessageBody::load(Either::Right(Some(Arc::new(cell))));

        assert_eq!(body.op_code, Some(0x0f8a7ea5));
        assert_eq!(body.comment, None);
        assert!(body.cell.is_some());
    }

    #[test]
    fn referenced_body() {
        let msg = Transfer::default()
            .body_ref(body_cell(0, b"hello"))
            .build();

        let parsed = InternalMessage::parse(&msg).unwrap();

        assert_eq!(parsed.dst, Some(Transfer::DST));
        assert_eq!(parsed.src, None);
        assert_eq!(parsed.value.grams, Coins::from_nano(1_500_000_000u64));
        assert!(parsed.bounce);
        assert_eq!(parsed.created_lt, 42);
        assert_eq!(parsed.created_at, 1_700_000_000);
        assert_eq!(parsed.body.op_code, Some(0));
        assert_eq!(parsed.body.comment.as_deref(), Some("hello"));
        assert!(parsed.body.cell.is_some());
    }

    #[test]
    fn inline_body() {
        let msg = Transfer::default().body_inline(0, b"gm").build();

        let parsed = InternalMessage::parse(&msg).unwrap();

        assert_eq!(parsed.body.op_code, Some(0));
        assert_eq!(parsed.body.comment.as_deref(), Some("gm"));
        assert_eq!(parsed.body.cell, None);
    }

    #[test]
    fn unaligned_inline_body() {
        let mut msg = Transfer::default().body_inline(0, b"gm");
        msg.src = Some(Transfer::DST);

        let parsed = InternalMessage::parse(&msg.build()).unwrap();

        assert_eq!(parsed.src, Some(Transfer::DST));
        assert_eq!(parsed.body.op_code, Some(0));
        assert_eq!(parsed.body.comment, None);
    }

    #[test]
    fn empty_inline_body() {
        let parsed = InternalMessage::parse(&Transfer::default().build()).unwrap();

        assert_eq!(parsed.body, MessageBody::default());
    }

    #[test]
    fn body_after_init_ref() {
        let msg = Transfer::default()
            .init_ref(Cell::new())
            .body_ref(body_cell(0, b"deploy"))
            .build();

        let parsed = InternalMessage::parse(&msg).unwrap();

        assert!(parsed.init.is_some());
        assert_eq!(parsed.body.comment.as_deref(), Some("deploy"));
    }

    #[test]
    fn missing_body_ref() {
        let mut msg = Transfer::default().body_ref(body_cell(0, b"x"));
        msg.drop_refs = true;

        let parsed = InternalMessage::parse(&msg.build()).unwrap();

        assert_eq!(parsed.body, MessageBody::default());
    }

    #[test]
    fn inline_state_init() {
        let mut builder = CellBuilder::new();
        Transfer::default().store_info(&mut builder);
        builder.store_bit(true).unwrap().store_bit(false).unwrap();

        assert_eq!(
            InternalMessage::parse(&builder.into_cell()).unwrap_err(),
            MessageError::UnsupportedInlineStateInit
        );
    }

    #[test]
    fn external() {
        let mut builder = Cell::builder();
        builder.store_uint(0b10, 2).unwrap();

        assert_eq!(
            InternalMessage::parse(&builder.into_cell()).unwrap_err(),
            MessageError::NotInternal
        );
    }

    #[test]
    fn truncated() {
        let mut builder = Cell::builder();
        builder.store_uint(0b0110, 4).unwrap();
        let err = InternalMessage::parse(&builder.into_cell()).unwrap_err();

        assert_eq!(err.to_string(), "src: tag: slice overrun: requested 2 bits, 0 left");
    }
}
