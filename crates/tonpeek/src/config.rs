use tonpeek_boc::DecoderConfig;
use tonpeek_ton::ExtractorConfig;

use crate::ProtocolRegistry;

/// Arguments for [`decode_payload`](crate::decode_payload)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub extractor: ExtractorConfig,
    pub protocols: ProtocolRegistry,
}
