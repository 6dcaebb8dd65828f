use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use tonpeek_boc::Cell;

/// Representation hash of a payload root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HashInfo {
    pub hex: Option<String>,
    pub base64: Option<String>,
    /// Why the hash is missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HashInfo {
    pub const EXOTIC_NOTE: &'static str = "hash unavailable: exotic cells";
}

pub fn hash_info(root: &Cell) -> HashInfo {
    match root.hash() {
        Some(hash) => HashInfo {
            hex: Some(hex::encode(hash)),
            base64: Some(STANDARD.encode(hash)),
            note: None,
        },
        None => HashInfo {
            note: Some(HashInfo::EXOTIC_NOTE.into()),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn ordinary() {
        let mut builder = Cell::builder();
        builder.store_uint(0x0000000F, 32).unwrap();
        let info = hash_info(&builder.into_cell());

        assert_eq!(
            info.hex.as_deref(),
            Some("57b520dbcb9d135863fc33963cde9f6db2ded1430d88056810a2c9434a3860f9")
        );
        assert_eq!(
            info.base64.as_deref(),
            Some("V7Ug28udE1hj/DOWPN6fbbLe0UMNiAVoEKLJQ0o4YPk=")
        );
        assert_eq!(info.note, None);
    }

    #[test]
    fn exotic_child() {
        let mut exotic = Cell::builder();
        exotic.set_exotic(true).store_uint(1, 8).unwrap();
        let mut root = Cell::builder();
        root.store_reference(Arc::new(exotic.into_cell())).unwrap();

        assert_eq!(
            hash_info(&root.into_cell()),
            HashInfo {
                hex: None,
                base64: None,
                note: Some("hash unavailable: exotic cells".into()),
            }
        );
    }
}
