//! Operation model
//!
//! Every request routes through this enum; the tag is the name callers use.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAssetType,
    UpdateAssetType,
    DeleteAssetType,
    PutAsset,
    ReadAsset,
    GetSchema,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::CreateAssetType,
        Operation::UpdateAssetType,
        Operation::DeleteAssetType,
        Operation::PutAsset,
        Operation::ReadAsset,
        Operation::GetSchema,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::CreateAssetType => "createAssetType",
            Self::UpdateAssetType => "updateAssetType",
            Self::DeleteAssetType => "deleteAssetType",
            Self::PutAsset => "putAsset",
            Self::ReadAsset => "readAsset",
            Self::GetSchema => "getSchema",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.tag() == tag)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
