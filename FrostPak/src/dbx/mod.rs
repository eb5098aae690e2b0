//! DBX document module
//!
//! DBX files are Frostbite's binary XML: a string table followed by a stream
//! of LEB128-indexed element records. This module reads and writes the binary
//! form and converts it to and from indented XML text.

mod binary;
mod convert;
mod document;
mod leb128;
mod numbers;
mod xml;

pub use binary::{read_dbx, write_dbx};
pub use convert::{
    ConvertMode, ConvertResult, convert_dbx_to_xml, convert_file, convert_paths,
    convert_xml_to_dbx, find_convertible_files,
};
pub use document::{DbxDocument, DbxElement, DbxNumbers, DbxValue};
pub use xml::{from_xml, to_xml};

/// Binary DBX magic
pub const MAGIC: &[u8; 8] = b"{binary}";

/// Declaration line of converted XML files
pub const XML_HEADER: &str = "<?xml version=\"1.0\"?>";

/// Size of the fixed binary header (magic plus four u32 fields)
pub const HEADER_SIZE: usize = 24;

/// Fields stored as unsigned 16-bit vectors
pub const HALVES: &[&str] = &[
    "SphereKeyW",
    "SphereKeyY",
    "SphereKeyZ",
    "TargetId",
    "SourceId",
    "SphereKeyX",
];

/// Fields stored as 64-bit float vectors
pub const DOUBLES: &[&str] = &[
    "AwareForgetTime",
    "LineOfSightTestTime",
    "SensingTimeSpan",
    "FireKeepTime",
    "LostForgetTime",
    "TimeUntilUnseenIsLost",
    "AttackerTrackTime",
];

/// Hash fields; their words always print as signed integers
pub const HASHES: &[&str] = &[
    "OriginalHashedWaveName",
    "HashedName",
    "HashedWaveName",
    "OnRoadMaterialNameHashes",
    "Hash",
    "Id",
    "CompositeMeshPartNames",
];

/// Fields that always stay strings even when their text looks numeric
pub const TYPE2: &[&str] = &["Name", "TextureFile", "LocationName"];

/// Number fields that may legitimately hold zero values
pub const EMPTYNUMS: &[&str] = &[
    "NeighbourLinks",
    "LeftCurve",
    "ForwardGearSpeeds",
    "DownCurve",
    "CompositeMeshPartNames",
    "RandomEventWeight",
    "RightCurve",
    "ShCoefficientsLightDelta",
    "ShCoefficientsLight",
    "FirstPartHealthStateNetworkIds",
    "ReverseGearSpeeds",
    "ZOcclusionLookup",
    "ForwardGearRatios",
    "DisallowedIndices",
    "SkinnedMeshTransforms",
    "UpCurve",
    "FirstPartHealthStateIndices",
    "ShCoefficientsShadow",
    "ReverseGearRatios",
];

/// Placeholder text for a lane of `00000000` words
pub const ZERO_LANE: &str = "*zero*";

/// Placeholder text for a lane of `CDCDCDCD` words
pub const NONZERO_LANE: &str = "*nonzero*";

/// Fill pattern behind [`NONZERO_LANE`]
pub const NONZERO_WORD: u32 = 0xCDCD_CDCD;
