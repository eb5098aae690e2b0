//! Types for FBRB archive handling

use std::path::PathBuf;

use serde::Serialize;

/// Type name stored for plain files (`.dbx`, `.bin`, `.dbmanifest`, `.nonres`)
pub const NON_RESOURCE: &str = "<non-resource>";

/// Type name stored for deleted placeholders
pub const DELETED: &str = "*deleted*";

/// On-disk extension (lowercase, no dot) to stored resource type name.
pub const RESOURCE_TYPES: &[(&str, &str)] = &[
    ("swfmovie", "SwfMovie"),
    ("dx10pixelshader", "Dx10PixelShader"),
    ("havokphysicsdata", "HavokPhysicsData"),
    ("treemeshset", "TreeMeshSet"),
    ("terrainheightfield", "TerrainHeightfield"),
    ("itexture", "ITexture"),
    ("animtreeinfo", "AnimTreeInfo"),
    ("irradiancevolume", "IrradianceVolume"),
    ("visualterrain", "VisualTerrain"),
    ("skinnedmeshset", "SkinnedMeshSet"),
    ("dx10vertexshader", "Dx10VertexShader"),
    ("aimanimation", "AimAnimation"),
    ("occludermesh", "OccluderMesh"),
    ("dx9shaderdatabase", "Dx9ShaderDatabase"),
    ("wave", "Wave"),
    ("sootmesh", "SootMesh"),
    ("terrainmaterialmap", "TerrainMaterialMap"),
    ("rigidmeshset", "RigidMeshSet"),
    ("compositemeshset", "CompositeMeshSet"),
    ("watermesh", "WaterMesh"),
    ("visualwater", "VisualWater"),
    ("dx9vertexshader", "Dx9VertexShader"),
    ("dx9pixelshader", "Dx9PixelShader"),
    ("dx11shaderdatabase", "Dx11ShaderDatabase"),
    ("dx11pixelshader", "Dx11PixelShader"),
    ("grannymodel", "GrannyModel"),
    ("ragdollresource", "RagdollResource"),
    ("grannyanimation", "GrannyAnimation"),
    ("weathersystem", "WeatherSystem"),
    ("dx11vertexshader", "Dx11VertexShader"),
    ("terrain", "Terrain"),
    ("impulseresponse", "ImpulseResponse"),
    ("binkmemory", "BinkMemory"),
    ("deltaanimation", "DeltaAnimation"),
    ("dx10shaderdatabase", "Dx10ShaderDatabase"),
    ("meshdata", "MeshData"),
    ("xenonpixelshader", "XenonPixelShader"),
    ("xenonvertexshader", "XenonVertexShader"),
    ("xenonshaderdatabase", "XenonShaderDatabase"),
    ("xenontexture", "XenonTexture"),
    ("ps3pixelshader", "Ps3PixelShader"),
    ("ps3vertexshader", "Ps3VertexShader"),
    ("ps3shaderdatabase", "Ps3ShaderDatabase"),
    ("ps3texture", "Ps3Texture"),
    ("pathdatadefinition", "PathDataDefinition"),
    ("nonres", NON_RESOURCE),
    ("dbx", NON_RESOURCE),
    ("dbxdeleted", DELETED),
    ("resdeleted", DELETED),
    ("bin", NON_RESOURCE),
    ("dbmanifest", NON_RESOURCE),
];

/// Look up the stored type name for an on-disk extension (case-insensitive).
#[must_use]
pub fn type_for_extension(extension: &str) -> Option<&'static str> {
    let extension = extension.to_ascii_lowercase();
    RESOURCE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, type_name)| *type_name)
}

/// Split a file name into stem and extension the way the archive tools
/// always have: the extension keeps its dot, leading dots belong to the stem.
#[must_use]
pub fn split_extension(file_name: &str) -> (&str, &str) {
    let leading_dots = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[leading_dots..].rfind('.') {
        Some(pos) => file_name.split_at(leading_dots + pos),
        None => (file_name, ""),
    }
}

/// Entry in the FBRB file table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FbrbEntry {
    /// Stored path, forward slashes (e.g. `levels/mp_001/terrain.res`)
    pub name: String,
    /// Resource type name (e.g. `ITexture`, `<non-resource>`, `*deleted*`)
    pub type_name: String,
    /// Flags word: `0x00010000` for files with content, `0` for empty ones
    pub flags: u32,
    /// Offset into the uncompressed payload
    pub payload_offset: u32,
    /// Size of the file in bytes
    pub size: u32,
    /// Second size field; the tools always write it equal to `size`
    pub stored_size: u32,
}

impl FbrbEntry {
    /// Returns true for deleted placeholders
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.type_name.eq_ignore_ascii_case(DELETED)
    }

    /// Relative on-disk path this entry extracts to.
    ///
    /// The stored `.res` ending is replaced by the lowercase resource type so
    /// the type survives a round trip through the file system.
    #[must_use]
    pub fn extracted_path(&self) -> PathBuf {
        let (folder, file_name) = self.name.rsplit_once('/').unwrap_or(("", &self.name));
        let (stem, ending) = split_extension(file_name);
        let type_name = self.type_name.to_lowercase();

        let ending = if type_name == DELETED {
            if ending == ".dbx" {
                ".dbxdeleted".to_string()
            } else {
                ".resdeleted".to_string()
            }
        } else if type_name == NON_RESOURCE && ending == ".res" {
            ".nonres".to_string()
        } else if type_name != NON_RESOURCE {
            format!(".{type_name}")
        } else {
            ending.to_string()
        };

        let mut path = PathBuf::new();
        for part in folder.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path.push(format!("{stem}{ending}"));
        path
    }
}

/// Progress information during FBRB operations
#[derive(Debug, Clone)]
pub struct FbrbProgress {
    /// Current operation phase
    pub phase: FbrbPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current file being processed (if applicable)
    pub current_file: Option<String>,
}

impl FbrbProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: FbrbPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a file/item name
    #[must_use]
    pub fn with_file(
        phase: FbrbPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }

    /// Get the progress percentage (0.0 - 1.0)
    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Phase of an FBRB operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FbrbPhase {
    /// Reading and decompressing the header
    ReadingHeader,
    /// Decompressing the payload stream
    StagingPayload,
    /// Writing files to disk (during extraction)
    WritingFiles,
    /// Scanning files in a directory (during creation)
    ScanningFiles,
    /// Compressing files (during creation)
    CompressingFiles,
    /// Writing the finished archive
    WritingArchive,
    /// Operation complete
    Complete,
}

impl FbrbPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadingHeader => "Reading header",
            Self::StagingPayload => "Decompressing payload",
            Self::WritingFiles => "Writing files",
            Self::ScanningFiles => "Scanning files",
            Self::CompressingFiles => "Compressing files",
            Self::WritingArchive => "Writing archive",
            Self::Complete => "Complete",
        }
    }
}

/// Progress callback for FBRB operations.
///
/// Must be `Sync + Send` so batch operations can share it across threads.
pub type ProgressCallback<'a> = &'a (dyn Fn(&FbrbProgress) + Sync + Send);

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, type_name: &str) -> FbrbEntry {
        FbrbEntry {
            name: name.to_string(),
            type_name: type_name.to_string(),
            flags: 0x0001_0000,
            payload_offset: 0,
            size: 1,
            stored_size: 1,
        }
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("terrain.res"), ("terrain", ".res"));
        assert_eq!(split_extension("a.b.dbx"), ("a.b", ".dbx"));
        assert_eq!(split_extension("noext"), ("noext", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_type_for_extension() {
        assert_eq!(type_for_extension("ITexture"), Some("ITexture"));
        assert_eq!(type_for_extension("dbx"), Some(NON_RESOURCE));
        assert_eq!(type_for_extension("resdeleted"), Some(DELETED));
        assert_eq!(type_for_extension("txt"), None);
    }

    #[test]
    fn test_extracted_path_resource_type() {
        let e = entry("levels/mp_001/terrain.res", "ITexture");
        assert_eq!(e.extracted_path(), PathBuf::from("levels/mp_001/terrain.itexture"));
    }

    #[test]
    fn test_extracted_path_non_resource() {
        assert_eq!(entry("a/b.dbx", NON_RESOURCE).extracted_path(), PathBuf::from("a/b.dbx"));
        assert_eq!(entry("a/b.res", NON_RESOURCE).extracted_path(), PathBuf::from("a/b.nonres"));
        assert_eq!(entry("c.bin", NON_RESOURCE).extracted_path(), PathBuf::from("c.bin"));
    }

    #[test]
    fn test_extracted_path_deleted() {
        let dbx = entry("x/y.dbx", DELETED);
        assert!(dbx.is_deleted());
        assert_eq!(dbx.extracted_path(), PathBuf::from("x/y.dbxdeleted"));
        assert_eq!(entry("x/z.res", DELETED).extracted_path(), PathBuf::from("x/z.resdeleted"));
    }

    #[test]
    fn test_progress_percentage() {
        assert!((FbrbProgress::new(FbrbPhase::Complete, 0, 0).percentage() - 1.0).abs() < f32::EPSILON);
        assert!((FbrbProgress::new(FbrbPhase::WritingFiles, 1, 4).percentage() - 0.25).abs() < f32::EPSILON);
    }
}
