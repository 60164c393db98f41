/// Directory under the corpus root holding one sub-directory per identity.
pub const FACES_DIR_NAME: &str = "Faces";

/// Derived-state record written at the end of a full extraction pass.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Extension of the per-recording frame archives.
pub const ARCHIVE_EXTENSION: &str = "npz";

/// Array inside each archive holding the colour frames, shape (H, W, C, N).
pub const COLOR_IMAGES_KEY: &str = "colorImages";

pub const FACE_FILE_PREFIX: &str = "face_";
pub const FACE_FILE_EXTENSION: &str = "png";

/// Split resolutions are rounded up per axis to a multiple of this.
pub const TILE_SIZE: u32 = 16;

/// Fraction of identities assigned to the test split.
pub const TEST_FRACTION: f64 = 0.2;

pub const SCENE_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Detector label that disqualifies a scene image.
pub const PERSON_LABEL: &str = "person";

/// Directory under a scene corpus receiving the person-free images.
pub const SCENE_OUTPUT_DIR_NAME: &str = "Other";
