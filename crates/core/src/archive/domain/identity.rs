use std::path::Path;

/// Derives the identity a recording belongs to from its archive file name.
///
/// Archives are named `<identity>_<suffix>.<ext>`; the identity is the stem
/// with its last underscore-delimited segment removed. The identity itself may
/// contain underscores (`Aaron_Eckhart_3.npz` belongs to `Aaron_Eckhart`).
/// Returns `None` when the stem has no underscore, or when the identity would
/// be empty or could not serve as a single directory name under `Faces/`.
pub fn identity_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (identity, _suffix) = stem.rsplit_once('_')?;
    if identity.is_empty() || identity == "." || identity == ".." {
        return None;
    }
    if identity.contains(['/', '\\']) {
        return None;
    }
    Some(identity.to_string())
}
