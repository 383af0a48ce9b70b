//! Target model loading.
//!
//! The gallery uses exactly one external 3D model, fetched by URL (or
//! read from disk) when a session starts. All the simulation needs from
//! it is bounding geometry: one axis-aligned box per mesh primitive,
//! read straight from the glTF accessor min/max metadata without
//! decoding any vertex data.
//!
//! Loading is asynchronous from the session's point of view: a
//! background thread fetches and parses, and the shell polls a channel.
//! A failed load is reported and leaves the target pool empty; it is
//! never fatal and never retried automatically.

use gallery_common::Aabb;
use glam::Vec3;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

/// Content-addressed id of a loaded model, hashed from its raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

/// Bounding geometry extracted from a model: one box per mesh primitive,
/// in model-local units.
#[derive(Debug, Clone)]
pub struct ModelBounds {
    pub id: AssetId,
    pub name: String,
    pub parts: Vec<Aabb>,
}

impl ModelBounds {
    /// Overall local bounds (union of all parts).
    pub fn bounds(&self) -> Option<Aabb> {
        self.parts.iter().copied().reduce(|a, b| a.union(&b))
    }
}

/// Errors from model loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed GLB container: {0}")]
    Malformed(String),
    #[error("model contains no position accessors")]
    NoGeometry,
}

/// Where the model comes from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    Url(String),
    File(PathBuf),
}

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_CHUNK_JSON: u32 = 0x4E4F_534A;

/// Parse model bytes (GLB container or plain glTF JSON) into bounding
/// geometry.
pub fn parse_model_bytes(name: &str, bytes: &[u8]) -> Result<ModelBounds, AssetError> {
    let json: Value = if bytes.len() >= 4 && &bytes[..4] == GLB_MAGIC {
        serde_json::from_slice(glb_json_chunk(bytes)?)?
    } else {
        serde_json::from_slice(bytes)?
    };

    let parts = position_bounds(&json)?;
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut id_bytes = [0u8; 8];
    id_bytes.copy_from_slice(&digest[..8]);

    Ok(ModelBounds {
        id: AssetId(u64::from_le_bytes(id_bytes)),
        name: name.to_string(),
        parts,
    })
}

/// Load a model from a local glTF/GLB file.
pub fn load_model_file(path: impl AsRef<Path>) -> Result<ModelBounds, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    parse_model_bytes(name, &bytes)
}

/// Fetch a model over HTTP and parse it. Blocking; meant to run on the
/// loader thread, not the frame loop.
pub fn fetch_model(url: &str) -> Result<ModelBounds, AssetError> {
    tracing::info!(url, "fetching target model");
    let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    parse_model_bytes(url, &bytes)
}

/// Start a background load and return the channel the shell polls.
///
/// The result arrives at most once. If the receiver is dropped first
/// (session torn down mid-load), the send fails silently and the thread
/// exits; nothing ever calls back into dead state.
pub fn spawn_model_load(source: ModelSource) -> mpsc::Receiver<Result<ModelBounds, AssetError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = match source {
            ModelSource::Url(url) => fetch_model(&url),
            ModelSource::File(path) => load_model_file(&path),
        };
        if let Err(ref e) = result {
            tracing::error!("model load failed: {e}");
        }
        let _ = tx.send(result);
    });
    rx
}

/// Slice out the JSON chunk of a GLB container.
///
/// GLB layout: 12-byte header (magic, version, length), then chunks of
/// (length, type, data). The JSON chunk is required to come first.
fn glb_json_chunk(bytes: &[u8]) -> Result<&[u8], AssetError> {
    if bytes.len() < 20 {
        return Err(AssetError::Malformed("shorter than header".into()));
    }
    let chunk_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
    let chunk_type = u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    if chunk_type != GLB_CHUNK_JSON {
        return Err(AssetError::Malformed("first chunk is not JSON".into()));
    }
    bytes
        .get(20..20 + chunk_len)
        .ok_or_else(|| AssetError::Malformed("JSON chunk truncated".into()))
}

/// Collect one box per mesh primitive from the POSITION accessors'
/// min/max metadata.
fn position_bounds(json: &Value) -> Result<Vec<Aabb>, AssetError> {
    let accessors = json.get("accessors").and_then(Value::as_array);
    let meshes = json.get("meshes").and_then(Value::as_array);
    let (Some(accessors), Some(meshes)) = (accessors, meshes) else {
        return Err(AssetError::NoGeometry);
    };

    let mut parts = Vec::new();
    for mesh in meshes {
        let Some(primitives) = mesh.get("primitives").and_then(Value::as_array) else {
            continue;
        };
        for primitive in primitives {
            let position = primitive
                .get("attributes")
                .and_then(|a| a.get("POSITION"))
                .and_then(Value::as_u64);
            let Some(index) = position else { continue };
            let Some(accessor) = accessors.get(index as usize) else {
                continue;
            };
            if let (Some(min), Some(max)) = (
                vec3_field(accessor, "min"),
                vec3_field(accessor, "max"),
            ) {
                parts.push(Aabb::new(min, max));
            }
        }
    }

    if parts.is_empty() {
        Err(AssetError::NoGeometry)
    } else {
        Ok(parts)
    }
}

fn vec3_field(accessor: &Value, key: &str) -> Option<Vec3> {
    let arr = accessor.get(key)?.as_array()?;
    if arr.len() < 3 {
        return None;
    }
    Some(Vec3::new(
        arr[0].as_f64()? as f32,
        arr[1].as_f64()? as f32,
        arr[2].as_f64()? as f32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_gltf() -> String {
        serde_json::json!({
            "asset": { "version": "2.0" },
            "accessors": [
                { "type": "VEC3", "min": [-0.5, 0.0, -0.5], "max": [0.5, 1.7, 0.5] },
                { "type": "SCALAR" },
                { "type": "VEC3", "min": [-0.2, 1.7, -0.2], "max": [0.2, 2.0, 0.2] }
            ],
            "meshes": [
                { "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] },
                { "primitives": [ { "attributes": { "POSITION": 2 } } ] }
            ]
        })
        .to_string()
    }

    fn wrap_glb(json: &str) -> Vec<u8> {
        let mut padded = json.as_bytes().to_vec();
        while padded.len() % 4 != 0 {
            padded.push(b' ');
        }
        let mut out = Vec::new();
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&((12 + 8 + padded.len()) as u32).to_le_bytes());
        out.extend_from_slice(&(padded.len() as u32).to_le_bytes());
        out.extend_from_slice(&GLB_CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(&padded);
        out
    }

    #[test]
    fn plain_gltf_json_yields_parts() {
        let model = parse_model_bytes("girl", sample_gltf().as_bytes()).unwrap();
        assert_eq!(model.parts.len(), 2);
        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-0.5, 0.0, -0.5));
        assert_eq!(bounds.max, Vec3::new(0.5, 2.0, 0.5));
    }

    #[test]
    fn glb_container_yields_same_parts() {
        let glb = wrap_glb(&sample_gltf());
        let model = parse_model_bytes("girl", &glb).unwrap();
        assert_eq!(model.parts.len(), 2);
    }

    #[test]
    fn truncated_glb_is_malformed() {
        let mut glb = wrap_glb(&sample_gltf());
        glb.truncate(30);
        assert!(matches!(
            parse_model_bytes("bad", &glb),
            Err(AssetError::Malformed(_))
        ));
    }

    #[test]
    fn garbage_bytes_are_a_json_error() {
        assert!(matches!(
            parse_model_bytes("bad", b"not a model"),
            Err(AssetError::Json(_))
        ));
    }

    #[test]
    fn model_without_positions_has_no_geometry() {
        let json = serde_json::json!({
            "asset": { "version": "2.0" },
            "accessors": [],
            "meshes": [ { "primitives": [ {} ] } ]
        })
        .to_string();
        assert!(matches!(
            parse_model_bytes("empty", json.as_bytes()),
            Err(AssetError::NoGeometry)
        ));
    }

    #[test]
    fn content_id_tracks_bytes() {
        let a = parse_model_bytes("a", sample_gltf().as_bytes()).unwrap();
        let b = parse_model_bytes("b", sample_gltf().as_bytes()).unwrap();
        let c = parse_model_bytes("c", &wrap_glb(&sample_gltf())).unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(sample_gltf().as_bytes()).unwrap();
        let model = load_model_file(tmp.path()).unwrap();
        assert_eq!(model.parts.len(), 2);
    }

    #[test]
    fn background_load_delivers_over_channel() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(sample_gltf().as_bytes()).unwrap();
        let rx = spawn_model_load(ModelSource::File(tmp.path().to_path_buf()));
        let result = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("loader thread should reply");
        assert!(result.is_ok());
    }

    #[test]
    fn background_load_reports_missing_file() {
        let rx = spawn_model_load(ModelSource::File(PathBuf::from("/nonexistent/model.glb")));
        let result = rx
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("loader thread should reply");
        assert!(matches!(result, Err(AssetError::Io(_))));
    }
}
