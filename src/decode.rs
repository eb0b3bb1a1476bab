//! Turns the model's JSON reply into frames keyed by dense id.

use crate::{
    Error, Result,
    rig::{Deformation, DenseFrame, DenseId, Position},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::warn;

type RawFrame = Map<String, Value>;

/// Frame sequences arrive either in a `{"frames": [...]}` envelope or bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFrames {
    Wrapped { frames: Vec<RawFrame> },
    Bare(Vec<RawFrame>),
}

impl RawFrames {
    fn into_frames(self) -> Vec<RawFrame> {
        match self {
            Self::Wrapped { frames } => frames,
            Self::Bare(frames) => frames,
        }
    }
}

/// A single flat frame of deltas.
pub fn decode_deltas(content: &str) -> Result<DenseFrame> {
    let raw: RawFrame = parse(content)?;
    decode_frame(raw, |_, value: Deformation| Some(value))
}

/// A sequence of delta frames.
pub fn decode_delta_frames(content: &str) -> Result<Vec<DenseFrame>> {
    parse_frames(content)?
        .into_iter()
        .map(|raw| decode_frame(raw, |_, value: Deformation| Some(value)))
        .collect()
}

/// A sequence of absolute-position frames, converted to deltas against
/// `originals` (dense id to rest position).
pub fn decode_position_frames(
    content: &str,
    originals: &HashMap<DenseId, [f64; 3]>,
) -> Result<Vec<DenseFrame>> {
    parse_frames(content)?
        .into_iter()
        .map(|raw| {
            decode_frame(raw, |id, position: Position| match originals.get(&id) {
                Some(origin) => Some(position.delta_from(*origin)),
                None => {
                    warn!("No original position for control point {}, skipping", id);
                    None
                }
            })
        })
        .collect()
}

fn parse<T: DeserializeOwned>(content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| Error::decode(e.to_string()))
}

fn parse_frames(content: &str) -> Result<Vec<RawFrame>> {
    let value: Value = parse(content)?;
    serde_json::from_value::<RawFrames>(value)
        .map(RawFrames::into_frames)
        .map_err(|_| Error::decode("expected an array of frames or an object with a \"frames\" array"))
}

/// Parses each key strictly as a dense id, skipping the ones that are not,
/// and hands typed values to `convert`.
fn decode_frame<T, F>(raw: RawFrame, convert: F) -> Result<DenseFrame>
where
    T: DeserializeOwned,
    F: Fn(DenseId, T) -> Option<Deformation>,
{
    let mut frame = DenseFrame::new();

    for (key, value) in raw {
        let Ok(id) = key.parse::<DenseId>() else {
            warn!("Invalid ID format: {}", key);
            continue;
        };

        let value: T = serde_json::from_value(value)
            .map_err(|e| Error::decode(format!("control point {}: {}", key, e)))?;

        if let Some(deformation) = convert(id, value) {
            frame.insert(id, deformation);
        }
    }

    Ok(frame)
}
