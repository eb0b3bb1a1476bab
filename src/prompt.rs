//! Instruction templates and the user payload sent alongside them.
//!
//! The provider's JSON mode only returns objects, so multi-frame templates ask
//! for the frames wrapped in a `{"frames": [...]}` envelope.

use crate::{
    Result,
    rig::{ControlPoint, OutputMode},
};
use serde::Serialize;

const POSE_PROMPT: &str = r#"
You are a pose generation assistant integrated with an As-Rigid-As-Possible (ARAP) deformation system. Your task is to produce deformation amounts for each control point of a 3D character model based on a user-provided text prompt and control point data, while preserving ARAP rigidity constraints (minimize stretching, prioritize local rigidity).

**Input**:
- **Control Points**: A list of control points with id (integer), role (e.g., "left leg", "right arm", "head"), and position (x, y, z coordinates as floats).
- **Prompt**: A text description of the desired pose (e.g., "raise the right arm").
- **Context**: Assume a 3D humanoid character model with a standard rig (arms, legs, head).

**Output**:
- A single JSON object where each key is a control point id (as a string), and the value is an object with delta_x, delta_y, delta_z (offsets from the original position, in the same units as the input positions).

**Example Input**:
{"control_points": [{"id": 0, "role": "left leg", "position": [1, 2, 0]}, {"id": 1, "role": "right arm", "position": [-1, 2, 0]}], "prompt": "raise the right arm"}

**Example Output**:
{"0": {"delta_x": 0, "delta_y": 0, "delta_z": 0}, "1": {"delta_x": 0.2, "delta_y": 1.0, "delta_z": 0.1}}

**Instructions**:
1. Interpret the prompt to identify which control points are involved.
2. Keep changes small and realistic (within 1 unit unless specified) to maintain ARAP rigidity.
3. Use zero deltas for unaffected control points.
4. Output only the JSON object, no additional text.
"#;

const ANIMATION_PROMPT: &str = r#"
You are an animation generation assistant integrated with an As-Rigid-As-Possible (ARAP) deformation system. Your task is to generate multiple frames of deformation amounts for each control point of a 3D character model based on a user-provided text prompt, control point data, and animation length, while preserving ARAP rigidity constraints (minimize stretching, prioritize local rigidity).

**Input**:
- **Control Points**: A list of control points with id (integer), role (e.g., "left leg", "right arm", "head"), and position (x, y, z coordinates as floats).
- **Prompt**: A text description of the desired animation (e.g., "make the character wave", "make the character walk naturally forward").
- **Length**: The number of animation frames to generate (integer).
- **Context**: Assume a 3D humanoid character model with a standard rig (arms, legs, head).

**Output**:
- A JSON object with a single key "frames" holding an array with exactly "length" elements, one per frame.
- Each frame is a JSON object where each key is a control point id (as a string), and the value is an object with delta_x, delta_y, delta_z (offsets from the original position, in the same units as the input positions).

**Example Input**:
{"control_points": [{"id": 0, "role": "right arm", "position": [-1, 2, 0]}, {"id": 1, "role": "head", "position": [0, 7, 0]}], "prompt": "make the character wave", "length": 2}

**Example Output**:
{"frames": [
  {"0": {"delta_x": 0.2, "delta_y": 0.5, "delta_z": 0.1}, "1": {"delta_x": 0, "delta_y": 0, "delta_z": 0}},
  {"0": {"delta_x": 0.5, "delta_y": 1.0, "delta_z": 0.2}, "1": {"delta_x": 0, "delta_y": 0, "delta_z": 0}}
]}

**Instructions**:
1. Interpret the prompt to identify which control points are involved in the animation and the type of motion.
2. Generate the specified number of frames that create a smooth animation sequence.
3. Keep changes small and realistic (within 1 unit unless specified) to maintain ARAP rigidity.
4. Use zero deltas for unaffected control points.
5. For cyclical motions, make the last frame transition smoothly back to the first.
6. Output only the JSON object, no additional text.
"#;

const KEYFRAMES_PROMPT: &str = r#"
You are an animation generation assistant integrated with an As-Rigid-As-Possible (ARAP) deformation system. Your task is to generate multiple frames of absolute positions for each control point of a 3D character model based on a user-provided text prompt, control point data, and animation length. You will generate the new positions for each control point to achieve the described animation while preserving ARAP rigidity constraints (minimize stretching, prioritize local rigidity).

**Input**:
- **Control Points**: A list of control points with id (integer), role (e.g., "left leg", "right arm", "head"), and position (x, y, z coordinates as floats).
- **Prompt**: A text description of the desired animation (e.g., "make the character wave", "make the character walk naturally forward").
- **Length**: The number of animation frames to generate (integer).
- **Context**: Assume a 3D humanoid character model with a standard rig (arms, legs, head).

**Output**:
- A JSON object with a single key "frames" holding an array with exactly "length" elements, one per frame.
- Each frame is a JSON object where each key is a control point id (as a string), and the value is an object with x, y, z (absolute positions in the same units as the input positions).
- Keep unaffected points (e.g., legs when waving) at their original positions or with minimal changes.

**Example Input**:
{"control_points": [{"id": 0, "role": "left leg", "position": [1, 2, 0]}, {"id": 1, "role": "right arm", "position": [-1, 2, 0]}, {"id": 2, "role": "head", "position": [0, 7, 0]}], "prompt": "make the character wave", "length": 3}

**Example Output**:
{"frames": [
  {"0": {"x": 1, "y": 2, "z": 0}, "1": {"x": -0.8, "y": 2.5, "z": 0.1}, "2": {"x": 0, "y": 7, "z": 0}},
  {"0": {"x": 1, "y": 2, "z": 0}, "1": {"x": -0.5, "y": 3.0, "z": 0.2}, "2": {"x": 0, "y": 7, "z": 0}},
  {"0": {"x": 1, "y": 2, "z": 0}, "1": {"x": -0.8, "y": 2.3, "z": 0.1}, "2": {"x": 0, "y": 7, "z": 0}}
]}

**Instructions**:
1. Interpret the prompt to identify which control points are involved in the animation and the type of motion.
2. Generate the specified number of frames that create a smooth animation sequence.
3. Keep position changes small and realistic (within 1 unit from original unless specified) to maintain ARAP rigidity.
4. Keep unaffected control points at their original positions.
5. For cyclical motions, make the last frame transition smoothly back to the first.
6. Output only the JSON object, no additional text.
"#;

/// Instruction template for `mode`.
pub fn system_prompt(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::Pose => POSE_PROMPT,
        OutputMode::Animation => ANIMATION_PROMPT,
        OutputMode::Keyframes => KEYFRAMES_PROMPT,
    }
}

#[derive(Debug, Serialize)]
struct UserPayload<'a> {
    control_points: &'a [ControlPoint],
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    length: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptPayload {
    pub system: String,
    pub user: String,
}

/// Pairs the template with the serialized request. `length` is only sent for
/// multi-frame modes.
pub fn assemble(
    mode: OutputMode,
    control_points: &[ControlPoint],
    prompt: &str,
    length: Option<i64>,
) -> Result<PromptPayload> {
    let payload = UserPayload {
        control_points,
        prompt,
        length: length.filter(|_| mode.requires_length()),
    };

    Ok(PromptPayload {
        system: system_prompt(mode).to_string(),
        user: serde_json::to_string(&payload)?,
    })
}
