use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera-relative horizontal direction for [`CameraEvent::TranslateLocal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Front,
    Right,
}

/// One discrete input delta.
///
/// The mapping from device events (keys, drags, scroll) to these is the
/// caller's business; scene files use the serialized form to script a
/// camera, e.g. `{ "op": "rotate", "angle": -45.0, "axis": [0, 0, 1] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CameraEvent {
    Translate { offset: Vec3 },
    TranslateLocal { amount: f32, direction: Direction },
    Rotate { angle: f32, axis: Vec3 },
    RotateLocalX { angle: f32 },
    Scale { factor: f32 },
    Resize { width: u32, height: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_deserialize_from_tagged_json() {
        let json = r#"[
            { "op": "translate_local", "amount": 0.1, "direction": "front" },
            { "op": "rotate", "angle": -45.0, "axis": [1.0, 0.0, 0.0] },
            { "op": "rotate_local_x", "angle": 2.5 },
            { "op": "scale", "factor": 1.125 },
            { "op": "resize", "width": 1280, "height": 720 },
            { "op": "translate", "offset": [0.0, 1.0, 0.0] }
        ]"#;
        let events: Vec<CameraEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[0],
            CameraEvent::TranslateLocal {
                amount: 0.1,
                direction: Direction::Front
            }
        );
        assert_eq!(
            events[1],
            CameraEvent::Rotate {
                angle: -45.0,
                axis: Vec3::X
            }
        );
        assert_eq!(
            events[4],
            CameraEvent::Resize {
                width: 1280,
                height: 720
            }
        );
    }

    #[test]
    fn unknown_op_is_rejected() {
        let result: Result<CameraEvent, _> = serde_json::from_str(r#"{ "op": "dolly" }"#);
        assert!(result.is_err());
    }
}
