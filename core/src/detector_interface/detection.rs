use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box with all coordinates as normalized fractions
/// of the frame in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Normalized box area.
    pub fn area(&self) -> f32 {
        (self.xmax - self.xmin) * (self.ymax - self.ymin)
    }

    /// Horizontal center, used for zone assignment.
    pub fn x_center(&self) -> f32 {
        (self.xmin + self.xmax) / 2.0
    }
}

/// Single accepted detection for one frame. Ephemeral: handed from the
/// ingest stage to the zone stage by value and dropped with the frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub bounds: BoundingBox,
    pub class_id: u32,
    pub score: f32,
}

impl Detection {
    pub fn new(bounds: BoundingBox, class_id: u32, score: f32) -> Self {
        Self {
            bounds,
            class_id,
            score,
        }
    }
}
