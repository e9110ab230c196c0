use crate::camera::OrbitCamera;

/// Camera block laid out for verbatim upload (std140-compatible: the 3x3
/// normal matrix is stored as three padded columns).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub normal_mat: [[f32; 4]; 3],
    pub world_scale: f32,
    pub _padding: [f32; 3],
}

impl CameraUniform {
    pub fn from_camera(camera: &OrbitCamera) -> Self {
        let normal = camera.normal_matrix();
        Self {
            projection: camera.projection_matrix().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            normal_mat: [
                normal.x_axis.extend(0.0).to_array(),
                normal.y_axis.extend(0.0).to_array(),
                normal.z_axis.extend(0.0).to_array(),
            ],
            world_scale: camera.zoom_scale(),
            _padding: [0.0; 3],
        }
    }
}
