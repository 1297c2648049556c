use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

const YAW: f32 = -90.0;
const PITCH: f32 = 0.0;
const SPEED: f32 = 2.5;
const SENSITIVITY: f32 = 0.1;
const ZOOM: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-flying perspective camera driven by keyboard, mouse-look and
/// scroll zoom. Orientation is yaw/pitch only (no roll); pitch is clamped
/// so the view never flips over the vertical.
#[derive(Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub right: Vector3<f32>,
    pub world_up: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub zoom: f32,
}

impl Camera {
    pub fn new(position: Point3<f32>) -> Self {
        let mut camera = Camera {
            position,
            front: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            world_up: Vector3::unit_y(),
            yaw: YAW,
            pitch: PITCH,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    pub fn process_mouse(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;
        self.pitch = self.pitch.clamp(-89.0, 89.0);
        self.update_vectors();
    }

    pub fn process_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(1.0, 45.0);
    }

    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        self.front = Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 3.0));
        assert!(close(camera.front, Vector3::new(0.0, 0.0, -1.0)));
        assert!(close(camera.right, Vector3::unit_x()));
        assert!(close(camera.up, Vector3::unit_y()));
    }

    #[test]
    fn pitch_is_clamped_at_the_vertical() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0));
        camera.process_mouse(0.0, 10000.0);
        assert_eq!(camera.pitch, 89.0);
        camera.process_mouse(0.0, -100000.0);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn scroll_zoom_clamps_to_fov_range() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0));
        camera.process_scroll(100.0);
        assert_eq!(camera.zoom, 1.0);
        camera.process_scroll(-100.0);
        assert_eq!(camera.zoom, 45.0);
    }

    #[test]
    fn keyboard_moves_along_the_camera_axes() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 3.0));
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert!((camera.position.z - 0.5).abs() < 1e-5);
        camera.process_keyboard(CameraMovement::Right, 1.0);
        assert!((camera.position.x - 2.5).abs() < 1e-5);
    }
}
