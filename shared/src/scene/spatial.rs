use glam::{Vec2, Vec3};

/// Which kind of transform a concrete node type carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpatialKind {
    None,
    TwoD,
    Ui,
    ThreeD,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transform2D {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub z_index: i32,
    pub z_as_relative: bool,
    pub y_sort_enabled: bool,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            z_index: 0,
            z_as_relative: true,
            y_sort_enabled: false,
        }
    }
}

/// Layout state of a UI control. Anchors and offsets are in
/// left/right/top/bottom order.
#[derive(Clone, Debug, PartialEq)]
pub struct UiTransform {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub size: Vec2,
    pub z_index: i32,
    pub z_as_relative: bool,
    pub custom_minimum_size: Vec2,
    pub layout_mode: i32,
    pub layout_direction: i32,
    pub anchor_left: f32,
    pub anchor_right: f32,
    pub anchor_top: f32,
    pub anchor_bottom: f32,
    pub anchors_preset: i32,
    pub offset_left: f32,
    pub offset_right: f32,
    pub offset_top: f32,
    pub offset_bottom: f32,
    pub pivot_offset: Vec2,
    pub theme: Option<String>,
}

impl Default for UiTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            size: Vec2::ZERO,
            z_index: 0,
            z_as_relative: true,
            custom_minimum_size: Vec2::ZERO,
            layout_mode: 0,
            layout_direction: 0,
            anchor_left: 0.0,
            anchor_right: 0.0,
            anchor_top: 0.0,
            anchor_bottom: 0.0,
            anchors_preset: 0,
            offset_left: 0.0,
            offset_right: 0.0,
            offset_top: 0.0,
            offset_bottom: 0.0,
            pivot_offset: Vec2::ZERO,
            theme: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transform3D {
    pub position: Vec3,
    /// Euler angles, radians
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Spatial state of an entity. The variants are mutually exclusive.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Spatial {
    #[default]
    None,
    TwoD(Transform2D),
    Ui(UiTransform),
    ThreeD(Transform3D),
}

impl Spatial {
    pub fn kind(&self) -> SpatialKind {
        match self {
            Spatial::None => SpatialKind::None,
            Spatial::TwoD(_) => SpatialKind::TwoD,
            Spatial::Ui(_) => SpatialKind::Ui,
            Spatial::ThreeD(_) => SpatialKind::ThreeD,
        }
    }

    /// Moves the entity, dropping `z` for planar kinds. Returns false for
    /// entities without a transform.
    pub fn set_position(&mut self, position: Vec3) -> bool {
        match self {
            Spatial::None => false,
            Spatial::TwoD(transform) => {
                transform.position = position.truncate();
                true
            }
            Spatial::Ui(transform) => {
                transform.position = position.truncate();
                true
            }
            Spatial::ThreeD(transform) => {
                transform.position = position;
                true
            }
        }
    }

    pub fn position(&self) -> Option<Vec3> {
        match self {
            Spatial::None => None,
            Spatial::TwoD(transform) => Some(transform.position.extend(0.0)),
            Spatial::Ui(transform) => Some(transform.position.extend(0.0)),
            Spatial::ThreeD(transform) => Some(transform.position),
        }
    }
}
