use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{meta, NetworkId, Spatial, SpatialKind, Transform2D, Transform3D, UiTransform};

use super::CodecError;

/// Serialized form of one entity and, recursively, its children. Field
/// names are the short keys used on the wire and in save files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    #[serde(rename = "N")]
    pub name: String,
    #[serde(rename = "T")]
    pub declared_type: String,
    #[serde(rename = "DT")]
    pub concrete_type: String,
    #[serde(flatten)]
    pub spatial: SpatialFields,
    #[serde(rename = "M", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
    #[serde(rename = "G", default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(rename = "C", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntityRecord>,
    #[serde(rename = "IND", default, skip_serializing_if = "Option::is_none")]
    pub network_payload: Option<Value>,
    #[serde(rename = "ISD", default, skip_serializing_if = "Option::is_none")]
    pub save_payload: Option<Value>,
}

impl EntityRecord {
    /// The identity carried in the metadata, present on network records only.
    pub fn network_id(&self) -> Result<Option<NetworkId>, CodecError> {
        match self.meta.get(meta::UNIQUE_ID) {
            None => Ok(None),
            Some(value) => value
                .parse::<NetworkId>()
                .map(Some)
                .map_err(|_| CodecError::MalformedIdentity {
                    name: self.name.clone(),
                    value: value.clone(),
                }),
        }
    }

    /// Number of records in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(EntityRecord::subtree_len)
            .sum::<usize>()
    }
}

/// Planar or spatial vector; the variant is picked by the array length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Vector {
    Xyz(Vec3),
    Xy(Vec2),
}

/// Euler angles for 3-D entities, a single angle otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rotation {
    Euler(Vec3),
    Angle(f32),
}

/// Flattened transform fields. Which ones are present depends on the
/// concrete type's [`SpatialKind`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpatialFields {
    #[serde(rename = "P", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vector>,
    #[serde(rename = "R", default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
    #[serde(rename = "S", default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vector>,
    #[serde(rename = "SZ", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Vec2>,
    #[serde(rename = "ZI", default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
    #[serde(rename = "ZIR", default, skip_serializing_if = "Option::is_none")]
    pub z_as_relative: Option<bool>,
    #[serde(rename = "YSE", default, skip_serializing_if = "Option::is_none")]
    pub y_sort_enabled: Option<bool>,
    #[serde(rename = "MS", default, skip_serializing_if = "Option::is_none")]
    pub custom_minimum_size: Option<Vec2>,
    #[serde(rename = "LM", default, skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<i32>,
    #[serde(rename = "LD", default, skip_serializing_if = "Option::is_none")]
    pub layout_direction: Option<i32>,
    #[serde(rename = "AL", default, skip_serializing_if = "Option::is_none")]
    pub anchor_left: Option<f32>,
    #[serde(rename = "AR", default, skip_serializing_if = "Option::is_none")]
    pub anchor_right: Option<f32>,
    #[serde(rename = "AT", default, skip_serializing_if = "Option::is_none")]
    pub anchor_top: Option<f32>,
    #[serde(rename = "AB", default, skip_serializing_if = "Option::is_none")]
    pub anchor_bottom: Option<f32>,
    #[serde(rename = "AP", default, skip_serializing_if = "Option::is_none")]
    pub anchors_preset: Option<i32>,
    #[serde(rename = "OL", default, skip_serializing_if = "Option::is_none")]
    pub offset_left: Option<f32>,
    #[serde(rename = "OR", default, skip_serializing_if = "Option::is_none")]
    pub offset_right: Option<f32>,
    #[serde(rename = "OT", default, skip_serializing_if = "Option::is_none")]
    pub offset_top: Option<f32>,
    #[serde(rename = "OB", default, skip_serializing_if = "Option::is_none")]
    pub offset_bottom: Option<f32>,
    #[serde(rename = "PO", default, skip_serializing_if = "Option::is_none")]
    pub pivot_offset: Option<Vec2>,
    #[serde(rename = "THM", default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl SpatialFields {
    pub fn from_spatial(spatial: &Spatial) -> Self {
        match spatial {
            Spatial::None => Self::default(),
            Spatial::TwoD(transform) => Self {
                position: Some(Vector::Xy(transform.position)),
                rotation: Some(Rotation::Angle(transform.rotation)),
                scale: Some(Vector::Xy(transform.scale)),
                z_index: Some(transform.z_index),
                z_as_relative: Some(transform.z_as_relative),
                y_sort_enabled: Some(transform.y_sort_enabled),
                ..Self::default()
            },
            Spatial::Ui(transform) => Self {
                position: Some(Vector::Xy(transform.position)),
                rotation: Some(Rotation::Angle(transform.rotation)),
                scale: Some(Vector::Xy(transform.scale)),
                size: Some(transform.size),
                z_index: Some(transform.z_index),
                z_as_relative: Some(transform.z_as_relative),
                custom_minimum_size: Some(transform.custom_minimum_size),
                layout_mode: Some(transform.layout_mode),
                layout_direction: Some(transform.layout_direction),
                anchor_left: Some(transform.anchor_left),
                anchor_right: Some(transform.anchor_right),
                anchor_top: Some(transform.anchor_top),
                anchor_bottom: Some(transform.anchor_bottom),
                anchors_preset: Some(transform.anchors_preset),
                offset_left: Some(transform.offset_left),
                offset_right: Some(transform.offset_right),
                offset_top: Some(transform.offset_top),
                offset_bottom: Some(transform.offset_bottom),
                pivot_offset: Some(transform.pivot_offset),
                theme: transform.theme.clone(),
                ..Self::default()
            },
            Spatial::ThreeD(transform) => Self {
                position: Some(Vector::Xyz(transform.position)),
                rotation: Some(Rotation::Euler(transform.rotation)),
                scale: Some(Vector::Xyz(transform.scale)),
                ..Self::default()
            },
        }
    }

    /// Builds the transform for `kind`. Position, rotation and scale are
    /// required for every spatial kind (and size for UI controls); the
    /// remaining fields fall back to their defaults.
    pub fn to_spatial(&self, name: &str, kind: SpatialKind) -> Result<Spatial, CodecError> {
        let fields = FieldReader { name, kind };
        match kind {
            SpatialKind::None => Ok(Spatial::None),
            SpatialKind::TwoD => {
                let defaults = Transform2D::default();
                Ok(Spatial::TwoD(Transform2D {
                    position: fields.planar("P", self.position)?,
                    rotation: fields.angle(self.rotation)?,
                    scale: fields.planar("S", self.scale)?,
                    z_index: self.z_index.unwrap_or(defaults.z_index),
                    z_as_relative: self.z_as_relative.unwrap_or(defaults.z_as_relative),
                    y_sort_enabled: self.y_sort_enabled.unwrap_or(defaults.y_sort_enabled),
                }))
            }
            SpatialKind::Ui => {
                let defaults = UiTransform::default();
                Ok(Spatial::Ui(UiTransform {
                    position: fields.planar("P", self.position)?,
                    rotation: fields.angle(self.rotation)?,
                    scale: fields.planar("S", self.scale)?,
                    size: fields.require("SZ", self.size)?,
                    z_index: self.z_index.unwrap_or(defaults.z_index),
                    z_as_relative: self.z_as_relative.unwrap_or(defaults.z_as_relative),
                    custom_minimum_size: self
                        .custom_minimum_size
                        .unwrap_or(defaults.custom_minimum_size),
                    layout_mode: self.layout_mode.unwrap_or(defaults.layout_mode),
                    layout_direction: self.layout_direction.unwrap_or(defaults.layout_direction),
                    anchor_left: self.anchor_left.unwrap_or(defaults.anchor_left),
                    anchor_right: self.anchor_right.unwrap_or(defaults.anchor_right),
                    anchor_top: self.anchor_top.unwrap_or(defaults.anchor_top),
                    anchor_bottom: self.anchor_bottom.unwrap_or(defaults.anchor_bottom),
                    anchors_preset: self.anchors_preset.unwrap_or(defaults.anchors_preset),
                    offset_left: self.offset_left.unwrap_or(defaults.offset_left),
                    offset_right: self.offset_right.unwrap_or(defaults.offset_right),
                    offset_top: self.offset_top.unwrap_or(defaults.offset_top),
                    offset_bottom: self.offset_bottom.unwrap_or(defaults.offset_bottom),
                    pivot_offset: self.pivot_offset.unwrap_or(defaults.pivot_offset),
                    theme: self.theme.clone(),
                }))
            }
            SpatialKind::ThreeD => Ok(Spatial::ThreeD(Transform3D {
                position: fields.spatial("P", self.position)?,
                rotation: fields.euler(self.rotation)?,
                scale: fields.spatial("S", self.scale)?,
            })),
        }
    }
}

struct FieldReader<'a> {
    name: &'a str,
    kind: SpatialKind,
}

impl FieldReader<'_> {
    fn require<T>(&self, field: &'static str, value: Option<T>) -> Result<T, CodecError> {
        value.ok_or_else(|| CodecError::MissingField {
            name: self.name.to_string(),
            kind: self.kind,
            field,
        })
    }

    fn malformed(&self, field: &'static str) -> CodecError {
        CodecError::MalformedField {
            name: self.name.to_string(),
            field,
        }
    }

    fn planar(&self, field: &'static str, value: Option<Vector>) -> Result<Vec2, CodecError> {
        match self.require(field, value)? {
            Vector::Xy(vector) => Ok(vector),
            Vector::Xyz(_) => Err(self.malformed(field)),
        }
    }

    fn spatial(&self, field: &'static str, value: Option<Vector>) -> Result<Vec3, CodecError> {
        match self.require(field, value)? {
            Vector::Xyz(vector) => Ok(vector),
            Vector::Xy(_) => Err(self.malformed(field)),
        }
    }

    fn angle(&self, value: Option<Rotation>) -> Result<f32, CodecError> {
        match self.require("R", value)? {
            Rotation::Angle(angle) => Ok(angle),
            Rotation::Euler(_) => Err(self.malformed("R")),
        }
    }

    fn euler(&self, value: Option<Rotation>) -> Result<Vec3, CodecError> {
        match self.require("R", value)? {
            Rotation::Euler(euler) => Ok(euler),
            Rotation::Angle(_) => Err(self.malformed("R")),
        }
    }
}
