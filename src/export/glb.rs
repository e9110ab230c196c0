use std::borrow::Cow;
use std::collections::BTreeMap;

use gltf::binary::Glb;
use gltf_json::Index;
use gltf_json::accessor::{ComponentType, GenericComponentType, Type as AccessorType};
use gltf_json::buffer::Target;
use gltf_json::mesh::{Mode, Primitive, Semantic};
use gltf_json::validation::{Checked, USize64};
use glam::{Mat4, Vec4};

use crate::error::{Result, ShapeError};
use crate::render::Renderable;
use crate::types::{BoundingBox, Topology};

const GENERATOR: &str = "orbit-shapes";
const MESHOPT_EXTENSION: &str = "EXT_meshopt_compression";
const BIN_BUFFER: u32 = 0;
const FALLBACK_BUFFER: u32 = 1;

/// Output of the view writers: the GLB binary chunk plus the size of the
/// decoded data that compressed views describe.
#[derive(Default)]
struct BinLayout {
    data: Vec<u8>,
    fallback_len: usize,
}

impl BinLayout {
    /// Reserve `len` decoded bytes in the fallback buffer and return their offset.
    fn reserve_fallback(&mut self, len: usize) -> usize {
        self.fallback_len = self.fallback_len.next_multiple_of(4);
        let offset = self.fallback_len;
        self.fallback_len += len;
        offset
    }
}

/// Serialize a renderable into a binary GLB (glTF 2.0) byte buffer.
///
/// Produces a self-contained GLB with:
/// - 1 buffer (positions + optional normals + indices)
/// - 1 Mesh with 1 Primitive (mode = Triangles or Lines)
/// - 1 Node carrying the model transform → 1 Scene
/// - a Material when the renderable has a color
///
/// Indices use u16 when vertex_count <= 65535.
pub fn write_glb(renderable: &Renderable) -> Result<Vec<u8>> {
    write_glb_impl(renderable, false)
}

/// Same as [`write_glb`] with EXT_meshopt_compression applied to the vertex
/// attributes and, for triangle meshes, the index buffer. Viewers must
/// support the extension to load these.
///
/// Compressed views keep their decoded size and point at a second,
/// data-less buffer flagged as the extension's fallback; the encoded bytes
/// live in the GLB binary chunk and are only referenced from the extension.
pub fn write_glb_compressed(renderable: &Renderable) -> Result<Vec<u8>> {
    write_glb_impl(renderable, true)
}

fn write_glb_impl(renderable: &Renderable, compress: bool) -> Result<Vec<u8>> {
    let mesh = renderable.mesh();
    let bounds = BoundingBox::from_points(mesh.positions()).ok_or_else(|| {
        ShapeError::Output(format!("{}: cannot export an empty mesh", renderable.name()))
    })?;

    let mut root = gltf_json::Root {
        asset: gltf_json::Asset {
            version: "2.0".into(),
            generator: Some(GENERATOR.into()),
            ..Default::default()
        },
        ..Default::default()
    };

    let mut bin = BinLayout::default();
    let mut attributes = BTreeMap::new();
    let vertex_count = mesh.vertex_count();

    // --- Positions (required) ---
    let positions = mesh.position_buffer();
    let pos_encoded = if compress {
        encode_f32x3(&positions)
    } else {
        None
    };
    let pos_view = write_vertex_attribute_view(
        &mut root,
        &mut bin,
        bytemuck::cast_slice(&positions),
        12,
        vertex_count,
        pos_encoded,
    );
    let pos_accessor = root.push(vec3_accessor(
        pos_view,
        vertex_count,
        Some((bounds.min, bounds.max)),
    ));
    attributes.insert(Checked::Valid(Semantic::Positions), pos_accessor);

    // --- Normals (surfaces only) ---
    if mesh.has_normals() {
        let normals = mesh.normal_buffer();
        let normals_encoded = if compress {
            encode_f32x3(&normals)
        } else {
            None
        };
        let view = write_vertex_attribute_view(
            &mut root,
            &mut bin,
            bytemuck::cast_slice(&normals),
            12,
            vertex_count,
            normals_encoded,
        );
        let accessor = root.push(vec3_accessor(view, vertex_count, None));
        attributes.insert(Checked::Valid(Semantic::Normals), accessor);
    }

    // --- Indices ---
    let use_u16_indices = vertex_count <= 65535;
    let mode = match mesh.topology() {
        Topology::Triangles => Mode::Triangles,
        Topology::Lines => Mode::Lines,
    };
    // The meshopt index codec only understands triangle lists.
    let idx_encoded = if compress && mesh.topology() == Topology::Triangles {
        meshopt::encode_index_buffer(mesh.indices(), vertex_count).ok()
    } else {
        None
    };
    let idx_view = write_index_view(
        &mut root,
        &mut bin,
        mesh.indices(),
        use_u16_indices,
        idx_encoded,
    );
    let idx_component_type = if use_u16_indices {
        ComponentType::U16
    } else {
        ComponentType::U32
    };
    let idx_accessor = root.push(gltf_json::Accessor {
        buffer_view: Some(idx_view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(mesh.indices().len()),
        component_type: Checked::Valid(GenericComponentType(idx_component_type)),
        type_: Checked::Valid(AccessorType::Scalar),
        min: None,
        max: None,
        name: None,
        normalized: false,
        sparse: None,
        extensions: Default::default(),
        extras: Default::default(),
    });

    // --- Material (optional) ---
    let material = renderable
        .color()
        .map(|color| build_material(&mut root, renderable.name(), color));

    // --- Mesh ---
    let primitive = Primitive {
        attributes,
        indices: Some(idx_accessor),
        material,
        mode: Checked::Valid(mode),
        targets: None,
        extensions: Default::default(),
        extras: Default::default(),
    };
    let mesh_idx = root.push(gltf_json::Mesh {
        primitives: vec![primitive],
        weights: None,
        name: Some(renderable.name().to_string()),
        extensions: Default::default(),
        extras: Default::default(),
    });

    // --- Node ---
    let model = renderable.model();
    let node_idx = root.push(gltf_json::Node {
        mesh: Some(mesh_idx),
        name: Some(renderable.name().to_string()),
        matrix: (model != Mat4::IDENTITY).then(|| model.to_cols_array()),
        ..Default::default()
    });

    // --- Scene ---
    let scene_idx = root.push(gltf_json::Scene {
        nodes: vec![node_idx],
        name: None,
        extensions: Default::default(),
        extras: Default::default(),
    });
    root.scene = Some(scene_idx);

    if compress {
        root.extensions_used.push(MESHOPT_EXTENSION.to_string());
        root.extensions_required.push(MESHOPT_EXTENSION.to_string());
    }

    // --- Buffers ---
    let BinLayout {
        data: mut bin_data,
        fallback_len,
    } = bin;
    pad_to_four(&mut bin_data, 0);
    root.push(gltf_json::Buffer {
        byte_length: USize64::from(bin_data.len()),
        uri: None,
        name: None,
        extensions: Default::default(),
        extras: Default::default(),
    });
    if fallback_len > 0 {
        let mut others = serde_json::Map::new();
        others.insert(MESHOPT_EXTENSION.into(), serde_json::json!({ "fallback": true }));
        root.push(gltf_json::Buffer {
            byte_length: USize64::from(fallback_len.next_multiple_of(4)),
            uri: None,
            name: None,
            extensions: Some(gltf_json::extensions::buffer::Buffer { others }),
            extras: Default::default(),
        });
    }

    // --- Assemble GLB ---
    let mut json_bytes = gltf_json::serialize::to_string(&root)?.into_bytes();
    pad_to_four(&mut json_bytes, b' ');

    let glb = Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            length: (12 + 8 + json_bytes.len() + 8 + bin_data.len()) as u32,
        },
        json: Cow::Owned(json_bytes),
        bin: Some(Cow::Owned(bin_data)),
    };

    glb.to_vec()
        .map_err(|e| ShapeError::Output(format!("{}: GLB serialization failed: {e}", renderable.name())))
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

fn vec3_accessor(
    view: Index<gltf_json::buffer::View>,
    count: usize,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> gltf_json::Accessor {
    gltf_json::Accessor {
        buffer_view: Some(view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(count),
        component_type: Checked::Valid(GenericComponentType(ComponentType::F32)),
        type_: Checked::Valid(AccessorType::Vec3),
        min: bounds.map(|(min, _)| serde_json::json!(min)),
        max: bounds.map(|(_, max)| serde_json::json!(max)),
        name: None,
        normalized: false,
        sparse: None,
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Encode a flat f32 array as [f32; 3] vertex data using meshopt.
fn encode_f32x3(data: &[f32]) -> Option<Vec<u8>> {
    let vertices: &[[f32; 3]] = bytemuck::cast_slice(data);
    meshopt::encode_vertex_buffer(vertices).ok()
}

fn meshopt_view_extension(
    byte_offset: usize,
    byte_length: usize,
    stride: usize,
    count: usize,
    mode: &str,
) -> gltf_json::extensions::buffer::View {
    let mut others = serde_json::Map::new();
    others.insert(
        MESHOPT_EXTENSION.into(),
        serde_json::json!({
            "buffer": BIN_BUFFER,
            "byteOffset": byte_offset,
            "byteLength": byte_length,
            "byteStride": stride,
            "count": count,
            "mode": mode
        }),
    );
    gltf_json::extensions::buffer::View { others }
}

/// Write a vertex attribute buffer view, meshopt-encoded when
/// `encoded_data` is present.
fn write_vertex_attribute_view(
    root: &mut gltf_json::Root,
    bin: &mut BinLayout,
    raw_bytes: &[u8],
    stride: usize,
    vertex_count: usize,
    encoded_data: Option<Vec<u8>>,
) -> Index<gltf_json::buffer::View> {
    pad_to_four(&mut bin.data, 0);
    let byte_offset = bin.data.len();

    if let Some(encoded) = encoded_data {
        bin.data.extend_from_slice(&encoded);
        let decoded_len = vertex_count * stride;
        let fallback_offset = bin.reserve_fallback(decoded_len);
        root.push(gltf_json::buffer::View {
            buffer: Index::new(FALLBACK_BUFFER),
            byte_length: USize64::from(decoded_len),
            byte_offset: Some(USize64::from(fallback_offset)),
            byte_stride: Some(gltf_json::buffer::Stride(stride)),
            name: None,
            target: Some(Checked::Valid(Target::ArrayBuffer)),
            extensions: Some(meshopt_view_extension(
                byte_offset,
                encoded.len(),
                stride,
                vertex_count,
                "ATTRIBUTES",
            )),
            extras: Default::default(),
        })
    } else {
        bin.data.extend_from_slice(raw_bytes);
        root.push(gltf_json::buffer::View {
            buffer: Index::new(BIN_BUFFER),
            byte_length: USize64::from(raw_bytes.len()),
            byte_offset: Some(USize64::from(byte_offset)),
            byte_stride: None,
            name: None,
            target: Some(Checked::Valid(Target::ArrayBuffer)),
            extensions: Default::default(),
            extras: Default::default(),
        })
    }
}

/// Write an index buffer view, meshopt-encoded when `encoded_data` is
/// present.
fn write_index_view(
    root: &mut gltf_json::Root,
    bin: &mut BinLayout,
    indices: &[u32],
    use_u16: bool,
    encoded_data: Option<Vec<u8>>,
) -> Index<gltf_json::buffer::View> {
    pad_to_four(&mut bin.data, 0);
    let byte_offset = bin.data.len();
    let index_size = if use_u16 { 2 } else { 4 };

    if let Some(encoded) = encoded_data {
        bin.data.extend_from_slice(&encoded);
        let decoded_len = indices.len() * index_size;
        let fallback_offset = bin.reserve_fallback(decoded_len);
        root.push(gltf_json::buffer::View {
            buffer: Index::new(FALLBACK_BUFFER),
            byte_length: USize64::from(decoded_len),
            byte_offset: Some(USize64::from(fallback_offset)),
            byte_stride: None,
            name: None,
            target: Some(Checked::Valid(Target::ElementArrayBuffer)),
            extensions: Some(meshopt_view_extension(
                byte_offset,
                encoded.len(),
                index_size,
                indices.len(),
                "TRIANGLES",
            )),
            extras: Default::default(),
        })
    } else {
        if use_u16 {
            let idx_u16: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
            bin.data.extend_from_slice(bytemuck::cast_slice(&idx_u16));
        } else {
            bin.data.extend_from_slice(bytemuck::cast_slice(indices));
        }

        root.push(gltf_json::buffer::View {
            buffer: Index::new(BIN_BUFFER),
            byte_length: USize64::from(indices.len() * index_size),
            byte_offset: Some(USize64::from(byte_offset)),
            byte_stride: None,
            name: None,
            target: Some(Checked::Valid(Target::ElementArrayBuffer)),
            extensions: Default::default(),
            extras: Default::default(),
        })
    }
}

/// Flat-colored material; translucent colors switch to blending.
fn build_material(
    root: &mut gltf_json::Root,
    name: &str,
    color: Vec4,
) -> Index<gltf_json::Material> {
    let alpha_mode = if color.w < 1.0 {
        gltf_json::material::AlphaMode::Blend
    } else {
        gltf_json::material::AlphaMode::Opaque
    };

    let pbr = gltf_json::material::PbrMetallicRoughness {
        base_color_factor: gltf_json::material::PbrBaseColorFactor(color.to_array()),
        metallic_factor: gltf_json::material::StrengthFactor(0.0),
        roughness_factor: gltf_json::material::StrengthFactor(1.0),
        base_color_texture: None,
        metallic_roughness_texture: None,
        extensions: Default::default(),
        extras: Default::default(),
    };

    root.push(gltf_json::Material {
        pbr_metallic_roughness: pbr,
        alpha_mode: Checked::Valid(alpha_mode),
        alpha_cutoff: None,
        double_sided: false,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: gltf_json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        name: Some(name.to_string()),
        extensions: Default::default(),
        extras: Default::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Disk, Geometry, Grid, Line, Torus, UvSphere};
    use glam::Vec3;

    fn renderable(name: &str, shape: &dyn Geometry) -> Renderable {
        Renderable::new(name, shape.generate().unwrap())
    }

    #[test]
    fn glb_magic_and_version() {
        let bytes = write_glb(&renderable("disk", &Disk::new(0.5, 8))).unwrap();
        assert_eq!(&bytes[0..4], b"glTF");
        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(version, 2);
    }

    #[test]
    fn glb_roundtrip_counts() {
        let sphere = renderable("sphere", &UvSphere::new(1.0, 12, 6));
        let bytes = write_glb(&sphere).unwrap();

        let (doc, buffers, _images) = gltf::import_slice(&bytes).unwrap();
        let gltf_mesh = doc.meshes().next().unwrap();
        assert_eq!(gltf_mesh.name(), Some("sphere"));
        let prim = gltf_mesh.primitives().next().unwrap();
        assert_eq!(prim.mode(), gltf::mesh::Mode::Triangles);

        let reader = prim.reader(|buf| Some(&buffers[buf.index()]));
        let positions: Vec<[f32; 3]> = reader.read_positions().unwrap().collect();
        assert_eq!(positions.len(), sphere.mesh().vertex_count());
        assert_eq!(positions[0], sphere.mesh().position(0).to_array());

        let normals = reader.read_normals().unwrap().count();
        assert_eq!(normals, sphere.mesh().vertex_count());

        let indices: Vec<u32> = reader.read_indices().unwrap().into_u32().collect();
        assert_eq!(indices, sphere.mesh().indices());
    }

    #[test]
    fn position_accessor_carries_bounds() {
        let torus = renderable("torus", &Torus::new(0.2, 0.5, 8, 16));
        let bytes = write_glb(&torus).unwrap();
        let (doc, _, _) = gltf::import_slice(&bytes).unwrap();
        let prim = doc.meshes().next().unwrap().primitives().next().unwrap();
        let bb = prim.bounding_box();
        assert!((bb.max[2] - 0.2).abs() < 1e-5);
        assert!((bb.min[0] + 0.7).abs() < 1e-5);
    }

    #[test]
    fn helpers_export_as_lines_without_normals() {
        let mut grid = renderable("floor", &Grid::new(1.0, 5));
        grid.set_color(Vec4::new(0.7, 0.7, 0.7, 0.25));
        let bytes = write_glb(&grid).unwrap();

        let (doc, _, _) = gltf::import_slice(&bytes).unwrap();
        let prim = doc.meshes().next().unwrap().primitives().next().unwrap();
        assert_eq!(prim.mode(), gltf::mesh::Mode::Lines);
        assert!(prim.get(&Semantic::Normals).is_none());
        assert_eq!(prim.indices().unwrap().count(), 32);

        let material = doc.materials().next().unwrap();
        assert_eq!(material.alpha_mode(), gltf::material::AlphaMode::Blend);
        let color = material.pbr_metallic_roughness().base_color_factor();
        assert!((color[3] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn uncolored_mesh_has_no_material() {
        let bytes = write_glb(&renderable("disk", &Disk::new(1.0, 6))).unwrap();
        let (doc, _, _) = gltf::import_slice(&bytes).unwrap();
        assert_eq!(doc.materials().count(), 0);
    }

    #[test]
    fn model_transform_lands_on_node() {
        let mut disk = renderable("disk", &Disk::new(1.0, 6));
        let (doc, _, _) = gltf::import_slice(&write_glb(&disk).unwrap()).unwrap();
        let node = doc.nodes().next().unwrap();
        assert_eq!(node.transform().matrix(), Mat4::IDENTITY.to_cols_array_2d());

        disk.rotate(Vec3::X, 90.0);
        let (doc, _, _) = gltf::import_slice(&write_glb(&disk).unwrap()).unwrap();
        let node = doc.nodes().next().unwrap();
        let matrix = Mat4::from_cols_array_2d(&node.transform().matrix());
        assert!(matrix.abs_diff_eq(disk.model(), 1e-6));
        assert_eq!(node.name(), Some("disk"));
    }

    #[test]
    fn compressed_glb_declares_extension() {
        let sphere = renderable("sphere", &UvSphere::new(1.0, 32, 16));
        let plain = write_glb(&sphere).unwrap();
        let compressed = write_glb_compressed(&sphere).unwrap();

        let glb = Glb::from_slice(&compressed).unwrap();
        assert_eq!(glb.header.version, 2);
        let json = std::str::from_utf8(&glb.json).unwrap();
        assert!(json.contains(MESHOPT_EXTENSION));
        assert!(json.contains("TRIANGLES"));
        assert!(compressed.len() < plain.len());
    }

    #[test]
    fn compressed_views_describe_decoded_data() {
        let disk = renderable("disk", &Disk::new(1.0, 256));
        let bytes = write_glb_compressed(&disk).unwrap();
        let glb = Glb::from_slice(&bytes).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&glb.json).unwrap();

        let buffers = json["buffers"].as_array().unwrap();
        assert_eq!(buffers.len(), 2);
        assert_eq!(buffers[1]["extensions"][MESHOPT_EXTENSION]["fallback"], true);
        assert!(buffers[1].get("uri").is_none());
        let bin_len = buffers[0]["byteLength"].as_u64().unwrap();
        let fallback_len = buffers[1]["byteLength"].as_u64().unwrap();

        let views = json["bufferViews"].as_array().unwrap();
        for accessor in json["accessors"].as_array().unwrap() {
            let view = &views[accessor["bufferView"].as_u64().unwrap() as usize];
            let count = accessor["count"].as_u64().unwrap();
            let element_size = match accessor["type"].as_str().unwrap() {
                "VEC3" => 12,
                _ => if accessor["componentType"] == 5123 { 2 } else { 4 },
            };
            // 257 positions need 3084 bytes.
            assert!(view["byteLength"].as_u64().unwrap() >= count * element_size);

            assert_eq!(view["buffer"], 1);
            let end = view["byteOffset"].as_u64().unwrap_or(0) + view["byteLength"].as_u64().unwrap();
            assert!(end <= fallback_len);

            let ext = &view["extensions"][MESHOPT_EXTENSION];
            assert_eq!(ext["buffer"], 0);
            assert_eq!(ext["count"].as_u64().unwrap(), count);
            let ext_end = ext["byteOffset"].as_u64().unwrap() + ext["byteLength"].as_u64().unwrap();
            assert!(ext_end <= bin_len);
        }
    }

    #[test]
    fn uncompressed_glb_has_one_buffer() {
        let bytes = write_glb(&renderable("disk", &Disk::new(1.0, 8))).unwrap();
        let glb = Glb::from_slice(&bytes).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&glb.json).unwrap();
        assert_eq!(json["buffers"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn compressed_lines_keep_plain_indices() {
        let line = renderable("axis", &Line::new(Vec3::NEG_X, Vec3::X));
        let bytes = write_glb_compressed(&line).unwrap();
        let glb = Glb::from_slice(&bytes).unwrap();
        let json = std::str::from_utf8(&glb.json).unwrap();
        assert!(json.contains("ATTRIBUTES"));
        assert!(!json.contains("TRIANGLES"));
    }
}
