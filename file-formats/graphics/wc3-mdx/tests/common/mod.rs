//! Byte builders for synthetic MDX files
#![allow(dead_code)]

pub const LINEAR: u32 = 1;
pub const NON_LOOPING: u32 = 1;

pub const DONT_INHERIT_TRANSLATION: u32 = 0x1;
pub const BONE_FLAG: u32 = 0x100;
pub const HELPER_FLAG: u32 = 0x0;

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_i32(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

fn put_string(out: &mut Vec<u8>, s: &str, len: usize) {
    let mut bytes = s.as_bytes().to_vec();
    bytes.resize(len, 0);
    out.extend_from_slice(&bytes);
}

/// Accumulates chunks after the `MDLX` magic
#[derive(Debug, Default)]
pub struct MdxBuilder {
    data: Vec<u8>,
}

impl MdxBuilder {
    pub fn new() -> Self {
        Self {
            data: b"MDLX".to_vec(),
        }
    }

    pub fn chunk(mut self, tag: &[u8; 4], body: &[u8]) -> Self {
        self.data.extend_from_slice(tag);
        put_u32(&mut self.data, body.len() as u32);
        self.data.extend_from_slice(body);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

pub fn version(v: u32) -> Vec<u8> {
    v.to_le_bytes().to_vec()
}

fn extent(min: [f32; 3], max: [f32; 3]) -> Vec<u8> {
    let mut out = Vec::new();
    put_f32s(&mut out, &[0.0]);
    put_f32s(&mut out, &min);
    put_f32s(&mut out, &max);
    out
}

pub fn model_info(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    put_string(&mut out, name, 80);
    put_string(&mut out, "", 260);
    out.extend(extent([-1.0; 3], [1.0; 3]));
    put_u32(&mut out, 150);
    out
}

pub fn sequence(name: &str, start: u32, end: u32, flags: u32) -> Vec<u8> {
    let mut out = Vec::new();
    put_string(&mut out, name, 80);
    put_u32(&mut out, start);
    put_u32(&mut out, end);
    put_f32s(&mut out, &[0.0]);
    put_u32(&mut out, flags);
    put_f32s(&mut out, &[0.0]);
    put_u32(&mut out, 0);
    out.extend(extent([0.0; 3], [0.0; 3]));
    out
}

pub fn global_sequences(durations: &[u32]) -> Vec<u8> {
    durations.iter().flat_map(|d| d.to_le_bytes()).collect()
}

pub fn texture(replaceable_id: u32, path: &str) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, replaceable_id);
    put_string(&mut out, path, 260);
    put_u32(&mut out, 0);
    out
}

pub fn pivots(points: &[[f32; 3]]) -> Vec<u8> {
    let mut out = Vec::new();
    for p in points {
        put_f32s(&mut out, p);
    }
    out
}

fn track_header(tag: &[u8; 4], count: usize, interpolation: u32, global_sequence: i32) -> Vec<u8> {
    let mut out = tag.to_vec();
    put_u32(&mut out, count as u32);
    put_u32(&mut out, interpolation);
    put_i32(&mut out, global_sequence);
    out
}

pub fn track_f32(tag: &[u8; 4], global_sequence: i32, keys: &[(i32, f32)]) -> Vec<u8> {
    let mut out = track_header(tag, keys.len(), LINEAR, global_sequence);
    for (frame, value) in keys {
        put_i32(&mut out, *frame);
        put_f32s(&mut out, &[*value]);
    }
    out
}

pub fn track_vec3(tag: &[u8; 4], global_sequence: i32, keys: &[(i32, [f32; 3])]) -> Vec<u8> {
    let mut out = track_header(tag, keys.len(), LINEAR, global_sequence);
    for (frame, value) in keys {
        put_i32(&mut out, *frame);
        put_f32s(&mut out, value);
    }
    out
}

pub fn track_vec4(tag: &[u8; 4], global_sequence: i32, keys: &[(i32, [f32; 4])]) -> Vec<u8> {
    let mut out = track_header(tag, keys.len(), LINEAR, global_sequence);
    for (frame, value) in keys {
        put_i32(&mut out, *frame);
        put_f32s(&mut out, value);
    }
    out
}

/// Node header plus tracks; the size field covers all of it
pub fn node(name: &str, object_id: u32, parent: i32, flags: u32, tracks: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, (96 + tracks.len()) as u32);
    put_string(&mut out, name, 80);
    put_u32(&mut out, object_id);
    put_i32(&mut out, parent);
    put_u32(&mut out, flags);
    out.extend_from_slice(tracks);
    out
}

pub fn bone(node: Vec<u8>) -> Vec<u8> {
    let mut out = node;
    put_i32(&mut out, -1);
    put_i32(&mut out, -1);
    out
}

pub fn helper(node: Vec<u8>) -> Vec<u8> {
    node
}

pub fn layer(filter_mode: u32, texture_id: u32, alpha: f32, tracks: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, (28 + tracks.len()) as u32);
    put_u32(&mut out, filter_mode);
    put_u32(&mut out, 0);
    put_u32(&mut out, texture_id);
    put_i32(&mut out, -1);
    put_u32(&mut out, 0);
    put_f32s(&mut out, &[alpha]);
    out.extend_from_slice(tracks);
    out
}

pub fn material(layers: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = layers.concat();
    let mut out = Vec::new();
    put_u32(&mut out, (20 + body.len()) as u32);
    put_u32(&mut out, 0);
    put_u32(&mut out, 0);
    out.extend_from_slice(b"LAYS");
    put_u32(&mut out, layers.len() as u32);
    out.extend(body);
    out
}

/// One triangle bound to matrix group 0, which holds `bone`
pub fn triangle_geoset(material_id: u32, bone: u32, offset: [f32; 3]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"VRTX");
    put_u32(&mut body, 3);
    let [x, y, z] = offset;
    put_f32s(
        &mut body,
        &[x, y, z, x + 1.0, y, z, x, y + 1.0, z + 2.0],
    );
    body.extend_from_slice(b"NRMS");
    put_u32(&mut body, 3);
    put_f32s(&mut body, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
    body.extend_from_slice(b"PTYP");
    put_u32(&mut body, 1);
    put_u32(&mut body, 4);
    body.extend_from_slice(b"PCNT");
    put_u32(&mut body, 1);
    put_u32(&mut body, 3);
    body.extend_from_slice(b"PVTX");
    put_u32(&mut body, 3);
    for i in [0u16, 1, 2] {
        body.extend_from_slice(&i.to_le_bytes());
    }
    body.extend_from_slice(b"GNDX");
    put_u32(&mut body, 3);
    body.extend_from_slice(&[0, 0, 0]);
    body.extend_from_slice(b"MTGC");
    put_u32(&mut body, 1);
    put_u32(&mut body, 1);
    body.extend_from_slice(b"MATS");
    put_u32(&mut body, 1);
    put_u32(&mut body, bone);
    put_u32(&mut body, material_id);
    put_u32(&mut body, 0);
    put_u32(&mut body, 0);
    body.extend(extent([0.0; 3], [0.0; 3]));
    put_u32(&mut body, 0);
    body.extend_from_slice(b"UVAS");
    put_u32(&mut body, 1);
    body.extend_from_slice(b"UVBS");
    put_u32(&mut body, 3);
    put_f32s(&mut body, &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);

    let mut out = Vec::new();
    put_u32(&mut out, (4 + body.len()) as u32);
    out.extend(body);
    out
}

pub fn geoset_animation(alpha: f32, geoset_id: u32, tracks: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    put_u32(&mut out, (28 + tracks.len()) as u32);
    put_f32s(&mut out, &[alpha]);
    put_u32(&mut out, 0);
    put_f32s(&mut out, &[1.0, 1.0, 1.0]);
    put_u32(&mut out, geoset_id);
    out.extend_from_slice(tracks);
    out
}

/// `PRE2` record with zero latitude and variation
pub fn particle_emitter2(node: Vec<u8>, speed: f32, lifespan: f32, rate: f32) -> Vec<u8> {
    let mut body = Vec::new();
    // speed, variation, latitude, gravity, lifespan, rate, width, length
    put_f32s(&mut body, &[speed, 0.0, 0.0, 0.0, lifespan, rate, 1.0, 1.0]);
    // filter mode, rows, columns, head or tail
    for v in [2u32, 1, 1, 0] {
        put_u32(&mut body, v);
    }
    // tail length, time middle, 3 segment colors
    put_f32s(&mut body, &[1.0, 0.5]);
    put_f32s(&mut body, &[1.0; 9]);
    body.extend_from_slice(&[255, 255, 255]);
    put_f32s(&mut body, &[1.0; 3]);
    // head, head decay, tail, tail decay intervals
    for _ in 0..12 {
        put_u32(&mut body, 0);
    }
    // texture id, squirt, priority plane, replaceable id
    for _ in 0..4 {
        put_u32(&mut body, 0);
    }

    let mut out = Vec::new();
    put_u32(&mut out, (4 + node.len() + body.len()) as u32);
    out.extend(node);
    out.extend(body);
    out
}

pub fn ribbon_emitter(node: Vec<u8>, height: f32, lifespan: f32, rate: u32) -> Vec<u8> {
    let mut body = Vec::new();
    put_f32s(&mut body, &[height, height, 1.0, 1.0, 1.0, 1.0, lifespan]);
    // texture slot, rate, rows, columns, material id
    for v in [0, rate, 1, 1, 0] {
        put_u32(&mut body, v);
    }
    put_f32s(&mut body, &[0.0]);

    let mut out = Vec::new();
    put_u32(&mut out, (4 + node.len() + body.len()) as u32);
    out.extend(node);
    out.extend(body);
    out
}
