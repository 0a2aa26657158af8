// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ export of a built scene.
//!
//! Each mesh node becomes one `o` object with positions already moved into
//! world coordinates. Face indices are 1-based and shared across objects.

use std::io::{self, Write};

use section_engine::SceneGraph;

/// Write every non-empty mesh node of `scene` as OBJ text.
pub fn write_scene_obj<W: Write>(scene: &SceneGraph, writer: &mut W) -> io::Result<usize> {
    writeln!(writer, "# Section assembly OBJ export")?;

    let mut base = 1u32;
    let mut objects = 0;
    for (key, offset, mesh) in scene.world_meshes() {
        if mesh.is_empty() {
            continue;
        }
        let name = scene
            .get(key)
            .and_then(|node| node.name())
            .unwrap_or("solid")
            .replace(char::is_whitespace, "_");
        writeln!(writer, "o {name}_{objects}")?;

        for p in mesh.positions.chunks_exact(3) {
            writeln!(
                writer,
                "v {:.6} {:.6} {:.6}",
                p[0] as f64 + offset.x,
                p[1] as f64 + offset.y,
                p[2] as f64 + offset.z
            )?;
        }
        for n in mesh.normals.chunks_exact(3) {
            writeln!(writer, "vn {:.6} {:.6} {:.6}", n[0], n[1], n[2])?;
        }
        for tri in mesh.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] + base, tri[1] + base, tri[2] + base);
            writeln!(writer, "f {i0}//{i0} {i1}//{i1} {i2}//{i2}")?;
        }

        base += mesh.vertex_count() as u32;
        objects += 1;
    }

    Ok(objects)
}
