//! Triangulation primitives shared by every surface generator.
//!
//! A ring is `ring_size` consecutive vertices starting at some index. Rings
//! are closed: the column after `ring_size - 1` is column 0.

use crate::error::{Result, ShapeError};

/// Smallest ring that still encloses an area.
pub const MIN_RING_SIZE: u32 = 3;

/// Triangle orientation relative to the ring's storage order.
///
/// `Forward` is counter-clockwise when the ring runs counter-clockwise seen
/// from the outside and, for stitching, ring B lies "after" ring A in the
/// surface's second parameter. `Reverse` flips every emitted triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Forward,
    Reverse,
}

impl Winding {
    fn orient(self, a: u32, b: u32, c: u32) -> [u32; 3] {
        match self {
            Winding::Forward => [a, b, c],
            Winding::Reverse => [a, c, b],
        }
    }
}

fn check_ring(ring_size: u32) -> Result<()> {
    if ring_size < MIN_RING_SIZE {
        return Err(ShapeError::InvalidParameter(format!(
            "ring size must be at least {MIN_RING_SIZE} to close (got {ring_size})"
        )));
    }
    Ok(())
}

/// The last index of a ring of `ring_size` starting at `start` must fit in `u32`.
fn check_span(start: u32, ring_size: u32) -> Result<()> {
    start.checked_add(ring_size - 1).map(|_| ()).ok_or_else(|| {
        ShapeError::Topology(format!(
            "ring of {ring_size} at index {start} runs past the u32 index range"
        ))
    })
}

/// Fan from a single apex to every consecutive pair of a ring.
///
/// Emits `ring_size` triangles `(pole, ring[j], ring[j + 1])` (forward), the
/// last one wrapping to `ring[0]`.
pub fn pole_fan(
    pole: u32,
    ring_start: u32,
    ring_size: u32,
    winding: Winding,
    out: &mut Vec<u32>,
) -> Result<()> {
    check_ring(ring_size)?;
    check_span(ring_start, ring_size)?;
    out.reserve(ring_size as usize * 3);
    for j in 0..ring_size {
        let next = (j + 1) % ring_size;
        out.extend(winding.orient(pole, ring_start + j, ring_start + next));
    }
    Ok(())
}

/// Split the quad `a0 a1 / b0 b1` into two triangles.
///
/// `a0 -> a1` runs along ring A, `a0 -> b0` crosses to ring B.
pub fn split_quad(a0: u32, a1: u32, b0: u32, b1: u32, winding: Winding) -> [[u32; 3]; 2] {
    [winding.orient(a0, a1, b1), winding.orient(a0, b1, b0)]
}

/// Triangulate the closed strip between two equal-size rings.
///
/// Emits `2 * ring_size` triangles, one quad per column.
pub fn stitch_rings(
    ring_a: u32,
    ring_b: u32,
    ring_size: u32,
    winding: Winding,
    out: &mut Vec<u32>,
) -> Result<()> {
    check_ring(ring_size)?;
    check_span(ring_a, ring_size)?;
    check_span(ring_b, ring_size)?;
    out.reserve(ring_size as usize * 6);
    for j in 0..ring_size {
        let next = (j + 1) % ring_size;
        for tri in split_quad(
            ring_a + j,
            ring_a + next,
            ring_b + j,
            ring_b + next,
            winding,
        ) {
            out.extend(tri);
        }
    }
    Ok(())
}

/// Stitch `ring_count` rings of `ring_size` laid out back to back from
/// `first_ring`, also joining the last ring to the first (a torus lattice).
pub fn stitch_closed_lattice(
    first_ring: u32,
    ring_count: u32,
    ring_size: u32,
    winding: Winding,
    out: &mut Vec<u32>,
) -> Result<()> {
    check_ring(ring_count)?;
    check_ring(ring_size)?;
    let last_ring = (ring_count - 1)
        .checked_mul(ring_size)
        .and_then(|offset| first_ring.checked_add(offset))
        .ok_or_else(|| {
            ShapeError::Topology(format!(
                "{ring_count} rings of {ring_size} run past the u32 index range"
            ))
        })?;
    check_span(last_ring, ring_size)?;
    for i in 0..ring_count {
        let next = (i + 1) % ring_count;
        stitch_rings(
            first_ring + i * ring_size,
            first_ring + next * ring_size,
            ring_size,
            winding,
            out,
        )?;
    }
    Ok(())
}
