pub type Float = f64;

pub const DELTA_T: Float = 1.0;

pub const DELTA_X: Float = 1.0;

pub const LATTICE_DENSITY: Float = 1.0;

pub const LATTICE_PHI: Float = 0.0;

pub const CS_2: Float = 1.0 / 3.0 * DELTA_X * DELTA_X / DELTA_T / DELTA_T;

pub const CS_2_INV: Float = 3.0;

pub const CS_4_INV: Float = 9.0;

/// Interpolation fraction along a boundary link. The boundary point sits
/// halfway between the fluid-side and solid-side sites; no sub-grid
/// positioning is attempted.
pub(crate) const LINK_LAMBDA: Float = 0.5;
