use crate::functions;
use crate::prelude_crate::*;

// ----------------------------------------------------------------------------- FUNCTIONS

/// Second-order equilibrium distribution for a scalar `value` moving with
/// `velocity`.
pub(crate) fn equilibrium(
    value: Float,
    velocity: &[Float],
    vel_set_params: &VelocitySetParameters,
) -> Vec<Float> {
    let q = vel_set_params.get_q();
    let c = vel_set_params.get_c();
    let w = vel_set_params.get_w();
    let mut f_eq = Vec::with_capacity(q);
    let u_dot_u = velocity.iter().map(|u_x| u_x * u_x).sum::<Float>();
    (0..q).for_each(|i| {
        let u_dot_c = velocity
            .iter()
            .zip(c[i].iter())
            .map(|(u_x, c_x)| u_x * (*c_x as Float))
            .sum::<Float>();
        f_eq.push(
            w[i] * value
                * (1.0 + u_dot_c * CS_2_INV + 0.5 * u_dot_c * u_dot_c * CS_4_INV
                    - 0.5 * u_dot_u * CS_2_INV),
        );
    });
    f_eq
}

// -------------------------------------------------------------------- STRUCT: FluidField

/// Per-site distribution storage standing in for the external fluid
/// solver. The coupling core only ever touches it through the moment
/// accessors and per-population get/set below.
#[derive(Debug)]
pub struct FluidField {
    velocity_set_parameters: Arc<VelocitySetParameters>,
    sites: Vec<RwLock<Vec<Float>>>,
}

impl FluidField {
    /// Initialise every site to the equilibrium of the given density and
    /// velocity fields.
    pub fn new(
        velocity_set_parameters: Arc<VelocitySetParameters>,
        density: &[Float],
        velocity: &[Vec<Float>],
    ) -> Self {
        if density.len() != velocity.len() {
            panic!(
                "Density field length ({}) does not match the velocity field length ({})",
                density.len(),
                velocity.len()
            );
        }
        let sites = density
            .iter()
            .zip(velocity.iter())
            .map(|(&rho, u)| RwLock::new(equilibrium(rho, u, &velocity_set_parameters)))
            .collect();
        FluidField {
            velocity_set_parameters,
            sites,
        }
    }

    pub fn test_default(num_sites: usize) -> Self {
        let vel_set_params = Arc::new(VelocitySetParameters::test_default());
        let density = functions::uniform_scalar(LATTICE_DENSITY, num_sites);
        let velocity = functions::uniform_vector(vec![0.0, 0.0, 0.0], num_sites);
        FluidField::new(vel_set_params, &density, &velocity)
    }
}

impl FluidField {
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn get_f(&self, index: usize) -> Vec<Float> {
        self.sites[index].read().unwrap().clone()
    }

    pub fn set_f(&self, index: usize, f: Vec<Float>) {
        let mut f_guard = self.sites[index].write().unwrap();
        *f_guard = f;
    }

    pub fn get_population(&self, index: usize, p: usize) -> Float {
        self.sites[index].read().unwrap()[p]
    }

    pub fn set_population(&self, index: usize, p: usize, value: Float) {
        let mut f_guard = self.sites[index].write().unwrap();
        f_guard[p] = value;
    }

    /// Zeroth velocity moment (density) of the distribution at a site.
    pub fn zeroth_moment(&self, index: usize) -> Float {
        self.sites[index].read().unwrap().iter().sum()
    }

    /// First velocity moment (momentum) of the distribution at a site.
    pub fn first_moment(&self, index: usize) -> Vec<Float> {
        let f = self.sites[index].read().unwrap();
        let c = self.velocity_set_parameters.get_c();
        let d = self.velocity_set_parameters.get_d();
        (0..d)
            .map(|x| {
                f.iter()
                    .zip(c.iter())
                    .map(|(f_i, c_i)| f_i * (c_i[x] as Float))
                    .sum::<Float>()
            })
            .collect()
    }
}

// ------------------------------------------------------------------- STRUCT: ScalarField

/// Per-site order-parameter storage standing in for the external scalar
/// (composition) solver.
#[derive(Debug)]
pub struct ScalarField {
    values: Vec<RwLock<Float>>,
}

impl ScalarField {
    pub fn new(initial: &[Float]) -> Self {
        ScalarField {
            values: initial.iter().map(|&phi| RwLock::new(phi)).collect(),
        }
    }
}

impl ScalarField {
    pub fn num_sites(&self) -> usize {
        self.values.len()
    }

    pub fn get_value(&self, index: usize) -> Float {
        *self.values[index].read().unwrap()
    }

    pub fn set_value(&self, index: usize, value: Float) {
        let mut value_guard = self.values[index].write().unwrap();
        *value_guard = value;
    }
}
