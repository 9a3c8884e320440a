use crate::colloid::{Colloid, ColloidId, ColloidSet};
use crate::config::Config;
use crate::domain::Domain;
use crate::fluid::{FluidField, ScalarField};
use crate::functions;
use crate::occupancy::OccupancyMap;
use crate::prelude_crate::*;
use crate::wall::Wall;

// -------------------------------------------------------------------- STRUCT: Parameters

pub struct ColloidParameters {
    pub radius: Float,
    pub center: Vec<Float>,
    pub velocity: Vec<Float>,
    pub angular_velocity: Vec<Float>,
}

impl ColloidParameters {
    pub fn at_rest(radius: Float, center: Vec<Float>) -> Self {
        ColloidParameters {
            radius,
            center,
            velocity: vec![0.0; 3],
            angular_velocity: vec![0.0; 3],
        }
    }
}

pub struct Parameters {
    pub n: Vec<usize>,
    pub n_total: Vec<usize>,
    pub offset: Vec<i32>,
    pub nhalo: usize,
    pub periodic: Vec<bool>,
    pub velocity_set: VelocitySet,
    pub reference_density: Float,
    pub reference_phi: Float,
    pub initial_density: Vec<Float>,
    pub initial_velocity: Vec<Vec<Float>>,
    pub initial_phi: Vec<Float>,
    pub wall_faces: Vec<BoundaryFace>,
    pub colloids: Vec<ColloidParameters>,
}

impl Default for Parameters {
    fn default() -> Self {
        let n = vec![12, 12, 12];
        let num_sites = functions::allocated_sites(&n, 1);
        Parameters {
            n: n.clone(),
            n_total: n,
            offset: vec![0, 0, 0],
            nhalo: 1,
            periodic: vec![true, true, true],
            velocity_set: VelocitySet::D3Q19,
            reference_density: LATTICE_DENSITY,
            reference_phi: LATTICE_PHI,
            initial_density: functions::uniform_scalar(LATTICE_DENSITY, num_sites),
            initial_velocity: functions::uniform_vector(vec![0.0, 0.0, 0.0], num_sites),
            initial_phi: functions::uniform_scalar(LATTICE_PHI, num_sites),
            wall_faces: Vec::new(),
            colloids: Vec::new(),
        }
    }
}

impl Parameters {
    /// Periodic 12^3 box with a single resting colloid of radius 1.25 at
    /// the centre.
    pub fn test_default() -> Self {
        Parameters {
            colloids: vec![ColloidParameters::at_rest(1.25, vec![6.0, 6.0, 6.0])],
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------- STRUCT: Coupling

/// Couples the locally-owned colloids to the lattice fields: owns the
/// occupancy map and the per-colloid link tables, and drives the per-step
/// rebuild / transition sequence. The collision and propagation stages of
/// the fluid solver live outside and only see the moment sums, the
/// conservation corrections and the virtual distributions this object
/// maintains.
#[derive(Debug)]
pub struct Coupling {
    domain: Arc<Domain>,
    velocity_set_parameters: Arc<VelocitySetParameters>,
    occupancy: OccupancyMap,
    colloids: ColloidSet,
    fluid: Arc<FluidField>,
    phi: Arc<ScalarField>,
    wall: Wall,
    reference_density: Float,
    reference_phi: Float,
    config: Config,
}

impl Coupling {
    pub fn new(config: Config, params: Parameters) -> Self {
        let velocity_set = params.velocity_set;
        if config.verbose {
            println!("Selecting velocity set for the coupling: {velocity_set:?}\n");
            println!(
                "Creating coupling domain with local extent {:?} and halo {}\n",
                params.n, params.nhalo
            );
        }
        let velocity_set_parameters = Arc::new(velocity_set.get_velocity_set_parameters());
        let domain = Arc::new(Domain::new(
            params.n,
            params.n_total,
            params.offset,
            params.nhalo,
            params.periodic,
        ));

        let num_sites = domain.num_sites();
        if params.initial_density.len() != num_sites {
            panic!(
                "Number of allocated sites ({num_sites}) does not match the length of the initial density field ({})",
                params.initial_density.len()
            );
        }
        if params.initial_phi.len() != num_sites {
            panic!(
                "Number of allocated sites ({num_sites}) does not match the length of the initial order-parameter field ({})",
                params.initial_phi.len()
            );
        }

        let occupancy = OccupancyMap::new(num_sites, config.verbose);
        let fluid = Arc::new(FluidField::new(
            Arc::clone(&velocity_set_parameters),
            &params.initial_density,
            &params.initial_velocity,
        ));
        let phi = Arc::new(ScalarField::new(&params.initial_phi));

        let wall = if params.wall_faces.is_empty() {
            Wall::none(num_sites)
        } else {
            Wall::from_faces(&domain, &params.wall_faces)
        };

        let mut colloids = ColloidSet::new();
        for cp in params.colloids {
            colloids.add(cp.radius, cp.center, cp.velocity, cp.angular_velocity);
        }

        Coupling {
            domain,
            velocity_set_parameters,
            occupancy,
            colloids,
            fluid,
            phi,
            wall,
            reference_density: params.reference_density,
            reference_phi: params.reference_phi,
            config,
        }
    }

    pub fn test_default() -> Self {
        Coupling::new(Config::default(), Parameters::test_default())
    }
}

impl Coupling {
    pub fn get_domain(&self) -> &Arc<Domain> {
        &self.domain
    }

    pub fn get_velocity_set_parameters(&self) -> &Arc<VelocitySetParameters> {
        &self.velocity_set_parameters
    }

    pub fn get_occupancy(&self) -> &OccupancyMap {
        &self.occupancy
    }

    pub fn get_colloids(&self) -> &ColloidSet {
        &self.colloids
    }

    pub fn get_fluid(&self) -> &Arc<FluidField> {
        &self.fluid
    }

    pub fn get_phi(&self) -> &Arc<ScalarField> {
        &self.phi
    }

    pub fn get_wall(&self) -> &Wall {
        &self.wall
    }

    pub fn get_config(&self) -> &Config {
        &self.config
    }

    pub fn get_reference_density(&self) -> Float {
        self.reference_density
    }

    pub fn get_reference_phi(&self) -> Float {
        self.reference_phi
    }

    /// The colloid occupying a site in the current snapshot, if any.
    pub fn colloid_at_site(&self, index: usize) -> Option<&Arc<Colloid>> {
        self.occupancy
            .owner(index)
            .map(|id: ColloidId| self.colloids.get(id))
    }

    /// Combined view of a site used by the link builders: the fixed wall
    /// takes precedence, then colloid occupancy, then open fluid.
    pub fn site_status(&self, index: usize) -> SiteStatus {
        if self.wall.is_boundary(index) {
            SiteStatus::Boundary
        } else if self.occupancy.owner(index).is_some() {
            SiteStatus::Colloid
        } else {
            SiteStatus::Fluid
        }
    }
}

impl Coupling {
    /// One coupling step. The occupancy map must be complete over the
    /// whole allocation (halo included) before links or transitions are
    /// touched, so the order here is fixed: rebuild the map, settle the
    /// covered/exposed corrections (which raise rebuild flags), then
    /// rebuild or reset the link tables.
    pub fn update_step(&self) {
        self.update_map();
        self.remove_or_replace_fluid();
        self.update_links();
    }
}
