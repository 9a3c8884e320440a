use crate::functions;
use crate::links::LinkTable;
use crate::prelude_crate::*;
use rayon::prelude::*;

/// Weak identifier of a colloid. The occupancy map stores identifiers,
/// never references: a site points at its owner, it does not own it.
pub type ColloidId = usize;

// ----------------------------------------------------------------------- STRUCT: Colloid

/// One rigid spherical particle, with the coupling state this crate owns:
/// the link table, the per-step moment sums (`sumw`, `cbar`, `rxcbar`)
/// and the conservation corrections (`deltam`, `deltaphi`, `f0`, `t0`)
/// handed to the external force and torque assembly.
#[derive(Debug)]
pub struct Colloid {
    id: ColloidId,
    radius: Float,
    center: RwLock<Vec<Float>>,
    velocity: RwLock<Vec<Float>>,
    angular_velocity: RwLock<Vec<Float>>,
    rebuild: RwLock<bool>,
    sumw: RwLock<Float>,
    cbar: RwLock<Vec<Float>>,
    rxcbar: RwLock<Vec<Float>>,
    deltam: RwLock<Float>,
    deltaphi: RwLock<Float>,
    f0: RwLock<Vec<Float>>,
    t0: RwLock<Vec<Float>>,
    links: RwLock<LinkTable>,
}

impl Colloid {
    pub fn new(
        id: ColloidId,
        radius: Float,
        center: Vec<Float>,
        velocity: Vec<Float>,
        angular_velocity: Vec<Float>,
    ) -> Self {
        if radius <= 0.0 {
            panic!("Colloid radius must be positive (got {radius})");
        }
        Colloid {
            id,
            radius,
            center: RwLock::new(center),
            velocity: RwLock::new(velocity),
            angular_velocity: RwLock::new(angular_velocity),
            // A fresh particle has no links yet: the first pass is a full
            // reconstruction.
            rebuild: RwLock::new(true),
            sumw: RwLock::new(0.0),
            cbar: RwLock::new(vec![0.0; 3]),
            rxcbar: RwLock::new(vec![0.0; 3]),
            deltam: RwLock::new(0.0),
            deltaphi: RwLock::new(0.0),
            f0: RwLock::new(vec![0.0; 3]),
            t0: RwLock::new(vec![0.0; 3]),
            links: RwLock::new(LinkTable::new()),
        }
    }

    pub fn test_default() -> Self {
        Colloid::new(
            0,
            1.25,
            vec![6.0, 6.0, 6.0],
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
        )
    }
}

impl Colloid {
    pub fn get_id(&self) -> ColloidId {
        self.id
    }

    pub fn get_radius(&self) -> Float {
        self.radius
    }

    /// # Examples
    /// ```
    /// # use lbcolloid::colloid::Colloid;
    /// let colloid = Colloid::test_default();
    ///
    /// assert_eq!(colloid.get_center(), vec![6.0, 6.0, 6.0]);
    ///
    /// colloid.set_center(vec![6.5, 6.0, 6.0]);
    /// assert_eq!(colloid.get_center(), vec![6.5, 6.0, 6.0]);
    /// ```
    pub fn get_center(&self) -> Vec<Float> {
        self.center.read().unwrap().clone()
    }

    pub fn set_center(&self, center: Vec<Float>) {
        let mut center_guard = self.center.write().unwrap();
        *center_guard = center;
    }

    pub fn get_velocity(&self) -> Vec<Float> {
        self.velocity.read().unwrap().clone()
    }

    pub fn set_velocity(&self, velocity: Vec<Float>) {
        let mut velocity_guard = self.velocity.write().unwrap();
        *velocity_guard = velocity;
    }

    pub fn get_angular_velocity(&self) -> Vec<Float> {
        self.angular_velocity.read().unwrap().clone()
    }

    pub fn set_angular_velocity(&self, angular_velocity: Vec<Float>) {
        let mut angular_velocity_guard = self.angular_velocity.write().unwrap();
        *angular_velocity_guard = angular_velocity;
    }

    pub fn get_rebuild(&self) -> bool {
        *self.rebuild.read().unwrap()
    }

    pub fn set_rebuild(&self, rebuild: bool) {
        let mut rebuild_guard = self.rebuild.write().unwrap();
        *rebuild_guard = rebuild;
    }
}

impl Colloid {
    pub fn get_sumw(&self) -> Float {
        *self.sumw.read().unwrap()
    }

    pub fn get_cbar(&self) -> Vec<Float> {
        self.cbar.read().unwrap().clone()
    }

    pub fn get_rxcbar(&self) -> Vec<Float> {
        self.rxcbar.read().unwrap().clone()
    }

    pub fn get_deltam(&self) -> Float {
        *self.deltam.read().unwrap()
    }

    pub fn get_deltaphi(&self) -> Float {
        *self.deltaphi.read().unwrap()
    }

    pub fn get_f0(&self) -> Vec<Float> {
        self.f0.read().unwrap().clone()
    }

    pub fn get_t0(&self) -> Vec<Float> {
        self.t0.read().unwrap().clone()
    }

    /// Zero the link-derived moment sums. Runs at the head of every link
    /// update, before any contribution is accumulated.
    pub fn zero_coupling_sums(&self) {
        *self.sumw.write().unwrap() = 0.0;
        *self.cbar.write().unwrap() = vec![0.0; 3];
        *self.rxcbar.write().unwrap() = vec![0.0; 3];
    }

    /// Zero the conservation corrections after the external assembly has
    /// consumed them.
    pub fn reset_conservation(&self) {
        *self.deltam.write().unwrap() = 0.0;
        *self.deltaphi.write().unwrap() = 0.0;
        *self.f0.write().unwrap() = vec![0.0; 3];
        *self.t0.write().unwrap() = vec![0.0; 3];
    }

    pub(crate) fn add_deltam(&self, delta: Float) {
        *self.deltam.write().unwrap() += delta;
    }

    pub(crate) fn add_deltaphi(&self, delta: Float) {
        *self.deltaphi.write().unwrap() += delta;
    }

    pub fn add_f0(&self, delta: &[Float]) {
        let mut f0_guard = self.f0.write().unwrap();
        f0_guard
            .iter_mut()
            .zip(delta.iter())
            .for_each(|(f_x, d_x)| *f_x += d_x);
    }

    pub fn add_t0(&self, delta: &[Float]) {
        let mut t0_guard = self.t0.write().unwrap();
        t0_guard
            .iter_mut()
            .zip(delta.iter())
            .for_each(|(t_x, d_x)| *t_x += d_x);
    }

    /// Contribution of one fluid-status link to the coupling sums used by
    /// the force and torque assembly.
    pub(crate) fn link_mean_contrib(
        &self,
        direction: usize,
        rb: &[Float],
        vel_set_params: &VelocitySetParameters,
    ) {
        let w = vel_set_params.get_w()[direction];
        let c = functions::direction_vector(&vel_set_params.get_c()[direction]);
        let rxc = functions::cross_product(rb, &c);

        *self.sumw.write().unwrap() += w;

        let mut cbar_guard = self.cbar.write().unwrap();
        cbar_guard
            .iter_mut()
            .zip(c.iter())
            .for_each(|(cbar_x, c_x)| *cbar_x += w * c_x);

        let mut rxcbar_guard = self.rxcbar.write().unwrap();
        rxcbar_guard
            .iter_mut()
            .zip(rxc.iter())
            .for_each(|(rxcbar_x, rxc_x)| *rxcbar_x += w * rxc_x);
    }
}

impl Colloid {
    /// Snapshot of the link table (records are small; callers that walk
    /// links repeatedly should clone once).
    pub fn get_link_table(&self) -> LinkTable {
        self.links.read().unwrap().clone()
    }

    pub(crate) fn set_link_table(&self, links: LinkTable) {
        let mut links_guard = self.links.write().unwrap();
        *links_guard = links;
    }

    /// Active links only, cloned out of the arena.
    pub fn get_links(&self) -> Vec<crate::links::Link> {
        self.links
            .read()
            .unwrap()
            .iter_active()
            .cloned()
            .collect()
    }
}

// -------------------------------------------------------------------- STRUCT: ColloidSet

/// Registry of the locally-owned colloids. Stands in for the external
/// cell index: iteration order is insertion order, identifiers are dense
/// indices into the registry.
#[derive(Debug, Default)]
pub struct ColloidSet {
    colloids: Vec<Arc<Colloid>>,
}

impl ColloidSet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(
        &mut self,
        radius: Float,
        center: Vec<Float>,
        velocity: Vec<Float>,
        angular_velocity: Vec<Float>,
    ) -> Arc<Colloid> {
        let id = self.colloids.len();
        let colloid = Arc::new(Colloid::new(id, radius, center, velocity, angular_velocity));
        self.colloids.push(Arc::clone(&colloid));
        colloid
    }

    pub fn get(&self, id: ColloidId) -> &Arc<Colloid> {
        &self.colloids[id]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Colloid>> {
        self.colloids.iter()
    }

    pub fn par_iter(&self) -> rayon::slice::Iter<'_, Arc<Colloid>> {
        self.colloids.par_iter()
    }

    pub fn len(&self) -> usize {
        self.colloids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colloids.is_empty()
    }
}
