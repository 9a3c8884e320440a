use crate::colloid::Colloid;
use crate::coupling::Coupling;
use crate::domain::Domain;
use crate::links::LinkStatus;
use crate::prelude_crate::*;

// -------------------------------------------------------------------------- STRUCT: Wall

/// Static external boundary map: which allocated sites belong to the
/// fixed walls of the global box. Built once; never changes during a run.
#[derive(Debug)]
pub struct Wall {
    boundary: Vec<bool>,
}

impl Wall {
    pub fn none(num_sites: usize) -> Self {
        Wall {
            boundary: vec![false; num_sites],
        }
    }

    pub fn from_mask(mask: Vec<bool>) -> Self {
        Wall { boundary: mask }
    }

    /// Mark the halo sites beyond the named faces of the global box as
    /// wall. A walled axis cannot be periodic.
    pub fn from_faces(domain: &Domain, faces: &[BoundaryFace]) -> Self {
        for face in faces {
            let axis = Wall::face_axis(face);
            if domain.get_periodic()[axis] {
                panic!("Wall face {face:?} requested along periodic axis {axis}");
            }
        }

        let mut boundary = vec![false; domain.num_sites()];
        let n_total = domain.get_n_total();
        let offset = domain.get_offset();

        for i in domain.allocated_min(0)..=domain.allocated_max(0) {
            for j in domain.allocated_min(1)..=domain.allocated_max(1) {
                for k in domain.allocated_min(2)..=domain.allocated_max(2) {
                    let global = [i + offset[0], j + offset[1], k + offset[2]];
                    let walled = faces.iter().any(|face| {
                        let axis = Wall::face_axis(face);
                        if Wall::face_is_low(face) {
                            global[axis] < 0
                        } else {
                            global[axis] >= n_total[axis] as i32
                        }
                    });
                    if walled {
                        boundary[domain.site_index(i, j, k)] = true;
                    }
                }
            }
        }
        Wall { boundary }
    }

    fn face_axis(face: &BoundaryFace) -> usize {
        match face {
            BoundaryFace::West | BoundaryFace::East => 0,
            BoundaryFace::South | BoundaryFace::North => 1,
            BoundaryFace::Bottom | BoundaryFace::Top => 2,
        }
    }

    fn face_is_low(face: &BoundaryFace) -> bool {
        matches!(
            face,
            BoundaryFace::West | BoundaryFace::South | BoundaryFace::Bottom
        )
    }
}

impl Wall {
    pub fn is_boundary(&self, index: usize) -> bool {
        self.boundary[index]
    }

    pub fn present(&self) -> bool {
        self.boundary.iter().any(|&b| b)
    }

    pub fn num_boundary_sites(&self) -> usize {
        self.boundary.iter().filter(|&&b| b).count()
    }
}

impl Coupling {
    /// Mirror of the particle-particle rebuild against the fixed wall
    /// map, with the roles swapped: the traversal walks the colloid's own
    /// interior sites and pairs each with adjacent wall sites. The stored
    /// direction is the opposing partner of the interior-to-wall
    /// direction, so bounce-back propagation reads the correct
    /// reciprocal. Runs after `reconstruct_links`, reusing whatever
    /// `Unused` records the particle pass left behind.
    pub(crate) fn reconstruct_wall_links(&self, colloid: &Colloid) {
        let domain = self.get_domain();
        let occupancy = self.get_occupancy();
        let wall = self.get_wall();
        let vel_set_params = self.get_velocity_set_parameters();
        let q = vel_set_params.get_q();
        let c = vel_set_params.get_c();

        let id = colloid.get_id();
        let r0 = domain.local_from_global(&colloid.get_center());

        let mut table = colloid.get_link_table();
        let bbox = self.bounding_box(&r0, colloid.get_radius(), 1);

        for i in bbox[0].0..=bbox[0].1 {
            for j in bbox[1].0..=bbox[1].1 {
                for k in bbox[2].0..=bbox[2].1 {
                    let index1 = domain.site_index(i, j, k);
                    if occupancy.owner(index1) != Some(id) {
                        continue;
                    }

                    let rsite1 = domain.site_coordinates(i, j, k);
                    let rsep = domain.separation(&r0, &rsite1);

                    for p in 1..q {
                        let index0 =
                            domain.site_index(i + c[p][0], j + c[p][1], k + c[p][2]);
                        if !wall.is_boundary(index0) {
                            continue;
                        }

                        let rb = rsep
                            .iter()
                            .zip(c[p].iter())
                            .map(|(rsep_x, &c_x)| rsep_x + LINK_LAMBDA * c_x as Float)
                            .collect::<Vec<Float>>();

                        let slot = table.acquire();
                        let link = table.get_link_mut(slot);
                        link.set_topology(index0, index1, vel_set_params.get_opposite_direction(p));
                        link.set_rb(rb);
                        link.set_status(LinkStatus::Boundary);
                    }
                }
            }
        }

        colloid.set_link_table(table);
    }
}
