use crate::colloid::{Colloid, ColloidId};
use crate::coupling::Coupling;
use crate::functions;
use crate::prelude_crate::*;

// --------------------------------------------------------------------- ENUM: SiteChange

/// What happened to a site between the previous and current occupancy
/// snapshots. Pure classification; the corrections are applied by the
/// transition pass below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteChange {
    Unchanged,
    Covered(ColloidId),
    Exposed(ColloidId),
}

impl SiteChange {
    pub fn classify(previous: Option<ColloidId>, current: Option<ColloidId>) -> Self {
        match (previous, current) {
            (None, Some(id)) => SiteChange::Covered(id),
            (Some(id), None) => SiteChange::Exposed(id),
            // A direct owner-to-owner handoff carries no fluid to fix up.
            _ => SiteChange::Unchanged,
        }
    }
}

impl Coupling {
    /// Diff the occupancy snapshots and settle every site that flipped
    /// between fluid and solid. Newly covered sites have their outgoing
    /// moments booked against the new owner; newly exposed sites are
    /// refilled from their surviving fluid neighbours, with the change
    /// booked against the previous owner. Halo sites only raise the
    /// rebuild flag: their corrections belong to the process that owns
    /// them.
    pub fn remove_or_replace_fluid(&self) {
        let domain = self.get_domain();
        let occupancy = self.get_occupancy();

        for i in domain.allocated_min(0)..=domain.allocated_max(0) {
            for j in domain.allocated_min(1)..=domain.allocated_max(1) {
                for k in domain.allocated_min(2)..=domain.allocated_max(2) {
                    let index = domain.site_index(i, j, k);
                    let change =
                        SiteChange::classify(occupancy.owner_previous(index), occupancy.owner(index));
                    match change {
                        SiteChange::Unchanged => {}
                        SiteChange::Covered(id) => {
                            let colloid = self.get_colloids().get(id);
                            colloid.set_rebuild(true);
                            if domain.is_interior(i, j, k) {
                                self.remove_fluid(index, i, j, k, colloid);
                                self.remove_order_parameter(index, colloid);
                            }
                        }
                        SiteChange::Exposed(id) => {
                            let colloid = self.get_colloids().get(id);
                            colloid.set_rebuild(true);
                            if domain.is_interior(i, j, k) {
                                self.replace_fluid(index, i, j, k, colloid);
                                self.replace_order_parameter(index, i, j, k, colloid);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Book the fluid swallowed at a newly covered site against the new
    /// owner. The distribution itself is left behind; only its moments
    /// matter.
    fn remove_fluid(&self, index: usize, i: i32, j: i32, k: i32, colloid: &Colloid) {
        let oldrho = self.get_fluid().zeroth_moment(index);
        let oldu = self.get_fluid().first_moment(index);

        colloid.add_deltam(self.get_reference_density() - oldrho);
        colloid.add_f0(&oldu);

        let rb = self.boundary_vector(i, j, k, colloid);
        colloid.add_t0(&functions::cross_product(&rb, &oldu));
    }

    fn remove_order_parameter(&self, index: usize, colloid: &Colloid) {
        let phi = self.get_phi().get_value(index);
        colloid.add_deltaphi(phi - self.get_reference_phi());
    }

    /// Refill a newly exposed site with the quadrature-weighted average
    /// of the neighbours that stayed fluid across the step, and book the
    /// created moments against the previous owner.
    fn replace_fluid(&self, index: usize, i: i32, j: i32, k: i32, colloid: &Colloid) {
        let domain = self.get_domain();
        let vel_set_params = self.get_velocity_set_parameters();
        let q = vel_set_params.get_q();
        let c = vel_set_params.get_c();
        let w = vel_set_params.get_w();

        let mut newf = vec![0.0; q];
        let mut weight = 0.0;

        for p in 1..q {
            let indexn = domain.site_index(i + c[p][0], j + c[p][1], k + c[p][2]);
            if !self.eligible_fluid_neighbor(indexn) {
                continue;
            }
            let f_n = self.get_fluid().get_f(indexn);
            newf.iter_mut()
                .zip(f_n.iter())
                .for_each(|(newf_p, f_p)| *newf_p += w[p] * f_p);
            weight += w[p];
        }

        if weight == 0.0 {
            panic!("Site {index} was exposed with no fluid neighbour to average from");
        }

        let rw = 1.0 / weight;
        let mut newrho = 0.0;
        // Sign chosen for the upcoming correction to the colloid momentum.
        let mut newu = vec![0.0; 3];
        for p in 0..q {
            newf[p] *= rw;
            newrho += newf[p];
            for x in 0..3 {
                newu[x] -= newf[p] * c[p][x] as Float;
            }
        }
        self.get_fluid().set_f(index, newf);

        colloid.add_deltam(newrho - self.get_reference_density());
        colloid.add_f0(&newu);

        let rb = self.boundary_vector(i, j, k, colloid);
        colloid.add_t0(&functions::cross_product(&rb, &newu));
    }

    fn replace_order_parameter(&self, index: usize, i: i32, j: i32, k: i32, colloid: &Colloid) {
        let domain = self.get_domain();
        let vel_set_params = self.get_velocity_set_parameters();
        let q = vel_set_params.get_q();
        let c = vel_set_params.get_c();
        let w = vel_set_params.get_w();

        let mut newphi = 0.0;
        let mut weight = 0.0;

        for p in 1..q {
            let indexn = domain.site_index(i + c[p][0], j + c[p][1], k + c[p][2]);
            if !self.eligible_fluid_neighbor(indexn) {
                continue;
            }
            newphi += w[p] * self.get_phi().get_value(indexn);
            weight += w[p];
        }

        if weight == 0.0 {
            panic!("Site {index} was exposed with no fluid neighbour to average from");
        }

        newphi /= weight;
        self.get_phi().set_value(index, newphi);
        colloid.add_deltaphi(-(newphi - self.get_reference_phi()));
    }

    /// A neighbour may feed the exposed-site average only if it was fluid
    /// in both snapshots: never wall, and owned in neither the previous
    /// nor the current map.
    fn eligible_fluid_neighbor(&self, index: usize) -> bool {
        let occupancy = self.get_occupancy();
        !self.get_wall().is_boundary(index)
            && occupancy.owner(index).is_none()
            && occupancy.owner_previous(index).is_none()
    }

    fn boundary_vector(&self, i: i32, j: i32, k: i32, colloid: &Colloid) -> Vec<Float> {
        let domain = self.get_domain();
        let r0 = domain.local_from_global(&colloid.get_center());
        let rsite = domain.site_coordinates(i, j, k);
        domain.separation(&r0, &rsite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid;

    #[test]
    fn test_classify() {
        assert_eq!(SiteChange::classify(None, None), SiteChange::Unchanged);
        assert_eq!(SiteChange::classify(Some(2), Some(2)), SiteChange::Unchanged);
        assert_eq!(SiteChange::classify(None, Some(1)), SiteChange::Covered(1));
        assert_eq!(SiteChange::classify(Some(1), None), SiteChange::Exposed(1));
        // Owner-to-owner handoff without an unowned step in between.
        assert_eq!(SiteChange::classify(Some(0), Some(1)), SiteChange::Unchanged);
    }

    #[test]
    fn test_one_spacing_translation_covers_and_exposes_once() {
        let coupling = Coupling::test_default();
        coupling.update_step();

        let colloid = coupling.get_colloids().get(0);
        colloid.set_center(vec![7.0, 6.0, 6.0]);
        coupling.update_step();

        let domain = coupling.get_domain();
        let occupancy = coupling.get_occupancy();

        let mut covered = Vec::new();
        let mut exposed = Vec::new();
        for i in domain.allocated_min(0)..=domain.allocated_max(0) {
            for j in domain.allocated_min(1)..=domain.allocated_max(1) {
                for k in domain.allocated_min(2)..=domain.allocated_max(2) {
                    let index = domain.site_index(i, j, k);
                    match SiteChange::classify(
                        occupancy.owner_previous(index),
                        occupancy.owner(index),
                    ) {
                        SiteChange::Covered(_) => covered.push((i, j, k)),
                        SiteChange::Exposed(_) => exposed.push((i, j, k)),
                        SiteChange::Unchanged => {}
                    }
                }
            }
        }

        let mut expected_covered = vec![(8, 6, 6), (7, 5, 6), (7, 7, 6), (7, 6, 5), (7, 6, 7)];
        let mut expected_exposed = vec![(5, 6, 6), (6, 5, 6), (6, 7, 6), (6, 6, 5), (6, 6, 7)];
        expected_covered.sort();
        expected_exposed.sort();
        covered.sort();
        exposed.sort();

        assert_eq!(covered, expected_covered);
        assert_eq!(exposed, expected_exposed);
        assert!(covered.iter().all(|site| !exposed.contains(site)));

        // Uniform resting fluid: the bookkeeping cancels to round-off.
        assert!(colloid.get_deltam().abs() < 1e-12);
        assert_eq!(colloid.get_deltaphi(), 0.0);
        for x in 0..3 {
            assert!(colloid.get_f0()[x].abs() < 1e-12);
            assert!(colloid.get_t0()[x].abs() < 1e-12);
        }

        // The move forced a full reconstruction, consumed by update_links.
        assert!(!colloid.get_rebuild());
        assert_eq!(colloid.get_link_table().num_active(), 90);
    }

    #[test]
    fn test_transition_raises_rebuild_flag() {
        let coupling = Coupling::test_default();
        coupling.update_step();

        let colloid = coupling.get_colloids().get(0);
        colloid.set_center(vec![6.5, 6.0, 6.0]);
        coupling.update_map();
        coupling.remove_or_replace_fluid();

        assert!(colloid.get_rebuild());

        coupling.update_links();

        assert!(!colloid.get_rebuild());
    }

    #[test]
    fn test_exposed_site_with_single_neighbor_copies_its_moments() {
        let coupling = Coupling::test_default();
        let domain = coupling.get_domain();
        let occupancy = coupling.get_occupancy();
        let vel_set_params = coupling.get_velocity_set_parameters();
        let colloid = coupling.get_colloids().get(0);
        let c = vel_set_params.get_c().clone();

        // Fence off every neighbour of the target in the current map
        // except the one along +x, leaving exactly one eligible donor.
        let target = (6, 6, 6);
        let donor = domain.site_index(7, 6, 6);
        for p in 1..vel_set_params.get_q() {
            let neighbor = (target.0 + c[p][0], target.1 + c[p][1], target.2 + c[p][2]);
            if neighbor == (7, 6, 6) {
                continue;
            }
            occupancy.claim(domain.site_index(neighbor.0, neighbor.1, neighbor.2), 0);
        }

        let target_index = domain.site_index(target.0, target.1, target.2);
        coupling.get_fluid().set_f(
            donor,
            fluid::equilibrium(1.2, &[0.0, 0.0, 0.0], vel_set_params),
        );
        coupling.get_phi().set_value(donor, 0.4);

        coupling.replace_fluid(target_index, target.0, target.1, target.2, colloid);
        coupling.replace_order_parameter(target_index, target.0, target.1, target.2, colloid);

        // A single donor normalises to weight one: no blending at all.
        assert!((coupling.get_fluid().zeroth_moment(target_index) - 1.2).abs() < 1e-12);
        assert!((colloid.get_deltam() - 0.2).abs() < 1e-12);
        assert!((coupling.get_phi().get_value(target_index) - 0.4).abs() < 1e-12);
        assert!((colloid.get_deltaphi() + 0.4).abs() < 1e-12);
        for x in 0..3 {
            assert!(colloid.get_f0()[x].abs() < 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "no fluid neighbour")]
    fn test_exposed_site_with_no_neighbors_is_fatal() {
        let coupling = Coupling::test_default();
        let domain = coupling.get_domain();
        let occupancy = coupling.get_occupancy();
        let vel_set_params = coupling.get_velocity_set_parameters();
        let colloid = coupling.get_colloids().get(0);
        let c = vel_set_params.get_c().clone();

        for p in 1..vel_set_params.get_q() {
            occupancy.claim(domain.site_index(6 + c[p][0], 6 + c[p][1], 6 + c[p][2]), 0);
        }

        let target_index = domain.site_index(6, 6, 6);
        coupling.replace_fluid(target_index, 6, 6, 6, colloid);
    }

    #[test]
    fn test_remove_fluid_bookkeeping() {
        let coupling = Coupling::test_default();
        let domain = coupling.get_domain();
        let vel_set_params = coupling.get_velocity_set_parameters();
        let colloid = coupling.get_colloids().get(0);

        let index = domain.site_index(3, 3, 3);
        coupling
            .get_fluid()
            .set_f(index, fluid::equilibrium(1.2, &[0.03, 0.0, 0.0], vel_set_params));
        coupling.get_phi().set_value(index, 0.7);

        coupling.remove_fluid(index, 3, 3, 3, colloid);
        coupling.remove_order_parameter(index, colloid);

        assert!((colloid.get_deltam() + 0.2).abs() < 1e-12);
        assert!((colloid.get_deltaphi() - 0.7).abs() < 1e-12);

        let f0 = colloid.get_f0();
        assert!((f0[0] - 1.2 * 0.03).abs() < 1e-12);
        assert!(f0[1].abs() < 1e-12 && f0[2].abs() < 1e-12);

        // rb = (3,3,3) - (6,6,6) = (-3,-3,-3); t0 = rb x p.
        let t0 = colloid.get_t0();
        assert!(t0[0].abs() < 1e-12);
        assert!((t0[1] + 3.0 * 1.2 * 0.03).abs() < 1e-12);
        assert!((t0[2] - 3.0 * 1.2 * 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_halo_sites_are_excluded_from_corrections() {
        let coupling = Coupling::test_default();
        let domain = coupling.get_domain();
        let colloid = coupling.get_colloids().get(0);
        colloid.set_center(vec![0.0, 6.0, 6.0]);
        coupling.update_step();

        // Mark one halo site and one interior site of the shell about to
        // be exposed.
        let halo_exposed = domain.site_index(-1, 6, 6);
        let interior_exposed = domain.site_index(0, 5, 6);
        coupling.get_fluid().set_population(halo_exposed, 0, 9.9);
        coupling.get_fluid().set_population(interior_exposed, 0, 9.9);

        colloid.set_center(vec![1.0, 6.0, 6.0]);
        coupling.update_step();

        // The halo site kept its marker: only interior sites receive the
        // replacement average.
        assert_eq!(coupling.get_fluid().get_population(halo_exposed, 0), 9.9);
        assert!((coupling.get_fluid().get_population(interior_exposed, 0) - 9.9).abs() > 1.0);
    }
}
