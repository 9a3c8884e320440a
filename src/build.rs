use crate::colloid::Colloid;
use crate::coupling::Coupling;
use crate::functions;
use crate::links::LinkStatus;
use crate::prelude_crate::*;
use rayon::prelude::*;

impl Coupling {
    /// Rebuild the occupancy map for the whole allocation, halo included.
    /// Must complete before any link or transition pass: both read
    /// neighbour ownership that may lie in the halo.
    pub fn update_map(&self) {
        let occupancy = self.get_occupancy();
        occupancy.swap();
        occupancy.clear();

        let domain = self.get_domain();
        for colloid in self.get_colloids().iter() {
            let r0 = domain.local_from_global(&colloid.get_center());
            let radius = colloid.get_radius();
            let rsq = radius * radius;
            let bbox = self.bounding_box(&r0, radius, 0);

            for i in bbox[0].0..=bbox[0].1 {
                for j in bbox[1].0..=bbox[1].1 {
                    for k in bbox[2].0..=bbox[2].1 {
                        let rsite = domain.site_coordinates(i, j, k);
                        let rsep = domain.separation(&rsite, &r0);
                        if functions::dot_product(&rsep, &rsep) < rsq {
                            occupancy.claim(domain.site_index(i, j, k), colloid.get_id());
                        }
                    }
                }
            }
        }
    }

    /// Reconstruct or reset the boundary links of every local colloid.
    /// Each colloid's table is independent, so the pass runs in parallel;
    /// the occupancy map is only read.
    pub fn update_links(&self) {
        self.get_colloids().par_iter().for_each(|colloid| {
            colloid.zero_coupling_sums();
            if colloid.get_rebuild() {
                self.reconstruct_links(colloid);
                if self.get_wall().present() {
                    self.reconstruct_wall_links(colloid);
                }
            } else {
                self.reset_links(colloid);
            }
            colloid.set_rebuild(false);
        });
    }

    /// Full geometric rebuild of one colloid's links after its shape or
    /// position changed. Walks every outside site of the bounding cube,
    /// pairing it with inside neighbours along the lattice directions.
    /// Records are reused from the arena; whatever the traversal does not
    /// touch stays `Unused` for the next rebuild.
    pub(crate) fn reconstruct_links(&self, colloid: &Colloid) {
        let domain = self.get_domain();
        let occupancy = self.get_occupancy();
        let vel_set_params = self.get_velocity_set_parameters();
        let q = vel_set_params.get_q();
        let c = vel_set_params.get_c();

        let id = colloid.get_id();
        let r0 = domain.local_from_global(&colloid.get_center());
        let velocity = colloid.get_velocity();
        let angular_velocity = colloid.get_angular_velocity();

        let mut table = colloid.get_link_table();
        table.set_all_unused();

        // One site short of the halo edge, so every direction lookup
        // below stays inside the allocation.
        let bbox = self.bounding_box(&r0, colloid.get_radius(), 1);

        for i in bbox[0].0..=bbox[0].1 {
            for j in bbox[1].0..=bbox[1].1 {
                for k in bbox[2].0..=bbox[2].1 {
                    let index1 = domain.site_index(i, j, k);
                    if occupancy.owner(index1) == Some(id) {
                        continue;
                    }

                    let rsite1 = domain.site_coordinates(i, j, k);
                    let rsep = domain.separation(&r0, &rsite1);

                    // Site index1 is outside; any inside end along a
                    // lattice vector makes a link.
                    for p in 1..q {
                        let index0 =
                            domain.site_index(i + c[p][0], j + c[p][1], k + c[p][2]);
                        if occupancy.owner(index0) != Some(id) {
                            continue;
                        }

                        let rb = rsep
                            .iter()
                            .zip(c[p].iter())
                            .map(|(rsep_x, &c_x)| rsep_x + LINK_LAMBDA * c_x as Float)
                            .collect::<Vec<Float>>();

                        let slot = table.acquire();
                        let link = table.get_link_mut(slot);
                        link.set_topology(index1, index0, p);
                        link.set_rb(rb.clone());

                        if self.site_status(index1) == SiteStatus::Fluid {
                            link.set_status(LinkStatus::Fluid);
                            colloid.link_mean_contrib(p, &rb, vel_set_params);
                        } else {
                            link.set_status(LinkStatus::Colloid);
                            let ub = functions::vector_add(
                                &functions::cross_product(&angular_velocity, &rb),
                                &velocity,
                            );
                            self.set_virtual_velocity(index0, p, &ub);
                        }
                    }
                }
            }
        }

        colloid.set_link_table(table);
    }

    /// Refresh an unchanged colloid's links: recompute each boundary
    /// vector from the current centre and re-derive the Fluid/Colloid
    /// branch. Topology is untouched; wall links keep their status until
    /// the next full rebuild.
    pub(crate) fn reset_links(&self, colloid: &Colloid) {
        let domain = self.get_domain();
        let vel_set_params = self.get_velocity_set_parameters();
        let c = vel_set_params.get_c();

        let r0 = domain.local_from_global(&colloid.get_center());
        let velocity = colloid.get_velocity();
        let angular_velocity = colloid.get_angular_velocity();

        let mut table = colloid.get_link_table();
        for slot in 0..table.num_links() {
            let status = table.get_link(slot).get_status();
            if status == LinkStatus::Unused || status == LinkStatus::Boundary {
                continue;
            }

            let fluid_site = table.get_link(slot).get_fluid_site();
            let solid_site = table.get_link(slot).get_solid_site();
            let direction = table.get_link(slot).get_direction();

            let coords = domain.index_to_coords(fluid_site);
            let rsite = domain.site_coordinates(coords[0], coords[1], coords[2]);
            let rsep = domain.separation(&r0, &rsite);
            let rb = rsep
                .iter()
                .zip(c[direction].iter())
                .map(|(rsep_x, &c_x)| rsep_x + LINK_LAMBDA * c_x as Float)
                .collect::<Vec<Float>>();

            let link = table.get_link_mut(slot);
            link.set_rb(rb.clone());

            if self.site_status(fluid_site) == SiteStatus::Fluid {
                link.set_status(LinkStatus::Fluid);
                colloid.link_mean_contrib(direction, &rb, vel_set_params);
            } else {
                link.set_status(LinkStatus::Colloid);
                let ub = functions::vector_add(
                    &functions::cross_product(&angular_velocity, &rb),
                    &velocity,
                );
                self.set_virtual_velocity(solid_site, direction, &ub);
            }
        }

        colloid.set_link_table(table);
    }

    /// Write the equilibrium population for the rigid-body surface
    /// velocity `u` onto the solid-side site of a colloid-colloid link,
    /// for the propagation stage to bounce against.
    pub(crate) fn set_virtual_velocity(&self, index: usize, direction: usize, u: &[Float]) {
        let vel_set_params = self.get_velocity_set_parameters();
        let w = vel_set_params.get_w()[direction];
        let c = functions::direction_vector(&vel_set_params.get_c()[direction]);
        let u_dot_c = functions::dot_product(u, &c);
        self.get_fluid()
            .set_population(index, direction, w * (1.0 + CS_2_INV * u_dot_c));
    }

    /// Cube of sites around a centre, clipped `margin` sites inside the
    /// halo edge. Inclusive bounds per axis.
    pub(crate) fn bounding_box(
        &self,
        r0: &[Float],
        radius: Float,
        margin: i32,
    ) -> [(i32, i32); 3] {
        let domain = self.get_domain();
        let mut bbox = [(0, 0); 3];
        for x in 0..3 {
            let lo = (r0[x] - radius).floor() as i32;
            let hi = (r0[x] + radius).ceil() as i32;
            bbox[x] = (
                lo.max(domain.allocated_min(x) + margin),
                hi.min(domain.allocated_max(x) - margin),
            );
        }
        bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::coupling::{ColloidParameters, Parameters};

    fn sorted_triples(colloid: &Colloid) -> Vec<(usize, usize, usize, LinkStatus)> {
        let mut triples = colloid
            .get_links()
            .iter()
            .map(|link| {
                (
                    link.get_fluid_site(),
                    link.get_solid_site(),
                    link.get_direction(),
                    link.get_status(),
                )
            })
            .collect::<Vec<(usize, usize, usize, LinkStatus)>>();
        triples.sort();
        triples
    }

    #[test]
    fn test_update_map_claims_interior_sites() {
        let coupling = Coupling::test_default();

        coupling.update_map();

        let domain = coupling.get_domain();
        let occupancy = coupling.get_occupancy();

        let interior = [
            (6, 6, 6),
            (5, 6, 6),
            (7, 6, 6),
            (6, 5, 6),
            (6, 7, 6),
            (6, 6, 5),
            (6, 6, 7),
        ];
        for &(i, j, k) in interior.iter() {
            assert_eq!(occupancy.owner(domain.site_index(i, j, k)), Some(0));
        }
        assert_eq!(occupancy.owner(domain.site_index(7, 7, 6)), None);
        assert_eq!(occupancy.owner(domain.site_index(8, 6, 6)), None);

        let claimed = (0..domain.num_sites())
            .filter(|&index| occupancy.owner(index).is_some())
            .count();
        assert_eq!(claimed, interior.len());
    }

    #[test]
    fn test_update_map_keeps_previous_snapshot() {
        let coupling = Coupling::test_default();
        coupling.update_map();

        let colloid = coupling.get_colloids().get(0);
        colloid.set_center(vec![7.0, 6.0, 6.0]);
        coupling.update_map();

        let domain = coupling.get_domain();
        let occupancy = coupling.get_occupancy();
        let vacated = domain.site_index(5, 6, 6);
        let entered = domain.site_index(8, 6, 6);

        assert_eq!(occupancy.owner_previous(vacated), Some(0));
        assert_eq!(occupancy.owner(vacated), None);
        assert_eq!(occupancy.owner_previous(entered), None);
        assert_eq!(occupancy.owner(entered), Some(0));
    }

    #[test]
    fn test_reconstruct_links_of_isolated_colloid() {
        let coupling = Coupling::test_default();
        coupling.update_step();

        let colloid = coupling.get_colloids().get(0);
        let domain = coupling.get_domain();
        let occupancy = coupling.get_occupancy();
        let c = coupling.get_velocity_set_parameters().get_c().clone();

        let links = colloid.get_links();
        // Seven interior sites of a D3Q19 lattice expose ninety directed
        // fluid-solid pairs.
        assert_eq!(links.len(), 90);

        for link in links.iter() {
            assert_eq!(link.get_status(), LinkStatus::Fluid);
            assert_eq!(occupancy.owner(link.get_solid_site()), Some(0));
            assert_eq!(occupancy.owner(link.get_fluid_site()), None);

            // The solid end lies one lattice vector along the link
            // direction from the fluid end.
            let rf = domain.index_to_coords(link.get_fluid_site());
            let rs = domain.index_to_coords(link.get_solid_site());
            let p = link.get_direction();
            assert_eq!(rs[0] - rf[0], c[p][0]);
            assert_eq!(rs[1] - rf[1], c[p][1]);
            assert_eq!(rs[2] - rf[2], c[p][2]);
        }

        // sumw for this shape: twelve diagonal links off the centre site
        // plus six axis sites each exposing five axis and eight diagonal
        // directions.
        assert!((colloid.get_sumw() - 10.0 / 3.0).abs() < 1e-12);

        // A closed surface has no preferred direction.
        for x in 0..3 {
            assert!(colloid.get_cbar()[x].abs() < 1e-12);
            assert!(colloid.get_rxcbar()[x].abs() < 1e-12);
        }
    }

    #[test]
    fn test_reset_preserves_rebuild_topology() {
        let coupling = Coupling::test_default();
        coupling.update_step();

        let colloid = coupling.get_colloids().get(0);
        let after_rebuild = sorted_triples(colloid);
        let sumw_rebuild = colloid.get_sumw();

        // Rebuild flag is clear, so this goes down the reset path.
        assert!(!colloid.get_rebuild());
        coupling.update_links();
        assert_eq!(sorted_triples(colloid), after_rebuild);
        assert!((colloid.get_sumw() - sumw_rebuild).abs() < 1e-12);

        // A forced full rebuild lands on the identical link set.
        colloid.set_rebuild(true);
        coupling.update_links();
        assert_eq!(sorted_triples(colloid), after_rebuild);
        assert!((colloid.get_sumw() - sumw_rebuild).abs() < 1e-12);
    }

    #[test]
    fn test_facing_colloids_write_virtual_velocity() {
        let params = Parameters {
            colloids: vec![
                ColloidParameters {
                    radius: 1.25,
                    center: vec![4.0, 6.0, 6.0],
                    velocity: vec![0.01, 0.0, 0.0],
                    angular_velocity: vec![0.0, 0.0, 0.0],
                },
                ColloidParameters::at_rest(1.25, vec![7.0, 6.0, 6.0]),
            ],
            ..Default::default()
        };
        let coupling = Coupling::new(Config::default(), params);
        coupling.update_step();

        let domain = coupling.get_domain();
        let a = coupling.get_colloids().get(0);

        // Site (6,6,6) belongs to colloid 1 and faces colloid 0's site
        // (5,6,6), so colloid 0 carries a Colloid-status link there.
        let facing = domain.site_index(6, 6, 6);
        let own = domain.site_index(5, 6, 6);
        let link = a
            .get_links()
            .into_iter()
            .find(|link| link.get_fluid_site() == facing)
            .expect("facing link missing");
        assert_eq!(link.get_status(), LinkStatus::Colloid);
        assert_eq!(link.get_solid_site(), own);

        // Direction 2 is (-1,0,0): the virtual population carries the
        // equilibrium for the surface velocity u = (0.01, 0, 0).
        assert_eq!(link.get_direction(), 2);
        let expected = (1.0 / 18.0) * (1.0 - 3.0 * 0.01);
        let actual = coupling.get_fluid().get_population(own, 2);
        assert!((actual - expected).abs() < 1e-12);

        // Fluid links still outnumber the handful of facing links.
        let fluid_links = a
            .get_links()
            .iter()
            .filter(|l| l.get_status() == LinkStatus::Fluid)
            .count();
        assert!(fluid_links > 0);
    }

    #[test]
    fn test_set_virtual_velocity_includes_rotation() {
        let coupling = Coupling::test_default();
        let domain = coupling.get_domain();
        let index = domain.site_index(2, 2, 2);

        // Direction 3 is (0,1,0); a surface velocity of 1.5 along y gives
        // w (1 + 3 u.c) = (1/18)(1 + 4.5).
        coupling.set_virtual_velocity(index, 3, &[0.0, 1.5, 0.0]);

        let expected = (1.0 / 18.0) * 5.5;
        assert!((coupling.get_fluid().get_population(index, 3) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box_clipping() {
        let coupling = Coupling::test_default();

        let bbox = coupling.bounding_box(&[0.5, 6.0, 6.0], 2.0, 0);
        assert_eq!(bbox[0], (-1, 3));
        assert_eq!(bbox[1], (4, 8));

        let clipped = coupling.bounding_box(&[0.5, 6.0, 6.0], 2.0, 1);
        assert_eq!(clipped[0], (0, 3));
    }
}
