use crate::functions;
use crate::prelude_crate::*;

// ------------------------------------------------------------------------ STRUCT: Domain

/// Local subdomain of the global lattice, including the halo shell that
/// mirrors neighbouring subdomains. Site coordinates are local: the
/// interior runs from `0` to `n - 1` per axis and the halo extends the
/// range by `nhalo` on each side. Halo exchange itself is the transport
/// layer's job; this object only does indexing and geometry.
#[derive(Debug, PartialEq)]
pub struct Domain {
    n: Vec<usize>,
    n_total: Vec<usize>,
    offset: Vec<i32>,
    nhalo: i32,
    periodic: Vec<bool>,
}

impl Domain {
    pub fn new(
        n: Vec<usize>,
        n_total: Vec<usize>,
        offset: Vec<i32>,
        nhalo: usize,
        periodic: Vec<bool>,
    ) -> Self {
        if n.len() != 3 || n_total.len() != 3 || offset.len() != 3 || periodic.len() != 3 {
            panic!("Domain extents must have three axes");
        }
        if nhalo == 0 {
            panic!("The halo width must be at least one site");
        }
        n.iter().zip(n_total.iter()).for_each(|(n_x, nt_x)| {
            if n_x > nt_x {
                panic!("Local extent ({n_x}) exceeds the global extent ({nt_x})");
            }
        });
        Domain {
            n,
            n_total,
            offset,
            nhalo: nhalo as i32,
            periodic,
        }
    }

    /// Single-process box: local extent equals the global extent, halo of
    /// one site, fully periodic.
    pub fn test_default() -> Self {
        Domain::new(
            vec![12, 12, 12],
            vec![12, 12, 12],
            vec![0, 0, 0],
            1,
            vec![true, true, true],
        )
    }
}

impl Domain {
    pub fn get_n(&self) -> &Vec<usize> {
        &self.n
    }

    pub fn get_n_total(&self) -> &Vec<usize> {
        &self.n_total
    }

    pub fn get_offset(&self) -> &Vec<i32> {
        &self.offset
    }

    pub fn get_nhalo(&self) -> usize {
        self.nhalo as usize
    }

    pub fn get_periodic(&self) -> &Vec<bool> {
        &self.periodic
    }

    pub fn num_sites(&self) -> usize {
        functions::allocated_sites(&self.n, self.nhalo as usize)
    }

    /// First allocated coordinate along `axis` (the outermost halo site).
    pub fn allocated_min(&self, axis: usize) -> i32 {
        debug_assert!(axis < 3);
        -self.nhalo
    }

    /// Last allocated coordinate along `axis`, inclusive.
    pub fn allocated_max(&self, axis: usize) -> i32 {
        self.n[axis] as i32 + self.nhalo - 1
    }

    pub fn is_interior(&self, i: i32, j: i32, k: i32) -> bool {
        i >= 0
            && i < self.n[0] as i32
            && j >= 0
            && j < self.n[1] as i32
            && k >= 0
            && k < self.n[2] as i32
    }
}

impl Domain {
    /// Flat index of the site at local coordinates `(i, j, k)` within the
    /// halo-extended allocation.
    ///
    /// # Examples
    /// ```
    /// # use lbcolloid::domain::Domain;
    /// let domain = Domain::test_default();
    ///
    /// let index = domain.site_index(3, 7, 11);
    /// assert_eq!(domain.index_to_coords(index), vec![3, 7, 11]);
    ///
    /// let halo = domain.site_index(-1, 0, 12);
    /// assert_eq!(domain.index_to_coords(halo), vec![-1, 0, 12]);
    /// ```
    pub fn site_index(&self, i: i32, j: i32, k: i32) -> usize {
        debug_assert!(i >= self.allocated_min(0) && i <= self.allocated_max(0));
        debug_assert!(j >= self.allocated_min(1) && j <= self.allocated_max(1));
        debug_assert!(k >= self.allocated_min(2) && k <= self.allocated_max(2));
        let ey = self.n[1] as i32 + 2 * self.nhalo;
        let ez = self.n[2] as i32 + 2 * self.nhalo;
        (((i + self.nhalo) * ey + (j + self.nhalo)) * ez + (k + self.nhalo)) as usize
    }

    /// Local coordinates of the site with flat index `index`.
    pub fn index_to_coords(&self, index: usize) -> Vec<i32> {
        let ey = self.n[1] as i32 + 2 * self.nhalo;
        let ez = self.n[2] as i32 + 2 * self.nhalo;
        let index = index as i32;
        let i = index / (ey * ez) - self.nhalo;
        let j = (index / ez) % ey - self.nhalo;
        let k = index % ez - self.nhalo;
        debug_assert_eq!(self.site_index(i, j, k), index as usize);
        vec![i, j, k]
    }

    /// Physical position of a site in local coordinates. Site `(i, j, k)`
    /// sits at `(i, j, k) * DELTA_X`; its control volume extends half a
    /// spacing either side.
    pub fn site_coordinates(&self, i: i32, j: i32, k: i32) -> Vec<Float> {
        vec![
            i as Float * DELTA_X,
            j as Float * DELTA_X,
            k as Float * DELTA_X,
        ]
    }

    /// Translate a global physical position into this subdomain's local
    /// frame.
    pub fn local_from_global(&self, r: &[Float]) -> Vec<Float> {
        r.iter()
            .zip(self.offset.iter())
            .map(|(r_x, &o_x)| r_x - o_x as Float * DELTA_X)
            .collect()
    }

    /// Vector from `r1` to `r2`, minimum-image corrected along every
    /// periodic axis.
    ///
    /// # Examples
    /// ```
    /// # use lbcolloid::domain::Domain;
    /// let domain = Domain::test_default();
    ///
    /// assert_eq!(domain.separation(&[1.0, 6.0, 6.0], &[3.0, 6.0, 6.0]), vec![2.0, 0.0, 0.0]);
    /// assert_eq!(domain.separation(&[1.0, 6.0, 6.0], &[11.0, 6.0, 6.0]), vec![-2.0, 0.0, 0.0]);
    /// ```
    pub fn separation(&self, r1: &[Float], r2: &[Float]) -> Vec<Float> {
        let mut rsep = r2
            .iter()
            .zip(r1.iter())
            .map(|(r2_x, r1_x)| r2_x - r1_x)
            .collect::<Vec<Float>>();
        for x in 0..3 {
            if !self.periodic[x] {
                continue;
            }
            let l_x = self.n_total[x] as Float * DELTA_X;
            if rsep[x] > 0.5 * l_x {
                rsep[x] -= l_x;
            }
            if rsep[x] < -0.5 * l_x {
                rsep[x] += l_x;
            }
        }
        rsep
    }
}
