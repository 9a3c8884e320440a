use crate::colloid::ColloidId;
use crate::prelude_crate::*;
use colored::*;

// ------------------------------------------------------------------ STRUCT: OccupancyMap

/// Per-site record of which colloid, if any, claims the site as interior.
/// Two snapshots are kept: `current` is rebuilt from scratch every step,
/// `previous` is the snapshot the transition handler diffs against.
/// Allocated once per domain (re)initialisation, sized to the local
/// subdomain plus halo.
#[derive(Debug)]
pub struct OccupancyMap {
    current: RwLock<Vec<Option<ColloidId>>>,
    previous: RwLock<Vec<Option<ColloidId>>>,
}

impl OccupancyMap {
    pub fn new(num_sites: usize, verbose: bool) -> Self {
        if verbose {
            let bytes = 2 * num_sites * std::mem::size_of::<Option<ColloidId>>();
            println!(
                "Requesting {} bytes for the colloid occupancy maps\n",
                bytes.to_string().yellow().bold()
            );
        }
        OccupancyMap {
            current: RwLock::new(vec![None; num_sites]),
            previous: RwLock::new(vec![None; num_sites]),
        }
    }
}

impl OccupancyMap {
    pub fn num_sites(&self) -> usize {
        self.current.read().unwrap().len()
    }

    /// Reset every site of the current snapshot to unowned.
    pub fn clear(&self) {
        self.current
            .write()
            .unwrap()
            .iter_mut()
            .for_each(|owner| *owner = None);
    }

    /// Mark a site as interior to `id`. A site can only have one owner
    /// per snapshot; overlapping claims mean the particle configuration
    /// is invalid and there is nothing sensible to continue with.
    pub fn claim(&self, index: usize, id: ColloidId) {
        let mut current_guard = self.current.write().unwrap();
        if let Some(prior) = current_guard[index] {
            panic!("Site {index} claimed by colloid {id} but already owned by colloid {prior}");
        }
        current_guard[index] = Some(id);
    }

    pub fn owner(&self, index: usize) -> Option<ColloidId> {
        self.current.read().unwrap()[index]
    }

    pub fn owner_previous(&self, index: usize) -> Option<ColloidId> {
        self.previous.read().unwrap()[index]
    }

    /// Copy the current snapshot into the previous one at the step
    /// boundary, before the current one is rebuilt.
    pub fn swap(&self) {
        let current_guard = self.current.read().unwrap();
        let mut previous_guard = self.previous.write().unwrap();
        previous_guard.copy_from_slice(&current_guard);
    }
}
