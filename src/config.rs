use core_affinity::{get_core_ids, set_for_current};
use std::num::{NonZero, NonZeroUsize};

// ------------------------------------------------------------------------ STRUCT: Config

#[derive(Debug)]
pub struct Config {
    pub number_of_threads: NonZeroUsize,
    pub core_affinity: bool,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            number_of_threads: NonZero::new(1).unwrap(),
            core_affinity: false,
            verbose: false,
        }
    }
}

impl Config {
    pub fn get_number_of_threads(&self) -> usize {
        usize::from(self.number_of_threads)
    }
}

// ----------------------------------------------------------------------------- FUNCTIONS

pub fn init_global_pool(num_threads: usize, pin_all_cores: bool) {
    if pin_all_cores {
        let cores = get_core_ids().expect("could not list the system cores");
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .start_handler(move |idx| {
                let core = cores[idx % cores.len()];
                let _ = set_for_current(core);
            })
            .build_global()
            .expect("the global pool was already created");
    } else {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .expect("the global pool was already created");
    };
}
