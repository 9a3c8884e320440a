// ------------------------------------------------------------------------------- MODULES

mod d3q15;
mod d3q19;
mod d3q27;

// ------------------------------------------------------------------------------- IMPORTS

use crate::prelude_crate::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VelocitySet {
    D3Q15 = 0,
    D3Q19 = 1,
    D3Q27 = 2,
}

use VelocitySet::*;

impl VelocitySet {
    pub(crate) fn get_velocity_set_parameters(&self) -> Parameters {
        match self {
            D3Q15 => Parameters {
                velocity_set: D3Q15,
                d: d3q15::D,
                q: d3q15::Q,
                c: d3q15::C.iter().map(|&arr| arr.to_vec()).collect(),
                w: d3q15::W.to_vec(),
                q_bar: d3q15::Q_BAR.to_vec(),
            },
            D3Q19 => Parameters {
                velocity_set: D3Q19,
                d: d3q19::D,
                q: d3q19::Q,
                c: d3q19::C.iter().map(|&arr| arr.to_vec()).collect(),
                w: d3q19::W.to_vec(),
                q_bar: d3q19::Q_BAR.to_vec(),
            },
            D3Q27 => Parameters {
                velocity_set: D3Q27,
                d: d3q27::D,
                q: d3q27::Q,
                c: d3q27::C.iter().map(|&arr| arr.to_vec()).collect(),
                w: d3q27::W.to_vec(),
                q_bar: d3q27::Q_BAR.to_vec(),
            },
        }
    }
}

// ----------------------------------------------------------------- STRUCT: Parameters

#[derive(Debug, PartialEq)]
pub struct Parameters {
    pub(crate) velocity_set: VelocitySet,
    pub(crate) d: usize,
    pub(crate) q: usize,
    pub(crate) c: Vec<Vec<i32>>,
    pub(crate) w: Vec<Float>,
    pub(crate) q_bar: Vec<usize>,
}

impl Default for Parameters {
    fn default() -> Self {
        D3Q19.get_velocity_set_parameters()
    }
}

impl Parameters {
    pub(crate) fn test_default() -> Self {
        Default::default()
    }
}

impl Parameters {
    pub(crate) fn get_d(&self) -> usize {
        self.d
    }

    pub(crate) fn get_q(&self) -> usize {
        self.q
    }

    pub(crate) fn get_c(&self) -> &Vec<Vec<i32>> {
        &self.c
    }

    pub(crate) fn get_w(&self) -> &Vec<Float> {
        &self.w
    }

    pub(crate) fn get_q_bar(&self) -> &Vec<usize> {
        &self.q_bar
    }

    pub(crate) fn get_opposite_direction(&self, direction: usize) -> usize {
        self.get_q_bar()[direction]
    }
}
