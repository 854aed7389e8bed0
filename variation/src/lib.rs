//! Variants of road network descriptions.
//!
//! A template is an ordinary input document with an additional `<vars>`
//! block declaring random and derived variables, and `${...}` placeholders
//! in attribute values. Every variant draws new values and substitutes them.

pub mod error;
pub mod expr;
pub mod sample;
pub mod template;

use log::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub use error::VarError;
pub use template::{parse_template, Template, VarDef, VarKind};

/// `n` rendered documents drawn from one seeded generator.
pub fn vary(template :&Template, n :usize, seed :u64) -> Result<Vec<String>, VarError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let values = sample::sample(&template.vars, &mut rng)?;
        debug!("Variant {}: {:?}", i, values);
        out.push(template.render(&values)?);
    }
    Ok(out)
}
