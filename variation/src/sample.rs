use std::collections::HashMap;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};
use crate::error::VarError;
use crate::template::{VarDef, VarKind};

#[derive(Clone, Copy, PartialEq)]
enum Mark { Visiting, Done }

/// Order in which `expr` variables can be evaluated, so that every
/// variable comes after the ones it refers to.
pub fn eval_order(vars :&[VarDef]) -> Result<Vec<usize>, VarError> {
    fn visit(i :usize, vars :&[VarDef], marks :&mut Vec<Option<Mark>>, order :&mut Vec<usize>, path :&mut Vec<String>) -> Result<(), VarError> {
        match marks[i] {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                path.push(vars[i].id.clone());
                return Err(VarError::Cycle(path.join(" -> ")));
            },
            None => {},
        }
        marks[i] = Some(Mark::Visiting);
        path.push(vars[i].id.clone());
        if let VarKind::Expr(e) = &vars[i].kind {
            for name in e.vars() {
                match vars.iter().position(|v| v.id == name) {
                    Some(j) => visit(j, vars, marks, order, path)?,
                    None => return Err(VarError::Unknown(name)),
                }
            }
        }
        path.pop();
        marks[i] = Some(Mark::Done);
        order.push(i);
        Ok(())
    }

    let mut marks = vec![None; vars.len()];
    let mut order = Vec::new();
    for i in 0..vars.len() {
        visit(i, vars, &mut marks, &mut order, &mut Vec::new())?;
    }
    Ok(order)
}

/// Draw one value for every variable.
pub fn sample<R :Rng>(vars :&[VarDef], rng :&mut R) -> Result<HashMap<String, f64>, VarError> {
    let mut values = HashMap::new();
    // random variables first, in declaration order, so a seed gives the same
    // values whatever the expressions look like
    for v in vars {
        let x = match &v.kind {
            VarKind::Uniform { min, max } => if min < max { rng.gen_range(*min, *max) } else { *min },
            VarKind::Normal { mu, sd } => Normal::new(*mu, *sd)
                .map_err(|e| VarError::Definition(v.id.clone(), format!("{:?}", e)))?
                .sample(rng),
            VarKind::Choice(choices) => *choices.choose(rng)
                .ok_or_else(|| VarError::Definition(v.id.clone(), "no values to choose from".to_string()))?,
            VarKind::Expr(_) => continue,
        };
        values.insert(v.id.clone(), x);
    }
    for i in eval_order(vars)? {
        if let VarKind::Expr(e) = &vars[i].kind {
            let x = e.eval(&values)?;
            values.insert(vars[i].id.clone(), x);
        }
    }
    Ok(values)
}
