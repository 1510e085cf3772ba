use super::{Model, ModelError, Solution};
use crate::algebra::FloatT;
use crate::timers::Timers;
use std::io::Write;

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

pub(crate) fn print_header<T: FloatT>(
    out: &mut impl Write,
    model: &Model<T>,
    solver: &str,
    threads: usize,
) -> std::io::Result<()> {
    let counts = model.counts();

    writeln!(out, "-------------------------------------------------------------")?;
    writeln!(
        out,
        "           conic-model v{}  -  {}",
        crate::VERSION,
        solver
    )?;
    writeln!(out, "-------------------------------------------------------------")?;

    if let Some(name) = model.name() {
        writeln!(out, "\nproblem: {}", name)?;
    } else {
        writeln!(out, "\nproblem:")?;
    }
    writeln!(out, "  variables     = {}", counts.variables)?;
    writeln!(out, "  constraints   = {}", counts.constraints)?;
    writeln!(out, "  afe rows      = {}", counts.afe_rows)?;
    writeln!(out, "  nnz(F)        = {}", model.afe_nnz())?;
    writeln!(out, "  accs          = {}", counts.accs)?;
    writeln!(out, "  djcs          = {}", counts.djcs)?;
    writeln!(out, "  psd blocks    = {}", counts.psd_blocks)?;

    _print_domains_by_kind(out, model)?;

    let set = &model.settings;
    let time_lim_str = {
        if set.time_limit.is_infinite() {
            "Inf".to_string()
        } else {
            format!("{:?}", set.time_limit)
        }
    };
    writeln!(out, "\nsettings:")?;
    write!(out, "  sense = {:?}, ", model.objective_sense())?;
    print_nthreads(out, threads)?;
    writeln!(out)?;
    writeln!(
        out,
        "  max iter = {}, time limit = {}, tol_feas = {:.1e}",
        set.max_iter, time_lim_str, set.tol_feas
    )?;
    writeln!(out)?;
    out.flush()
}

pub(crate) fn print_footer<T: FloatT>(
    out: &mut impl Write,
    result: &Result<Solution<T>, ModelError>,
    timers: &Timers,
) -> std::io::Result<()> {
    writeln!(out, "-------------------------------------------------------------")?;

    match result {
        Ok(solution) => {
            writeln!(out, "Terminated with status = {}", solution.status)?;
            writeln!(out, "problem status = {}", solution.problem_status)?;
            writeln!(
                out,
                "primal objective = {}",
                expformat!("{:+8.4e}", solution.primal_objective)
            )?;
        }
        Err(e) => writeln!(out, "Terminated with error = {}", e)?,
    }

    for (key, elapsed) in timers.iter() {
        writeln!(out, "{} time = {:?}", key, elapsed)?;
    }
    writeln!(out, "total time = {:?}", timers.total_time())?;
    out.flush()
}

fn _print_domains_by_kind<T: FloatT>(out: &mut impl Write, model: &Model<T>) -> std::io::Result<()> {
    // count and total dimension per kind, in first-use order
    let mut kinds: Vec<(&'static str, usize, usize)> = Vec::new();
    for domain in model.domains.iter() {
        let name = domain.kind().name();
        match kinds.iter_mut().find(|(k, _, _)| *k == name) {
            Some(entry) => {
                entry.1 += 1;
                entry.2 += domain.dim();
            }
            None => kinds.push((name, 1, domain.dim())),
        }
    }
    for (name, count, dims) in kinds {
        writeln!(out, "    : {:<20} = {}, total dim = {}", name, count, dims)?;
    }
    Ok(())
}

fn print_nthreads(out: &mut impl Write, nthreads: usize) -> std::io::Result<()> {
    match nthreads {
        0 => Ok(()),
        1 => write!(out, "(1 thread)"),
        _ => write!(out, "({nthreads} threads)"),
    }
}

// Rust formats exponents as e-8 rather than e-08.
fn _exp_str_reformat(mut thestr: String) -> String {
    // Insert a '+' after the 'e' if there is no sign, and pad the
    // exponent to two digits
    if let Some(epos) = thestr.find('e') {
        let exp = thestr.split_off(epos + 1);
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(d) => ('-', d.to_string()),
            None => ('+', exp.trim_start_matches('+').to_string()),
        };
        thestr.push(sign);
        if digits.len() < 2 {
            thestr.push('0');
        }
        thestr.push_str(&digits);
    }
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat("1.0000e-8".to_string()), "1.0000e-08");
    assert_eq!(_exp_str_reformat("+1.2500e3".to_string()), "+1.2500e+03");
    assert_eq!(_exp_str_reformat("2.0e123".to_string()), "2.0e+123");
}
