use super::acc::Acc;
use super::constraints::SparseRow;
use super::djc::Djc;
use super::domain::Domain;
use super::*;
use crate::algebra::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// The user supplied data of a model.  Solutions, print targets and
// callbacks are not written.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonModelData<T: FloatT> {
    name: Option<String>,
    sense: ObjectiveSense,
    c: Vec<T>,
    c_fix: T,
    variable_bounds: Vec<Bound<T>>,
    variable_names: Vec<Option<String>>,
    integer: Vec<bool>,
    constraint_rows: Vec<SparseRow<T>>,
    constraint_bounds: Vec<Bound<T>>,
    constraint_names: Vec<Option<String>>,
    afe_rows: usize,
    f_rows: Vec<usize>,
    f_vars: Vec<usize>,
    f_vals: Vec<T>,
    g: Vec<T>,
    domains: Vec<Domain<T>>,
    accs: Vec<Acc>,
    djcs: Vec<Djc>,
    psd_dims: Vec<usize>,
    barc: Vec<BarcEntry<T>>,
    barf: Vec<BarfEntry<T>>,
    settings: ModelSettings<T>,
}

fn invalid_data(e: ModelError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

impl<T> Model<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Writes the model data as JSON.  The model is validated first.
    pub fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        self.validate().map_err(invalid_data)?;

        let mut json_data = JsonModelData {
            name: self.name().map(str::to_string),
            sense: self.sense,
            c: self.c.clone(),
            c_fix: self.c_fix,
            variable_bounds: self.variables.bounds.clone(),
            variable_names: self.variables.names.clone(),
            integer: self.variables.integer.clone(),
            constraint_rows: self.constraints.rows.clone(),
            constraint_bounds: self.constraints.bounds.clone(),
            constraint_names: self.constraints.names.clone(),
            afe_rows: self.afe.row_count(),
            f_rows: self.afe.f_rows.clone(),
            f_vars: self.afe.f_vars.clone(),
            f_vals: self.afe.f_vals.clone(),
            g: self.afe.g.clone(),
            domains: self.domains.iter().cloned().collect(),
            accs: self.accs.accs.clone(),
            djcs: self.djcs.djcs.clone(),
            psd_dims: self.psd.dims.clone(),
            barc: self.psd.barc.clone(),
            barf: self.psd.barf.clone(),
            settings: self.settings.clone(),
        };

        // sanitize values that can't be serialized, i.e. infs
        json_data
            .variable_bounds
            .iter_mut()
            .chain(json_data.constraint_bounds.iter_mut())
            .for_each(sanitize_bound);
        if json_data.settings.time_limit == f64::INFINITY {
            json_data.settings.time_limit = f64::MAX;
        }

        // write to file
        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    /// Reads a model written by [`write_to_file`](Self::write_to_file)
    /// into a new model with its own identity.
    pub fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        // read file
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut json: JsonModelData<T> = serde_json::from_str(&buffer)?;

        // restore sanitized settings to their original values
        if json.settings.time_limit == f64::MAX {
            json.settings.time_limit = f64::INFINITY;
        }

        let mut model = Model::<T>::new();
        if let Some(name) = json.name {
            model.set_name(&name);
        }
        model.sense = json.sense;
        model.c_fix = json.c_fix;
        model.settings = json.settings;

        let n = json.variable_bounds.len();
        model.append_variables(n);
        model.put_c_list(&(0..n).collect::<Vec<_>>(), &json.c).map_err(invalid_data)?;
        for (j, b) in json.variable_bounds.into_iter().enumerate() {
            // re-checking also maps the sanitized values back to infinity
            model
                .set_variable_bound(j, b.key, b.lower, b.upper)
                .map_err(invalid_data)?;
        }
        model.variables.names = json.variable_names;
        model.variables.integer = json.integer;

        let m = json.constraint_bounds.len();
        model.append_constraints(m);
        for (i, (row, b)) in json
            .constraint_rows
            .into_iter()
            .zip(json.constraint_bounds)
            .enumerate()
        {
            model.put_arow(i, &row.idx, &row.val).map_err(invalid_data)?;
            model
                .set_constraint_bound(i, b.key, b.lower, b.upper)
                .map_err(invalid_data)?;
        }
        model.constraints.names = json.constraint_names;

        model.append_afe_rows(json.afe_rows);
        model
            .set_afe_entries(&json.f_rows, &json.f_vars, &json.f_vals)
            .map_err(invalid_data)?;
        model.set_afe_constants(0, &json.g).map_err(invalid_data)?;

        for d in json.domains {
            model
                .append_domain(d.kind().clone(), d.dim())
                .map_err(invalid_data)?;
        }
        model.accs.counter.append(json.accs.len());
        model.accs.accs = json.accs;
        model.djcs.counter.append(json.djcs.len());
        model.djcs.djcs = json.djcs;

        model.append_psd_blocks(&json.psd_dims).map_err(invalid_data)?;
        model.psd.barc = json.barc;
        model.psd.barf = json.barf;

        // names, integrality flags and the lists above must agree in length
        if model.variables.names.len() != n
            || model.variables.integer.len() != n
            || model.constraints.names.len() != m
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "inconsistent attribute lengths",
            ));
        }
        model.validate().map_err(invalid_data)?;
        Ok(model)
    }
}

fn sanitize_bound<T: FloatT>(b: &mut Bound<T>) {
    if b.lower == T::neg_infinity() {
        b.lower = T::min_value();
    }
    if b.upper == T::infinity() {
        b.upper = T::max_value();
    }
}
