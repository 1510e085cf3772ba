#[cfg(feature = "serde")]
mod json {
    use conic_model::{io::ConfigurablePrintTarget, model::*};
    use std::f64::consts::SQRT_2;
    use std::io::{Read, Seek, SeekFrom, Write};

    fn full_model() -> Model {
        let mut model: Model = Model::with_name("round trip");
        model.print_to_sink();
        model.set_objective_sense(ObjectiveSense::Maximize);

        let x = model.append_variables(3);
        model.set_variable_bound(x, BoundKey::Lower, 0.0, 0.0).unwrap();
        model.set_variable_bound(x + 1, BoundKey::Range, -1.0, 1.0).unwrap();
        model.set_integer(x + 2, true).unwrap();
        model.set_variable_name(x, "x").unwrap();
        model.put_c_list(&[0, 1, 2], &[1.0, 2.0, 3.0]).unwrap();
        model.set_c_fix(-1.5);

        let i = model.append_constraints(1);
        model.put_arow(i, &[0, 2], &[1.0, -1.0]).unwrap();
        model.set_constraint_bound(i, BoundKey::Upper, 0.0, 4.0).unwrap();

        let r = model.append_afe_rows(4);
        model
            .set_afe_entries(&[r, r + 1, r + 2, r + 2], &[0, 1, 2, 2], &[1.0, SQRT_2, 1.0, 0.5])
            .unwrap();
        model.set_afe_constants(r, &[0.0, 0.0, 0.0, -2.0]).unwrap();

        let psd = model.append_svec_psd_domain(3).unwrap();
        let pow = model.append_primal_power_domain(3, &[1.0, 3.0]).unwrap();
        let zero = model.append_zero_domain(1).unwrap();
        let nonpos = model.append_nonpositive_domain(1).unwrap();
        model.append_acc(psd, &[r, r + 1, r + 2], None).unwrap();
        model.append_acc(pow, &[r, r + 2, r + 1], None).unwrap();
        model
            .append_disjunction(&[
                vec![DomainMembership::new(zero, [r + 3])],
                vec![DomainMembership::new(nonpos, [r])],
            ])
            .unwrap();

        let b = model.append_psd_blocks(&[2]).unwrap();
        model.put_barc_triplets(&[b], &[1], &[0], &[0.5]).unwrap();
        model.put_barf_triplets(&[r + 3], &[b], &[1], &[1], &[1.0]).unwrap();

        model.settings.max_iter = 77;
        model
    }

    #[test]
    fn test_json_io() {
        let model = full_model();

        // write the model to a file
        let mut file = tempfile::tempfile().unwrap();
        model.write_to_file(&mut file).unwrap();

        // read the model from the file
        file.seek(SeekFrom::Start(0)).unwrap();
        let model2 = Model::<f64>::read_from_file(&mut file).unwrap();

        assert_ne!(model.id(), model2.id());
        assert_eq!(model2.name(), Some("round trip"));
        assert_eq!(model2.objective_sense(), ObjectiveSense::Maximize);
        assert_eq!(model2.counts(), model.counts());
        assert_eq!(model2.objective_coefficients(), model.objective_coefficients());
        assert_eq!(model2.objective_constant(), -1.5);
        assert_eq!(model2.settings, model.settings);
        assert_eq!(model2.settings.time_limit, f64::INFINITY);

        // infinite bounds survive the trip
        for j in 0..3 {
            assert_eq!(model2.variable_bound(j).unwrap(), model.variable_bound(j).unwrap());
        }
        assert_eq!(model2.variable_bound(2).unwrap().lower, f64::NEG_INFINITY);
        assert_eq!(model2.constraint_bound(0).unwrap().lower, f64::NEG_INFINITY);
        assert_eq!(model2.variable_name(0).unwrap(), Some("x"));
        assert!(model2.is_integer(2).unwrap());
        assert_eq!(model2.constraint_row(0).unwrap(), model.constraint_row(0).unwrap());

        let triplets: Vec<_> = model.afe_triplets().collect();
        let triplets2: Vec<_> = model2.afe_triplets().collect();
        assert_eq!(triplets, triplets2);
        assert_eq!(model2.afe_constant(3).unwrap(), -2.0);

        for k in 0..model.num_accs() {
            assert_eq!(model2.acc(k).unwrap(), model.acc(k).unwrap());
            assert_eq!(model2.acc_domain(k).unwrap(), model.acc_domain(k).unwrap());
        }
        assert_eq!(model2.djc(0).unwrap(), model.djc(0).unwrap());
        assert_eq!(model2.barc_entries(), model.barc_entries());
        assert_eq!(model2.barf_entries(), model.barf_entries());

        // both models agree at a point
        let x = [1.0, 0.5, 2.0];
        let barx = vec![vec![1.0, 0.25, 1.0]];
        assert_eq!(
            model2.evaluate_afe_rows(&x, &barx).unwrap(),
            model.evaluate_afe_rows(&x, &barx).unwrap()
        );
        assert_eq!(
            model2.objective_value(&x, &barx).unwrap(),
            model.objective_value(&x, &barx).unwrap()
        );
    }

    #[test]
    fn test_json_rejects_invalid() {
        // an invalid model is not written
        let mut model = full_model();
        model.set_afe_entry(9, 0, 1.0);
        let mut file = tempfile::tempfile().unwrap();
        let err = model.write_to_file(&mut file).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

        // semidefinite entries edited outside the model are caught on read
        let model = full_model();
        for (from, to, expected) in [
            (
                "\"barc\":[{\"block\":0,\"i\":1,",
                "\"barc\":[{\"block\":0,\"i\":7,",
                ModelError::InvalidPsdIndex { i: 7, j: 0, dim: 2 },
            ),
            (
                "\"barf\":[{\"row\":3,\"block\":0,",
                "\"barf\":[{\"row\":3,\"block\":4,",
                ModelError::UnknownHandle(HandleKind::PsdBlock(4)),
            ),
        ] {
            let mut file = tempfile::tempfile().unwrap();
            model.write_to_file(&mut file).unwrap();
            file.seek(SeekFrom::Start(0)).unwrap();
            let mut json = String::new();
            file.read_to_string(&mut json).unwrap();
            assert!(json.contains(from));

            let mut file = tempfile::tempfile().unwrap();
            file.write_all(json.replace(from, to).as_bytes()).unwrap();
            file.seek(SeekFrom::Start(0)).unwrap();
            let err = Model::<f64>::read_from_file(&mut file).unwrap_err();
            assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
            assert_eq!(err.to_string(), expected.to_string());
        }

        // garbage is not read
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"{\"name\": 3}").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        assert!(Model::<f64>::read_from_file(&mut file).is_err());
    }
}
