use conic_model::model::*;
use std::f64::consts::SQRT_2;

#[test]
fn test_power_domain_arity() {
    let mut model: Model = Model::new();

    // three exponents on a dimension 3 cone
    let err = model
        .append_primal_power_domain(3, &[0.2, 0.3, 0.5])
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidDomainParameters(_)));

    // one exponent on a dimension 3 cone
    let err = model.append_dual_power_domain(3, &[1.0]).unwrap_err();
    assert!(matches!(err, ModelError::InvalidDomainParameters(_)));

    // dimension below 2
    let err = model.append_primal_power_domain(1, &[]).unwrap_err();
    assert!(matches!(err, ModelError::InvalidDomainParameters(_)));

    assert_eq!(model.num_domains(), 0);
}

#[test]
fn test_power_domain_exponent_sign() {
    let mut model: Model = Model::new();

    for alpha in [[0.0, 1.0], [-0.5, 1.5], [1.0, f64::INFINITY]] {
        let err = model.append_primal_power_domain(3, &alpha).unwrap_err();
        assert!(matches!(err, ModelError::InvalidDomainParameters(_)));
        let err = model.append_dual_power_domain(3, &alpha).unwrap_err();
        assert!(matches!(err, ModelError::InvalidDomainParameters(_)));
    }
    assert_eq!(model.num_domains(), 0);
}

#[test]
fn test_power_domain_normalized() {
    let mut model: Model = Model::new();

    // x0^0.2 x1^0.8 ≥ |x2|, given unnormalized
    let p = model.append_primal_power_domain(3, &[2.0, 8.0]).unwrap();
    let domain = model.domain(p).unwrap();
    assert_eq!(domain.dim(), 3);
    match domain.kind() {
        DomainKind::PrimalPower(alpha) => {
            assert!((alpha[0] - 0.2).abs() < 1e-15);
            assert!((alpha[1] - 0.8).abs() < 1e-15);
        }
        kind => panic!("unexpected domain kind {:?}", kind),
    }

    // more than one right hand side entry
    let p = model.append_primal_power_domain(5, &[1.0, 1.0, 2.0]).unwrap();
    assert_eq!(model.domain(p).unwrap().dim(), 5);
}

#[test]
fn test_fixed_dimension_domains() {
    let mut model: Model = Model::new();

    assert!(model.append_primal_exp_domain().is_ok());
    assert!(model.append_dual_exp_domain().is_ok());
    assert!(matches!(
        model.append_domain(DomainKind::PrimalExponential, 4),
        Err(ModelError::InvalidDomainDimension { dim: 4, .. })
    ));
    assert!(matches!(
        model.append_rotated_quadratic_domain(1),
        Err(ModelError::InvalidDomainDimension { .. })
    ));
    assert!(matches!(
        model.append_nonnegative_domain(0),
        Err(ModelError::InvalidDomainDimension { .. })
    ));
    assert_eq!(model.num_domains(), 2);
}

#[test]
fn test_svec_dimensions() {
    let mut model: Model = Model::new();

    // triangular numbers k(k+1)/2
    for dim in [1, 3, 6, 10, 15] {
        assert!(model.append_svec_psd_domain(dim).is_ok());
    }
    for dim in [0, 2, 4, 5, 7, 14] {
        assert!(matches!(
            model.append_svec_psd_domain(dim),
            Err(ModelError::InvalidDomainDimension { .. })
        ));
    }
    assert_eq!(model.num_domains(), 5);
}

#[test]
fn test_handles_are_model_scoped() {
    let mut m1: Model = Model::new();
    let mut m2: Model = Model::new();
    assert_ne!(m1.id(), m2.id());

    m1.append_afe_rows(3);
    m2.append_afe_rows(3);
    let q1 = m1.append_quadratic_domain(3).unwrap();
    let q2 = m2.append_quadratic_domain(3).unwrap();
    assert_eq!(q1.index(), q2.index());
    assert_ne!(q1, q2);

    // same index, wrong model
    assert!(matches!(
        m2.append_acc(q1, &[0, 1, 2], None),
        Err(ModelError::UnknownHandle(HandleKind::Domain(0)))
    ));
    assert!(m2.domain(q1).is_err());
    assert!(matches!(
        m2.append_disjunction(&[vec![DomainMembership::new(q1, [0, 1, 2])]]),
        Err(ModelError::UnknownHandle(HandleKind::Domain(0)))
    ));
    assert_eq!(m2.num_accs(), 0);
    assert_eq!(m2.num_djcs(), 0);

    m2.append_acc(q2, &[0, 1, 2], None).unwrap();
}

#[test]
fn test_handles_across_clones() {
    let mut original: Model = Model::new();
    original.append_afe_rows(2);
    let early = original.append_nonnegative_domain(2).unwrap();

    let mut copy = original.clone();
    assert_ne!(copy.id(), original.id());

    // handles minted before the clone work on both
    copy.append_acc(early, &[0, 1], None).unwrap();
    original.append_acc(early, &[0, 1], None).unwrap();

    // handles minted afterwards belong to one model only
    let late = original.append_zero_domain(2).unwrap();
    assert!(copy.append_acc(late, &[0, 1], None).is_err());
    let copy_late = copy.append_zero_domain(2).unwrap();
    assert!(original.append_acc(copy_late, &[0, 1], None).is_err());
    assert_eq!(late.index(), copy_late.index());

    // and so on down a chain of clones
    let mut grandchild = copy.clone();
    grandchild.append_acc(early, &[0, 1], None).unwrap();
    grandchild.append_acc(copy_late, &[0, 1], None).unwrap();
    assert!(grandchild.append_acc(late, &[0, 1], None).is_err());
}

#[test]
fn test_svec_psd_constraint() {
    // [x0 x1; x1 x2] ⪰ 0 written as an svec with a √2 off diagonal
    let mut model: Model = Model::new();
    model.append_variables(3);
    let r = model.append_afe_rows(3);
    model
        .set_afe_entries(&[r, r + 1, r + 2], &[0, 1, 2], &[1.0, SQRT_2, 1.0])
        .unwrap();
    let psd = model.append_svec_psd_domain(3).unwrap();
    model.append_acc(psd, &[r, r + 1, r + 2], None).unwrap();

    assert!(model.acc_satisfied(0, &[2.0, 1.0, 2.0], &[]).unwrap());
    assert!(model.acc_satisfied(0, &[1.0, 1.0, 1.0], &[]).unwrap());
    assert!(!model.acc_satisfied(0, &[1.0, 2.0, 1.0], &[]).unwrap());
    assert!(!model.acc_satisfied(0, &[-1.0, 0.0, 1.0], &[]).unwrap());
}

#[test]
fn test_psd_block_contributions() {
    // min ⟨C, X̄⟩ + x0 with C = [2 1; 1 2]
    // s.t. ⟨I, X̄⟩ + x0 = 1 as one affine row
    let mut model: Model = Model::new();
    model.append_variables(1);
    model.put_cj(0, 1.0).unwrap();
    let block = model.append_psd_blocks(&[2]).unwrap();
    assert_eq!(model.psd_block_dim(block).unwrap(), 2);

    // lower triangle only; the (1,0) entry stands for both off diagonals
    model
        .put_barc_triplets(&[block, block, block], &[0, 1, 1], &[0, 0, 1], &[2.0, 1.0, 2.0])
        .unwrap();
    let err = model
        .put_barc_triplets(&[block], &[0], &[1], &[1.0])
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidPsdIndex { i: 0, j: 1, dim: 2 }));
    assert_eq!(model.barc_entries().len(), 3);

    let r = model.append_afe_rows(1);
    model.set_afe_entry(r, 0, 1.0);
    model.set_afe_constant(r, -1.0).unwrap();
    model
        .put_barf_triplets(&[r, r], &[block, block], &[0, 1], &[0, 1], &[1.0, 1.0])
        .unwrap();
    let zero = model.append_zero_domain(1).unwrap();
    model.append_acc(zero, &[r], None).unwrap();

    // X̄ = [0.5 0.1; 0.1 0.5] packed as (X00, X10, X11)
    let barx = vec![vec![0.5, 0.1, 0.5]];
    let objective = model.objective_value(&[0.0], &barx).unwrap();
    assert!((objective - 2.2).abs() < 1e-12);

    let rows = model.evaluate_afe_rows(&[0.0], &barx).unwrap();
    assert!(rows[0].abs() < 1e-12);
    assert!(model.acc_satisfied(0, &[0.0], &barx).unwrap());
    assert!(!model.acc_satisfied(0, &[0.5], &barx).unwrap());

    // wrongly sized block values
    assert!(model.evaluate_afe_rows(&[0.0], &[vec![0.5, 0.5]]).is_err());
    assert!(model.evaluate_afe_rows(&[0.0], &[]).is_err());
}

#[test]
fn test_psd_rows_checked_at_validation() {
    let mut model: Model = Model::new();
    model.append_psd_blocks(&[3]).unwrap();
    model.put_barf_triplets(&[4], &[0], &[2], &[1], &[1.0]).unwrap();
    assert!(matches!(
        model.validate(),
        Err(ModelError::UnknownHandle(HandleKind::AfeRow(4)))
    ));
    model.append_afe_rows(5);
    model.validate().unwrap();
}
