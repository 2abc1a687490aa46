//! Saddle-point assembly of a two-body scene, checked against a dense
//! reference built directly with nalgebra.

use approx::assert_relative_eq;
use mbs_assembly::{
    Assembler, AssemblyConfig, AssemblyError, BodyBlock, Constraint, JacobianBlock, KktStorage,
    StaticConstraint,
};
use mbs_link::{Joint, LinkBase, LinkState, LinkType};
use mbs_sparse::{
    CsrSparseMatrix, DenseMatrix, SparseMatrix, SymmetryType, TripletMatrix,
};
use nalgebra::{DMatrix, Matrix3};
use std::collections::BTreeSet;

const NUM_VARS: usize = 6;

fn body_masses() -> Vec<BodyBlock> {
    vec![
        BodyBlock::new(0, 0, DMatrix::from_diagonal(&nalgebra::dvector![2.0, 2.0, 1.0])),
        BodyBlock::new(
            1,
            3,
            DMatrix::from_row_slice(3, 3, &[4.0, 0.5, 0.0, 0.5, 4.0, 0.0, 0.0, 0.0, 1.0]),
        ),
    ]
}

fn ball_blocks() -> Vec<JacobianBlock> {
    let identity = DMatrix::<f64>::identity(3, 3);
    vec![
        JacobianBlock::new(0, 0, identity.clone()),
        JacobianBlock::new(1, 3, -identity),
    ]
}

fn rod_blocks() -> Vec<JacobianBlock> {
    vec![
        JacobianBlock::new(0, 0, DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 0.0])),
        JacobianBlock::new(1, 3, DMatrix::from_row_slice(1, 3, &[-1.0, -2.0, 0.5])),
    ]
}

/// Ball joint, a broken distance link, then an intact distance link.
fn scene() -> Vec<StaticConstraint> {
    let ball = StaticConstraint::new(Joint::named("ball", LinkType::Spherical), ball_blocks());
    let mut cut = StaticConstraint::new(
        Joint::named("cut", LinkType::Distance),
        vec![JacobianBlock::new(1, 3, DMatrix::from_element(1, 3, 9.0))],
    );
    cut.set_broken(true);
    let rod = StaticConstraint::new(Joint::named("rod", LinkType::Distance), rod_blocks());
    vec![ball, cut, rod]
}

fn reference_kkt() -> DMatrix<f64> {
    let mut cq = DMatrix::<f64>::zeros(4, NUM_VARS);
    cq.view_mut((0, 0), (3, 3)).copy_from(&Matrix3::identity());
    cq.view_mut((0, 3), (3, 3)).copy_from(&(-Matrix3::identity()));
    cq.view_mut((3, 0), (1, 3)).copy_from_slice(&[1.0, 2.0, 0.0]);
    cq.view_mut((3, 3), (1, 3)).copy_from_slice(&[-1.0, -2.0, 0.5]);

    let mut k = DMatrix::<f64>::zeros(NUM_VARS + 4, NUM_VARS + 4);
    for body in body_masses() {
        k.view_mut((body.offset, body.offset), (3, 3)).copy_from(&body.mass);
    }
    k.view_mut((NUM_VARS, 0), (4, NUM_VARS)).copy_from(&cq);
    k.view_mut((0, NUM_VARS), (NUM_VARS, 4)).copy_from(&cq.transpose());
    k
}

fn upper_assembler() -> Assembler {
    Assembler::new(AssemblyConfig {
        kkt_storage: KktStorage::Upper,
        ..Default::default()
    })
}

fn entries<M: SparseMatrix>(matrix: &M) -> Vec<(usize, usize, f64)> {
    let mut out = Vec::new();
    matrix.for_each_entry(&mut |row, col, value| {
        if value != 0.0 {
            out.push((row, col, value));
        }
    });
    out.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    out
}

#[test]
fn test_full_kkt_matches_dense_reference() {
    let mut kkt = DenseMatrix::new(0, 0);
    let report = Assembler::default()
        .assemble_kkt(&mut kkt, &body_masses(), &scene(), NUM_VARS)
        .unwrap();

    assert_eq!((report.rows, report.cols), (10, 10));
    assert_eq!(report.active, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.blocks_pasted, 2 + 4);
    assert_eq!(report.wake_bodies, BTreeSet::from([0, 1]));
    assert_eq!(kkt.symmetry(), SymmetryType::SymmetricIndef);
    assert_relative_eq!(*kkt.as_matrix(), reference_kkt(), epsilon = 1e-12);
}

#[test]
fn test_upper_kkt_is_upper_triangle_of_full() {
    let mut full = TripletMatrix::new(0, 0);
    let mut upper = TripletMatrix::new(0, 0);
    Assembler::default()
        .assemble_kkt(&mut full, &body_masses(), &scene(), NUM_VARS)
        .unwrap();
    upper_assembler()
        .assemble_kkt(&mut upper, &body_masses(), &scene(), NUM_VARS)
        .unwrap();

    assert_eq!(upper.nrows(), full.nrows());
    for row in 0..full.nrows() {
        for col in 0..full.ncols() {
            let expected = if row <= col {
                full.get_element(row, col).unwrap()
            } else {
                0.0
            };
            assert_eq!(upper.get_element(row, col).unwrap(), expected, "({row}, {col})");
        }
    }
}

#[test]
fn test_backends_agree_on_kkt() {
    let mut csr = CsrSparseMatrix::new(0, 0);
    let mut triplet = TripletMatrix::new(0, 0);
    let mut dense = DenseMatrix::new(0, 0);
    let assembler = Assembler::default();
    for target in [
        &mut csr as &mut dyn SparseMatrix,
        &mut triplet as &mut dyn SparseMatrix,
        &mut dense as &mut dyn SparseMatrix,
    ] {
        assembler
            .assemble_kkt(target, &body_masses(), &scene(), NUM_VARS)
            .unwrap();
    }

    assert_eq!(entries(&csr), entries(&triplet));
    assert_eq!(entries(&dense), entries(&triplet));

    let exported = csr.csr_export().expect("csr backend exports arrays");
    let converted = exported.to_csr_matrix().unwrap();
    assert_eq!(converted.nnz(), csr.nnz());
    assert_eq!(converted.nrows(), 10);
}

#[test]
fn test_pair_parallel_matches_sequential() {
    let sequential = Assembler::new(AssemblyConfig {
        parallel: false,
        ..Default::default()
    });
    let parallel = Assembler::default();

    let mut jac_seq = TripletMatrix::new(0, 0);
    let mut mass_seq = TripletMatrix::new(0, 0);
    let mut jac_par = CsrSparseMatrix::new(0, 0);
    let mut mass_par = CsrSparseMatrix::new(0, 0);

    let seq = sequential
        .assemble_pair(&mut jac_seq, &mut mass_seq, &body_masses(), &scene(), NUM_VARS)
        .unwrap();
    let par = parallel
        .assemble_pair(&mut jac_par, &mut mass_par, &body_masses(), &scene(), NUM_VARS)
        .unwrap();

    assert_eq!(seq, par);
    assert_eq!((seq.0.rows, seq.0.cols), (4, NUM_VARS));
    assert_eq!((seq.1.rows, seq.1.cols), (NUM_VARS, NUM_VARS));
    assert_eq!(entries(&jac_seq), entries(&jac_par));
    assert_eq!(entries(&mass_seq), entries(&mass_par));
    assert_eq!(mass_par.symmetry(), SymmetryType::SymmetricPosDef);
    assert_eq!(jac_par.symmetry(), SymmetryType::General);
}

#[test]
fn test_invalid_mass_leaves_kkt_untouched() {
    let mut kkt = TripletMatrix::new(0, 0);
    let assembler = Assembler::default();
    assembler
        .assemble_kkt(&mut kkt, &body_masses(), &scene(), NUM_VARS)
        .unwrap();
    let before = entries(&kkt);

    let mut bodies = body_masses();
    bodies[1].offset = 4;
    let err = assembler
        .assemble_kkt(&mut kkt, &bodies, &scene(), NUM_VARS)
        .unwrap_err();

    assert!(matches!(err, AssemblyError::InvalidMassBlock { body: 1, offset: 4, .. }));
    assert_eq!(kkt.nrows(), 10);
    assert_eq!(entries(&kkt), before);
}

#[test]
fn test_repaired_link_rejoins_assembly() {
    let mut constraints = scene();
    let mut jacobian = TripletMatrix::new(0, 0);
    let assembler = Assembler::default();

    let report = assembler
        .assemble_jacobian(&mut jacobian, &constraints, NUM_VARS)
        .unwrap();
    assert_eq!(report.rows, 4);

    constraints[1].set_broken(false);
    constraints[0].set_disabled(true);
    let report = assembler
        .assemble_jacobian(&mut jacobian, &constraints, NUM_VARS)
        .unwrap();

    // cut at row 0, rod at row 1
    assert_eq!(report.rows, 2);
    assert_eq!(report.active, 2);
    assert_eq!(jacobian.get_element(0, 4).unwrap(), 9.0);
    assert_eq!(jacobian.get_element(1, 1).unwrap(), 2.0);
    assert_eq!(jacobian.get_element(1, 5).unwrap(), 0.5);
}

/// Gear pair defined by a physics crate; it does not wake its bodies.
struct Gear {
    state: LinkState,
    ratio: f64,
}

impl LinkBase for Gear {
    fn state(&self) -> &LinkState {
        &self.state
    }
    fn state_mut(&mut self) -> &mut LinkState {
        &mut self.state
    }
    fn link_type(&self) -> LinkType {
        LinkType::Gear
    }
    fn num_coords(&self) -> usize {
        1
    }
    fn is_requiring_waking(&self) -> bool {
        false
    }
}

impl Constraint for Gear {
    fn jacobian(&self) -> Vec<JacobianBlock> {
        vec![
            JacobianBlock::new(0, 2, DMatrix::from_element(1, 1, 1.0)),
            JacobianBlock::new(1, 5, DMatrix::from_element(1, 1, -self.ratio)),
        ]
    }
}

#[test]
fn test_heterogeneous_constraints() {
    let constraints: Vec<Box<dyn Constraint>> = vec![
        Box::new(Gear {
            state: LinkState::default(),
            ratio: 3.0,
        }),
        Box::new(StaticConstraint::new(
            Joint::named("rod", LinkType::Distance),
            rod_blocks(),
        )),
    ];

    let mut jacobian = CsrSparseMatrix::new(0, 0);
    let report = Assembler::default()
        .assemble_jacobian(&mut jacobian, &constraints, NUM_VARS)
        .unwrap();

    assert_eq!(report.rows, 2);
    assert_eq!(report.blocks_pasted, 4);
    assert_eq!(report.wake_bodies, BTreeSet::from([0, 1]));
    assert_eq!(jacobian.get_element(0, 5).unwrap(), -3.0);
    assert_eq!(jacobian.get_element(1, 0).unwrap(), 1.0);

    // Only the gear is left: nobody needs waking.
    let report = Assembler::default()
        .assemble_jacobian(&mut jacobian, &constraints[..1], NUM_VARS)
        .unwrap();
    assert!(report.wake_bodies.is_empty());
}
