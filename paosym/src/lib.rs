//! Crystal symmetry of the tight-binding Hamiltonian.
//!
//! A SymmetrySet carries the space-group operations together with
//! their orbital-space unitaries. It expands a Hamiltonian given on a
//! wedge of the Brillouin zone to the regular grid, and re-symmetrizes
//! the grid until the band structure is invariant under every
//! operation within threshold.

pub mod wigner;

mod kmap;

pub use kmap::{snap_to_grid, KMap};

use kmap::{match_grid_index, rotate_k};
use wigner::{to_chemistry_basis, wigner_blocks};

use kgrid::{full_grid, RGrid};
use krtransform::{k_to_r_fft, r_to_k_direct, r_to_k_fft};
use lattice::Lattice;
use linalg::eigvalsh;
use matrix::{Dot, Matrix};
use paoconsts::*;
use paopool::Pool;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::fmt;
use types::c64;
use utility::{block_diag, correct_roundoff_hex, wrap_half};

#[derive(Debug)]
pub enum SymmetryError {
    EulerReconstruction {
        op_index: usize,
    },

    IncompleteCoverage {
        found: usize,
        expected: usize,
        missing: Vec<[f64; 3]>,
    },
}

impl fmt::Display for SymmetryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SymmetryError::EulerReconstruction { op_index } => {
                write!(
                    f,
                    "symmetry operation {} cannot be rebuilt from its Euler angles",
                    op_index
                )
            }

            SymmetryError::IncompleteCoverage {
                found,
                expected,
                missing,
            } => {
                write!(
                    f,
                    "wedge expansion reached {} of {} grid points, first missing k = {:?}",
                    found, expected, missing[0]
                )
            }
        }
    }
}

impl Error for SymmetryError {}

/// Atomic-orbital basis of the Hamiltonian. Shells are listed atom by
/// atom; each shell contributes 2l+1 orbitals, or 2j+1 spinor
/// components when a spin-orbit basis is used.
#[derive(Debug, Clone)]
pub struct OrbitalBasis {
    atom_shells: Vec<usize>,
    l_shells: Vec<usize>,
    j2_shells: Option<Vec<i64>>,
}

impl OrbitalBasis {
    /// Scalar-relativistic basis from (atom index, l) shells.
    pub fn scalar(shells: &[(usize, usize)]) -> OrbitalBasis {
        let mut atom_shells = Vec::with_capacity(shells.len());
        let mut l_shells = Vec::with_capacity(shells.len());

        for &(atom, l) in shells {
            assert!(l <= 3, "orbital rotations are tabulated up to l = 3");
            assert_atom_order(&atom_shells, atom);

            atom_shells.push(atom);
            l_shells.push(l);
        }

        OrbitalBasis {
            atom_shells,
            l_shells,
            j2_shells: None,
        }
    }

    /// Spin-orbit basis from (atom index, l, 2j) shells. Every shell
    /// must carry j = l + 1/2 or j = l - 1/2.
    pub fn spin_orbit(shells: &[(usize, usize, i64)]) -> OrbitalBasis {
        let mut atom_shells = Vec::with_capacity(shells.len());
        let mut l_shells = Vec::with_capacity(shells.len());
        let mut j2_shells = Vec::with_capacity(shells.len());

        for &(atom, l, j2) in shells {
            assert!(l <= 3, "orbital rotations are tabulated up to l = 3");
            assert!(
                j2 == 2 * l as i64 + 1 || (l > 0 && j2 == 2 * l as i64 - 1),
                "shell j must be l + 1/2 or l - 1/2"
            );
            assert_atom_order(&atom_shells, atom);

            atom_shells.push(atom);
            l_shells.push(l);
            j2_shells.push(j2);
        }

        OrbitalBasis {
            atom_shells,
            l_shells,
            j2_shells: Some(j2_shells),
        }
    }

    pub fn is_spin_orbit(&self) -> bool {
        self.j2_shells.is_some()
    }

    pub fn n_shells(&self) -> usize {
        self.l_shells.len()
    }

    fn shell_dim(&self, ish: usize) -> usize {
        match &self.j2_shells {
            Some(j2s) => (j2s[ish] + 1) as usize,
            None => 2 * self.l_shells[ish] + 1,
        }
    }

    /// Total number of orbitals.
    pub fn nawf(&self) -> usize {
        (0..self.n_shells()).map(|i| self.shell_dim(i)).sum()
    }

    /// Atom index of every orbital, in basis order.
    pub fn atom_of_orbital(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.nawf());

        for ish in 0..self.n_shells() {
            for _ in 0..self.shell_dim(ish) {
                out.push(self.atom_shells[ish]);
            }
        }

        out
    }

    /// Spatial parity (-1)^l of every orbital.
    fn parity(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.nawf());

        for ish in 0..self.n_shells() {
            let p = if self.l_shells[ish] % 2 == 0 { 1.0 } else { -1.0 };

            for _ in 0..self.shell_dim(ish) {
                out.push(p);
            }
        }

        out
    }

    /// First orbital index of each atom. Requires contiguous shells
    /// per atom, which assert_atom_order guarantees.
    fn atom_offsets(&self) -> Vec<usize> {
        let natoms = match self.atom_shells.iter().max() {
            Some(&m) => m + 1,
            None => 0,
        };

        let mut counts = vec![0usize; natoms];

        for ish in 0..self.n_shells() {
            counts[self.atom_shells[ish]] += self.shell_dim(ish);
        }

        let mut offsets = vec![0usize; natoms];
        let mut off = 0;

        for a in 0..natoms {
            offsets[a] = off;
            off += counts[a];
        }

        offsets
    }

    fn atom_orbital_counts(&self) -> Vec<usize> {
        let natoms = match self.atom_shells.iter().max() {
            Some(&m) => m + 1,
            None => 0,
        };

        let mut counts = vec![0usize; natoms];

        for ish in 0..self.n_shells() {
            counts[self.atom_shells[ish]] += self.shell_dim(ish);
        }

        counts
    }
}

fn assert_atom_order(atom_shells: &[usize], atom: usize) {
    if let Some(&last) = atom_shells.last() {
        assert!(
            atom >= last,
            "shells must be listed atom by atom in ascending order"
        );
    }
}

/// One space-group operation with its orbital-space unitary.
pub struct SymOperator {
    /// Rotation in crystal coordinates.
    pub rot: Matrix<f64>,
    pub inv_rot: Matrix<f64>,
    pub time_reversal: bool,
    pub inversion: bool,
    pub is_identity: bool,
    /// Orbital unitary at k = 0; transform_hk attaches the
    /// atom-dependent phases.
    pub u: Matrix<c64>,
    /// Fractional shift per atom picked up by the operation.
    pub shifts: Vec<[f64; 3]>,
}

pub struct SymmetrySet {
    ops: Vec<SymOperator>,
    u_inv: Matrix<f64>,
    u_tr: Option<Matrix<c64>>,
    atom_of_orbital: Vec<usize>,
    nawf: usize,
}

impl SymmetrySet {
    /// Build the operator set. Rotations are given in crystal
    /// coordinates; equiv_atoms[iop][p] is the atom that operation
    /// iop sends atom p onto.
    pub fn new(
        rotations: &[Matrix<f64>],
        time_reversal: &[bool],
        atom_positions: &[[f64; 3]],
        equiv_atoms: &[Vec<usize>],
        basis: &OrbitalBasis,
        latt: &Lattice,
    ) -> Result<SymmetrySet, SymmetryError> {
        assert_eq!(rotations.len(), time_reversal.len());
        assert_eq!(rotations.len(), equiv_atoms.len());

        let nawf = basis.nawf();
        let atom_of_orbital = basis.atom_of_orbital();

        let u_tr = if basis.is_spin_orbit() {
            Some(spinor_time_reversal(basis))
        } else {
            None
        };

        let par = basis.parity();
        let mut u_inv = Matrix::<f64>::new(nawf, nawf);

        for i in 0..nawf {
            for j in 0..nawf {
                u_inv[[i, j]] = par[i] * par[j];
            }
        }

        let id3 = Matrix::<f64>::identity(3);
        let mut ops = Vec::with_capacity(rotations.len());

        for (iop, rot) in rotations.iter().enumerate() {
            let mut rot_cart = latt.rotation_to_cart(rot);
            correct_roundoff_hex(rot_cart.as_mut_slice(), EPS6);

            let (mut u, inversion) = orbital_rotation(&rot_cart, iop, basis)?;

            if time_reversal[iop] {
                if let Some(tr) = &u_tr {
                    u = tr.dot(&u);
                }
            }

            let perm = atom_permutation(basis, &equiv_atoms[iop]);
            u = perm.dot(&u);
            snap_unitary(&mut u, EPS8);

            let shifts = phase_shifts(rot, atom_positions, &equiv_atoms[iop]);

            let mut inv_rot = rot.clone();
            inv_rot.inv();

            let is_identity =
                rot.max_abs_diff(&id3) < EPS8 && !time_reversal[iop] && !inversion;

            ops.push(SymOperator {
                rot: rot.clone(),
                inv_rot,
                time_reversal: time_reversal[iop],
                inversion,
                is_identity,
                u,
                shifts,
            });
        }

        Ok(SymmetrySet {
            ops,
            u_inv,
            u_tr,
            atom_of_orbital,
            nawf,
        })
    }

    pub fn n_ops(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[SymOperator] {
        &self.ops
    }

    /// H(k') for k' the image of k under operation isym. kp is the
    /// source point k: the fractional-translation phases attach to
    /// the orbital unitary there.
    pub fn transform_hk(&self, h: &Matrix<c64>, isym: usize, kp: &[f64; 3]) -> Matrix<c64> {
        let op = &self.ops[isym];

        let u_k = self.u_at_k(op, kp);
        let mut thp = u_k.dot(h).dot(&u_k.adjoint());

        if op.inversion {
            thp *= &self.u_inv;
        }

        if op.time_reversal {
            thp *= &self.u_inv;
            thp = thp.conj();
        }

        thp
    }

    /// Inverse of transform_hk: recover H(k) from H(k') at the image
    /// point. kp is the source point k, as in the forward direction.
    pub fn transform_hk_rev(&self, h: &Matrix<c64>, isym: usize, kp: &[f64; 3]) -> Matrix<c64> {
        let op = &self.ops[isym];

        let u_k = self.u_at_k(op, kp);

        let mut thp = h.clone();

        if op.time_reversal {
            thp = thp.conj();
            thp *= &self.u_inv;
        }

        if op.inversion {
            thp *= &self.u_inv;
        }

        u_k.adjoint().dot(&thp).dot(&u_k)
    }

    fn u_at_k(&self, op: &SymOperator, kp: &[f64; 3]) -> Matrix<c64> {
        let mut u = op.u.clone();

        for n in 0..self.nawf {
            let s = op.shifts[self.atom_of_orbital[n]];
            let arg = TWOPI * (s[0] * kp[0] + s[1] * kp[1] + s[2] * kp[2]);
            let phase = c64::from_polar(1.0, arg);

            for m in 0..self.nawf {
                u[[m, n]] = u[[m, n]] * phase;
            }
        }

        u
    }

    /// Time-reversal image of a Hamiltonian block: H(-k) from H(k).
    fn tr_image(&self, h: &Matrix<c64>) -> Matrix<c64> {
        match &self.u_tr {
            Some(tr) => {
                let mut t = tr.dot(h).dot(&tr.adjoint());
                t *= &self.u_inv;
                t.conj()
            }

            None => h.conj(),
        }
    }

    /// Append the time-reversal partners -k of every wedge point not
    /// already present.
    pub fn apply_t_rev(&self, hks: &mut Vec<Matrix<c64>>, kpts: &mut Vec<[f64; 3]>) {
        let n0 = kpts.len();

        for i in 0..n0 {
            let mk = [
                wrap_half(-kpts[i][0]),
                wrap_half(-kpts[i][1]),
                wrap_half(-kpts[i][2]),
            ];

            let present = kpts.iter().any(|kp| {
                (kp[0] - mk[0]).abs() < EPS6
                    && (kp[1] - mk[1]).abs() < EPS6
                    && (kp[2] - mk[2]).abs() < EPS6
            });

            if present {
                continue;
            }

            let img = self.tr_image(&hks[i]);

            kpts.push(mk);
            hks.push(img);
        }
    }

    /// Average every k with the time-reversal image of -k on the
    /// regular grid, so that H(-k) = T H(k) T^-1 holds exactly.
    pub fn enforce_t_rev(&self, hks: &mut [Matrix<c64>], grid: &[[f64; 3]]) {
        let mut done = vec![false; grid.len()];

        for i in 0..grid.len() {
            if done[i] {
                continue;
            }

            let mk = [
                wrap_half(-grid[i][0]),
                wrap_half(-grid[i][1]),
                wrap_half(-grid[i][2]),
            ];

            // the regular grid always contains -k
            let j = match match_grid_index(&mk, grid) {
                Some(j) => j,
                None => continue,
            };

            let img = self.tr_image(&hks[j]);

            let mut avg = hks[i].clone();
            avg.add_scaled(&img, ONE_C64);
            avg = avg * 0.5;
            avg.hermitize();

            if i == j {
                hks[i] = avg;
            } else {
                hks[j] = self.tr_image(&avg);
                hks[i] = avg;

                done[j] = true;
            }

            done[i] = true;
        }
    }

    /// Map every full-grid point onto a wedge point and the operation
    /// connecting them. The first operation to reach a grid point
    /// wins. Fails if the orbit of the wedge misses part of the grid.
    pub fn find_equiv_k(
        &self,
        wedge_kpts: &[[f64; 3]],
        grid: &[[f64; 3]],
    ) -> Result<KMap, SymmetryError> {
        let mut covered = vec![false; grid.len()];
        let mut kmap = KMap::default();

        for (isym, op) in self.ops.iter().enumerate() {
            for (ik, kp) in wedge_kpts.iter().enumerate() {
                let newk = rotate_k(&op.rot, kp, op.time_reversal);

                if let Some(gi) = match_grid_index(&newk, grid) {
                    if !covered[gi] {
                        covered[gi] = true;
                        kmap.push(gi, ik, isym);
                    }
                }
            }
        }

        if kmap.len() != grid.len() {
            let missing: Vec<[f64; 3]> = covered
                .iter()
                .enumerate()
                .filter(|(_, &c)| !c)
                .map(|(i, _)| grid[i])
                .collect();

            return Err(SymmetryError::IncompleteCoverage {
                found: kmap.len(),
                expected: grid.len(),
                missing,
            });
        }

        Ok(kmap)
    }

    /// Populate the regular grid from the wedge, distributed over the
    /// pool by covered grid point.
    pub fn wedge_to_grid(
        &self,
        hks_wedge: &[Matrix<c64>],
        wedge_kpts: &[[f64; 3]],
        kmap: &KMap,
        grid: &[[f64; 3]],
        pool: &dyn Pool,
    ) -> Vec<Matrix<c64>> {
        let nn = self.nawf * self.nawf;
        let range = pool.own_range(kmap.len());

        let mut local = vec![ZERO_C64; range.len() * nn];

        for (li, idx) in range.enumerate() {
            let isym = kmap.sym_per_k[idx];
            let orig = kmap.orig_k_ind[idx];
            let gi = kmap.new_k_ind[idx];

            let mut h = if self.ops[isym].is_identity {
                hks_wedge[orig].clone()
            } else {
                self.transform_hk(&hks_wedge[orig], isym, &wedge_kpts[orig])
            };

            h.hermitize();

            local[li * nn..(li + 1) * nn].copy_from_slice(h.as_slice());
        }

        let mut full = vec![ZERO_C64; kmap.len() * nn];
        pool.allgather_c64(&local, &mut full);

        let mut out = vec![Matrix::<c64>::new(self.nawf, self.nawf); grid.len()];

        for (j, &gi) in kmap.new_k_ind.iter().enumerate() {
            out[gi]
                .as_mut_slice()
                .copy_from_slice(&full[j * nn..(j + 1) * nn]);
        }

        out
    }

    /// The operations whose image reaches grid point nki, together
    /// with the grid index of the source point.
    fn find_images(&self, nki: usize, grid: &[[f64; 3]]) -> Vec<(usize, usize)> {
        let mut images = Vec::with_capacity(self.ops.len());

        for (isym, op) in self.ops.iter().enumerate() {
            let src = rotate_k(&op.inv_rot, &grid[nki], op.time_reversal);

            if let Some(idx) = match_grid_index(&src, grid) {
                images.push((isym, idx));
            }
        }

        images
    }

    /// Replace H at every grid point by the mean over its symmetry
    /// images. Returns the largest deviation between any image and
    /// the identity image.
    pub fn symmetrize_grid(
        &self,
        hks: &mut [Matrix<c64>],
        grid: &[[f64; 3]],
        pool: &dyn Pool,
    ) -> f64 {
        let nn = self.nawf * self.nawf;
        let range = pool.own_range(grid.len());

        let mut local = vec![ZERO_C64; range.len() * nn];
        let mut residual = 0.0_f64;

        for (li, nki) in range.enumerate() {
            let images = self.find_images(nki, grid);

            let mut mean = Matrix::<c64>::new(self.nawf, self.nawf);
            let mut first: Option<Matrix<c64>> = None;

            for &(isym, src) in images.iter() {
                let t = if self.ops[isym].is_identity {
                    hks[src].clone()
                } else {
                    self.transform_hk(&hks[src], isym, &grid[src])
                };

                match &first {
                    Some(f0) => residual = residual.max(t.max_abs_diff(f0)),
                    None => first = Some(t.clone()),
                }

                mean.add_scaled(&t, ONE_C64);
            }

            mean = mean * (1.0 / images.len() as f64);
            mean.hermitize();

            local[li * nn..(li + 1) * nn].copy_from_slice(mean.as_slice());
        }

        let mut full = vec![ZERO_C64; grid.len() * nn];
        pool.allgather_c64(&local, &mut full);

        for (nki, h) in hks.iter_mut().enumerate() {
            h.as_mut_slice()
                .copy_from_slice(&full[nki * nn..(nki + 1) * nn]);
        }

        pool.reduce_max(residual)
    }

    /// Largest band-energy spread over the orbit of random sample
    /// points, evaluated by direct interpolation from R space.
    pub fn check_sym(&self, hrs: &[Matrix<c64>], rgrid: &RGrid, samples: &[[f64; 3]]) -> f64 {
        let mut branches: Vec<Vec<Vec<f64>>> = Vec::new();

        for op in self.ops.iter() {
            // antiunitary operations send k to -Rk
            let sign = if op.time_reversal { -1.0 } else { 1.0 };

            let kpts: Vec<[f64; 3]> = samples
                .iter()
                .map(|kp| {
                    let mut out = [0.0; 3];
                    op.rot.action(kp, &mut out);

                    [sign * out[0], sign * out[1], sign * out[2]]
                })
                .collect();

            let hks = r_to_k_direct(hrs, rgrid, &kpts);

            branches.push(hks.iter().map(|h| eigvalsh(h)).collect());
        }

        let mut worst = 0.0_f64;

        for s in 0..samples.len() {
            for b in 0..self.nawf {
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;

                for br in branches.iter() {
                    lo = lo.min(br[s][b]);
                    hi = hi.max(br[s][b]);
                }

                worst = worst.max(hi - lo);
            }
        }

        worst
    }

    /// Expand the wedge Hamiltonian to the regular grid and
    /// symmetrize it, optionally iterating with a low-pass filter
    /// until the sampled band residual drops below threshold.
    pub fn expand_to_grid(
        &self,
        hks_wedge: &[Matrix<c64>],
        wedge_kpts: &[[f64; 3]],
        nk: [usize; 3],
        latt: &Lattice,
        use_time_reversal: bool,
        refine: Option<&RefineConfig>,
        pool: &dyn Pool,
    ) -> Result<(Vec<Matrix<c64>>, SymmetrizeReport), SymmetryError> {
        let grid = full_grid(nk);

        let mut hks = hks_wedge.to_vec();
        let mut kpts = wedge_kpts.to_vec();

        snap_to_grid(&mut kpts, &grid);

        if use_time_reversal {
            self.apply_t_rev(&mut hks, &mut kpts);
        }

        let kmap = self.find_equiv_k(&kpts, &grid)?;

        let mut hks_grid = self.wedge_to_grid(&hks, &kpts, &kmap, &grid, pool);

        self.symmetrize_grid(&mut hks_grid, &grid, pool);

        let report = match refine {
            Some(cfg) => self.refine_grid(&mut hks_grid, nk, &grid, latt, cfg, pool),

            None => SymmetrizeReport {
                residual: 0.0,
                iterations: 0,
                converged: true,
            },
        };

        Ok((hks_grid, report))
    }

    fn refine_grid(
        &self,
        hks_grid: &mut Vec<Matrix<c64>>,
        nk: [usize; 3],
        grid: &[[f64; 3]],
        latt: &Lattice,
        cfg: &RefineConfig,
        pool: &dyn Pool,
    ) -> SymmetrizeReport {
        let samples = sample_kpts(cfg.num_samples, cfg.seed);

        let mut residual = 0.0;
        let mut iterations = 0;
        let mut converged = false;

        for iter in 1..=cfg.max_iter {
            let (mut hrs, rgrid) = k_to_r_fft(hks_grid, nk, [0, 0, 0]);

            residual = self.check_sym(&hrs, &rgrid, &samples);
            iterations = iter;

            if cfg.verbose && pool.is_coordinator() {
                println!("Sym iter #{:2}: {:.4e}", iter, residual);
            }

            if residual < cfg.threshold {
                converged = true;

                break;
            }

            low_pass_filter(&mut hrs, &rgrid, latt, cfg.lpf_cutoff, cfg.lpf_scale);

            *hks_grid = r_to_k_fft(&hrs, nk);

            self.symmetrize_grid(hks_grid, grid, pool);
        }

        SymmetrizeReport {
            residual,
            iterations,
            converged,
        }
    }
}

/// Settings of the iterative re-symmetrization loop.
#[derive(Debug, Clone)]
pub struct RefineConfig {
    pub threshold: f64,
    pub max_iter: usize,
    pub lpf_cutoff: f64,
    pub lpf_scale: f64,
    pub num_samples: usize,
    pub seed: u64,
    pub verbose: bool,
}

impl Default for RefineConfig {
    fn default() -> RefineConfig {
        RefineConfig {
            threshold: SYMM_THRESHOLD,
            max_iter: SYMM_MAX_ITER,
            lpf_cutoff: LPF_CUTOFF,
            lpf_scale: LPF_SCALE,
            num_samples: 10,
            seed: 42,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetrizeReport {
    pub residual: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Damp the long-range tail of H(R): entries beyond cutoff times the
/// largest radius are scaled down.
pub fn low_pass_filter(
    hrs: &mut [Matrix<c64>],
    rgrid: &RGrid,
    latt: &Lattice,
    cutoff: f64,
    scale: f64,
) {
    let cart = rgrid.cartesian(latt);

    let radius: Vec<f64> = cart
        .iter()
        .map(|r| (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt())
        .collect();

    let rmax = radius.iter().cloned().fold(0.0, f64::max);

    for (ir, h) in hrs.iter_mut().enumerate() {
        if radius[ir] > cutoff * rmax {
            *h = h.clone() * scale;
        }
    }
}

/// Reproducible random k points in [-0.5, 0.5)^3, rounded to four
/// decimals so they never collide with tolerance windows.
pub fn sample_kpts(n: usize, seed: u64) -> Vec<[f64; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..n)
        .map(|_| {
            let mut kp = [0.0; 3];

            for v in kp.iter_mut() {
                let x: f64 = rng.gen::<f64>() - 0.5;

                *v = (x * 1.0e4).round() / 1.0e4;
            }

            kp
        })
        .collect()
}

fn orbital_rotation(
    rot_cart: &Matrix<f64>,
    iop: usize,
    basis: &OrbitalBasis,
) -> Result<(Matrix<c64>, bool), SymmetryError> {
    match &basis.j2_shells {
        Some(j2s) => {
            let (blocks, inversion) = wigner_blocks(rot_cart, iop, [1, 3, 5, 7])?;

            let shell_blocks: Vec<&Matrix<c64>> = j2s
                .iter()
                .map(|&j2| &blocks[((j2 - 1) / 2) as usize])
                .collect();

            Ok((block_diag(&shell_blocks), inversion))
        }

        None => {
            let (blocks, inversion) = wigner_blocks(rot_cart, iop, [0, 2, 4, 6])?;
            let chem = to_chemistry_basis(&blocks);

            let shell_blocks: Vec<&Matrix<c64>> =
                basis.l_shells.iter().map(|&l| &chem[l]).collect();

            Ok((block_diag(&shell_blocks), inversion))
        }
    }
}

/// T |j m> = (-1)^(j - m) |j -m>, one antidiagonal block per shell.
fn spinor_time_reversal(basis: &OrbitalBasis) -> Matrix<c64> {
    let j2s = basis.j2_shells.as_ref().unwrap();

    let blocks: Vec<Matrix<c64>> = j2s
        .iter()
        .map(|&j2| {
            let n = (j2 + 1) as usize;
            let mut mat = Matrix::<c64>::new(n, n);

            for r in 0..n {
                let sign = if (j2 - r as i64).rem_euclid(2) == 0 {
                    1.0
                } else {
                    -1.0
                };

                mat[[r, n - 1 - r]] = c64::new(sign, 0.0);
            }

            mat
        })
        .collect();

    let refs: Vec<&Matrix<c64>> = blocks.iter().collect();

    block_diag(&refs)
}

/// Permutation moving the orbital block of each atom onto its image
/// atom.
fn atom_permutation(basis: &OrbitalBasis, equiv: &[usize]) -> Matrix<c64> {
    let nawf = basis.nawf();
    let offsets = basis.atom_offsets();
    let counts = basis.atom_orbital_counts();

    let mut perm = Matrix::<c64>::new(nawf, nawf);

    for (p, &p1) in equiv.iter().enumerate() {
        assert_eq!(
            counts[p], counts[p1],
            "equivalent atoms must carry the same orbitals"
        );

        for r in 0..counts[p] {
            perm[[offsets[p1] + r, offsets[p] + r]] = ONE_C64;
        }
    }

    perm
}

/// Fractional shift picked up by every atom: the image of atom p
/// lands on atom equiv[p] displaced by a lattice vector.
fn phase_shifts(rot: &Matrix<f64>, positions: &[[f64; 3]], equiv: &[usize]) -> Vec<[f64; 3]> {
    let rot_t = rot.transpose();

    let mut shifts = vec![[0.0; 3]; positions.len()];

    for (p, pos) in positions.iter().enumerate() {
        let p1 = equiv[p];

        let mut mapped = [0.0; 3];
        rot_t.action(pos, &mut mapped);

        for i in 0..3 {
            shifts[p1][i] = ((mapped[i] - positions[p1][i]) * 100.0).round() / 100.0;
        }
    }

    shifts
}

fn snap_unitary(u: &mut Matrix<c64>, atol: f64) {
    for v in u.as_mut_slice().iter_mut() {
        let mut re_im = [v.re, v.im];
        correct_roundoff_hex(&mut re_im, atol);

        *v = c64::new(re_im[0], re_im[1]);
    }
}
