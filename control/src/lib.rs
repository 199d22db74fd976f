use paoconsts::*;

use std::{
    fs::File,
    io::{BufRead, BufReader},
};

#[derive(Debug, Default)]
pub struct Control {
    verbosity: String,

    nk1: usize,
    nk2: usize,
    nk3: usize,

    nelec: f64,

    spin_orbit: bool,
    mag_calc: bool,

    // band selection for the reduced Hamiltonian
    proj_thr: f64,
    shift_energy: f64, // eV on input, Ha internally
    shift_kind: i32,
    shift_eta: f64, // eV on input, Ha internally

    // grid symmetrization
    symmetrize: bool,
    symm_thresh: f64,
    symm_max_iter: usize,

    eigen_solver: String, // standard, generalized
    pool_scheme: String,  // serial
}

impl Control {
    pub fn new() -> Control {
        let mut ctrl = Control::default();

        ctrl.verbosity = "high".to_string();

        ctrl.nk1 = 1;
        ctrl.nk2 = 1;
        ctrl.nk3 = 1;

        ctrl.proj_thr = 0.95;
        ctrl.shift_energy = 5.0 * EV_TO_HA;
        ctrl.shift_kind = 1;
        ctrl.shift_eta = 1.0 * EV_TO_HA;

        ctrl.symmetrize = false;
        ctrl.symm_thresh = SYMM_THRESHOLD;
        ctrl.symm_max_iter = SYMM_MAX_ITER;

        ctrl.eigen_solver = "standard".to_string();
        ctrl.pool_scheme = "serial".to_string();

        ctrl
    }

    pub fn get_verbosity(&self) -> &str {
        &self.verbosity
    }

    pub fn get_nk(&self) -> [usize; 3] {
        [self.nk1, self.nk2, self.nk3]
    }

    pub fn get_nelec(&self) -> f64 {
        self.nelec
    }

    pub fn is_spin_orbit(&self) -> bool {
        self.spin_orbit
    }

    pub fn is_mag_calc(&self) -> bool {
        self.mag_calc
    }

    pub fn get_proj_thr(&self) -> f64 {
        self.proj_thr
    }

    pub fn get_shift_energy(&self) -> f64 {
        self.shift_energy
    }

    pub fn get_shift_kind(&self) -> i32 {
        self.shift_kind
    }

    pub fn get_shift_eta(&self) -> f64 {
        self.shift_eta
    }

    pub fn get_symmetrize(&self) -> bool {
        self.symmetrize
    }

    pub fn get_symm_thresh(&self) -> f64 {
        self.symm_thresh
    }

    pub fn get_symm_max_iter(&self) -> usize {
        self.symm_max_iter
    }

    pub fn get_eigen_solver(&self) -> &str {
        &self.eigen_solver
    }

    pub fn get_pool_scheme(&self) -> &str {
        &self.pool_scheme
    }

    pub fn read_file(&mut self, inpfile: &str) {
        let mut b_has_invalid_parameter = false;

        let lines = self.read_file_data_to_vec(inpfile);

        for line in lines.iter() {
            let s: Vec<&str> = line.split('=').map(|x| x.trim()).collect();

            match s[0] {
                "verbosity" => {
                    self.verbosity = s[1].parse().unwrap();
                }

                "nk1" => {
                    self.nk1 = s[1].parse().unwrap();
                }

                "nk2" => {
                    self.nk2 = s[1].parse().unwrap();
                }

                "nk3" => {
                    self.nk3 = s[1].parse().unwrap();
                }

                "nelec" => {
                    self.nelec = s[1].parse().unwrap();
                }

                "spin_orbit" => {
                    self.spin_orbit = s[1].parse().unwrap();
                }

                "mag_calc" => {
                    self.mag_calc = s[1].parse().unwrap();
                }

                "proj_thr" => {
                    self.proj_thr = s[1].parse().unwrap();
                }

                "shift_energy" => {
                    self.shift_energy = s[1].parse::<f64>().unwrap() * EV_TO_HA;
                }

                "shift_kind" => {
                    self.shift_kind = s[1].parse().unwrap();
                }

                "shift_eta" => {
                    self.shift_eta = s[1].parse::<f64>().unwrap() * EV_TO_HA;
                }

                "symmetrize" => {
                    self.symmetrize = s[1].parse().unwrap();
                }

                "symm_thresh" => {
                    self.symm_thresh = s[1].parse().unwrap();
                }

                "symm_max_iter" => {
                    self.symm_max_iter = s[1].parse().unwrap();
                }

                "eigen_solver" => {
                    self.eigen_solver = s[1].parse().unwrap();
                }

                "pool_scheme" => {
                    self.pool_scheme = s[1].parse().unwrap();
                }

                "" => {}

                _ => {
                    println!("unknown parameter : {}", line);
                    b_has_invalid_parameter = true;
                }
            }
        }

        if b_has_invalid_parameter {
            println!("Program exited abnormally");

            std::process::exit(-1);
        }
    }

    pub fn read_file_data_to_vec(&mut self, inpfile: &str) -> Vec<String> {
        let file = File::open(inpfile).unwrap();

        let lines = BufReader::new(file).lines();

        let lines: Vec<String> = lines.filter_map(std::io::Result::ok).collect();

        lines
    }

    pub fn display(&self) {
        const OUT_WIDTH1: usize = 28;
        const OUT_WIDTH2: usize = 18;

        println!("   {:-^80}", " control parameters ");
        println!();

        println!(
            "   {:<width1$} = {:>width2$}",
            "nk1 x nk2 x nk3",
            format!("{} x {} x {}", self.nk1, self.nk2, self.nk3),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "nelec",
            self.get_nelec(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "spin_orbit",
            self.is_spin_orbit(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "proj_thr",
            self.get_proj_thr(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$.3E} eV",
            "shift_energy",
            self.get_shift_energy() * HA_TO_EV,
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "shift_kind",
            self.get_shift_kind(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "symmetrize",
            self.get_symmetrize(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$.3E}",
            "symm_thresh",
            self.get_symm_thresh(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!(
            "   {:<width1$} = {:>width2$}",
            "eigen_solver",
            self.get_eigen_solver(),
            width1 = OUT_WIDTH1,
            width2 = OUT_WIDTH2
        );

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let ctrl = Control::new();

        assert_eq!(ctrl.get_nk(), [1, 1, 1]);
        assert_eq!(ctrl.get_shift_kind(), 1);
        assert!((ctrl.get_proj_thr() - 0.95).abs() < EPS12);
        assert_eq!(ctrl.get_eigen_solver(), "standard");
        assert_eq!(ctrl.get_pool_scheme(), "serial");
        assert!(!ctrl.get_symmetrize());
    }

    #[test]
    fn test_read_file() {
        let path = std::env::temp_dir().join("in.ctrl.test");

        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, "nk1 = 4").unwrap();
            writeln!(f, "nk2 = 4").unwrap();
            writeln!(f, "nk3 = 2").unwrap();
            writeln!(f, "nelec = 8.0").unwrap();
            writeln!(f).unwrap();
            writeln!(f, "shift_kind = 0").unwrap();
            writeln!(f, "symmetrize = true").unwrap();
            writeln!(f, "symm_thresh = 1e-4").unwrap();
        }

        let mut ctrl = Control::new();
        ctrl.read_file(path.to_str().unwrap());

        assert_eq!(ctrl.get_nk(), [4, 4, 2]);
        assert!((ctrl.get_nelec() - 8.0).abs() < EPS12);
        assert_eq!(ctrl.get_shift_kind(), 0);
        assert!(ctrl.get_symmetrize());
        assert!((ctrl.get_symm_thresh() - 1e-4).abs() < EPS12);

        std::fs::remove_file(&path).ok();
    }
}
