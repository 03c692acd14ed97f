// Constants

// Tolerances
pub const LATTICE_TOLERANCE: f64 = 1e-10; // For most lattice operations
pub const COST_TOLERANCE: f64 = 1e-5; // For classifying mapping costs as equal

// Sentinel cost for forbidden assignments
pub const DEFAULT_INFINITY: f64 = 1e20;

// Iteration bounds
pub const MAX_VORONOI_ITERATIONS: usize = 64; // Wigner-Seitz wrap-in loop
pub const MAX_LLL_ITERATIONS: usize = 256; // Basis reduction loop

// Unimodular reorientation search: entries of the perturbation matrix
// are drawn from [-range, range]
pub const DEFAULT_REORIENTATION_RANGE: i64 = 1;

// Quantum for fingerprint quantization of fractional translations
pub const FINGERPRINT_QUANTUM: f64 = 1e-6;
