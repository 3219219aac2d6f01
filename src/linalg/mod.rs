pub mod cholesky;
pub mod givens;
pub mod householder;
