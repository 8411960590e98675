//! Small nonlinear solvers shared by unit cells, exchangers and components.

mod jacobian;
mod newton;
mod roots;

pub use jacobian::finite_difference_jacobian;
pub use newton::{NewtonConfig, NewtonResult, newton_solve, newton_solve_fd};
pub use roots::{RootConfig, RootResult, brent, secant};
