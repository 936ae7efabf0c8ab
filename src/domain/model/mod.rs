pub mod aggregate;
pub mod movie;
pub mod review;
pub mod validation;

pub use aggregate::*;
pub use movie::*;
pub use review::*;
pub use validation::*;
