mod error;
pub use error::{ExecError, ExecResult};

pub mod proc;
pub use proc::{ProcConfig, ProcRunner};

mod util;

#[cfg(feature = "roachprod")]
pub mod roachprod;
#[cfg(feature = "roachprod")]
pub use roachprod::{RoachprodCluster, RoachprodConfig};
