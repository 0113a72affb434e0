pub mod driver;
pub mod io;

pub use driver::*;
pub use io::*;
