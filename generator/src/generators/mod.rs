mod common;
mod golang;
mod java;
mod typescript;

pub use common::Generator;
pub use golang::GolangGenerator;
pub use java::JavaGenerator;
pub use typescript::TypescriptGenerator;
