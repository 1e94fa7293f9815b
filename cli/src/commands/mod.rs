pub mod classes;
pub mod compile;
pub mod disassemble;
pub mod fire;
