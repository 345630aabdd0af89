pub mod ctf;
pub mod scan;
