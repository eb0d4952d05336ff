pub mod plan;
pub mod specfile;


#[cfg(test)]
#[path = "specfile_test.rs"]
mod specfile_test;
