mod similarity_resolver;

pub use similarity_resolver::*;

#[cfg(test)]
#[path = "./resolver_test.rs"]
mod resolver_test;
